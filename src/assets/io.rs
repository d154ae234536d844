use std::future::Future;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::errors::{Error, Result};

/// Asynchronous byte source for asset files.
pub trait AssetReader: Send + Sync {
    fn read_bytes(&self, uri: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Reads assets relative to a root directory.
#[derive(Debug, Clone)]
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root_path: root.as_ref().to_path_buf(),
        }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Path of `uri`, relative to the root unless already absolute.
    #[must_use]
    pub fn resolve(&self, uri: &str) -> PathBuf {
        self.root_path.join(uri)
    }
}

impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        if is_data_uri(uri) {
            return decode_data_uri(uri);
        }
        let path = self.resolve(uri);
        tokio::fs::read(&path).await.map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("{}: {e}", path.display()),
            ))
        })
    }
}

#[inline]
#[must_use]
pub fn is_data_uri(uri: &str) -> bool {
    uri.starts_with("data:")
}

/// Decodes a base64 `data:` URI payload.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| Error::DataUriError("missing ',' separator".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(Error::DataUriError(format!(
            "unsupported encoding in '{header}'"
        )));
    }
    Ok(STANDARD.decode(payload)?)
}

/// Directory containing `path`, used to resolve relative buffer URIs.
#[must_use]
pub fn parent_dir(path: &str) -> String {
    Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// File name without extension, or the whole input.
#[must_use]
pub fn file_stem(path: &str) -> &str {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_data_uri() {
        let bytes = decode_data_uri("data:application/octet-stream;base64,AQID").unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn rejects_plain_data_uri() {
        assert!(matches!(
            decode_data_uri("data:text/plain,hello"),
            Err(Error::DataUriError(_))
        ));
    }

    #[test]
    fn stems_and_parents() {
        assert_eq!(file_stem("models/mmd/motions/loop_step_1.glb"), "loop_step_1");
        assert_eq!(parent_dir("models/mmd/alicia/a.glb"), "models/mmd/alicia");
    }
}
