//! glTF model and motion decoding.
//!
//! Decoding produces plain data ([`ModelData`], [`AnimationClip`]) that is
//! `Send` and can cross from the loader runtime to the UI thread. Scene
//! nodes are only created by [`ModelData::instantiate`].

use std::sync::Arc;

use glam::{Affine3A, Mat4, Quat, Vec3, Vec4};
use gltf::animation::util::ReadOutputs;

use crate::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use crate::assets::io::{AssetReader, file_stem, is_data_uri, decode_data_uri, parent_dir};
use crate::errors::{Error, Result};
use crate::resources::{AlphaMode, Geometry, Material, TextureData, Vertex};
use crate::scene::{Model, ModelPrimitive, Node, Scene, Skeleton, Transform};

#[derive(Debug, Clone)]
pub struct NodeData {
    pub name: String,
    pub parent: Option<usize>,
    pub transform: (Vec3, Quat, Vec3),
}

#[derive(Debug, Clone)]
pub struct SkinData {
    pub name: String,
    /// Indices into [`ModelData::nodes`].
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Vec<Affine3A>,
}

#[derive(Debug, Clone)]
pub struct PrimitiveData {
    pub node: usize,
    pub skin: Option<usize>,
    pub geometry: Arc<Geometry>,
    pub material: Arc<Material>,
}

/// A decoded model, not yet part of any scene.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub name: String,
    pub nodes: Vec<NodeData>,
    pub skins: Vec<SkinData>,
    pub primitives: Vec<PrimitiveData>,
    pub animations: Vec<AnimationClip>,
}

impl ModelData {
    /// Creates the node hierarchy and skeletons inside `scene`.
    ///
    /// Every top-level glTF node is re-parented under a fresh root node named
    /// after the model; the returned [`Model`] still has to be registered
    /// with [`Scene::add_model`] to be drawn.
    pub fn instantiate(&self, scene: &mut Scene) -> Model {
        let root = scene.add_node(Node::new(self.name.clone()));

        let handles: Vec<_> = self
            .nodes
            .iter()
            .map(|n| {
                let mut node = Node::new(n.name.clone());
                let (t, r, s) = n.transform;
                node.transform = Transform::from_trs(t, r, s);
                scene.nodes.insert(node)
            })
            .collect();

        for (i, n) in self.nodes.iter().enumerate() {
            let parent = n.parent.map_or(root, |p| handles[p]);
            scene.attach(handles[i], parent);
        }

        let skeletons: Vec<_> = self
            .skins
            .iter()
            .map(|skin| {
                let bones = skin.joints.iter().map(|&j| handles[j]).collect();
                scene.add_skeleton(Skeleton::new(
                    &skin.name,
                    bones,
                    skin.inverse_bind_matrices.clone(),
                ))
            })
            .collect();

        let primitives = self
            .primitives
            .iter()
            .map(|p| ModelPrimitive {
                node: handles[p.node],
                geometry: p.geometry.clone(),
                material: p.material.clone(),
                skeleton: p.skin.and_then(|s| skeletons.get(s).copied()),
            })
            .collect();

        Model {
            name: self.name.clone(),
            root,
            primitives,
            skeletons,
            animations: self.animations.iter().cloned().map(Arc::new).collect(),
        }
    }
}

/// Reads and decodes the model at `path`.
pub async fn load_model<R: AssetReader>(reader: &R, path: &str) -> Result<ModelData> {
    let bytes = reader.read_bytes(path).await?;
    let gltf = gltf::Gltf::from_slice(&bytes)?;
    let base = parent_dir(path);
    let buffers = load_buffers(reader, &gltf, &base).await?;
    let textures = load_textures(reader, &gltf, &buffers, &base).await?;

    let nodes = load_nodes(&gltf);
    let skins = load_skins(&gltf, &buffers);
    let primitives = load_primitives(&gltf, &buffers, &textures);
    if primitives.is_empty() {
        return Err(Error::EmptyModel(path.to_string()));
    }
    let animations = load_animations(&gltf, &buffers);

    log::info!(
        "Loaded model '{}': {} nodes, {} skins, {} primitives",
        path,
        nodes.len(),
        skins.len(),
        primitives.len()
    );

    Ok(ModelData {
        name: file_stem(path).to_string(),
        nodes,
        skins,
        primitives,
        animations,
    })
}

/// Reads `path` and folds all its animations into one clip named after the
/// file.
pub async fn load_motion<R: AssetReader>(reader: &R, path: &str) -> Result<AnimationClip> {
    let bytes = reader.read_bytes(path).await?;
    let gltf = gltf::Gltf::from_slice(&bytes)?;
    let buffers = load_buffers(reader, &gltf, &parent_dir(path)).await?;

    let clip = AnimationClip::merge(file_stem(path), load_animations(&gltf, &buffers));
    if clip.tracks.is_empty() {
        return Err(Error::NoAnimation(path.to_string()));
    }
    log::debug!(
        "Loaded motion '{}': {} tracks, {:.2}s",
        clip.name,
        clip.track_count(),
        clip.duration
    );
    Ok(clip)
}

fn join_uri(base: &str, uri: &str) -> String {
    if is_data_uri(uri) || base.is_empty() {
        uri.to_string()
    } else {
        format!("{base}/{uri}")
    }
}

async fn load_buffers<R: AssetReader>(
    reader: &R,
    gltf: &gltf::Gltf,
    base: &str,
) -> Result<Vec<Vec<u8>>> {
    let mut buffers = Vec::with_capacity(gltf.buffers().len());
    for buffer in gltf.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .clone()
                .ok_or_else(|| Error::GltfError("missing GLB binary chunk".to_string()))?,
            gltf::buffer::Source::Uri(uri) if is_data_uri(uri) => decode_data_uri(uri)?,
            gltf::buffer::Source::Uri(uri) => reader.read_bytes(&join_uri(base, uri)).await?,
        };
        if data.len() < buffer.length() {
            return Err(Error::GltfError(format!(
                "buffer {} is {} bytes, expected {}",
                buffer.index(),
                data.len(),
                buffer.length()
            )));
        }
        buffers.push(data);
    }
    Ok(buffers)
}

/// Decodes every image, indexed by glTF image index.
async fn load_textures<R: AssetReader>(
    reader: &R,
    gltf: &gltf::Gltf,
    buffers: &[Vec<u8>],
    base: &str,
) -> Result<Vec<Option<Arc<TextureData>>>> {
    let mut textures = Vec::with_capacity(gltf.images().len());
    for image in gltf.images() {
        let bytes = match image.source() {
            gltf::image::Source::View { view, .. } => {
                let start = view.offset();
                buffers[view.buffer().index()][start..start + view.length()].to_vec()
            }
            gltf::image::Source::Uri { uri, .. } => {
                match reader.read_bytes(&join_uri(base, uri)).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        log::warn!("Skipping image '{uri}': {e}");
                        textures.push(None);
                        continue;
                    }
                }
            }
        };

        match image::load_from_memory(&bytes) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                let (width, height) = rgba.dimensions();
                textures.push(Some(Arc::new(TextureData::new(
                    image.name().map(str::to_string),
                    width,
                    height,
                    rgba.into_raw(),
                ))));
            }
            Err(e) => {
                log::warn!("Skipping undecodable image {}: {e}", image.index());
                textures.push(None);
            }
        }
    }
    Ok(textures)
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("node_{}", node.index()), str::to_string)
}

fn load_nodes(gltf: &gltf::Gltf) -> Vec<NodeData> {
    let mut nodes: Vec<NodeData> = gltf
        .nodes()
        .map(|n| {
            let (t, r, s) = n.transform().decomposed();
            NodeData {
                name: node_name(&n),
                parent: None,
                transform: (Vec3::from_array(t), Quat::from_array(r), Vec3::from_array(s)),
            }
        })
        .collect();

    for node in gltf.nodes() {
        for child in node.children() {
            nodes[child.index()].parent = Some(node.index());
        }
    }
    nodes
}

fn load_skins(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Vec<SkinData> {
    gltf.skins()
        .map(|skin| {
            let reader = skin.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
            let joints: Vec<usize> = skin.joints().map(|j| j.index()).collect();
            let inverse_bind_matrices = reader
                .read_inverse_bind_matrices()
                .map(|iter| {
                    iter.map(|m| Affine3A::from_mat4(Mat4::from_cols_array_2d(&m)))
                        .collect()
                })
                .unwrap_or_else(|| vec![Affine3A::IDENTITY; joints.len()]);
            SkinData {
                name: skin.name().unwrap_or("skin").to_string(),
                joints,
                inverse_bind_matrices,
            }
        })
        .collect()
}

fn load_material(
    material: &gltf::Material,
    textures: &[Option<Arc<TextureData>>],
) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let mut out = Material::new(
        material.name().unwrap_or("material"),
        Vec4::from_array(pbr.base_color_factor()),
    );
    if let Some(info) = pbr.base_color_texture()
        && let Some(Some(texture)) = textures.get(info.texture().source().index())
    {
        out.base_color_map = Some(texture.clone());
    }
    out.alpha_mode = match material.alpha_mode() {
        gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
        gltf::material::AlphaMode::Mask => AlphaMode::Mask,
        gltf::material::AlphaMode::Blend => AlphaMode::Blend,
    };
    out.alpha_cutoff = material.alpha_cutoff().unwrap_or(0.5);
    out
}

fn load_primitives(
    gltf: &gltf::Gltf,
    buffers: &[Vec<u8>],
    textures: &[Option<Arc<TextureData>>],
) -> Vec<PrimitiveData> {
    let materials: Vec<Arc<Material>> = gltf
        .materials()
        .map(|m| Arc::new(load_material(&m, textures)))
        .collect();
    let default_material = Arc::new(Material::default());

    let mut out = Vec::new();
    for node in gltf.nodes() {
        let Some(mesh) = node.mesh() else {
            continue;
        };
        let skin = node.skin().map(|s| s.index());

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::debug!("Skipping non-triangle primitive in mesh {}", mesh.index());
                continue;
            }
            let Some(geometry) = load_geometry(&primitive, buffers) else {
                continue;
            };
            let material = primitive
                .material()
                .index()
                .and_then(|i| materials.get(i).cloned())
                .unwrap_or_else(|| default_material.clone());

            out.push(PrimitiveData {
                node: node.index(),
                skin,
                geometry: Arc::new(geometry),
                material,
            });
        }
    }
    out
}

fn load_geometry(primitive: &gltf::Primitive, buffers: &[Vec<u8>]) -> Option<Geometry> {
    let reader = primitive.reader(|b| buffers.get(b.index()).map(Vec::as_slice));

    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let count = positions.len();

    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map_or_else(|| vec![[0.0, 1.0, 0.0]; count], Iterator::collect);
    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map_or_else(|| vec![[0.0; 2]; count], |r| r.into_f32().collect());
    let joints: Vec<[u32; 4]> = reader.read_joints(0).map_or_else(
        || vec![[0; 4]; count],
        |r| r.into_u16().map(|j| j.map(u32::from)).collect(),
    );
    let weights: Vec<[f32; 4]> = reader
        .read_weights(0)
        .map_or_else(|| vec![[0.0; 4]; count], |r| r.into_f32().collect());

    let vertices = (0..count)
        .map(|i| Vertex {
            position: positions[i],
            normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            uv: uvs.get(i).copied().unwrap_or_default(),
            joints: joints.get(i).copied().unwrap_or_default(),
            weights: weights.get(i).copied().unwrap_or_default(),
        })
        .collect();

    let indices = reader
        .read_indices()
        .map_or_else(|| (0..count as u32).collect(), |r| r.into_u32().collect());

    Some(Geometry::new(vertices, indices))
}

/// Decodes every glTF animation into a clip. Morph weight channels are
/// ignored.
pub fn load_animations(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Vec<AnimationClip> {
    gltf.animations()
        .map(|anim| {
            let mut tracks = Vec::new();
            for channel in anim.channels() {
                let reader = channel.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
                let target = channel.target();
                let node_name = node_name(&target.node());

                let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs())
                else {
                    continue;
                };
                let times: Vec<f32> = inputs.collect();
                let interpolation = match channel.sampler().interpolation() {
                    gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                    gltf::animation::Interpolation::Step => InterpolationMode::Step,
                    gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
                };

                let (target, data) = match outputs {
                    ReadOutputs::Translations(iter) => (
                        TargetPath::Translation,
                        TrackData::Vector3(KeyframeTrack::new(
                            times,
                            iter.map(Vec3::from_array).collect(),
                            interpolation,
                        )),
                    ),
                    ReadOutputs::Rotations(iter) => (
                        TargetPath::Rotation,
                        TrackData::Quaternion(KeyframeTrack::new(
                            times,
                            iter.into_f32().map(Quat::from_array).collect(),
                            interpolation,
                        )),
                    ),
                    ReadOutputs::Scales(iter) => (
                        TargetPath::Scale,
                        TrackData::Vector3(KeyframeTrack::new(
                            times,
                            iter.map(Vec3::from_array).collect(),
                            interpolation,
                        )),
                    ),
                    ReadOutputs::MorphTargetWeights(_) => continue,
                };

                if !data.is_valid() {
                    log::warn!(
                        "Skipping {target:?} channel on '{node_name}': sampler output does not match its {} key times",
                        channel.sampler().input().count()
                    );
                    continue;
                }

                tracks.push(Track {
                    meta: TrackMeta { node_name, target },
                    data,
                });
            }
            AnimationClip::new(anim.name().unwrap_or("animation"), tracks)
        })
        .collect()
}
