use std::collections::VecDeque;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::runtime::Runtime;
use tokio::sync::Semaphore;

use crate::animation::AnimationClip;
use crate::assets::io::{AssetReader, FileAssetReader};
use crate::assets::loaders::{ModelData, load_model, load_motion};
use crate::errors::{Error, Result};

/// Order in which motion completions are handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipOrdering {
    /// As soon as each file finishes; order varies run to run.
    #[default]
    Completion,
    /// Held back until every requested motion settled, then released
    /// sorted by request index.
    Requested,
}

/// A finished load, delivered on the thread that polls the loader.
#[derive(Debug)]
pub enum LoadEvent {
    Model {
        path: String,
        result: Result<ModelData>,
    },
    Motion {
        /// Position of the path in the request list.
        index: usize,
        path: String,
        result: Result<AnimationClip>,
    },
}

/// Background asset fetching.
///
/// Work runs on a loader-owned multi-thread tokio runtime; completions come
/// back through a flume channel and are drained by [`poll_events`]
/// (once per frame) or [`wait_event`] (blocking, mostly for tests).
///
/// [`poll_events`]: Self::poll_events
/// [`wait_event`]: Self::wait_event
pub struct AssetLoader<R: AssetReader = FileAssetReader> {
    runtime: Runtime,
    reader: Arc<R>,
    sender: flume::Sender<LoadEvent>,
    receiver: flume::Receiver<LoadEvent>,
    limiter: Option<Arc<Semaphore>>,
    ordering: ClipOrdering,

    in_flight: usize,
    motions_requested: usize,
    motions_settled: usize,
    held_motions: Vec<LoadEvent>,
    ready: VecDeque<LoadEvent>,
}

impl<R: AssetReader> std::fmt::Debug for AssetLoader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader")
            .field("ordering", &self.ordering)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl AssetLoader {
    /// Loads files under `root`. `max_concurrent` bounds in-flight fetches;
    /// `None` issues everything at once.
    pub fn new(
        root: impl AsRef<Path>,
        ordering: ClipOrdering,
        max_concurrent: Option<usize>,
    ) -> Result<Self> {
        log::debug!("Asset root: {}", root.as_ref().display());
        Self::with_reader(FileAssetReader::new(root), ordering, max_concurrent)
    }
}

impl<R: AssetReader + 'static> AssetLoader<R> {
    pub fn with_reader(reader: R, ordering: ClipOrdering, max_concurrent: Option<usize>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("asset-loader")
            .build()?;
        let (sender, receiver) = flume::unbounded();

        Ok(Self {
            runtime,
            reader: Arc::new(reader),
            sender,
            receiver,
            limiter: max_concurrent.map(|n| Arc::new(Semaphore::new(n.max(1)))),
            ordering,
            in_flight: 0,
            motions_requested: 0,
            motions_settled: 0,
            held_motions: Vec::new(),
            ready: VecDeque::new(),
        })
    }

    #[inline]
    #[must_use]
    pub fn ordering(&self) -> ClipOrdering {
        self.ordering
    }

    /// Requests still running or not yet handed out.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.in_flight + self.held_motions.len() + self.ready.len()
    }

    pub fn request_model(&mut self, path: &str) {
        log::info!("Requesting model '{path}'");
        let reader = self.reader.clone();
        let owned = path.to_string();
        let path = path.to_string();
        self.spawn(
            async move { load_model(&*reader, &owned).await },
            move |result| LoadEvent::Model { path, result },
        );
    }

    /// Requests every path concurrently. Indices continue across calls.
    pub fn request_motions(&mut self, paths: &[String]) {
        log::info!("Requesting {} motions", paths.len());
        for path in paths {
            let index = self.motions_requested;
            self.motions_requested += 1;

            let reader = self.reader.clone();
            let owned = path.clone();
            let path = path.clone();
            self.spawn(
                async move { load_motion(&*reader, &owned).await },
                move |result| LoadEvent::Motion {
                    index,
                    path,
                    result,
                },
            );
        }
    }

    fn spawn<T, F, E>(&mut self, work: F, into_event: E)
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
        E: FnOnce(Result<T>) -> LoadEvent + Send + 'static,
    {
        self.in_flight += 1;
        let sender = self.sender.clone();
        let limiter = self.limiter.clone();

        self.runtime.spawn(async move {
            let _permit = match limiter {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };
            // A panicking decoder surfaces as an error instead of a lost event.
            let result = match tokio::spawn(work).await {
                Ok(result) => result,
                Err(e) => Err(Error::from(e)),
            };
            if sender.send(into_event(result)).is_err() {
                log::debug!("Loader dropped before completion was delivered");
            }
        });
    }

    fn accept(&mut self, event: LoadEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match (&event, self.ordering) {
            (LoadEvent::Motion { .. }, ClipOrdering::Requested) => {
                self.motions_settled += 1;
                self.held_motions.push(event);
                if self.motions_settled == self.motions_requested {
                    let mut held = std::mem::take(&mut self.held_motions);
                    held.sort_by_key(|e| match e {
                        LoadEvent::Motion { index, .. } => *index,
                        LoadEvent::Model { .. } => 0,
                    });
                    self.ready.extend(held);
                }
            }
            _ => self.ready.push_back(event),
        }
    }

    /// Drains every completion that arrived since the last call.
    pub fn poll_events(&mut self) -> Vec<LoadEvent> {
        while let Ok(event) = self.receiver.try_recv() {
            self.accept(event);
        }
        self.ready.drain(..).collect()
    }

    /// Blocks until the next event is ready or `timeout` elapses.
    pub fn wait_event(&mut self, timeout: Duration) -> Option<LoadEvent> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(event) = self.ready.pop_front() {
                return Some(event);
            }
            let event = self.receiver.recv_deadline(deadline).ok()?;
            self.accept(event);
        }
    }
}
