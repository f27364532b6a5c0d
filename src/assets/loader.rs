//! Model loading with progress reporting.
//!
//! [`ModelLoader::load`] is the async entry point. [`ModelLoader::spawn`] runs
//! the same load on a background thread and hands the results back through a
//! channel, so an event-loop host can drain them between frames:
//!
//! ```rust,ignore
//! let mut task = ModelLoader::new("public/avatar.glb").spawn();
//! // every frame:
//! while let Some(event) = task.poll() {
//!     match event {
//!         LoadEvent::Progress(p) => page.set_loading_text(&p.loading_text()),
//!         LoadEvent::Loaded(model) => { /* build the stage */ }
//!         LoadEvent::Failed(err) => log::error!("{err}"),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::animation::AnimationClip;
use crate::assets::io::FileAssetReader;
use crate::assets::loaders::gltf::GltfLoader;
use crate::assets::prefab::Prefab;
use crate::errors::{Result, StageError};

/// Text shown while the model streams in.
pub const LOADING_TEXT: &str = "Loading..";

/// Bytes received so far out of an optional known total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    /// `None` when the size is not known up front.
    pub total: Option<u64>,
}

impl LoadProgress {
    #[must_use]
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        Self { loaded, total }
    }

    /// `round(loaded / total * 100)`, clamped to `[0, 100]`.
    ///
    /// `None` when the total is unknown or zero.
    #[must_use]
    pub fn percent(&self) -> Option<u32> {
        let total = self.total.filter(|&t| t > 0)?;
        let ratio = self.loaded as f64 / total as f64;
        Some((ratio * 100.0).round().clamp(0.0, 100.0) as u32)
    }

    /// Indicator text, e.g. `"Loading.. 42%"`, or just `"Loading.."` when
    /// the percentage is undefined.
    #[must_use]
    pub fn loading_text(&self) -> String {
        match self.percent() {
            Some(percent) => format!("{LOADING_TEXT} {percent}%"),
            None => LOADING_TEXT.to_string(),
        }
    }
}

/// A loaded avatar: its node tree and clips.
#[derive(Debug, Clone)]
pub struct ModelAsset {
    pub source: PathBuf,
    pub prefab: Prefab,
}

impl ModelAsset {
    #[must_use]
    pub fn clips(&self) -> &[Arc<AnimationClip>] {
        &self.prefab.animations
    }
}

/// What the background load reports back.
#[derive(Debug)]
pub enum LoadEvent {
    Progress(LoadProgress),
    Loaded(Box<ModelAsset>),
    Failed(StageError),
}

pub struct ModelLoader {
    path: PathBuf,
    chunk_size: usize,
}

impl ModelLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            chunk_size: FileAssetReader::DEFAULT_CHUNK_SIZE,
        }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the model, calling `on_progress` for every chunk read.
    pub async fn load<F>(&self, on_progress: F) -> Result<ModelAsset>
    where
        F: FnMut(LoadProgress) + Send,
    {
        let root = self.path.parent().unwrap_or(Path::new("."));
        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| StageError::AssetNotFound(self.path.display().to_string()))?;

        let reader = FileAssetReader::new(root).with_chunk_size(self.chunk_size);
        let prefab = GltfLoader::new(&reader).load(file_name, on_progress).await?;

        log::info!(
            "Loaded {}: {} nodes, {} meshes, {} clips",
            self.path.display(),
            prefab.nodes.len(),
            prefab.mesh_count(),
            prefab.animations.len()
        );

        Ok(ModelAsset {
            source: self.path.clone(),
            prefab,
        })
    }

    /// Runs [`load`](Self::load) on its own thread with a single-threaded
    /// tokio runtime.
    pub fn spawn(self) -> LoadTask {
        let (sender, receiver) = flume::unbounded();

        let spawned = std::thread::Builder::new()
            .name("model-loader".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        let _ = sender.send(LoadEvent::Failed(err.into()));
                        return;
                    }
                };

                let progress_sender = sender.clone();
                let result = runtime.block_on(self.load(move |progress| {
                    let _ = progress_sender.send(LoadEvent::Progress(progress));
                }));

                let event = match result {
                    Ok(model) => LoadEvent::Loaded(Box::new(model)),
                    Err(err) => LoadEvent::Failed(err),
                };
                let _ = sender.send(event);
            });

        if let Err(err) = spawned {
            log::error!("Failed to spawn loader thread: {err}");
        }

        LoadTask {
            receiver,
            finished: false,
        }
    }
}

/// Receiving end of a spawned load.
pub struct LoadTask {
    receiver: flume::Receiver<LoadEvent>,
    finished: bool,
}

impl LoadTask {
    /// Next pending event, without blocking.
    ///
    /// If the loader thread dies without a final result, a single
    /// `Failed(LoaderDisconnected)` is reported.
    pub fn poll(&mut self) -> Option<LoadEvent> {
        if self.finished {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(event) => {
                if matches!(event, LoadEvent::Loaded(_) | LoadEvent::Failed(_)) {
                    self.finished = true;
                }
                Some(event)
            }
            Err(flume::TryRecvError::Empty) => None,
            Err(flume::TryRecvError::Disconnected) => {
                self.finished = true;
                Some(LoadEvent::Failed(StageError::LoaderDisconnected))
            }
        }
    }

    /// Blocks until the next event arrives.
    pub fn wait(&mut self) -> Option<LoadEvent> {
        if self.finished {
            return None;
        }
        let event = self
            .receiver
            .recv()
            .unwrap_or(LoadEvent::Failed(StageError::LoaderDisconnected));
        if matches!(event, LoadEvent::Loaded(_) | LoadEvent::Failed(_)) {
            self.finished = true;
        }
        Some(event)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
