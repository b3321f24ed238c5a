use crate::AssetError;
use mirrorscene_scene::Scene;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Where a model comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Builtin,
    Gltf(PathBuf),
}

impl ModelSource {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => Self::Gltf(p),
            None => Self::Builtin,
        }
    }
}

impl std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin => write!(f, "<builtin>"),
            Self::Gltf(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Loads models off the frame thread.
pub struct ModelLoader;

impl ModelLoader {
    /// Start loading `source` on a background thread.
    pub fn spawn(source: ModelSource) -> PendingModel {
        let (tx, rx) = mpsc::channel();
        let label = source.to_string();
        let spawned = thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || {
                let result = crate::load(&source);
                // The receiver may be gone if the app closed mid-load
                let _ = tx.send(result);
            });
        if let Err(e) = spawned {
            tracing::error!("failed to start loader thread: {e}");
        }
        PendingModel {
            rx: Some(rx),
            label,
        }
    }
}

/// Handle to a model that is still loading.
pub struct PendingModel {
    rx: Option<Receiver<Result<Scene, AssetError>>>,
    label: String,
}

impl PendingModel {
    /// Non-blocking poll. Yields the load result exactly once.
    pub fn try_take(&mut self) -> Option<Result<Scene, AssetError>> {
        let rx = self.rx.as_ref()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(AssetError::LoaderGone),
        };
        self.rx = None;
        Some(result)
    }

    /// Block until the model arrives. Returns `LoaderGone` if it was already taken.
    pub fn wait(mut self) -> Result<Scene, AssetError> {
        let rx = self.rx.take().ok_or(AssetError::LoaderGone)?;
        rx.recv().map_err(|_| AssetError::LoaderGone)?
    }

    pub fn is_done(&self) -> bool {
        self.rx.is_none()
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}
