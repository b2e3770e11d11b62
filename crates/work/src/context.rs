//! Worker execution context.

use std::sync::Arc;

use addons_storage::SharedStorage;

use crate::collaborators::{ColorExtractor, PreviewRenderer, Signer, Unconfigured};

/// Everything a worker needs to process a chunk.
#[derive(Clone)]
pub struct WorkerContext {
    /// Datastore the workers mutate
    pub storage: SharedStorage,

    /// File signing service
    pub signer: Arc<dyn Signer>,

    /// Theme preview renderer
    pub renderer: Arc<dyn PreviewRenderer>,

    /// Preview color extractor
    pub colors: Arc<dyn ColorExtractor>,
}

impl WorkerContext {
    /// Create a context with no external services wired up.
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            storage,
            signer: Arc::new(Unconfigured),
            renderer: Arc::new(Unconfigured),
            colors: Arc::new(Unconfigured),
        }
    }

    /// Set signer.
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = signer;
        self
    }

    /// Set preview renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn PreviewRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Set color extractor.
    pub fn with_color_extractor(mut self, colors: Arc<dyn ColorExtractor>) -> Self {
        self.colors = colors;
        self
    }
}

impl std::fmt::Debug for WorkerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerContext").finish_non_exhaustive()
    }
}
