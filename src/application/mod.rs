// ============================================================
// Layer 2: Application / Use Cases
// ============================================================
// This layer orchestrates the other layers for one goal each:
//
//   chat_use_case.rs     : canned reply or greedy seq2seq reply
//   classify_use_case.rs : upload → image → refund verdict
//   init_use_case.rs     : write a fresh artifacts directory
//
// Rules for this layer:
//   - No tensor code here (that's Layer 5)
//   - No HTTP or terminal printing (that's Layer 1 / server)
//   - Only workflow coordination
//
// `Assistant` bundles the two request use cases around one
// shared, immutable ModelRegistry. The CLI and the HTTP server
// both build exactly one at startup.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

pub mod config;
pub mod chat_use_case;
pub mod classify_use_case;
pub mod init_use_case;

use anyhow::Result;
use std::sync::Arc;

use crate::infra::{
    checkpoint::CheckpointManager,
    model_loader::{ModelLoader, ModelRegistry, ModelStatus},
    uploads::UploadStore,
};
use chat_use_case::ChatUseCase;
use classify_use_case::ClassifyUseCase;
use config::ServiceConfig;

pub struct Assistant {
    registry:     Arc<ModelRegistry>,
    pub chat:     ChatUseCase,
    pub classify: ClassifyUseCase,
}

impl Assistant {
    /// Load every available artifact and wire the use cases.
    /// Only an unusable upload directory is fatal.
    pub fn load(config: &ServiceConfig) -> Result<Self> {
        let loader = ModelLoader::new(CheckpointManager::new(config.artifacts.clone()), config.latent_dim);
        let registry = loader.load();
        let uploads = UploadStore::new(&config.upload_dir)?;
        Ok(Self::from_registry(registry, config, uploads))
    }

    pub fn from_registry(registry: ModelRegistry, config: &ServiceConfig, uploads: UploadStore) -> Self {
        let registry = Arc::new(registry);
        Self {
            chat:     ChatUseCase::new(registry.clone(), config.chat.clone()),
            classify: ClassifyUseCase::new(registry.clone(), uploads, config.classify.clone()),
            registry,
        }
    }

    pub fn status(&self) -> ModelStatus {
        self.registry.status()
    }
}
