// ============================================================
// Layer 6: Model Loader
// ============================================================
// Builds the process-wide, read-only model registry at startup.
//
// Load order:
//   1. Food classifier          (classifier.mpk)
//   2. Input vocabulary         (tokenizer_input.json)
//   3. Target vocabulary        (tokenizer_target.json)
//   4. Chat encoder/decoder     (seq2seq_config.json + seq2seq.mpk,
//                                only when BOTH vocabularies loaded)
//
// Every artifact is optional. A missing or broken one is logged
// and leaves that slot empty; the server still starts and the
// dependent endpoint answers with its "not available" message.

use anyhow::{bail, Result};
use serde::Serialize;
use std::sync::Arc;

use crate::domain::traits::{ImageClassifier, StepDecoder};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::vocab_store::{VocabStore, Vocabulary};
use crate::ml::classifier::BurnFoodClassifier;
use crate::ml::splitter::Seq2SeqRuntime;
use crate::ml::InferDevice;

/// Everything request handlers may use. Built once, never mutated.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    pub classifier:   Option<Arc<dyn ImageClassifier>>,
    pub chat_model:   Option<Arc<dyn StepDecoder>>,
    pub input_vocab:  Option<Arc<Vocabulary>>,
    pub target_vocab: Option<Arc<Vocabulary>>,
}

/// Load outcome of each capability, as reported by `/api/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    pub cnn_loaded:        bool,
    pub nlp_loaded:        bool,
    pub tokenizers_loaded: bool,
}

impl ModelRegistry {
    pub fn status(&self) -> ModelStatus {
        ModelStatus {
            cnn_loaded:        self.classifier.is_some(),
            nlp_loaded:        self.chat_model.is_some(),
            tokenizers_loaded: self.input_vocab.is_some() && self.target_vocab.is_some(),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ImageClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_chat_model(mut self, model: Arc<dyn StepDecoder>) -> Self {
        self.chat_model = Some(model);
        self
    }

    pub fn with_vocabularies(mut self, input: Vocabulary, target: Vocabulary) -> Self {
        self.input_vocab = Some(Arc::new(input));
        self.target_vocab = Some(Arc::new(target));
        self
    }
}

pub struct ModelLoader {
    checkpoints: CheckpointManager,
    latent_dim:  usize,
    device:      InferDevice,
}

impl ModelLoader {
    pub fn new(checkpoints: CheckpointManager, latent_dim: usize) -> Self {
        Self { checkpoints, latent_dim, device: InferDevice::default() }
    }

    /// Load whatever is available. Never fails.
    pub fn load(&self) -> ModelRegistry {
        tracing::info!("Loading models from '{}'", self.checkpoints.paths().dir.display());

        let mut registry = ModelRegistry::default();

        // ── Step 1: classifier ────────────────────────────────────────────────
        if self.checkpoints.has_classifier() {
            match self.checkpoints.load_classifier(&self.device) {
                Ok(model) => {
                    registry.classifier = Some(Arc::new(BurnFoodClassifier::new(model, self.device.clone())));
                    tracing::info!("Food classifier loaded");
                }
                Err(e) => tracing::error!("Error loading food classifier: {e:#}"),
            }
        } else {
            tracing::warn!(
                "Food classifier not found at '{}'",
                self.checkpoints.classifier_weights_path().display()
            );
        }

        // ── Steps 2-3: vocabularies ───────────────────────────────────────────
        registry.input_vocab = load_vocab("input", &self.checkpoints.input_vocab_store());
        registry.target_vocab = load_vocab("target", &self.checkpoints.target_vocab_store());

        // ── Step 4: chat model, split for step-wise decoding ──────────────────
        match (&registry.input_vocab, &registry.target_vocab) {
            (Some(input), Some(target)) if self.checkpoints.has_seq2seq() => {
                match self.load_chat_model(input, target) {
                    Ok(runtime) => {
                        registry.chat_model = Some(Arc::new(runtime));
                        tracing::info!("Chat encoder/decoder graphs ready");
                    }
                    Err(e) => tracing::error!("Error creating inference models: {e:#}"),
                }
            }
            _ => tracing::warn!("Chat model files not found or vocabularies missing"),
        }

        let status = registry.status();
        tracing::info!(
            "Model status: cnn_loaded={} nlp_loaded={} tokenizers_loaded={}",
            status.cnn_loaded, status.nlp_loaded, status.tokenizers_loaded
        );
        registry
    }

    fn load_chat_model(&self, input: &Vocabulary, target: &Vocabulary) -> Result<Seq2SeqRuntime> {
        let model = self.checkpoints.load_seq2seq(&self.device)?;

        // Every id a vocabulary can produce must index the embeddings
        if input.embedding_rows() > model.input_vocab_size() {
            bail!(
                "Input vocabulary needs {} embedding rows, network has {}",
                input.embedding_rows(),
                model.input_vocab_size()
            );
        }
        if target.embedding_rows() > model.target_vocab_size() {
            bail!(
                "Target vocabulary needs {} embedding rows, network has {}",
                target.embedding_rows(),
                model.target_vocab_size()
            );
        }

        Seq2SeqRuntime::new(model, self.latent_dim, self.device.clone())
    }
}

fn load_vocab(side: &str, store: &VocabStore) -> Option<Arc<Vocabulary>> {
    if !store.exists() {
        tracing::warn!("{side} vocabulary not found at '{}'", store.path().display());
        return None;
    }
    match store.load() {
        Ok(vocab) => {
            tracing::info!("{side} vocabulary loaded ({} words)", vocab.len());
            Some(Arc::new(vocab))
        }
        Err(e) => {
            tracing::error!("Error loading {side} vocabulary: {e:#}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::checkpoint::ArtifactPaths;
    use crate::ml::classifier::{FoodClassifier, FoodClassifierConfig};
    use crate::ml::seq2seq::{Seq2SeqConfig, Seq2SeqModel};
    use crate::ml::InferBackend;

    fn write_vocabs(ckpt: &CheckpointManager) {
        ckpt.input_vocab_store()
            .save(&Vocabulary::from_word_index([("where", 1), ("order", 2)]))
            .unwrap();
        ckpt.target_vocab_store()
            .save(&Vocabulary::from_word_index([("start", 1), ("end", 2), ("soon", 3)]))
            .unwrap();
    }

    fn write_seq2seq(ckpt: &CheckpointManager, input_rows: usize, latent: usize) {
        let device = InferDevice::default();
        let config = Seq2SeqConfig::new(input_rows, 4).with_embedding_dim(4).with_latent_dim(latent);
        let model: Seq2SeqModel<InferBackend> = config.init(&device);
        ckpt.save_seq2seq(&model, &config).unwrap();
    }

    #[test]
    fn test_empty_dir_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ModelLoader::new(CheckpointManager::new(ArtifactPaths::in_dir(dir.path())), 8);
        let status = loader.load().status();
        assert_eq!(
            status,
            ModelStatus { cnn_loaded: false, nlp_loaded: false, tokenizers_loaded: false }
        );
    }

    #[test]
    fn test_vocab_only_leaves_chat_model_off() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(ArtifactPaths::in_dir(dir.path()));
        write_vocabs(&ckpt);
        let registry = ModelLoader::new(ckpt, 8).load();
        assert!(registry.status().tokenizers_loaded);
        assert!(!registry.status().nlp_loaded);
    }

    #[test]
    fn test_full_chat_stack_loads() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let ckpt = CheckpointManager::new(paths.clone());
        write_vocabs(&ckpt);
        write_seq2seq(&ckpt, 3, 8);

        let registry = ModelLoader::new(CheckpointManager::new(paths), 8).load();
        assert!(registry.status().nlp_loaded);
        assert!(!registry.status().cnn_loaded);
    }

    #[test]
    fn test_latent_mismatch_disables_chat_model() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let ckpt = CheckpointManager::new(paths.clone());
        write_vocabs(&ckpt);
        write_seq2seq(&ckpt, 3, 8);

        let registry = ModelLoader::new(CheckpointManager::new(paths), 256).load();
        assert!(!registry.status().nlp_loaded);
        assert!(registry.status().tokenizers_loaded);
    }

    #[test]
    fn test_vocab_larger_than_embedding_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let ckpt = CheckpointManager::new(paths.clone());
        write_vocabs(&ckpt);
        // Input vocabulary needs 3 rows, network only has 2
        write_seq2seq(&ckpt, 2, 8);

        let registry = ModelLoader::new(CheckpointManager::new(paths), 8).load();
        assert!(!registry.status().nlp_loaded);
    }

    #[test]
    fn test_corrupt_classifier_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        std::fs::write(paths.resolve(&paths.classifier_weights), b"not a record").unwrap();

        let registry = ModelLoader::new(CheckpointManager::new(paths), 8).load();
        assert!(!registry.status().cnn_loaded);
    }

    #[test]
    fn test_classifier_loads_alone() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let device = InferDevice::default();
        let config = FoodClassifierConfig::new().with_stage_channels(vec![4]).with_hidden(4);
        let model: FoodClassifier<InferBackend> = config.init(&device);
        CheckpointManager::new(paths.clone()).save_classifier(&model, &config).unwrap();

        let status = ModelLoader::new(CheckpointManager::new(paths), 8).load().status();
        assert!(status.cnn_loaded);
        assert!(!status.tokenizers_loaded);
    }
}
