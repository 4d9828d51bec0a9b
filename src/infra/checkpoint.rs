// ============================================================
// Layer 6: Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What lives in the artifacts directory:
//
//   artifacts/
//     classifier.mpk          ← food classifier weights
//     classifier_config.json  ← classifier architecture (optional)
//     tokenizer_input.json    ← input vocabulary (see vocab_store.rs)
//     tokenizer_target.json   ← target vocabulary
//     seq2seq_config.json     ← chat network architecture
//     seq2seq.mpk             ← chat network weights
//
// Why save the config separately?
//   A burn record only holds parameters. To load one, the exact
//   module has to be rebuilt first from its architecture, then
//   the record is poured into it.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::vocab_store::VocabStore;
use crate::ml::classifier::{FoodClassifier, FoodClassifierConfig};
use crate::ml::seq2seq::{Seq2SeqConfig, Seq2SeqModel};

/// Where every artifact is found. Names are relative to `dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub dir:                PathBuf,
    pub classifier_weights: String,
    pub classifier_config:  String,
    pub input_vocab:        String,
    pub target_vocab:       String,
    pub seq2seq_config:     String,
    pub seq2seq_weights:    String,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::in_dir("artifacts")
    }
}

impl ArtifactPaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir:                dir.into(),
            classifier_weights: "classifier.mpk".to_string(),
            classifier_config:  "classifier_config.json".to_string(),
            input_vocab:        "tokenizer_input.json".to_string(),
            target_vocab:       "tokenizer_target.json".to_string(),
            seq2seq_config:     "seq2seq_config.json".to_string(),
            seq2seq_weights:    "seq2seq.mpk".to_string(),
        }
    }

    pub fn resolve(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

/// Loads and saves the model artifacts under one directory.
pub struct CheckpointManager {
    paths: ArtifactPaths,
}

impl CheckpointManager {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    pub fn input_vocab_store(&self) -> VocabStore {
        VocabStore::new(self.paths.resolve(&self.paths.input_vocab))
    }

    pub fn target_vocab_store(&self) -> VocabStore {
        VocabStore::new(self.paths.resolve(&self.paths.target_vocab))
    }

    // ── Classifier ────────────────────────────────────────────────────────────

    pub fn classifier_weights_path(&self) -> PathBuf {
        self.paths.resolve(&self.paths.classifier_weights)
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier_weights_path().exists()
    }

    /// Architecture from `classifier_config.json`, or the
    /// defaults when that file is absent.
    pub fn load_classifier_config(&self) -> Result<FoodClassifierConfig> {
        let path = self.paths.resolve(&self.paths.classifier_config);
        if !path.exists() {
            return Ok(FoodClassifierConfig::new());
        }
        FoodClassifierConfig::load(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read '{}': {}", path.display(), e))
    }

    pub fn load_classifier<B: Backend>(&self, device: &B::Device) -> Result<FoodClassifier<B>> {
        let config = self.load_classifier_config()?;
        let model: FoodClassifier<B> = config.init(device);
        let path = self.classifier_weights_path();
        let record = load_record(&path, device)?;
        Ok(model.load_record(record))
    }

    pub fn save_classifier<B: Backend>(
        &self,
        model:  &FoodClassifier<B>,
        config: &FoodClassifierConfig,
    ) -> Result<()> {
        let config_path = self.paths.resolve(&self.paths.classifier_config);
        write_config(config, &config_path)?;
        save_record(model.clone().into_record(), &self.classifier_weights_path())
    }

    // ── Seq2seq ───────────────────────────────────────────────────────────────

    fn seq2seq_config_path(&self) -> PathBuf {
        self.paths.resolve(&self.paths.seq2seq_config)
    }

    fn seq2seq_weights_path(&self) -> PathBuf {
        self.paths.resolve(&self.paths.seq2seq_weights)
    }

    /// True when both the architecture and the weights exist.
    pub fn has_seq2seq(&self) -> bool {
        self.seq2seq_config_path().exists() && self.seq2seq_weights_path().exists()
    }

    pub fn load_seq2seq_config(&self) -> Result<Seq2SeqConfig> {
        let path = self.seq2seq_config_path();
        Seq2SeqConfig::load(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read architecture '{}': {}", path.display(), e))
    }

    /// Rebuild the network from its architecture JSON and
    /// restore the trained weights into it.
    pub fn load_seq2seq<B: Backend>(&self, device: &B::Device) -> Result<Seq2SeqModel<B>> {
        let config = self.load_seq2seq_config()?;
        let model: Seq2SeqModel<B> = config.init(device);
        let record = load_record(&self.seq2seq_weights_path(), device)?;
        Ok(model.load_record(record))
    }

    pub fn save_seq2seq<B: Backend>(
        &self,
        model:  &Seq2SeqModel<B>,
        config: &Seq2SeqConfig,
    ) -> Result<()> {
        write_config(config, &self.seq2seq_config_path())?;
        save_record(model.clone().into_record(), &self.seq2seq_weights_path())
    }
}

fn write_config<C: Config>(config: &C, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    config
        .save(path)
        .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
    tracing::debug!("Saved config to '{}'", path.display());
    Ok(())
}

fn load_record<B: Backend, R: burn::record::Record<B>>(path: &Path, device: &B::Device) -> Result<R> {
    CompactRecorder::new()
        .load(path.to_path_buf(), device)
        .with_context(|| format!("Cannot load weights '{}'", path.display()))
}

fn save_record<B: Backend, R: burn::record::Record<B>>(record: R, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    CompactRecorder::new()
        .record(record, path.to_path_buf())
        .with_context(|| format!("Failed to save weights to '{}'", path.display()))?;
    tracing::debug!("Saved weights: '{}'", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{InferBackend, InferDevice};

    #[test]
    fn test_missing_artifacts_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(ArtifactPaths::in_dir(dir.path()));
        assert!(!ckpt.has_classifier());
        assert!(!ckpt.has_seq2seq());
        assert!(ckpt.load_seq2seq_config().is_err());
    }

    #[test]
    fn test_classifier_config_defaults_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(ArtifactPaths::in_dir(dir.path()));
        let config = ckpt.load_classifier_config().unwrap();
        assert_eq!(config.stage_channels, vec![16, 32, 64]);
    }

    #[test]
    fn test_seq2seq_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(ArtifactPaths::in_dir(dir.path()));
        let device = InferDevice::default();

        let config = Seq2SeqConfig::new(6, 5).with_embedding_dim(4).with_latent_dim(8);
        let model: Seq2SeqModel<InferBackend> = config.init(&device);
        ckpt.save_seq2seq(&model, &config).unwrap();
        assert!(ckpt.has_seq2seq());

        let loaded: Seq2SeqModel<InferBackend> = ckpt.load_seq2seq(&device).unwrap();
        assert_eq!(loaded.input_vocab_size(), 6);
        assert_eq!(loaded.target_vocab_size(), 5);
        assert_eq!(loaded.latent_dim(), 8);
    }

    #[test]
    fn test_classifier_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(ArtifactPaths::in_dir(dir.path()));
        let device = InferDevice::default();

        let config = FoodClassifierConfig::new().with_stage_channels(vec![4]).with_hidden(4);
        let model: FoodClassifier<InferBackend> = config.init(&device);
        ckpt.save_classifier(&model, &config).unwrap();
        assert!(ckpt.has_classifier());

        let loaded: FoodClassifier<InferBackend> = ckpt.load_classifier(&device).unwrap();
        assert_eq!(loaded.stages.len(), 1);
    }
}
