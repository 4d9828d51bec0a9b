// ============================================================
// Layer 2: InitUseCase
// ============================================================
// Writes a complete, loadable artifacts directory with randomly
// initialised weights, so the service can be exercised end to
// end without trained models:
//
//   Step 1: Input vocabulary from the canned phrases + replies
//   Step 2: Target vocabulary from "start <reply> end"
//   Step 3: Save both as tokenizer JSON            (Layer 6)
//   Step 4: Seq2seq sized to the vocabularies      (Layer 5)
//   Step 5: Food classifier                        (Layer 5)
//
// Replies from the result are noise; only the plumbing is real.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::application::config::ServiceConfig;
use crate::domain::responses::{phrases, replies};
use crate::infra::{checkpoint::CheckpointManager, vocab_store::Vocabulary};
use crate::ml::{
    classifier::FoodClassifierConfig,
    seq2seq::Seq2SeqConfig,
    InferBackend, InferDevice,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitConfig {
    pub embedding_dim: usize,
    pub latent_dim:    usize,
    /// Cap on each vocabulary's size.
    pub max_words:     usize,
    /// Replace artifacts that already exist.
    pub overwrite:     bool,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 128,
            latent_dim:    256,
            max_words:     10_000,
            overwrite:     false,
        }
    }
}

impl InitConfig {
    /// Match the state width the service will expect.
    pub fn for_service(service: &ServiceConfig) -> Self {
        Self { latent_dim: service.latent_dim, ..Self::default() }
    }
}

pub struct InitUseCase {
    checkpoints: CheckpointManager,
    config:      InitConfig,
    start_word:  String,
    end_word:    String,
}

impl InitUseCase {
    pub fn new(service: &ServiceConfig, config: InitConfig) -> Self {
        Self {
            checkpoints: CheckpointManager::new(service.artifacts.clone()),
            config,
            start_word:  service.chat.decode.start_word.clone(),
            end_word:    service.chat.decode.end_word.clone(),
        }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        if !cfg.overwrite && (self.checkpoints.has_classifier() || self.checkpoints.has_seq2seq()) {
            bail!(
                "Artifacts already exist in '{}' (pass --overwrite to replace them)",
                self.checkpoints.paths().dir.display()
            );
        }

        // ── Steps 1-3: vocabularies ───────────────────────────────────────────
        let inputs: Vec<&str> = phrases().chain(replies()).collect();
        let input_vocab = Vocabulary::build_from_texts(&inputs, cfg.max_words);

        let targets: Vec<String> = replies()
            .map(|r| format!("{} {} {}", self.start_word, r, self.end_word))
            .collect();
        let target_vocab = Vocabulary::build_from_texts(&targets, cfg.max_words);

        self.checkpoints.input_vocab_store().save(&input_vocab)?;
        self.checkpoints.target_vocab_store().save(&target_vocab)?;
        tracing::info!(
            "Saved vocabularies: {} input words, {} target words",
            input_vocab.len(),
            target_vocab.len()
        );

        // ── Step 4: chat network ──────────────────────────────────────────────
        let device = InferDevice::default();
        let seq2seq_config = Seq2SeqConfig::new(input_vocab.embedding_rows(), target_vocab.embedding_rows())
            .with_embedding_dim(cfg.embedding_dim)
            .with_latent_dim(cfg.latent_dim);
        let seq2seq = seq2seq_config.init::<InferBackend>(&device);
        self.checkpoints.save_seq2seq(&seq2seq, &seq2seq_config)?;
        tracing::info!(
            "Saved seq2seq ({}x{} vocab, latent {})",
            seq2seq_config.input_vocab_size,
            seq2seq_config.target_vocab_size,
            seq2seq_config.latent_dim
        );

        // ── Step 5: classifier ────────────────────────────────────────────────
        let classifier_config = FoodClassifierConfig::new();
        let classifier = classifier_config.init::<InferBackend>(&device);
        self.checkpoints.save_classifier(&classifier, &classifier_config)?;
        tracing::info!(
            "Saved food classifier to '{}'",
            self.checkpoints.classifier_weights_path().display()
        );

        Ok(())
    }
}
