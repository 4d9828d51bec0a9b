// ============================================================
// Layer 2: Chat Use Case
// ============================================================
// Answers one chat message:
//
//   Step 1: Canned table hit?        → fixed reply, no inference
//   Step 2: Input vocabulary loaded? → otherwise "not available"
//   Step 3: Clean + tokenise + pad   (Layer 4)
//   Step 4: Chat model loaded?       → otherwise "not available"
//   Step 5: Greedy decode            (Layer 5)
//
// Missing models are an expected state, not an error: the
// reply says so and the request still succeeds. Only a failure
// inside inference itself surfaces as Err.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data::{
    preprocessor::Preprocessor,
    sequence::{pad_sequence, texts_to_ids, PAD_ID},
};
use crate::domain::responses::canned_reply;
use crate::infra::model_loader::ModelRegistry;
use crate::ml::greedy::{DecodeConfig, GreedyDecoder};

pub const TOKENIZER_UNAVAILABLE: &str = "NLP tokenizer not available";
pub const MODELS_UNAVAILABLE: &str = "NLP models not available";
pub const EMPTY_GENERATION: &str = "I couldn't generate a proper response.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Width of the encoder input sequence.
    pub max_source_len: usize,
    pub decode:         DecodeConfig,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { max_source_len: 20, decode: DecodeConfig::default() }
    }
}

pub struct ChatUseCase {
    registry: Arc<ModelRegistry>,
    config:   ChatConfig,
    prep:     Preprocessor,
}

impl ChatUseCase {
    pub fn new(registry: Arc<ModelRegistry>, config: ChatConfig) -> Self {
        Self { registry, config, prep: Preprocessor::new() }
    }

    pub fn reply(&self, message: &str) -> Result<String> {
        if let Some(reply) = canned_reply(message) {
            tracing::debug!("Canned reply for {:?}", message);
            return Ok(reply.to_string());
        }
        self.model_reply(message)
    }

    fn model_reply(&self, message: &str) -> Result<String> {
        let Some(input_vocab) = self.registry.input_vocab.as_deref() else {
            return Ok(TOKENIZER_UNAVAILABLE.to_string());
        };

        let cleaned = self.prep.clean(message);
        let ids = texts_to_ids(&cleaned, input_vocab);
        let source = pad_sequence(&ids, self.config.max_source_len, PAD_ID);

        let (Some(model), Some(target)) = (
            self.registry.chat_model.as_deref(),
            self.registry.target_vocab.as_deref(),
        ) else {
            return Ok(MODELS_UNAVAILABLE.to_string());
        };

        let decoded = GreedyDecoder::new(model, target, &self.config.decode).decode(&source)?;
        tracing::debug!(
            "Decoded {} known words into {:?} ({} steps)",
            ids.len(),
            decoded.text,
            decoded.steps
        );

        if decoded.text.is_empty() {
            Ok(EMPTY_GENERATION.to_string())
        } else {
            Ok(decoded.text)
        }
    }
}
