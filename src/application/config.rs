// ============================================================
// Layer 2: Service Configuration
// ============================================================
// Everything the service needs to start, in one serialisable
// struct. The CLI builds it from flags/environment variables
// (see cli/commands.rs), so the application layer never sees
// clap types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::chat_use_case::ChatConfig;
use crate::application::classify_use_case::ClassifyConfig;
use crate::infra::checkpoint::ArtifactPaths;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub artifacts:  ArtifactPaths,
    /// Where uploads are written while they are classified.
    pub upload_dir: PathBuf,
    /// LSTM state width the chat network must have.
    pub latent_dim: usize,
    pub chat:       ChatConfig,
    pub classify:   ClassifyConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            artifacts:  ArtifactPaths::default(),
            upload_dir: PathBuf::from("uploads"),
            latent_dim: 256,
            chat:       ChatConfig::default(),
            classify:   ClassifyConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_trained_models() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.latent_dim, 256);
        assert_eq!(cfg.chat.max_source_len, 20);
        assert_eq!(cfg.chat.decode.max_chars, 100);
        assert_eq!(cfg.classify.image_size, 224);
        assert_eq!(cfg.classify.spoilage_threshold, 0.5);
    }

    #[test]
    fn test_roundtrips_through_json() {
        let cfg = ServiceConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ServiceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.artifacts.seq2seq_weights, cfg.artifacts.seq2seq_weights);
        assert_eq!(back.chat.decode.end_word, "end");
    }
}
