// ============================================================
// Layer 1: CLI Commands and Arguments
// ============================================================
// Defines the subcommands and all their configurable flags.
// Flags shared by every command that loads models live in
// `ServiceArgs`, and each of them can also come from a
// FOODBOT_* environment variable.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f32, PathBuf, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    chat_use_case::ChatConfig,
    classify_use_case::ClassifyConfig,
    config::ServiceConfig,
    init_use_case::InitConfig,
};
use crate::infra::checkpoint::ArtifactPaths;
use crate::ml::greedy::DecodeConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),

    /// Answer one chat message and exit
    Chat(ChatArgs),

    /// Classify one food photo and exit
    Classify(ClassifyArgs),

    /// Print which models load from the artifacts directory
    Status(ServiceArgs),

    /// Write randomly initialised artifacts for smoke testing
    InitArtifacts(InitArgs),
}

/// Everything needed to load models and answer requests.
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Directory holding weights, architectures and vocabularies
    #[arg(long, env = "FOODBOT_ARTIFACTS_DIR", default_value = "artifacts")]
    pub artifacts_dir: PathBuf,

    /// Directory uploads are written to while being classified
    #[arg(long, env = "FOODBOT_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// LSTM state width the chat network was trained with
    #[arg(long, env = "FOODBOT_LATENT_DIM", default_value_t = 256)]
    pub latent_dim: usize,

    /// Encoder input width in tokens
    #[arg(long, env = "FOODBOT_MAX_SOURCE_LEN", default_value_t = 20)]
    pub max_source_len: usize,

    /// Decoding stops once the reply grows past this many characters
    #[arg(long, env = "FOODBOT_MAX_RESPONSE_CHARS", default_value_t = 100)]
    pub max_response_chars: usize,

    #[arg(long, default_value = "start")]
    pub start_word: String,

    #[arg(long, default_value = "end")]
    pub end_word: String,

    /// Side length images are resized to
    #[arg(long, env = "FOODBOT_IMAGE_SIZE", default_value_t = 224)]
    pub image_size: u32,

    /// Probabilities at or above this count as spoiled
    #[arg(long, env = "FOODBOT_SPOILAGE_THRESHOLD", default_value_t = 0.5)]
    pub spoilage_threshold: f32,
}

/// Convert CLI args into the application-layer ServiceConfig.
/// The application layer never sees clap types.
impl From<ServiceArgs> for ServiceConfig {
    fn from(a: ServiceArgs) -> Self {
        ServiceConfig {
            artifacts:  ArtifactPaths::in_dir(a.artifacts_dir),
            upload_dir: a.upload_dir,
            latent_dim: a.latent_dim,
            chat: ChatConfig {
                max_source_len: a.max_source_len,
                decode: DecodeConfig {
                    start_word: a.start_word,
                    end_word:   a.end_word,
                    max_chars:  a.max_response_chars,
                },
            },
            classify: ClassifyConfig {
                image_size:         a.image_size,
                spoilage_threshold: a.spoilage_threshold,
            },
        }
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "FOODBOT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "FOODBOT_PORT", default_value_t = 5000)]
    pub port: u16,

    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// The customer's message
    pub message: String,

    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Path of the photo to check
    pub image: PathBuf,

    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Embedding width of the generated chat network
    #[arg(long, default_value_t = 128)]
    pub embedding_dim: usize,

    /// Cap on each generated vocabulary
    #[arg(long, default_value_t = 10_000)]
    pub max_words: usize,

    /// Replace artifacts that already exist
    #[arg(long)]
    pub overwrite: bool,

    #[command(flatten)]
    pub service: ServiceArgs,
}

impl InitArgs {
    pub fn init_config(&self) -> InitConfig {
        InitConfig {
            embedding_dim: self.embedding_dim,
            latent_dim:    self.service.latent_dim,
            max_words:     self.max_words,
            overwrite:     self.overwrite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_defaults_become_service_defaults() {
        let cli = Cli::try_parse_from(["foodbot", "status"]).unwrap();
        let Commands::Status(args) = cli.command else {
            panic!("expected status");
        };
        let config = ServiceConfig::from(args);
        let defaults = ServiceConfig::default();
        assert_eq!(config.latent_dim, defaults.latent_dim);
        assert_eq!(config.chat.max_source_len, 20);
        assert_eq!(config.chat.decode.max_chars, 100);
        assert_eq!(config.classify.image_size, 224);
        assert_eq!(config.artifacts.dir, PathBuf::from("artifacts"));
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "foodbot", "serve", "--port", "8080", "--max-response-chars", "40",
        ])
        .unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, 8080);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(ServiceConfig::from(args.service).chat.decode.max_chars, 40);
    }

    #[test]
    fn test_chat_takes_message() {
        let cli = Cli::try_parse_from(["foodbot", "chat", "where is my order"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat(ChatArgs { ref message, .. }) if message == "where is my order"));
    }
}
