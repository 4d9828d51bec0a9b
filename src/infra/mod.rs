// ============================================================
// Layer 6: Infrastructure Layer
// ============================================================
// Everything that touches the filesystem:
//
//   checkpoint.rs  : Burn records + architecture JSON for the
//                    classifier and the chat network
//
//   vocab_store.rs : Input/target vocabularies stored as
//                    tokenizer JSON
//
//   model_loader.rs: Startup loading into a read-only
//                    ModelRegistry, degrading per artifact
//
//   uploads.rs     : Request-scoped upload files with
//                    best-effort cleanup
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model weight and architecture persistence
pub mod checkpoint;

/// Vocabulary loading and saving
pub mod vocab_store;

/// Startup model loading with graceful degradation
pub mod model_loader;

/// Temporary upload files
pub mod uploads;
