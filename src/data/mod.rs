// ============================================================
// Layer 4: Data Pipeline
// ============================================================
// Turns raw request input into what the models consume.
//
// Chat text:
//
//   message
//       │
//       ▼
//   Preprocessor      → lower-case, strip punctuation and digits
//       │
//       ▼
//   texts_to_ids      → known words to ids, unknown words dropped
//       │
//       ▼
//   pad_sequence      → fixed width, zero-padded at the end
//
// Uploaded photos:
//
//   file ──decode_image──▶ prepare_image ──▶ PreparedImage
//
// Each module is responsible for exactly one step.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Cleans and normalises chat messages
pub mod preprocessor;

/// Word ids and fixed-width padding for the encoder
pub mod sequence;

/// Image decoding, resizing and pixel scaling
pub mod image;
