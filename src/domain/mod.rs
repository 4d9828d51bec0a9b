// ============================================================
// Layer 3: Domain Layer
// ============================================================
// Plain Rust types and traits describing what the assistant
// works with: canned replies, refund verdicts, prepared model
// inputs, and the two inference seams the runtime implements.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//
// Keeping burn out of here lets the use cases be tested with
// scripted fakes instead of real weights.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Exact-match phrase table answered without the model
pub mod responses;

// Classifier labels and the refund message each one maps to
pub mod verdict;

// Model inputs/state that cross the runtime boundary
pub mod inference;

// Runtime seams (classifier, step-wise decoder)
pub mod traits;
