// ============================================================
// Layer 4: Fixed-Length Token Sequences
// ============================================================
// The encoder was trained on sequences of exactly
// `max_source_len` ids. Short inputs are padded at the END with
// the padding id; long inputs lose their FIRST tokens so the
// tail of the question (usually the important part) survives.
//
//   max_len = 5, pad = 0
//   [7, 3]              → [7, 3, 0, 0, 0]
//   [1, 2, 3, 4, 5, 6]  → [2, 3, 4, 5, 6]

use crate::infra::vocab_store::Vocabulary;

/// Id used for padding positions. Never a vocabulary word.
pub const PAD_ID: u32 = 0;

/// Split cleaned text on whitespace and look every word up.
/// Words missing from the vocabulary are dropped.
pub fn texts_to_ids(cleaned: &str, vocab: &Vocabulary) -> Vec<u32> {
    cleaned
        .split_whitespace()
        .filter_map(|word| vocab.id_of(word))
        .collect()
}

/// Pad at the end / truncate from the front to exactly `max_len`.
pub fn pad_sequence(ids: &[u32], max_len: usize, pad_id: u32) -> Vec<u32> {
    let start = ids.len().saturating_sub(max_len);
    let mut out = Vec::with_capacity(max_len);
    out.extend_from_slice(&ids[start..]);
    out.resize(max_len, pad_id);
    out
}
