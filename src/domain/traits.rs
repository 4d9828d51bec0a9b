// ============================================================
// Layer 3: Core Traits (Runtime Seams)
// ============================================================
// The use cases never see burn. They talk to the learned models
// through these two traits:
//
//   - BurnFoodClassifier implements ImageClassifier
//   - Seq2SeqRuntime     implements StepDecoder
//
// Tests swap in scripted implementations, which is how the
// greedy loop and the handlers are exercised without weights.
//
// Both traits are `Send + Sync` because one loaded instance is
// shared by every request.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::inference::{DecoderState, PreparedImage, StepOutput};

// ─── ImageClassifier ──────────────────────────────────────────────────────────
/// A binary image classifier with a single sigmoid output.
pub trait ImageClassifier: Send + Sync {
    /// Probability in [0, 1] that the image shows spoiled food.
    fn spoilage_probability(&self, image: &PreparedImage) -> Result<f32>;
}

// ─── StepDecoder ──────────────────────────────────────────────────────────────
/// The encoder/decoder pair of a split seq2seq network.
pub trait StepDecoder: Send + Sync {
    /// Run the encoder over a padded source sequence and return
    /// its final recurrent state.
    fn encode(&self, source_ids: &[u32]) -> Result<DecoderState>;

    /// Feed one target token with the current state; get the
    /// next-token distribution and the updated state.
    fn step(&self, token_id: u32, state: &DecoderState) -> Result<StepOutput>;
}
