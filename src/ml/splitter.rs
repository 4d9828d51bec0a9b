// ============================================================
// Layer 5: Inference-Graph Splitter
// ============================================================
// Training ran the decoder over the whole target sequence at
// once. Generation has to feed back its own predictions, one
// token per step, so the trained network is taken apart into:
//
//   EncoderGraph  source ids           → (h, c)
//   DecoderGraph  one token id, (h, c) → next-token probs, (h, c)
//
// The sub-modules are MOVED out of the trained model, never
// re-initialised, so both graphs use the learned parameters.
//
// Reconstruction is rejected (and the chat model reported as
// unavailable) when the latent width does not match the
// configured one or a probe step through both graphs fails.

use anyhow::{bail, Result};
use burn::{
    nn::{Embedding, Linear, Lstm, LstmState},
    prelude::*,
    tensor::activation::softmax,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;

use crate::domain::{
    inference::{DecoderState, StepOutput},
    traits::StepDecoder,
};
use crate::ml::seq2seq::Seq2SeqModel;
use crate::ml::{InferBackend, InferDevice};

// ─── Encoder graph ────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct EncoderGraph<B: Backend> {
    pub embedding: Embedding<B>,
    pub lstm:      Lstm<B>,
}

impl<B: Backend> EncoderGraph<B> {
    /// source: [batch, src_len] → final LSTM state, each [batch, latent]
    pub fn forward(&self, source: Tensor<B, 2, Int>) -> LstmState<B, 2> {
        let (_, state) = self.lstm.forward(self.embedding.forward(source), None);
        state
    }
}

// ─── Decoder graph ────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct DecoderGraph<B: Backend> {
    pub embedding: Embedding<B>,
    pub lstm:      Lstm<B>,
    pub output:    Linear<B>,
}

impl<B: Backend> DecoderGraph<B> {
    /// token: [batch, 1] → probs [batch, target_vocab] plus the new state
    pub fn forward(
        &self,
        token: Tensor<B, 2, Int>,
        state: LstmState<B, 2>,
    ) -> (Tensor<B, 2>, LstmState<B, 2>) {
        let (decoded, next_state) = self
            .lstm
            .forward(self.embedding.forward(token), Some(state));
        let probs = softmax(self.output.forward(decoded), 2);
        let [batch, _, vocab] = probs.dims();
        (probs.reshape([batch, vocab]), next_state)
    }
}

/// Take the trained network apart into its two inference graphs.
pub fn split_inference_graphs<B: Backend>(
    model: Seq2SeqModel<B>,
    latent_dim: usize,
) -> Result<(EncoderGraph<B>, DecoderGraph<B>)> {
    let found = model.latent_dim();
    if found != latent_dim {
        bail!("Latent width mismatch: network has {found}, expected {latent_dim}");
    }

    let encoder = EncoderGraph {
        embedding: model.encoder_embedding,
        lstm:      model.encoder_lstm,
    };
    let decoder = DecoderGraph {
        embedding: model.decoder_embedding,
        lstm:      model.decoder_lstm,
        output:    model.output,
    };
    Ok((encoder, decoder))
}

// ─── Serving wrapper ──────────────────────────────────────────────────────────
/// The split graphs of a loaded chat model, shared by all requests.
pub struct Seq2SeqRuntime {
    encoder:    Mutex<EncoderGraph<InferBackend>>,
    decoder:    Mutex<DecoderGraph<InferBackend>>,
    latent_dim: usize,
    device:     InferDevice,
}

impl Seq2SeqRuntime {
    /// Split `model` and verify both graphs run end to end.
    pub fn new(
        model: Seq2SeqModel<InferBackend>,
        latent_dim: usize,
        device: InferDevice,
    ) -> Result<Self> {
        let (encoder, decoder) = split_inference_graphs(model, latent_dim)?;
        let runtime = Self {
            encoder: Mutex::new(encoder),
            decoder: Mutex::new(decoder),
            latent_dim,
            device,
        };

        // A record whose tensors do not fit the architecture only
        // fails at the first forward pass, and burn panics there.
        let probe = catch_unwind(AssertUnwindSafe(|| -> Result<()> {
            let state = runtime.encode(&[0])?;
            runtime.step(0, &state)?;
            Ok(())
        }));
        match probe {
            Ok(Ok(())) => Ok(runtime),
            Ok(Err(e)) => Err(e.context("Probe step through the split graphs failed")),
            Err(_) => bail!("Probe step through the split graphs panicked (weights do not fit the architecture)"),
        }
    }

    fn ids_tensor(&self, ids: &[u32]) -> Tensor<InferBackend, 2, Int> {
        let ids: Vec<i32> = ids.iter().map(|&id| id as i32).collect();
        Tensor::<InferBackend, 1, Int>::from_ints(ids.as_slice(), &self.device).unsqueeze::<2>()
    }

    fn state_tensor(&self, values: &[f32]) -> Result<Tensor<InferBackend, 2>> {
        if values.len() != self.latent_dim {
            bail!("Decoder state has width {}, expected {}", values.len(), self.latent_dim);
        }
        Ok(Tensor::<InferBackend, 1>::from_floats(values, &self.device).reshape([1, self.latent_dim]))
    }

    fn to_decoder_state(state: LstmState<InferBackend, 2>) -> Result<DecoderState> {
        Ok(DecoderState {
            hidden: to_vec(state.hidden)?,
            cell:   to_vec(state.cell)?,
        })
    }
}

fn to_vec<const D: usize>(tensor: Tensor<InferBackend, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| anyhow::anyhow!("Cannot read tensor data: {e:?}"))
}

impl StepDecoder for Seq2SeqRuntime {
    fn encode(&self, source_ids: &[u32]) -> Result<DecoderState> {
        let source = self.ids_tensor(source_ids);
        let state = {
            let encoder = self
                .encoder
                .lock()
                .map_err(|_| anyhow::anyhow!("encoder lock poisoned"))?;
            encoder.forward(source)
        };
        Self::to_decoder_state(state)
    }

    fn step(&self, token_id: u32, state: &DecoderState) -> Result<StepOutput> {
        let token = self.ids_tensor(&[token_id]);
        let state = LstmState {
            cell:   self.state_tensor(&state.cell)?,
            hidden: self.state_tensor(&state.hidden)?,
        };
        let (probs, next_state) = {
            let decoder = self
                .decoder
                .lock()
                .map_err(|_| anyhow::anyhow!("decoder lock poisoned"))?;
            decoder.forward(token, state)
        };
        Ok(StepOutput {
            probabilities: to_vec(probs)?,
            state:         Self::to_decoder_state(next_state)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::seq2seq::Seq2SeqConfig;

    fn tiny_model(device: &InferDevice) -> Seq2SeqModel<InferBackend> {
        Seq2SeqConfig::new(10, 7)
            .with_embedding_dim(6)
            .with_latent_dim(8)
            .init(device)
    }

    #[test]
    fn test_latent_mismatch_is_rejected() {
        let device = InferDevice::default();
        assert!(split_inference_graphs(tiny_model(&device), 256).is_err());
    }

    #[test]
    fn test_runtime_state_has_latent_width() {
        let device = InferDevice::default();
        let runtime = Seq2SeqRuntime::new(tiny_model(&device), 8, device).unwrap();
        let state = runtime.encode(&[3, 4, 0, 0]).unwrap();
        assert_eq!(state.hidden.len(), 8);
        assert_eq!(state.cell.len(), 8);

        let out = runtime.step(1, &state).unwrap();
        assert_eq!(out.probabilities.len(), 7);
        let total: f32 = out.probabilities.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_wrong_state_width_errors() {
        let device = InferDevice::default();
        let runtime = Seq2SeqRuntime::new(tiny_model(&device), 8, device).unwrap();
        let bad = DecoderState { hidden: vec![0.0; 3], cell: vec![0.0; 3] };
        assert!(runtime.step(1, &bad).is_err());
    }

    #[test]
    fn test_stepping_matches_teacher_forced_graph() {
        let device = InferDevice::default();
        let model = tiny_model(&device);
        let source = [2u32, 5, 1, 0];
        let target = [1u32, 4, 6];

        // Full graph over the whole target prefix
        let to_tensor = |ids: &[u32]| {
            let ids: Vec<i32> = ids.iter().map(|&i| i as i32).collect();
            Tensor::<InferBackend, 1, Int>::from_ints(ids.as_slice(), &device).unsqueeze::<2>()
        };
        let full = model
            .clone()
            .forward(to_tensor(&source), to_tensor(&target))
            .into_data()
            .to_vec::<f32>()
            .unwrap();

        // Same prefix, one token at a time through the split graphs
        let runtime = Seq2SeqRuntime::new(model, 8, device).unwrap();
        let mut state = runtime.encode(&source).unwrap();
        let vocab = 7;
        for (t, &token) in target.iter().enumerate() {
            let out = runtime.step(token, &state).unwrap();
            let expected = &full[t * vocab..(t + 1) * vocab];
            for (a, b) in out.probabilities.iter().zip(expected) {
                assert!((a - b).abs() < 1e-4, "step {t}: {a} vs {b}");
            }
            state = out.state;
        }
    }
}
