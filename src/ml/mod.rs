// ============================================================
// Layer 5: ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// Other layers reach the models only through the traits in
// `domain::traits`.
//
// What's in this layer:
//
//   classifier.rs: The food spoilage CNN
//                  conv/relu/max-pool stages, global average
//                  pool, two dense layers, sigmoid output
//
//   seq2seq.rs   : The chat encoder-decoder network as it was
//                  trained (teacher forcing over the whole
//                  target sequence)
//
//   splitter.rs  : Rebuilds the trained network as separate
//                  encoder and decoder graphs sharing its
//                  weights, so decoding can run one token at
//                  a time
//
//   greedy.rs    : The argmax decoding loop over any
//                  `StepDecoder`
//
// Reference: Burn Book §3 (Building Blocks)
//            Sutskever et al. (2014) Sequence to Sequence Learning

/// Food spoilage image classifier
pub mod classifier;

/// Encoder-decoder chat network (training-time graph)
pub mod seq2seq;

/// Encoder/decoder inference graphs built from the trained network
pub mod splitter;

/// Greedy autoregressive decoding loop
pub mod greedy;

/// Backend used for serving. NdArray keeps inference on the CPU
/// with no driver requirements; `--features wgpu` moves it to the GPU.
#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

pub type InferDevice = <InferBackend as burn::tensor::backend::Backend>::Device;
