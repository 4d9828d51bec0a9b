// ============================================================
// Layer 5: Encoder-Decoder Chat Network
// ============================================================
// The network exactly as it was trained, five stages:
//
//   source ids ─ encoder embedding ─ encoder LSTM ──┐ (h, c)
//                                                   ▼
//   target ids ─ decoder embedding ─────────── decoder LSTM ─ dense ─ softmax
//
// `forward` consumes the WHOLE target sequence at once (teacher
// forcing). Serving needs one token at a time, which is what
// `splitter.rs` builds from these same parameters.
//
// The architecture is saved next to the weights as JSON
// (burn's Config derive handles the serde side) so the loader
// can rebuild the module before restoring the record.
//
// Reference: Burn Book §3 (Modules), §5 (Records)

use burn::{
    nn::{Embedding, EmbeddingConfig, Linear, LinearConfig, Lstm, LstmConfig},
    prelude::*,
    tensor::activation::softmax,
};

#[derive(Config, Debug)]
pub struct Seq2SeqConfig {
    /// Rows of the encoder embedding (max input id + 1).
    pub input_vocab_size:  usize,
    /// Rows of the decoder embedding and width of the output layer.
    pub target_vocab_size: usize,
    #[config(default = 128)]
    pub embedding_dim:     usize,
    /// Width of the LSTM hidden and cell states.
    #[config(default = 256)]
    pub latent_dim:        usize,
}

impl Seq2SeqConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Seq2SeqModel<B> {
        Seq2SeqModel {
            encoder_embedding: EmbeddingConfig::new(self.input_vocab_size, self.embedding_dim).init(device),
            encoder_lstm:      LstmConfig::new(self.embedding_dim, self.latent_dim, true).init(device),
            decoder_embedding: EmbeddingConfig::new(self.target_vocab_size, self.embedding_dim).init(device),
            decoder_lstm:      LstmConfig::new(self.embedding_dim, self.latent_dim, true).init(device),
            output:            LinearConfig::new(self.latent_dim, self.target_vocab_size).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct Seq2SeqModel<B: Backend> {
    pub encoder_embedding: Embedding<B>,
    pub encoder_lstm:      Lstm<B>,
    pub decoder_embedding: Embedding<B>,
    pub decoder_lstm:      Lstm<B>,
    pub output:            Linear<B>,
}

impl<B: Backend> Seq2SeqModel<B> {
    /// encoder_input: [batch, src_len], decoder_input: [batch, tgt_len]
    /// → next-token probabilities [batch, tgt_len, target_vocab]
    pub fn forward(
        &self,
        encoder_input: Tensor<B, 2, Int>,
        decoder_input: Tensor<B, 2, Int>,
    ) -> Tensor<B, 3> {
        let (_, encoder_state) = self
            .encoder_lstm
            .forward(self.encoder_embedding.forward(encoder_input), None);
        let (decoded, _) = self
            .decoder_lstm
            .forward(self.decoder_embedding.forward(decoder_input), Some(encoder_state));
        softmax(self.output.forward(decoded), 2)
    }

    /// Embedding rows of the encoder side.
    pub fn input_vocab_size(&self) -> usize {
        self.encoder_embedding.weight.val().dims()[0]
    }

    /// Embedding rows of the decoder side.
    pub fn target_vocab_size(&self) -> usize {
        self.decoder_embedding.weight.val().dims()[0]
    }

    /// LSTM state width, read off the dense layer's input side.
    pub fn latent_dim(&self) -> usize {
        self.output.weight.val().dims()[0]
    }
}
