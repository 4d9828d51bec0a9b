// ============================================================
// Layer 5: Greedy Decoder
// ============================================================
// Generates a reply one word at a time, always taking the most
// probable next token (no beam search, no sampling).
//
// State machine:
//
//   Running { token, state }
//     │ step(token, state) → probs, state'
//     │ id = argmax(probs)
//     ├─ id not a known word           → Stopped(UnknownToken)
//     ├─ word == end word               → Stopped(EndToken)
//     ├─ output longer than max_chars   → Stopped(LengthBound)
//     └─ otherwise                      → Running { id, state' }
//
// The character bound is the only termination guarantee when
// the model never emits the end word. Every vocabulary word is
// non-empty, so each step grows the output by at least two
// characters and the loop ends after at most max_chars / 2 + 1
// steps.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::{inference::DecoderState, traits::StepDecoder};
use crate::infra::vocab_store::Vocabulary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Target word fed as the first decoder input.
    pub start_word: String,
    /// Target word that ends generation.
    pub end_word:   String,
    /// Stop once the generated text is longer than this.
    pub max_chars:  usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            start_word: "start".to_string(),
            end_word:   "end".to_string(),
            max_chars:  100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndToken,
    LengthBound,
    UnknownToken,
}

#[derive(Debug, Clone)]
pub struct Decoded {
    /// Generated words, end word removed, trimmed.
    pub text:   String,
    pub steps:  usize,
    pub reason: StopReason,
}

enum DecodeState {
    Running { token: u32, state: DecoderState },
    Stopped(StopReason),
}

pub struct GreedyDecoder<'a> {
    runtime: &'a dyn StepDecoder,
    target:  &'a Vocabulary,
    config:  &'a DecodeConfig,
}

impl<'a> GreedyDecoder<'a> {
    pub fn new(runtime: &'a dyn StepDecoder, target: &'a Vocabulary, config: &'a DecodeConfig) -> Self {
        Self { runtime, target, config }
    }

    /// Decode a padded source sequence into a reply.
    pub fn decode(&self, source_ids: &[u32]) -> Result<Decoded> {
        // Id 0 (padding) when the vocabulary has no start word
        let start = self.target.id_of(&self.config.start_word).unwrap_or(0);
        let mut current = DecodeState::Running {
            token: start,
            state: self.runtime.encode(source_ids)?,
        };

        let mut sentence = String::new();
        let mut steps = 0usize;

        let reason = loop {
            let (token, state) = match current {
                DecodeState::Running { token, state } => (token, state),
                DecodeState::Stopped(reason) => break reason,
            };

            let out = self.runtime.step(token, &state)?;
            steps += 1;

            let word = out.argmax().and_then(|id| self.target.word_of(id).map(|w| (id, w)));
            current = match word {
                None => DecodeState::Stopped(StopReason::UnknownToken),
                Some((id, word)) => {
                    sentence.push(' ');
                    sentence.push_str(word);
                    if word == self.config.end_word {
                        DecodeState::Stopped(StopReason::EndToken)
                    } else if sentence.chars().count() > self.config.max_chars {
                        DecodeState::Stopped(StopReason::LengthBound)
                    } else {
                        DecodeState::Running { token: id, state: out.state }
                    }
                }
            };
        };

        tracing::debug!("Greedy decode stopped after {} steps ({:?})", steps, reason);
        Ok(Decoded {
            text: strip_end_word(&sentence, &self.config.end_word),
            steps,
            reason,
        })
    }
}

/// Trim, then drop a trailing end word if one is there.
fn strip_end_word(sentence: &str, end_word: &str) -> String {
    let trimmed = sentence.trim();
    match trimmed.rsplit_once(' ') {
        Some((head, last)) if last == end_word => head.trim().to_string(),
        None if trimmed == end_word => String::new(),
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::inference::StepOutput;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Plays back a fixed token sequence; past the end it keeps
    /// repeating the last token.
    pub(crate) struct ScriptedDecoder {
        pub script: Vec<u32>,
        pub vocab:  usize,
        pub calls:  AtomicUsize,
    }

    impl ScriptedDecoder {
        pub(crate) fn new(script: Vec<u32>, vocab: usize) -> Self {
            Self { script, vocab, calls: AtomicUsize::new(0) }
        }
    }

    impl StepDecoder for ScriptedDecoder {
        fn encode(&self, _source_ids: &[u32]) -> Result<DecoderState> {
            Ok(DecoderState { hidden: vec![0.0; 2], cell: vec![0.0; 2] })
        }

        fn step(&self, _token_id: u32, state: &DecoderState) -> Result<StepOutput> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let pick = self.script.get(n).or(self.script.last()).copied().unwrap_or(0);
            let mut probabilities = vec![0.0; self.vocab];
            probabilities[pick as usize] = 1.0;
            Ok(StepOutput { probabilities, state: state.clone() })
        }
    }

    pub(crate) fn target_vocab() -> Vocabulary {
        Vocabulary::from_word_index([
            ("start", 1),
            ("end", 2),
            ("your", 3),
            ("order", 4),
            ("is", 5),
            ("late", 6),
        ])
    }

    #[test]
    fn test_stops_at_end_word() {
        let runtime = ScriptedDecoder::new(vec![3, 4, 5, 6, 2], 8);
        let vocab = target_vocab();
        let config = DecodeConfig::default();
        let out = GreedyDecoder::new(&runtime, &vocab, &config).decode(&[0; 4]).unwrap();
        assert_eq!(out.text, "your order is late");
        assert_eq!(out.reason, StopReason::EndToken);
        assert_eq!(out.steps, 5);
    }

    #[test]
    fn test_unknown_token_truncates() {
        // Id 7 is inside the distribution but not a word
        let runtime = ScriptedDecoder::new(vec![3, 4, 7, 6], 8);
        let vocab = target_vocab();
        let config = DecodeConfig::default();
        let out = GreedyDecoder::new(&runtime, &vocab, &config).decode(&[0; 4]).unwrap();
        assert_eq!(out.text, "your order");
        assert_eq!(out.reason, StopReason::UnknownToken);
    }

    #[test]
    fn test_padding_id_is_unknown() {
        let runtime = ScriptedDecoder::new(vec![0], 8);
        let vocab = target_vocab();
        let config = DecodeConfig::default();
        let out = GreedyDecoder::new(&runtime, &vocab, &config).decode(&[0; 4]).unwrap();
        assert_eq!(out.text, "");
        assert_eq!(out.steps, 1);
    }

    #[test]
    fn test_terminates_without_end_word() {
        // "late" forever: only the character bound can stop this
        let runtime = ScriptedDecoder::new(vec![6], 8);
        let vocab = target_vocab();
        let config = DecodeConfig::default();
        let out = GreedyDecoder::new(&runtime, &vocab, &config).decode(&[0; 4]).unwrap();
        assert_eq!(out.reason, StopReason::LengthBound);
        // 21 × " late" = 105 chars is the first length over 100
        assert_eq!(out.steps, 21);
        assert!(out.text.len() > 95 && out.text.len() <= 105);
    }

    #[test]
    fn test_bound_is_configurable() {
        let runtime = ScriptedDecoder::new(vec![6], 8);
        let vocab = target_vocab();
        let config = DecodeConfig { max_chars: 10, ..DecodeConfig::default() };
        let out = GreedyDecoder::new(&runtime, &vocab, &config).decode(&[0; 4]).unwrap();
        // " late late" is exactly 10, the third word crosses the bound
        assert_eq!(out.text, "late late late");
        assert_eq!(out.steps, 3);
    }

    #[test]
    fn test_strip_end_word() {
        assert_eq!(strip_end_word(" your order end", "end"), "your order");
        assert_eq!(strip_end_word(" end", "end"), "");
        assert_eq!(strip_end_word(" weekend", "end"), "weekend");
        assert_eq!(strip_end_word(" the end is near", "end"), "the end is near");
    }
}
