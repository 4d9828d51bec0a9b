// ============================================================
// Layer 6: Vocabulary Store
// ============================================================
// Loads the input/target vocabularies the seq2seq model was
// trained with. On disk each one is a HuggingFace tokenizer
// JSON with a WordLevel model, so the files open with the
// `tokenizers` crate and stay inspectable by other tooling.
//
// Id conventions (shared with the model):
//   0            → [PAD], never a word
//   1..=N        → words, most frequent first
//   N + 1        → [UNK], only there because WordLevel needs it
//
// The in-memory `Vocabulary` drops both special tokens, so a
// decoder prediction of 0 or N + 1 is "not a known word".
//
// Reference: Rust Book §8 (HashMaps)

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

use crate::data::preprocessor::Preprocessor;

pub const PAD_TOKEN: &str = "[PAD]";
pub const UNK_TOKEN: &str = "[UNK]";

// ─── Vocabulary ───────────────────────────────────────────────────────────────
/// Immutable word ↔ id mapping for one language side.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    word_to_id: HashMap<String, u32>,
    id_to_word: HashMap<u32, String>,
}

impl Vocabulary {
    /// Build from `(word, id)` pairs. Special tokens, empty words
    /// and the padding id are skipped.
    pub fn from_word_index<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut word_to_id = HashMap::new();
        let mut id_to_word = HashMap::new();
        for (word, id) in pairs {
            let word = word.into();
            if word.is_empty() || id == 0 || word == PAD_TOKEN || word == UNK_TOKEN {
                continue;
            }
            id_to_word.insert(id, word.clone());
            word_to_id.insert(word, id);
        }
        Self { word_to_id, id_to_word }
    }

    pub fn id_of(&self, word: &str) -> Option<u32> {
        self.word_to_id.get(word).copied()
    }

    pub fn word_of(&self, id: u32) -> Option<&str> {
        self.id_to_word.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.word_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_to_id.is_empty()
    }

    /// Largest word id; 0 when empty.
    pub fn max_id(&self) -> u32 {
        self.id_to_word.keys().copied().max().unwrap_or(0)
    }

    /// Rows an embedding table needs to cover every id,
    /// including padding.
    pub fn embedding_rows(&self) -> usize {
        self.max_id() as usize + 1
    }

    /// Build a frequency-ranked vocabulary from raw texts.
    /// Each text goes through the chat `Preprocessor` first, so
    /// the ids match what inference will look up.
    pub fn build_from_texts<S: AsRef<str>>(texts: &[S], max_words: usize) -> Self {
        let prep = Preprocessor::new();
        let mut freq: HashMap<String, usize> = HashMap::new();
        for text in texts {
            for word in prep.clean(text.as_ref()).split_whitespace() {
                *freq.entry(word.to_string()).or_insert(0) += 1;
            }
        }

        // Frequency descending, ties alphabetical so rebuilds are stable
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(max_words);

        Self::from_word_index(
            words.into_iter().enumerate().map(|(i, (w, _))| (w, i as u32 + 1)),
        )
    }

    /// Words sorted by id.
    fn ordered(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<(&str, u32)> = self
            .word_to_id
            .iter()
            .map(|(w, &id)| (w.as_str(), id))
            .collect();
        entries.sort_by_key(|(_, id)| *id);
        entries
    }
}

// ─── VocabStore ───────────────────────────────────────────────────────────────
/// Reads and writes one vocabulary file.
pub struct VocabStore {
    path: PathBuf,
}

impl VocabStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the tokenizer JSON and keep its word entries.
    pub fn load(&self) -> Result<Vocabulary> {
        let tokenizer = Tokenizer::from_file(&self.path).map_err(|e| {
            anyhow::anyhow!("Cannot load vocabulary from '{}': {}", self.path.display(), e)
        })?;
        let vocab = Vocabulary::from_word_index(tokenizer.get_vocab(false));
        tracing::debug!("Vocabulary '{}': {} words", self.path.display(), vocab.len());
        Ok(vocab)
    }

    /// Write `vocab` as a WordLevel tokenizer JSON.
    pub fn save(&self, vocab: &Vocabulary) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let unk_id = vocab.max_id() + 1;
        let mut entries = serde_json::Map::new();
        entries.insert(PAD_TOKEN.to_string(), serde_json::json!(0));
        for (word, id) in vocab.ordered() {
            entries.insert(word.to_string(), serde_json::json!(id));
        }
        entries.insert(UNK_TOKEN.to_string(), serde_json::json!(unk_id));

        // HuggingFace format, as Tokenizer::from_file() expects it
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": 0,      "content": PAD_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": unk_id, "content": UNK_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": null,
            "pre_tokenizer": { "type": "WhitespaceSplit" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": entries,
                "unk_token": UNK_TOKEN
            }
        });

        std::fs::write(&self.path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| format!("Cannot write vocabulary '{}'", self.path.display()))?;

        tracing::info!("Vocabulary with {} words saved to '{}'", vocab.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_tokens_are_not_words() {
        let vocab = Vocabulary::from_word_index([("[PAD]", 0), ("order", 1), ("[UNK]", 2)]);
        assert_eq!(vocab.len(), 1);
        assert_eq!(vocab.word_of(0), None);
        assert_eq!(vocab.word_of(2), None);
        assert_eq!(vocab.word_of(1), Some("order"));
    }

    #[test]
    fn test_build_ranks_by_frequency() {
        let vocab = Vocabulary::build_from_texts(&["Late order, late!", "late refund"], 10);
        assert_eq!(vocab.id_of("late"), Some(1));
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.embedding_rows(), 4);
    }

    #[test]
    fn test_build_respects_max_words() {
        let vocab = Vocabulary::build_from_texts(&["a b c d e f"], 3);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.max_id(), 3);
    }

    #[test]
    fn test_save_then_load_through_tokenizers() {
        let dir = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path().join("tokenizer_target.json"));
        let vocab = Vocabulary::from_word_index([("start", 1), ("end", 2), ("refund", 3)]);
        store.save(&vocab).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.id_of("refund"), Some(3));
        assert_eq!(loaded.word_of(2), Some("end"));
        assert_eq!(loaded.word_of(4), None);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let store = VocabStore::new("/definitely/not/here.json");
        assert!(!store.exists());
        assert!(store.load().is_err());
    }
}
