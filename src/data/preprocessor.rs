// ============================================================
// Layer 4: Text Preprocessor
// ============================================================
// Normalises chat text before it is looked up in the input
// vocabulary. The vocabularies were built from text cleaned the
// same way, so any drift here silently changes token ids.
//
// Cleaning steps (applied in order):
//   1. Lower-case (Unicode aware)
//   2. Remove ASCII punctuation  !"#$%&'()*+,-./:;<=>?@[\]^_`{|}~
//   3. Remove digit characters
//   4. Trim leading/trailing whitespace
//
// Inner whitespace is left alone; tokenisation splits on any
// run of it anyway.
//
// Reference: Rust Book §8 (Strings in Rust)

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean a raw chat message for tokenisation.
    pub fn clean(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let kept: String = lowered
            .chars()
            .filter(|c| !c.is_ascii_punctuation() && !c.is_numeric())
            .collect();
        kept.trim().to_string()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
