// ============================================================
// Layer 3: Canned Responses
// ============================================================
// Phrases the support bot answers with a fixed reply. The table
// is consulted before the seq2seq model, so these never touch
// inference even when models are loaded.

const PREDEFINED: &[(&str, &str)] = &[
    ("hello", "Hi there! How can I assist you? You can ask me questions."),
    ("how are you", "I'm doing great! I can help with questions."),
    ("what is your name", "I'm an Integrated ChatBot."),
    ("bye", "Goodbye! Have a great day! Please provide a rating (1-5):"),
    ("food is spoiled", "Please upload an image of the spoiled food for verification."),
    ("my food is cold", "Could you provide an image for verification?"),
    (
        "help",
        "I can answer questions and detect food spoilage. For spoilage, type 'food is spoiled' and upload an image.",
    ),
];

/// Look up a canned reply for a raw user message.
///
/// The key is the message lower-cased with surrounding whitespace
/// removed; inner whitespace and punctuation must match exactly.
pub fn canned_reply(message: &str) -> Option<&'static str> {
    let key = message.to_lowercase();
    let key = key.trim();
    PREDEFINED
        .iter()
        .find(|(phrase, _)| *phrase == key)
        .map(|(_, reply)| *reply)
}

/// All phrases in the table, in declaration order.
pub fn phrases() -> impl Iterator<Item = &'static str> {
    PREDEFINED.iter().map(|(phrase, _)| *phrase)
}

/// All canned replies, in declaration order.
pub fn replies() -> impl Iterator<Item = &'static str> {
    PREDEFINED.iter().map(|(_, reply)| *reply)
}
