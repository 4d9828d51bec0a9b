//! Shared handler state

use std::sync::Arc;

use crate::application::Assistant;

/// Cloned into every handler; the assistant itself is never copied.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
}

impl AppState {
    pub fn new(assistant: Assistant) -> Self {
        Self { assistant: Arc::new(assistant) }
    }
}
