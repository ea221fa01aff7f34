//! HTTP clients for the external OCR, chat-completion and translation services.

pub mod groq;
pub mod ocr_space;
pub mod translate;

pub use groq::{ChatCompletion, ChatError, ChatReply, GroqChatClient};
pub use ocr_space::{OcrError, OcrProvider, OcrSpaceClient};
pub use translate::{GoogleTranslateClient, TranslationBackend, TranslationError};

use reqwest::Client;
use std::time::Duration;

/// Shared reqwest client; `None` leaves requests without a deadline.
pub fn build_http_client(timeout: Option<Duration>) -> reqwest::Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}
