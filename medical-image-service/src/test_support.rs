//! Local stand-ins for the external services used by the unit tests.

use async_trait::async_trait;
use axum::Router;
use std::sync::Mutex;
use tokio::net::TcpListener;

use crate::clients::{
    ChatCompletion, ChatError, ChatReply, OcrProvider, TranslationBackend, TranslationError,
};
use crate::models::OcrOutcome;

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// URL of a local port nothing is listening on.
pub async fn unused_local_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/unused", addr)
}

pub struct FixedOcr(pub OcrOutcome);

#[async_trait]
impl OcrProvider for FixedOcr {
    async fn extract_text(&self, _base64_image: &str) -> OcrOutcome {
        self.0.clone()
    }
}

type ReplyFn = Box<dyn Fn(&str) -> Result<ChatReply, ChatError> + Send + Sync>;

/// Chat double that records prompts and answers with a canned reply.
pub struct RecordingChat {
    reply: ReplyFn,
    prompts: Mutex<Vec<String>>,
}

impl RecordingChat {
    pub fn new<F>(reply: F) -> Self
    where
        F: Fn(&str) -> Result<ChatReply, ChatError> + Send + Sync + 'static,
    {
        Self {
            reply: Box::new(reply),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(content: &'static str) -> Self {
        Self::new(move |_| Ok(ChatReply::Content(content.to_string())))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompletion for RecordingChat {
    async fn complete(&self, prompt: &str) -> Result<ChatReply, ChatError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.reply)(prompt)
    }
}

/// Translation double that tags text, or fails when `fail` is set.
pub struct TaggingTranslator {
    pub fail: bool,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl TaggingTranslator {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TranslationBackend for TaggingTranslator {
    async fn translate(&self, text: &str, target_code: &str) -> Result<String, TranslationError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), target_code.to_string()));
        if self.fail {
            return Err(TranslationError::Status(503));
        }
        Ok(format!("[{}] {}", target_code, text))
    }
}
