pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// A reply to one chat. Built by a handler, sent once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundReply {
    pub chat_id: i64,
    /// HTML-formatted body
    pub text: String,
}

impl OutboundReply {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
        }
    }
}

/// A downloaded voice recording, ready for transcription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioResource {
    pub file_id: String,
    /// Path reported by the platform, e.g. `voice/file_12.oga`
    pub file_path: String,
    pub bytes: Vec<u8>,
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Show the transient "typing…" indicator in a chat.
    async fn send_typing(&self, chat_id: i64) -> Result<()>;

    /// Send an HTML-formatted message.
    async fn send_html(&self, reply: &OutboundReply) -> Result<()>;

    /// Resolve a voice file id and download its contents.
    async fn resolve_voice(&self, file_id: &str) -> Result<AudioResource>;
}
