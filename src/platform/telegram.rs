use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, FileId, ParseMode};
use tracing::debug;

use super::{AudioResource, Messenger, OutboundReply};

/// [`Messenger`] backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(token: &str) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_typing(&self, chat_id: i64) -> Result<()> {
        self.bot
            .send_chat_action(ChatId(chat_id), ChatAction::Typing)
            .await
            .context("Failed to send typing indicator")?;
        Ok(())
    }

    async fn send_html(&self, reply: &OutboundReply) -> Result<()> {
        self.bot
            .send_message(ChatId(reply.chat_id), reply.text.clone())
            .parse_mode(ParseMode::Html)
            .await
            .with_context(|| format!("Failed to send message to chat {}", reply.chat_id))?;
        Ok(())
    }

    async fn resolve_voice(&self, file_id: &str) -> Result<AudioResource> {
        let file = self
            .bot
            .get_file(FileId(file_id.to_string()))
            .await
            .with_context(|| format!("Failed to resolve voice file {file_id}"))?;

        let mut bytes = Vec::new();
        self.bot
            .download_file(&file.path, &mut bytes)
            .await
            .with_context(|| format!("Failed to download voice file {}", file.path))?;

        debug!("Downloaded {} bytes from {}", bytes.len(), file.path);

        Ok(AudioResource {
            file_id: file_id.to_string(),
            file_path: file.path,
            bytes,
        })
    }
}
