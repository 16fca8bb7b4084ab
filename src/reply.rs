use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use crate::platform::{Messenger, OutboundReply};

/// Upper bound on the best-effort indicator call.
const TYPING_TIMEOUT: Duration = Duration::from_secs(2);

/// Outbound replies plus the best-effort typing indicator.
#[derive(Clone)]
pub struct ReplySender {
    messenger: Arc<dyn Messenger>,
}

impl ReplySender {
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self { messenger }
    }

    /// Signal "typing…" to the chat. Never fails; the indicator expires on
    /// its own after a few seconds.
    pub async fn typing(&self, chat_id: i64) {
        match tokio::time::timeout(TYPING_TIMEOUT, self.messenger.send_typing(chat_id)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Typing indicator failed for chat {}: {:#}", chat_id, e),
            Err(_) => warn!(
                "Typing indicator for chat {} timed out after {:?}",
                chat_id, TYPING_TIMEOUT
            ),
        }
    }

    pub async fn send(&self, reply: OutboundReply) -> Result<()> {
        debug!("Replying to chat {} ({} chars)", reply.chat_id, reply.text.len());
        self.messenger.send_html(&reply).await
    }

    pub fn messenger(&self) -> &Arc<dyn Messenger> {
        &self.messenger
    }
}
