use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use teloxide::types::{Update, UpdateKind};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::greetings::GreetingProvider;
use crate::platform::telegram::TelegramMessenger;
use crate::platform::{Messenger, OutboundReply};
use crate::reply::ReplySender;
use crate::search::{OpenAiSearch, SearchClient};
use crate::transcription::{Transcriber, WhisperTranscriber};
use crate::update::{InboundUpdate, Payload};

pub const FALLBACK_MESSAGE: &str = "There was an error trying to answer your message :(";

/// Handles to the external services plus the read-only greeting list.
/// Only the greeting RNG advances between requests.
pub struct AppState {
    replies: ReplySender,
    transcriber: Arc<dyn Transcriber>,
    search: Arc<dyn SearchClient>,
    greetings: GreetingProvider,
    bot_username: Option<String>,
    local: bool,
    rng: Mutex<StdRng>,
}

impl AppState {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        transcriber: Arc<dyn Transcriber>,
        search: Arc<dyn SearchClient>,
        greetings: GreetingProvider,
    ) -> Self {
        Self {
            replies: ReplySender::new(messenger),
            transcriber,
            search,
            greetings,
            bot_username: None,
            local: false,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let greetings = GreetingProvider::load(config.greetings.path.as_deref())?;
        let state = Self::new(
            Arc::new(TelegramMessenger::new(&config.telegram.token)),
            Arc::new(WhisperTranscriber::new(&config.openai)),
            Arc::new(OpenAiSearch::new(config.openai.clone())),
            greetings,
        )
        .with_bot_username(config.telegram.bot_username.clone())
        .with_local(config.is_local());
        Ok(state)
    }

    pub fn with_bot_username(mut self, bot_username: Option<String>) -> Self {
        self.bot_username = bot_username;
        self
    }

    pub fn with_local(mut self, local: bool) -> Self {
        self.local = local;
        self
    }

    /// Make greeting selection reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn is_local(&self) -> bool {
        self.local
    }

    /// Deserialize a raw update body and dispatch it.
    pub async fn process_body(&self, body: &str) -> Result<()> {
        let update: Update =
            serde_json::from_str(body).context("Failed to deserialize update body")?;
        self.process_update(&update).await
    }

    /// Classify and dispatch. Unmatched updates are dropped without error.
    pub async fn process_update(&self, update: &Update) -> Result<()> {
        match InboundUpdate::classify(update, self.bot_username.as_deref()) {
            Some(inbound) => self.dispatch(inbound).await,
            None => {
                match &update.kind {
                    UpdateKind::Message(message) => warn!(
                        "Unhandled message {} in chat {}: no command, voice or text",
                        message.id.0, message.chat.id.0
                    ),
                    _ => debug!("Unhandled update: {:?}", update.id),
                }
                Ok(())
            }
        }
    }

    pub async fn dispatch(&self, inbound: InboundUpdate) -> Result<()> {
        let chat_id = inbound.chat_id;
        let route = inbound.route();
        info!("Routing update from chat {} to {:?} handler", chat_id, route);

        match inbound.payload {
            Payload::Command { command, args } => {
                debug!("Command {:?} with args {:?}", command, args);
                self.handle_greeting(chat_id).await
            }
            Payload::Voice { file_id } => {
                self.replies.typing(chat_id).await;
                self.handle_voice(chat_id, &file_id).await
            }
            Payload::Text(text) => {
                self.replies.typing(chat_id).await;
                self.handle_text(chat_id, &text).await
            }
        }
    }

    /// Search failures are reported to the user instead of propagated.
    async fn handle_text(&self, chat_id: i64, text: &str) -> Result<()> {
        let reply = match self.search.search(text).await {
            Ok(answer) => {
                info!("Search answer for chat {}: {}", chat_id, answer);
                OutboundReply::new(chat_id, answer)
            }
            Err(e) => {
                error!("Search failed for chat {}: {:#}", chat_id, e);
                error!("{:?}", e);
                OutboundReply::new(chat_id, FALLBACK_MESSAGE)
            }
        };
        self.replies.send(reply).await
    }

    /// Any failure propagates to the caller; no fallback message is sent.
    async fn handle_voice(&self, chat_id: i64, file_id: &str) -> Result<()> {
        let audio = self
            .replies
            .messenger()
            .resolve_voice(file_id)
            .await
            .context("Failed to fetch voice message")?;

        let transcript = self
            .transcriber
            .transcribe(&audio)
            .await
            .context("Failed to transcribe voice message")?;
        info!("Transcript for chat {}: {}", chat_id, transcript);

        let answer = self
            .search
            .search(&transcript)
            .await
            .context("Failed to search transcribed voice message")?;

        self.replies.send(OutboundReply::new(chat_id, answer)).await
    }

    async fn handle_greeting(&self, chat_id: i64) -> Result<()> {
        let text = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            self.greetings.pick(&mut *rng).render()
        };
        self.replies.send(OutboundReply::new(chat_id, text)).await
    }
}
