use teloxide::types::{Message, Update, UpdateKind};

/// Commands answered with a greeting. Both behave identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
}

impl Command {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Command { command: Command, args: String },
    /// Opaque Telegram file id of the voice note.
    Voice { file_id: String },
    Text(String),
}

/// A classified inbound chat event. Lives for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUpdate {
    pub chat_id: i64,
    pub payload: Payload,
}

/// Which handler an update goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Greeting,
    Voice,
    Text,
}

impl InboundUpdate {
    /// Classify a platform update. `None` means no handler matches.
    ///
    /// Priority: recognized command, then voice, then text.
    pub fn classify(update: &Update, bot_username: Option<&str>) -> Option<Self> {
        match &update.kind {
            UpdateKind::Message(msg) => Self::from_message(msg, bot_username),
            _ => None,
        }
    }

    fn from_message(msg: &Message, bot_username: Option<&str>) -> Option<Self> {
        let chat_id = msg.chat.id.0;

        if let Some((command, args)) = msg.text().and_then(|t| parse_command(t, bot_username)) {
            return Some(Self {
                chat_id,
                payload: Payload::Command { command, args },
            });
        }

        if let Some(voice) = msg.voice() {
            return Some(Self {
                chat_id,
                payload: Payload::Voice {
                    file_id: voice.file.id.to_string(),
                },
            });
        }

        msg.text().map(|text| Self {
            chat_id,
            payload: Payload::Text(text.to_string()),
        })
    }

    pub fn route(&self) -> Route {
        route(&self.payload)
    }
}

/// Pure mapping from payload kind to handler.
pub fn route(payload: &Payload) -> Route {
    match payload {
        Payload::Command { .. } => Route::Greeting,
        Payload::Voice { .. } => Route::Voice,
        Payload::Text(_) => Route::Text,
    }
}

/// Parse `/start`, `/help@my_bot args`, etc.
///
/// A `@username` suffix must match `bot_username` when one is configured.
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<(Command, String)> {
    let rest = text.trim_start().strip_prefix('/')?;
    let (token, args) = match rest.find(char::is_whitespace) {
        Some(pos) => (&rest[..pos], rest[pos..].trim()),
        None => (rest, ""),
    };

    let name = match token.split_once('@') {
        Some((name, target)) => {
            if let Some(expected) = bot_username {
                if !target.eq_ignore_ascii_case(expected.trim_start_matches('@')) {
                    return None;
                }
            }
            name
        }
        None => token,
    };

    Command::from_name(&name.to_lowercase()).map(|command| (command, args.to_string()))
}
