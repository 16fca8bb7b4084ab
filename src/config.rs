use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const STAGE_LOCAL: &str = "local";
const KNOWN_STAGES: [&str; 3] = [STAGE_LOCAL, "dev", "prod"];

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub greetings: GreetingsConfig,
    /// Deployment stage: `local`, `dev` or `prod`.
    #[serde(default = "default_stage")]
    pub stage: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: String,
    /// When set, `/start@<bot_username>` is accepted as a command.
    #[serde(default)]
    pub bot_username: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_search_model")]
    pub search_model: String,
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            search_model: default_search_model(),
            transcription_model: default_transcription_model(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct GreetingsConfig {
    /// JSON file replacing the bundled greeting list.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_stage() -> String {
    "dev".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_search_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_system_prompt() -> String {
    "You are a search assistant answering questions sent from a Telegram chat. \
     Answer concisely and factually. Format the answer for Telegram HTML: use only \
     <b>, <i>, <u>, <s>, <a href=\"...\">, <code> and <pre> tags, and never use Markdown."
        .to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

impl Config {
    /// Load the TOML file (if any), apply environment overrides and validate.
    ///
    /// A missing file is only tolerated when `required` is false, so the bot
    /// can run from environment variables alone.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        Self::load_with(path, required, |key| std::env::var(key).ok())
    }

    /// [`Config::load`] with an explicit environment lookup.
    pub fn load_with<F>(path: &Path, required: bool, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() || required {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::from_toml_str("")?
        };

        config.apply_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid configuration")
    }

    /// Environment values win over the file.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TELEGRAM_TOKEN") {
            self.telegram.token = token;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.openai.api_key = key;
        }
        if let Some(stage) = lookup("STAGE") {
            self.stage = stage.trim().to_lowercase();
        }
        if let Some(bind) = lookup("BIND_ADDRESS") {
            self.server.bind_address = bind;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram.token.trim().is_empty() {
            anyhow::bail!("Telegram token is not configured (set TELEGRAM_TOKEN)");
        }
        if self.openai.api_key.trim().is_empty() {
            anyhow::bail!("OpenAI API key is not configured (set OPENAI_API_KEY)");
        }
        if !KNOWN_STAGES.contains(&self.stage.as_str()) {
            anyhow::bail!(
                "Unknown stage '{}', expected one of: {}",
                self.stage,
                KNOWN_STAGES.join(", ")
            );
        }
        Ok(())
    }

    pub fn is_local(&self) -> bool {
        self.stage == STAGE_LOCAL
    }
}
