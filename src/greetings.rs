use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

// Bundled at compile time so the bot starts without any resource files.
const BUNDLED_GREETINGS: &str = include_str!("../resources/greetings.json");

/// One onboarding message shown for `/start` and `/help`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Greeting {
    pub greeting: String,
    pub description: String,
    pub prompt: String,
}

impl Greeting {
    /// The three fields separated by blank lines.
    pub fn render(&self) -> String {
        format!("{}\n\n{}\n\n{}", self.greeting, self.description, self.prompt)
    }
}

/// Read-only list of greetings, loaded once at startup.
#[derive(Debug, Clone)]
pub struct GreetingProvider {
    greetings: Vec<Greeting>,
}

impl GreetingProvider {
    pub fn new(greetings: Vec<Greeting>) -> Result<Self> {
        if greetings.is_empty() {
            anyhow::bail!("Greeting list is empty");
        }
        Ok(Self { greetings })
    }

    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_GREETINGS).context("Failed to parse bundled greetings")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let greetings: Vec<Greeting> =
            serde_json::from_str(content).context("Invalid greetings JSON")?;
        Self::new(greetings)
    }

    /// Load from `path` if given, otherwise fall back to the bundled list.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let provider = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).with_context(|| {
                    format!("Failed to read greetings file: {}", path.display())
                })?;
                Self::from_json(&content)
                    .with_context(|| format!("Failed to load greetings from {}", path.display()))?
            }
            None => Self::bundled()?,
        };
        info!("Loaded {} greetings", provider.greetings().len());
        Ok(provider)
    }

    /// Uniform pick over the list.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &Greeting {
        // `new` rejects empty lists, so `choose` always yields a value.
        self.greetings.choose(rng).unwrap_or(&self.greetings[0])
    }

    pub fn greetings(&self) -> &[Greeting] {
        &self.greetings
    }
}
