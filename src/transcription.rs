//! Speech-to-text for voice messages.
//!
//! Uses the OpenAI-compatible `/audio/transcriptions` endpoint.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use crate::config::OpenAiConfig;
use crate::platform::AudioResource;

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &AudioResource) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

pub struct WhisperTranscriber {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl WhisperTranscriber {
    pub fn new(config: &OpenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.transcription_model.clone(),
        }
    }

    /// Upload name and MIME type for a platform file path.
    ///
    /// Telegram stores voice notes as `.oga`, which the API only accepts
    /// under the `.ogg` extension.
    fn upload_name(file_path: &str) -> (String, &'static str) {
        let name = file_path.rsplit('/').next().unwrap_or(file_path);
        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, ext.to_ascii_lowercase()),
            _ => (if name.is_empty() { "voice" } else { name }, String::new()),
        };
        match ext.as_str() {
            "mp3" | "mpeg" | "mpga" => (format!("{stem}.mp3"), "audio/mpeg"),
            "m4a" | "mp4" => (format!("{stem}.{ext}"), "audio/mp4"),
            "wav" => (format!("{stem}.wav"), "audio/wav"),
            "webm" => (format!("{stem}.webm"), "audio/webm"),
            "flac" => (format!("{stem}.flac"), "audio/flac"),
            _ => (format!("{stem}.ogg"), "audio/ogg"),
        }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio: &AudioResource) -> Result<String> {
        let (file_name, mime_type) = Self::upload_name(&audio.file_path);

        let file_part = Part::bytes(audio.bytes.clone())
            .file_name(file_name)
            .mime_str(mime_type)
            .context("Failed to create audio part")?;

        let form = Form::new()
            .part("file", file_part)
            .text("model", self.model.clone());

        debug!(
            "Transcribing {} bytes from {} ({})",
            audio.bytes.len(),
            audio.file_path,
            audio.file_id
        );

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .context("Failed to send transcription request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Transcription API error ({}): {}", status, body);
        }

        let transcription: TranscriptionResponse = response
            .json()
            .await
            .context("Failed to parse transcription response")?;

        Ok(transcription.text.trim().to_string())
    }
}
