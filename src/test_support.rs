//! Recording doubles for the external collaborators.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::subscriber::DefaultGuard;

use crate::platform::{AudioResource, Messenger, OutboundReply};
use crate::search::SearchClient;
use crate::transcription::Transcriber;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Typing(i64),
    SendHtml { chat_id: i64, text: String },
    ResolveVoice(String),
    Transcribe(AudioResource),
    Search(String),
}

/// Ordered log shared between doubles so cross-collaborator order can be asserted.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn take(&self) -> Vec<Call> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }

    pub fn sends(&self) -> Vec<(i64, String)> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                Call::SendHtml { chat_id, text } => Some((*chat_id, text.clone())),
                _ => None,
            })
            .collect()
    }
}

pub fn voice_resource(file_id: &str) -> AudioResource {
    AudioResource {
        file_id: file_id.to_string(),
        file_path: format!("voice/{file_id}.oga"),
        bytes: b"ogg-bytes".to_vec(),
    }
}

#[derive(Default)]
pub struct MockMessenger {
    log: CallLog,
    fail_typing: bool,
    fail_send: bool,
    fail_resolve: bool,
    typing_delay: Option<Duration>,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn failing_typing(mut self) -> Self {
        self.fail_typing = true;
        self
    }

    pub fn slow_typing(mut self, delay: Duration) -> Self {
        self.typing_delay = Some(delay);
        self
    }

    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub fn failing_resolve(mut self) -> Self {
        self.fail_resolve = true;
        self
    }

    pub fn calls(&self) -> CallLog {
        self.log.clone()
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send_typing(&self, chat_id: i64) -> Result<()> {
        self.log.push(Call::Typing(chat_id));
        if let Some(delay) = self.typing_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_typing {
            anyhow::bail!("typing: connection reset");
        }
        Ok(())
    }

    async fn send_html(&self, reply: &OutboundReply) -> Result<()> {
        self.log.push(Call::SendHtml {
            chat_id: reply.chat_id,
            text: reply.text.clone(),
        });
        if self.fail_send {
            anyhow::bail!("send: bad request");
        }
        Ok(())
    }

    async fn resolve_voice(&self, file_id: &str) -> Result<AudioResource> {
        self.log.push(Call::ResolveVoice(file_id.to_string()));
        if self.fail_resolve {
            anyhow::bail!("file not found: {file_id}");
        }
        Ok(voice_resource(file_id))
    }
}

pub struct MockTranscriber {
    log: CallLog,
    result: Result<String, String>,
}

impl MockTranscriber {
    pub fn returning(log: CallLog, text: &str) -> Self {
        Self {
            log,
            result: Ok(text.to_string()),
        }
    }

    pub fn failing(log: CallLog, error: &str) -> Self {
        Self {
            log,
            result: Err(error.to_string()),
        }
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, audio: &AudioResource) -> Result<String> {
        self.log.push(Call::Transcribe(audio.clone()));
        self.result.clone().map_err(anyhow::Error::msg)
    }
}

pub struct MockSearch {
    log: CallLog,
    result: Result<String, String>,
}

impl MockSearch {
    pub fn returning(log: CallLog, answer: &str) -> Self {
        Self {
            log,
            result: Ok(answer.to_string()),
        }
    }

    pub fn failing(log: CallLog, error: &str) -> Self {
        Self {
            log,
            result: Err(error.to_string()),
        }
    }
}

#[async_trait]
impl SearchClient for MockSearch {
    async fn search(&self, query: &str) -> Result<String> {
        self.log.push(Call::Search(query.to_string()));
        self.result.clone().map_err(anyhow::Error::msg)
    }
}

/// Captured log output for the current thread.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Route `tracing` output to a buffer until the guard drops.
///
/// `#[tokio::test]` runs on a current-thread runtime, so the thread-local
/// default covers every await in the test.
pub fn capture_logs() -> (LogBuffer, DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
