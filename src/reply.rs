//! Reply provider: turns one user message into a stream of text fragments,
//! either from the hosted model or from the canned fallback table.

use std::pin::Pin;
use std::time::Duration;

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::constants::{self, APOLOGY_TEXT, PLACEHOLDER_API_KEY};
use crate::error::ReplyError;
use crate::fallback::fallback_reply;
use crate::gemini::GeminiClient;

/// Lazy, finite sequence of reply fragments. Consumed once.
pub type ReplyStream<'a> = Pin<Box<dyn Stream<Item = String> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// Context of one conversation, owned by whoever owns the session.
#[derive(Debug, Default, Clone)]
pub struct ConversationHistory {
    entries: Vec<HistoryEntry>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.entries.push(HistoryEntry {
            role,
            content: content.into(),
        });
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Settings for the reply provider.
#[derive(Debug, Clone)]
pub struct ReplyConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Pause between characters of a fallback reply.
    pub fallback_delay: Duration,
    pub request_timeout: Option<Duration>,
}

impl ReplyConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: Some(constants::GEMINI_API_KEY.clone()),
            model: constants::GEMINI_MODEL.clone(),
            base_url: constants::GEMINI_BASE_URL.clone(),
            fallback_delay: Duration::from_millis(*constants::FALLBACK_DELAY_MS),
            request_timeout: constants::REQUEST_TIMEOUT_SECS.map(Duration::from_secs),
        }
    }

    /// Offline configuration: no credential, no delay.
    pub fn offline() -> Self {
        Self {
            api_key: None,
            model: constants::GEMINI_MODEL.clone(),
            base_url: constants::GEMINI_BASE_URL.clone(),
            fallback_delay: Duration::ZERO,
            request_timeout: None,
        }
    }

    /// The key, unless it is missing, empty or the placeholder value. Any
    /// other value is used as-is.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty() && *k != PLACEHOLDER_API_KEY)
    }
}

enum Source {
    Offline,
    Remote(GeminiClient),
}

pub struct ReplyProvider {
    source: Source,
    fallback_delay: Duration,
}

impl ReplyProvider {
    pub fn new(config: &ReplyConfig) -> Result<Self, ReplyError> {
        let source = match config.credential() {
            Some(key) => {
                let client = GeminiClient::new(
                    config.base_url.clone(),
                    key,
                    config.model.clone(),
                    config.request_timeout,
                )?;
                info!(model = %client.model(), "Replies will come from the remote model");
                Source::Remote(client)
            }
            None => {
                info!("No model credential configured; using canned replies");
                Source::Offline
            }
        };
        Ok(Self {
            source,
            fallback_delay: config.fallback_delay,
        })
    }

    pub fn is_offline(&self) -> bool {
        matches!(self.source, Source::Offline)
    }

    /// Streams the reply to `message`. The message is recorded in `history`
    /// immediately; the full reply is recorded once the stream completes
    /// without error. Remote failures end the stream with one apology
    /// fragment instead of an error.
    #[instrument(skip(self, history, message), fields(offline = self.is_offline()))]
    pub fn stream_reply<'a>(
        &'a self,
        history: &'a mut ConversationHistory,
        message: &str,
    ) -> ReplyStream<'a> {
        history.push(Role::User, message);
        let message = message.to_string();

        match &self.source {
            Source::Offline => {
                let reply = fallback_reply(&message);
                let delay = self.fallback_delay;
                Box::pin(async_stream::stream! {
                    for (i, ch) in reply.chars().enumerate() {
                        if i > 0 && !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        yield ch.to_string();
                    }
                    history.push(Role::Assistant, reply);
                })
            }
            Source::Remote(client) => Box::pin(async_stream::stream! {
                let mut full = String::new();
                let mut failed = false;
                match client.generate_stream(&message).await {
                    Ok(fragments) => {
                        futures::pin_mut!(fragments);
                        while let Some(fragment) = fragments.next().await {
                            match fragment {
                                Ok(text) => {
                                    full.push_str(&text);
                                    yield text;
                                }
                                Err(e) => {
                                    error!("Gemini API error: {}", e);
                                    failed = true;
                                    break;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        error!("Gemini API error: {}", e);
                        failed = true;
                    }
                }
                if failed {
                    yield APOLOGY_TEXT.to_string();
                } else {
                    history.push(Role::Assistant, full);
                }
            }),
        }
    }
}
