//! Media notification events
//!
//! The transport delivers a batch envelope:
//!
//! ```json
//! { "Records": [ { "Sns": { "Subject": "...", "Message": "{\"hlsUrl\": \"...\"}" } } ] }
//! ```
//!
//! `Message` is itself a JSON document. Only completion notifications carry
//! a reference URL worth processing; ingest notifications are skipped.

use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

/// Subject substring marking a completion notification
pub const COMPLETION_MARKER: &str = "Complete";

/// Batch envelope as delivered by the transport
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "Sns")]
    pub sns: Notification,
}

/// One notification: subject line plus raw JSON message body
#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    #[serde(rename = "Subject", default)]
    pub subject: Option<String>,
    #[serde(rename = "Message", default)]
    pub message: String,
}

/// Notification classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Media artifact finished processing
    Completion,
    /// Anything else (ingest progress, test messages)
    Other,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(rename = "hlsUrl")]
    hls_url: String,
}

impl NotificationEvent {
    /// Parse an event envelope; only a JSON object is accepted
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::MalformedNotification(format!("Invalid event: {}", e)))?;
        if !value.is_object() {
            return Err(Error::MalformedNotification(
                "Event is not a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| Error::MalformedNotification(format!("Invalid event: {}", e)))
    }
}

impl Notification {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> NotificationKind {
        match &self.subject {
            Some(subject) if subject.contains(COMPLETION_MARKER) => NotificationKind::Completion,
            _ => NotificationKind::Other,
        }
    }

    /// Reference URL carried by a completion message
    pub fn reference_url(&self) -> Result<String> {
        let message: CompletionMessage = serde_json::from_str(&self.message)
            .map_err(|e| Error::MalformedNotification(format!("Invalid message body: {}", e)))?;
        if message.hls_url.trim().is_empty() {
            return Err(Error::MalformedNotification("Empty hlsUrl".to_string()));
        }
        Ok(message.hls_url)
    }
}
