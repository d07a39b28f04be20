//! Assistant chat: the transcript, the compact weather context sent with
//! every question, and reply evaluation.
//!
//! Chat is a non-critical feature: every failure surfaces the same friendly
//! fallback line, never an error code. Unauthenticated asks are answered
//! locally with the sign-in prompt and never reach the service.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::weather::WeatherSnapshot;

pub const ASSISTANT_PATH: &str = "/api/chat";
pub const SIGN_IN_PROMPT: &str = "Please log in to continue chatting with me.";
pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble connecting to the weather network right now.";

/// Forecast points included in the assistant context (3-hour steps, 24h).
pub const CONTEXT_FORECAST_POINTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: ChatRole::User,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

/// The conversation. Process-local; cleared on logout.
#[derive(Debug, Clone, Default)]
pub struct ChatThread {
    pub messages: Vec<ChatMessage>,
    pub pending: bool,
}

impl ChatThread {
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::user(text));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(text));
    }

    pub fn reset(&mut self) {
        self.messages.clear();
        self.pending = false;
    }
}

/// Compact weather context attached to every authenticated ask. Derived
/// from the canonical snapshot, not the provider wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    pub location: String,
    pub description: String,
    pub temp_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_ms: f64,
    pub aqi: String,
    pub forecast: Vec<ChatForecastPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatForecastPoint {
    pub timestamp: i64,
    pub description: String,
    pub temp_c: f64,
}

impl ChatContext {
    #[must_use]
    pub fn from_snapshot(snapshot: &WeatherSnapshot) -> Self {
        Self {
            location: snapshot.location_name.clone(),
            description: snapshot.description.clone(),
            temp_c: snapshot.temp_c,
            humidity_pct: snapshot.humidity_pct,
            wind_speed_ms: snapshot.wind_speed_ms,
            aqi: snapshot.aqi.display(),
            forecast: snapshot
                .forecast
                .iter()
                .take(CONTEXT_FORECAST_POINTS)
                .map(|point| ChatForecastPoint {
                    timestamp: point.timestamp,
                    description: point.description.clone(),
                    temp_c: point.temp_c,
                })
                .collect(),
        }
    }
}

/// JSON body for an ask. The context is omitted entirely when no snapshot
/// is resolved yet.
#[must_use]
pub fn ask_body(message: &str, context: Option<&ChatContext>) -> Vec<u8> {
    serde_json::json!({
        "message": message,
        "weatherContext": context,
    })
    .to_string()
    .into_bytes()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum AssistantError {
    #[error("assistant service unavailable")]
    Unavailable,
}

#[derive(Debug, Default, Deserialize)]
struct ReplyWire {
    #[serde(default)]
    reply: String,
}

/// Evaluates an assistant response. Any non-success status, undecodable
/// body or empty reply counts as unavailable; the caller shows the
/// fallback line.
pub fn evaluate_reply(status: u16, body: &[u8]) -> Result<String, AssistantError> {
    if !(200..300).contains(&status) {
        return Err(AssistantError::Unavailable);
    }
    let wire: ReplyWire = serde_json::from_slice(body).map_err(|_| AssistantError::Unavailable)?;
    if wire.reply.is_empty() {
        return Err(AssistantError::Unavailable);
    }
    Ok(wire.reply)
}
