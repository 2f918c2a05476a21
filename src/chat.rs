use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
#[cfg(feature = "server")]
use utoipa::{IntoParams, ToSchema};

/// Prompt forwarded to the provider when the caller sends no message.
pub const DEFAULT_PROMPT: &str = "Tell me a joke";

#[cfg_attr(feature = "server", derive(ToSchema))]
#[derive(Serialize, Deserialize, Display, AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    #[serde(rename = "user")]
    #[strum(serialize = "user")]
    User,
    #[serde(rename = "ai")]
    #[strum(serialize = "ai")]
    Ai,
}

/// One entry of a conversation. Never mutated once created.
#[cfg_attr(feature = "server", derive(ToSchema))]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
}

impl Message {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
        }
    }

    #[must_use]
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Ai,
        }
    }
}

/// Query string accepted by the chat endpoints.
#[cfg_attr(feature = "server", derive(ToSchema, IntoParams))]
#[cfg_attr(feature = "server", into_params(parameter_in = Query))]
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ChatQuery {
    /// Text forwarded to the model. Defaults to "Tell me a joke".
    pub message: Option<String>,
}

impl ChatQuery {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}
