//! Wire types for the upstream chat-completion exchange.

use parley_core::conversation::Role;
use serde::{Deserialize, Serialize};

use crate::RelayConfig;
use crate::api::HistoryEntry;

/// Replies are capped to stay short enough to speak.
pub const MAX_REPLY_TOKENS: u32 = 150;
/// Sampling temperature for every upstream request.
pub const SAMPLING_TEMPERATURE: f32 = 0.7;
/// How many trailing history entries are forwarded upstream.
pub const HISTORY_WINDOW: usize = 10;

// ------------------------
// Types sent to the server
// ------------------------

/// One message in the upstream conversation payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// The system instructions.
    System {
        /// The instruction text.
        content: String,
    },
    /// A user input text.
    User {
        /// The message text.
        content: String,
    },
    /// An assistant text.
    Assistant {
        /// The reply text.
        content: String,
    },
}

/// The request body for the chat-completion call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    /// The model to sample from.
    pub model: String,
    /// The ordered message sequence.
    pub messages: Vec<Message>,
    /// Hard ceiling on reply length.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

// ------------------------------
// Types received from the server
// ------------------------------

/// The response body of the chat-completion call.
///
/// Every level is optional so that a malformed payload deserializes and
/// is rejected by shape inspection rather than a parse error.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatCompletion {
    /// The returned completion choices.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// One completion choice.
#[derive(Clone, Debug, Deserialize)]
pub struct Choice {
    /// The assistant message of this choice.
    pub message: Option<AssistantReply>,
}

/// The assistant message inside a completion choice.
#[derive(Clone, Debug, Deserialize)]
pub struct AssistantReply {
    /// The reply text.
    pub content: Option<String>,
}

// -----------
// Conversions
// -----------

/// Assembles the upstream request: the persona prompt first, then up to
/// the last [`HISTORY_WINDOW`] history entries verbatim, then the new
/// user message.
pub fn create_request(
    message: &str,
    history: &[HistoryEntry],
    config: &RelayConfig,
) -> ChatCompletionRequest {
    let tail = history.len().saturating_sub(HISTORY_WINDOW);
    let history = &history[tail..];

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::System {
        content: config.system_prompt.clone(),
    });
    messages.extend(history.iter().map(|entry| match entry.role {
        Role::User => Message::User {
            content: entry.content.clone(),
        },
        Role::Assistant => Message::Assistant {
            content: entry.content.clone(),
        },
    }));
    messages.push(Message::User {
        content: message.to_owned(),
    });

    ChatCompletionRequest {
        model: config.model.clone(),
        messages,
        max_tokens: MAX_REPLY_TOKENS,
        temperature: SAMPLING_TEMPERATURE,
    }
}

#[cfg(test)]
mod tests {
    use crate::RelayConfigBuilder;

    use super::*;

    #[test]
    fn test_create_request() {
        let config = RelayConfigBuilder::with_api_key("xxx")
            .with_model("custom")
            .with_system_prompt("Be brief.")
            .build();
        let history = vec![
            HistoryEntry {
                role: Role::User,
                content: "Hello".to_owned(),
            },
            HistoryEntry {
                role: Role::Assistant,
                content: "Hi, how can I help?".to_owned(),
            },
        ];

        let request = create_request("What's new?", &history, &config);
        let expected = ChatCompletionRequest {
            model: "custom".to_owned(),
            messages: vec![
                Message::System {
                    content: "Be brief.".to_owned(),
                },
                Message::User {
                    content: "Hello".to_owned(),
                },
                Message::Assistant {
                    content: "Hi, how can I help?".to_owned(),
                },
                Message::User {
                    content: "What's new?".to_owned(),
                },
            ],
            max_tokens: 150,
            temperature: 0.7,
        };
        assert_eq!(request, expected);
    }

    #[test]
    fn test_create_request_trims_history_to_the_window() {
        let config = RelayConfigBuilder::with_api_key("xxx").build();
        let history: Vec<_> = (0..15)
            .map(|i| HistoryEntry {
                role: if i % 2 == 0 {
                    Role::User
                } else {
                    Role::Assistant
                },
                content: format!("entry {i}"),
            })
            .collect();

        let request = create_request("latest", &history, &config);
        // System prompt + 10 history entries + the new message.
        assert_eq!(request.messages.len(), 12);
        assert_eq!(
            request.messages[1],
            Message::Assistant {
                content: "entry 5".to_owned(),
            }
        );
        assert_eq!(
            request.messages[11],
            Message::User {
                content: "latest".to_owned(),
            }
        );
    }
}
