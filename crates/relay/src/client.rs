//! The connector a voice client uses to reach the relay over HTTP.

use std::error::Error as StdError;
use std::fmt::{self, Display};

use parley_core::conversation::Role;
use parley_core::relay_client::RelayConnector;
use serde::Deserialize;

use crate::api::{AssistRequest, HistoryEntry};

/// Error type for [`HttpRelayConnector`].
#[derive(Debug)]
pub struct ClientError {
    message: String,
}

impl ClientError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for ClientError {}

// A lenient read of the relay's reply, tolerating either body shape.
#[derive(Deserialize)]
struct ReplyPayload {
    #[serde(default)]
    success: bool,
    response: Option<String>,
    error: Option<String>,
}

/// Connects a conversation controller to a relay server over HTTP.
#[derive(Clone, Debug)]
pub struct HttpRelayConnector {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRelayConnector {
    /// Creates a connector for the relay at `base_url`.
    #[inline]
    pub fn new<S: AsRef<str>>(base_url: S) -> Self {
        let base_url = base_url.as_ref().trim_end_matches('/');
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{base_url}/api/assist"),
        }
    }
}

impl RelayConnector for HttpRelayConnector {
    type Error = ClientError;

    fn send_message(
        &self,
        message: &str,
        history: &[(Role, String)],
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static
    {
        let request = AssistRequest {
            message: Some(message.to_owned()),
            conversation_history: history
                .iter()
                .map(|(role, content)| HistoryEntry {
                    role: *role,
                    content: content.clone(),
                })
                .collect(),
        };
        let resp_fut =
            self.client.post(&self.endpoint).json(&request).send();

        async move {
            let response = resp_fut.await.map_err(|err| {
                ClientError::new(format!("relay is unreachable: {err}"))
            })?;
            let status = response.status();
            let payload: ReplyPayload =
                response.json().await.map_err(|err| {
                    ClientError::new(format!(
                        "relay reply could not be read: {err}"
                    ))
                })?;

            if !status.is_success() {
                let reason = payload.error.unwrap_or_else(|| {
                    format!("relay request failed with status {status}")
                });
                return Err(ClientError::new(reason));
            }
            if !payload.success {
                return Err(ClientError::new(
                    "relay reported an unsuccessful turn",
                ));
            }
            payload.response.ok_or_else(|| {
                ClientError::new("relay reply was missing the response text")
            })
        }
    }
}
