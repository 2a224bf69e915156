//! The seam to the external chat-completion service.

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, header};

use crate::RelayConfig;
use crate::proto::ChatCompletionRequest;

/// Error type for an upstream chat-completion call.
///
/// The variants are the complete set of upstream outcomes besides
/// success, so callers pattern-match instead of probing payload shapes.
#[derive(Debug)]
pub enum UpstreamError {
    /// The upstream answered with a non-success HTTP status.
    Status {
        /// The HTTP status code.
        status: u16,
        /// The upstream's response body, for server-side logs only.
        detail: String,
    },
    /// The upstream answered 2xx but the payload carried no reply text.
    MalformedPayload,
    /// The upstream could not be reached at all.
    Transport {
        /// The transport failure, for server-side logs only.
        detail: String,
    },
}

impl Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Status { status, detail } => {
                write!(f, "upstream returned status {status}: {detail}")
            }
            UpstreamError::MalformedPayload => {
                "upstream payload is missing the reply content".fmt(f)
            }
            UpstreamError::Transport { detail } => {
                write!(f, "failed to reach the upstream service: {detail}")
            }
        }
    }
}

impl StdError for UpstreamError {}

/// A service that can turn a chat-completion request into a reply text.
///
/// Once the upstream is created, it should behave like a stateless
/// object; the handler shares one instance across all requests.
#[async_trait]
pub trait ChatUpstream: Send + Sync {
    /// Sends the request and resolves with the trimmed reply text.
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<String, UpstreamError>;
}

/// Chat-completion upstream over HTTP.
#[derive(Clone, Debug)]
pub struct HttpUpstream {
    client: Client,
    config: Arc<RelayConfig>,
}

impl HttpUpstream {
    /// Creates a new `HttpUpstream` with the given configuration.
    #[inline]
    pub fn new(config: Arc<RelayConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ChatUpstream for HttpUpstream {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<String, UpstreamError> {
        let mut builder = self
            .client
            .post(format!("{}{}", self.config.base_url, "/chat/completions"))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(customer_id) = &self.config.customer_id {
            builder = builder.header("customerId", customer_id);
        }

        let response = builder.json(request).send().await.map_err(|err| {
            UpstreamError::Transport {
                detail: err.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let completion: crate::proto::ChatCompletion = response
            .json()
            .await
            .map_err(|_| UpstreamError::MalformedPayload)?;
        let reply = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or(UpstreamError::MalformedPayload)?;
        Ok(reply.trim().to_owned())
    }
}
