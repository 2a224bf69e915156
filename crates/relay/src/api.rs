//! The HTTP surface of the relay.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use parley_core::conversation::Role;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::RelayConfig;
use crate::proto::create_request;
use crate::upstream::{ChatUpstream, UpstreamError};

/// One history item carried with an assist request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The author of this item.
    pub role: Role,
    /// The transcript or reply text.
    pub content: String,
}

/// The request body of `POST /api/assist`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssistRequest {
    /// The transcript to answer.
    pub message: Option<String>,
    /// Recent exchanges, oldest first.
    #[serde(rename = "conversationHistory", default)]
    pub conversation_history: Vec<HistoryEntry>,
}

/// The success body of `POST /api/assist`.
#[derive(Serialize)]
struct ReplyBody {
    response: String,
    success: bool,
}

/// The failure body of `POST /api/assist`.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Shared state of the HTTP surface.
pub struct AppState {
    /// The chat-completion upstream used to answer requests.
    pub upstream: Arc<dyn ChatUpstream>,
    /// The relay configuration.
    pub config: Arc<RelayConfig>,
}

/// Builds the relay router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/assist", post(assist))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Answers one conversation turn.
async fn assist(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AssistRequest>,
) -> Response {
    let Some(message) =
        request.message.filter(|message| !message.is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "Message is required".to_owned(),
            }),
        )
            .into_response();
    };

    let upstream_request = create_request(
        &message,
        &request.conversation_history,
        &state.config,
    );
    match state.upstream.complete(&upstream_request).await {
        Ok(reply) => (
            StatusCode::OK,
            Json(ReplyBody {
                response: reply,
                success: true,
            }),
        )
            .into_response(),
        Err(err) => {
            // Diagnostic detail stays here; clients get a generic text.
            error!("upstream request failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: failure_notice(&err).to_owned(),
                }),
            )
                .into_response()
        }
    }
}

fn failure_notice(err: &UpstreamError) -> &'static str {
    match err {
        UpstreamError::Status { .. } => "Failed to get AI response",
        UpstreamError::MalformedPayload => {
            "Invalid response from AI service"
        }
        UpstreamError::Transport { .. } => {
            "An error occurred while processing your request"
        }
    }
}
