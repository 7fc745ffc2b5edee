//! HTTP bridge to the host bot.
//!
//! The host forwards thread lifecycle events and administrative commands
//! here, together with snapshots of the guild they happened in:
//!
//! - `POST /threads/ready` - returns the template variables to publish
//! - `POST /threads/close` - drops the thread's stored invite
//! - `POST /commands` - runs a command and returns its reply
//! - `GET /health`
//!
//! When a bridge secret is configured every route except `/health` requires
//! it in the `x-bridge-secret` header.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::dispatcher::AppState;
use crate::events::TemplateVariables;
use crate::invites::ThreadSnapshot;
use crate::plugins::{self, CommandContext, CommandReply};

pub const SECRET_HEADER: &str = "x-bridge-secret";

#[derive(Debug, Serialize)]
pub struct ThreadReadyResponse {
    pub variables: TemplateVariables,
}

#[derive(Debug, Deserialize)]
pub struct ThreadCloseRequest {
    pub thread_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(flatten)]
    pub context: CommandContext,
}

/// Build the bridge router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/threads/ready", post(thread_ready))
        .route("/threads/close", post(thread_close))
        .route("/commands", post(command))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_secret))
        .route("/health", get(health))
        .with_state(state)
}

async fn require_secret(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(expected) = state.bridge_secret.as_deref() {
        let accepted = request
            .headers()
            .get(SECRET_HEADER)
            .is_some_and(|value| secret_matches(value.as_bytes(), expected.as_bytes()));

        if !accepted {
            warn!("Rejected bridge request to {}: bad secret", request.uri().path());
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }

    next.run(request).await
}

/// Equal-length inputs are compared in full, whatever byte differs first.
fn secret_matches(provided: &[u8], expected: &[u8]) -> bool {
    if provided.len() != expected.len() {
        return false;
    }
    provided
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /threads/ready
async fn thread_ready(
    State(state): State<AppState>,
    Json(thread): Json<ThreadSnapshot>,
) -> Json<ThreadReadyResponse> {
    debug!("Thread {} ready in guild {}", thread.thread_id, thread.guild.id);
    let variables = state.hooks.on_thread_ready(&thread).await;
    if variables.is_empty() {
        debug!("No invite published for thread {}", thread.thread_id);
    }
    Json(ThreadReadyResponse { variables })
}

/// POST /threads/close
async fn thread_close(
    State(state): State<AppState>,
    Json(request): Json<ThreadCloseRequest>,
) -> StatusCode {
    state.hooks.on_thread_close(request.thread_id).await;
    StatusCode::NO_CONTENT
}

/// POST /commands
async fn command(
    State(state): State<AppState>,
    Json(request): Json<CommandRequest>,
) -> Json<CommandReply> {
    let args: Vec<&str> = request.args.iter().map(String::as_str).collect();
    let reply = plugins::dispatch(&state, &request.context, &request.name, &args).await;
    Json(reply)
}
