use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::modules::streams::core::events::NewEvent;
use crate::modules::streams::core::expected_version::ExpectedVersion;
use crate::modules::streams::use_cases::append_event::command::AppendEvent;
use crate::modules::streams::use_cases::append_event::handler::AppendError;
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct AppendEventBody {
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub data: String,
}

pub async fn handle_next(
    State(state): State<AppState>,
    Path(stream_id): Path<String>,
    body: Bytes,
) -> Response {
    tracing::info!(stream_id = %stream_id, "received request: commit event");
    let command = match parse_body(&body) {
        Ok(event) => AppendEvent {
            stream_id,
            expected_version: ExpectedVersion::Next,
            event,
        },
        Err(err) => return err.into_response(),
    };
    run(state, command).await
}

pub async fn handle_at(
    State(state): State<AppState>,
    Path((stream_id, version)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    tracing::info!(stream_id = %stream_id, version = %version, "received request: commit event at version");
    let expected_version = match version.parse::<i64>() {
        Ok(version) => version,
        Err(err) => {
            return rejection(AppendError::InvalidInput(format!(
                "invalid version {version:?}: {err}"
            )))
            .into_response();
        }
    };
    let command = match parse_body(&body) {
        Ok(event) => AppendEvent {
            stream_id,
            expected_version: ExpectedVersion::Exact(expected_version),
            event,
        },
        Err(err) => return err.into_response(),
    };
    run(state, command).await
}

/// `POST /` names no stream at all.
pub async fn handle_missing_stream() -> Response {
    rejection(AppendError::InvalidInput("Invalid Stream ID".into())).into_response()
}

fn parse_body(body: &[u8]) -> Result<NewEvent, (StatusCode, String)> {
    serde_json::from_slice::<AppendEventBody>(body)
        .map(|body| NewEvent::new(body.event_type, body.data))
        .map_err(|err| {
            tracing::info!(error = %err, "failed to parse request");
            rejection(AppendError::InvalidInput(err.to_string()))
        })
}

async fn run(state: AppState, command: AppendEvent) -> Response {
    // A client that hangs up must not cut an append off between its read and its write,
    // so the append runs on its own task.
    let handler = state.append_handler.clone();
    let outcome = tokio::spawn(async move { handler.handle(command).await }).await;

    match outcome {
        Ok(Ok(_)) => (StatusCode::OK, "Success").into_response(),
        Ok(Err(err)) => rejection(err).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "append task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn rejection(err: AppendError) -> (StatusCode, String) {
    let status = match &err {
        AppendError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AppendError::VersionConflict { .. } => StatusCode::CONFLICT,
        AppendError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AppendError::LockTimeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
    };
    if status.is_server_error() {
        tracing::warn!(error = %err, "error storing event");
    }
    (status, format!("{err}\n"))
}
