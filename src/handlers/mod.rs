use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::models::event::object_payload;
use crate::models::{EventPatch, NewEvent, WireEvent};
use crate::routes::AppState;
use crate::utils::error::AppError;
use crate::utils::response::message;

pub const WELCOME_MESSAGE: &str = "Welcome to the Sacandaga Calendar Backend API!";

pub async fn root() -> Response {
    message(WELCOME_MESSAGE, StatusCode::OK)
}

/// Reached only once the bearer gate has accepted the request.
pub async fn login() -> Response {
    message("Token is valid", StatusCode::OK)
}

pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events: Vec<WireEvent> = state
        .store
        .get_all()
        .await?
        .into_iter()
        .map(|event| event.to_wire(state.naming))
        .collect();

    Ok((StatusCode::OK, Json(events)).into_response())
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let event = state.store.get_by_id(&id).await?;
    Ok((StatusCode::OK, Json(event.to_wire(state.naming))).into_response())
}

pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let new_event = NewEvent::from_json(json_body(payload)?, state.naming)?;
    let event = state.store.insert(&new_event).await?;

    tracing::info!(id = %event.id, title = %event.title, "Created event");
    Ok((StatusCode::CREATED, Json(event.to_wire(state.naming))).into_response())
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let body = object_payload(json_body(payload)?)?;
    // A missing event wins over field errors in the body.
    state.store.get_by_id(&id).await?;
    let patch = EventPatch::from_object(body, state.naming)?;
    let event = state.store.update_partial(&id, &patch).await?;

    tracing::info!(id = %event.id, "Updated event");
    Ok((StatusCode::OK, Json(event.to_wire(state.naming))).into_response())
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.store.delete(&id).await?;

    tracing::info!(id = %id, "Deleted event");
    Ok(message("Event deleted successfully", StatusCode::OK))
}

fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "Unreadable JSON body");
        AppError::ValidationError("Invalid JSON payload".to_string())
    })
}
