use std::any::Any;

use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config, FieldNaming};
use crate::handlers::{create_event, delete_event, get_event, list_events, login, root, update_event};
use crate::middleware::{require_bearer, BearerGate};
use crate::store::EventStore;
use crate::utils::error::AppError;

/// Shared, read-only handler state. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: EventStore,
    pub naming: FieldNaming,
    pub gate: BearerGate,
}

impl AppState {
    pub fn new(config: &Config, store: EventStore) -> Self {
        Self {
            store,
            naming: config.field_naming,
            gate: BearerGate::from_config(config),
        }
    }
}

pub fn create_routes(config: &Config, store: EventStore) -> Router {
    let state = AppState::new(config, store);
    let auth = from_fn_with_state(state.gate.clone(), require_bearer);

    Router::new()
        .route("/", get(root))
        .route("/login", get(login).route_layer(auth.clone()))
        .route(
            "/event",
            get(list_events).merge(post(create_event).route_layer(auth.clone())),
        )
        .route(
            "/event/:id",
            get(get_event).merge(
                patch(update_event)
                    .delete(delete_event)
                    .route_layer(auth),
            ),
        )
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config))
        .layer(create_cors_layer(config))
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic payload".to_string());

    AppError::InternalServerError(format!("handler panicked: {detail}")).into_response()
}
