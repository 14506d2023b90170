use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use crate::config::Config;
use crate::utils::error::AppError;

/// Static shared-secret check for mutating routes.
///
/// Holds the expected token when the gate is active, nothing otherwise.
#[derive(Clone, Debug, Default)]
pub struct BearerGate {
    token: Option<String>,
}

impl BearerGate {
    pub fn from_config(config: &Config) -> Self {
        if config.auth_enabled() {
            Self {
                token: config.api_token.clone(),
            }
        } else {
            Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    pub fn check(&self, authorization: Option<&HeaderValue>) -> Result<(), AppError> {
        let Some(expected) = self.token.as_deref() else {
            return Ok(());
        };

        let header = authorization
            .ok_or_else(|| AppError::AuthError("Missing Authorization header".to_string()))?;

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::AuthError("Invalid Authorization header format".to_string()))?;

        if token != expected {
            return Err(AppError::AuthError("Invalid token".to_string()));
        }
        Ok(())
    }
}

/// Rejects the request with 401 unless it carries the configured bearer token.
pub async fn require_bearer(
    State(gate): State<BearerGate>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    gate.check(request.headers().get(header::AUTHORIZATION))?;
    Ok(next.run(request).await)
}
