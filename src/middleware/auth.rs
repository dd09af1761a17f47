//! Shared-key authentication for the admin API

use crate::services::App;
use axum::{
    body::Body,
    extract::FromRequestParts,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// The HTTP header that carries the shared admin key
const API_KEY_HEADER: &str = "x-api-key";

/// Extractor proving the caller presented the configured admin key
pub struct ApiKey;

impl<S> FromRequestParts<S> for ApiKey {
    type Rejection = ApiKeyError;

    fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let app = parts
            .extensions
            .get::<Arc<App>>()
            .expect("app extension missing")
            .clone();

        let result = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiKeyError::MissingKey)
            .and_then(|key| {
                if key == app.config.api_key {
                    Ok(ApiKey)
                } else {
                    Err(ApiKeyError::BadKey)
                }
            });

        std::future::ready(result)
    }
}

/// Error type for rejected admin calls
#[derive(Debug, Error)]
pub enum ApiKeyError {
    /// The key header was not provided on the request
    #[error("Missing header x-api-key")]
    MissingKey,
    /// The provided key doesn't match the configured one
    #[error("Bad API key")]
    BadKey,
}

impl IntoResponse for ApiKeyError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingKey => StatusCode::UNAUTHORIZED,
            Self::BadKey => StatusCode::FORBIDDEN,
        };

        (status, Body::from(self.to_string())).into_response()
    }
}
