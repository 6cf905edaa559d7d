use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

/// Failure of a single call to an external provider.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("no result found: {0}")]
    NotFound(String),
    #[error("provider rejected credentials")]
    Unauthorized,
    #[error("provider rate limit exceeded")]
    RateLimited,
    #[error("provider returned status {0}: {1}")]
    Status(u16, String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode provider response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => ClientError::Unauthorized,
            404 => ClientError::NotFound(body),
            429 => ClientError::RateLimited,
            code => ClientError::Status(code, body),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid provider credentials")]
    ProviderAuth,
    #[error("{0}")]
    NotFound(String),
    #[error("Rate limit exceeded, please retry later")]
    RateLimited,
    #[error("Processing failed")]
    UpstreamShape(String),
    #[error("Upstream service failed")]
    Upstream(String),
    #[error("Storage failure")]
    Database(String),
    #[error("Service not configured")]
    Config(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    timestamp: String,
}

impl ApiError {
    fn details(&self) -> Option<String> {
        match self {
            ApiError::UpstreamShape(details)
            | ApiError::Upstream(details)
            | ApiError::Database(details)
            | ApiError::Config(details) => Some(details.clone()),
            _ => None,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::ProviderAuth => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::UpstreamShape(_)
            | ApiError::Upstream(_)
            | ApiError::Database(_)
            | ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Some(details) = self.details() {
            log::error!("{}: {}", self, details);
        }
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            details: self.details(),
            timestamp: Utc::now().to_rfc3339(),
        })
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotConfigured(provider) => {
                ApiError::Config(format!("{} is not configured", provider))
            }
            ClientError::InvalidRequest(message) => ApiError::Validation(message),
            ClientError::NotFound(what) => ApiError::NotFound(what),
            ClientError::Unauthorized => ApiError::ProviderAuth,
            ClientError::RateLimited => ApiError::RateLimited,
            ClientError::Decode(details) => ApiError::UpstreamShape(details),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<mongodb::error::Error> for ApiError {
    fn from(err: mongodb::error::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}
