use crate::provider::ProviderError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("AI provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl ApiError {
    fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Provider(ProviderError::EmptyResponse) => (
                StatusCode::BAD_GATEWAY,
                "EMPTY_RESPONSE",
                "AI service returned no text".to_string(),
            ),
            ApiError::Provider(err) => {
                let msg = err.to_string();
                let lower = msg.to_lowercase();
                if lower.contains("rate limit") || lower.contains("quota") || lower.contains("429") {
                    (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", format!("Rate limited: {msg}"))
                } else if lower.contains("authentication")
                    || lower.contains("api key")
                    || lower.contains("unauthorized")
                    || lower.contains("401")
                {
                    (
                        StatusCode::UNAUTHORIZED,
                        "AUTHENTICATION_ERROR",
                        format!("Authentication failed: {msg}"),
                    )
                } else if lower.contains("model") && lower.contains("not found") {
                    (StatusCode::NOT_FOUND, "MODEL_NOT_FOUND", format!("Model not found: {msg}"))
                } else {
                    (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", format!("AI service error: {msg}"))
                }
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.classify().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status_code, error_type, message) = self.classify();

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
            status_code: status_code.as_u16(),
        };

        HttpResponse::build(status_code).json(error_response)
    }
}
