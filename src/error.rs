// Application error type and its conversion into HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug)]
pub enum AppError {
    InternalServerError(anyhow::Error),
    BadRequest(String),
    NotFound(String),
}

// Lets handlers use `?` on anyhow results
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::InternalServerError(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(e) => {
                tracing::error!("Internal server error: {:?}", e);
                // Don't expose internal details to the client
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::BadRequest(message) => {
                tracing::warn!("Bad request: {}", message);
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::NotFound(message) => {
                tracing::info!("Not found: {}", message);
                (StatusCode::NOT_FOUND, message)
            }
        };

        (status, error_message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
