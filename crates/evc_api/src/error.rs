use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use evc_core::{SessionError, StoreError};
use evc_engine::EngineError;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
}

/// An [`EngineError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        ApiError(error)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

fn status_for(error: &EngineError) -> StatusCode {
    match error {
        EngineError::InvalidPhone(_)
        | EngineError::InvalidCode
        | EngineError::NoPendingVerification
        | EngineError::EmptyAmount
        | EngineError::InsufficientBalance { .. } => StatusCode::BAD_REQUEST,
        EngineError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        EngineError::StationNotFound(_) | EngineError::NotificationNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        EngineError::ResendCooldown { .. }
        | EngineError::StationUnavailable { .. }
        | EngineError::ConnectorUnavailable { .. }
        | EngineError::NoActiveSession
        | EngineError::Store(StoreError::Session(SessionError::AlreadyActive { .. })) => {
            StatusCode::CONFLICT
        }
        EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected with {}: {}", status, self.0);
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
