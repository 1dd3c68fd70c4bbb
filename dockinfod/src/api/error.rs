use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::types::ErrorBody;
use crate::resolver::ResolveError;

/// Handler error, rendered as a JSON body with an `error` field
#[derive(Debug)]
pub struct ApiError(ResolveError);

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            ResolveError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ResolveError::NotFound(_) => StatusCode::NOT_FOUND,
            ResolveError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ResolveError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            ResolveError::BadRequest { message, hint } => ErrorBody {
                error: message,
                hint,
            },
            ResolveError::Internal(detail) => {
                tracing::error!("Request failed: {}", detail);
                ErrorBody {
                    error: "internal error".to_string(),
                    hint: None,
                }
            }
            other => ErrorBody {
                error: other.to_string(),
                hint: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
