//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// API-level error with an HTTP status attached.
#[derive(Debug)]
pub enum ApiError {
    Internal(locus_core::Error),
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    BadGateway(String),
}

impl From<locus_core::Error> for ApiError {
    fn from(err: locus_core::Error) -> Self {
        match err {
            locus_core::Error::Validation(msg) => ApiError::BadRequest(msg),
            locus_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            locus_core::Error::ContentNotFound(id) => {
                ApiError::NotFound(format!("content {id} not found"))
            }
            locus_core::Error::Conflict(msg) => ApiError::Conflict(msg),
            locus_core::Error::RemoteUnavailable(msg) => ApiError::BadGateway(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_core_error_status_mapping() {
        assert_eq!(
            status_of(locus_core::Error::Validation("bad".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(locus_core::Error::NotFound("gone".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(locus_core::Error::ContentNotFound(7).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(locus_core::Error::Conflict("dup".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(locus_core::Error::RemoteUnavailable("down".into()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(locus_core::Error::Internal("oops".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
