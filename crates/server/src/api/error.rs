//! Error responses for API handlers.
//!
//! Every failure leaves the server as `{"error": ...}` with the status the
//! ingest layer assigned.

use axum::{
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use zesha_core::IngestError;

#[derive(Debug)]
pub enum ApiError {
    Ingest(IngestError),
    /// The multipart stream could not be read (malformed, or over the body limit).
    Multipart(MultipartError),
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        Self::Ingest(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Ingest(IngestError::bad_request(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Ingest(IngestError::bad_request(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Ingest(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, Json(err.to_body())).into_response()
            }
            Self::Multipart(err) => {
                (err.status(), Json(json!({ "error": err.body_text() }))).into_response()
            }
        }
    }
}
