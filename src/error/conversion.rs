//! Conversion of [`ApiError`](crate::error::ApiError) into HTTP responses.
//!
//! Errors render as a JSON body of the form `{"error": "<message>"}` with
//! the status code from `ApiError::status_code`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::error::types::ApiError;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {:?}", self);
        }
        let body = Json(serde_json::json!({ "error": self.message() }));
        (status, body).into_response()
    }
}
