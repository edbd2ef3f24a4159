//! Shared HTTP response handling.

use prepcall_core::PrepcallError;
use reqwest::{Response, StatusCode};
use serde::Deserialize;

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Converts a non-success response into a typed backend error.
///
/// The remote reports failures as `{ "message": ... }`; when the body does
/// not parse, the raw text is carried instead.
pub(crate) async fn error_from_response(response: Response) -> PrepcallError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "failed to read error body".to_string());
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|wrapper| wrapper.message)
        .unwrap_or(body);
    PrepcallError::backend_status(status.as_u16(), message)
}

/// Returns true when the status means the looked-up entity does not exist.
pub(crate) fn is_not_found(status: StatusCode) -> bool {
    status == StatusCode::NOT_FOUND
}
