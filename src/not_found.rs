//! The response for paths that match no route.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::ApiMessage;

/// A route handler that responds with a JSON 404.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

/// A JSON 404 response for resources that do not exist.
pub fn get_404_not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiMessage::new("the requested resource could not be found")),
    )
        .into_response()
}
