//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{Error, owner::OWNER_TOKEN_HEADER};

/// Bodies longer than this many bytes are truncated in the `info` level logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level with the
/// owner token header redacted. If a body is longer than
/// [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated and the full body is logged
/// at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_body(body, Error::InvalidRequestBody).await {
        Ok(bytes) => bytes,
        Err(response) => return response,
    };

    let headers = redacted_headers(&parts.headers);
    let body_text = String::from_utf8_lossy(&body_bytes);
    log_body(
        &format!("Received request: {} {} {headers:#?}", parts.method, parts.uri),
        &body_text,
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match read_body(body, Error::InvalidResponseBody).await {
        Ok(bytes) => bytes,
        Err(response) => return response,
    };

    let body_text = String::from_utf8_lossy(&body_bytes);
    log_body(
        &format!("Sending response: {} {:#?}", parts.status, parts.headers),
        &body_text,
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body, to_error: fn(String) -> Error) -> Result<Bytes, Response> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|error| unreadable_body(error, to_error))
}

fn unreadable_body(error: axum::Error, to_error: fn(String) -> Error) -> Response {
    tracing::error!("Could not read body for logging: {error}");
    to_error(error.to_string()).into_response()
}

fn redacted_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    if headers.contains_key(OWNER_TOKEN_HEADER) {
        headers.insert(OWNER_TOKEN_HEADER, HeaderValue::from_static(REDACTED));
    }

    headers
}

/// Cut `body` to at most [LOG_BODY_LENGTH_LIMIT] bytes without splitting a character.
fn truncate(body: &str) -> &str {
    if body.len() <= LOG_BODY_LENGTH_LIMIT {
        return body;
    }

    let mut end = LOG_BODY_LENGTH_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_body(head: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("{head}\nbody: {}...", truncate(body));
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{head}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use axum::http::{HeaderMap, HeaderValue, StatusCode};

    use crate::{
        Error, OWNER_TOKEN_HEADER,
        logging::{LOG_BODY_LENGTH_LIMIT, REDACTED, redacted_headers, truncate, unreadable_body},
    };

    fn read_error() -> axum::Error {
        axum::Error::new(io::Error::other("connection reset"))
    }

    #[test]
    fn unreadable_request_body_is_bad_request() {
        let response = unreadable_body(read_error(), Error::InvalidRequestBody);

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unreadable_response_body_is_server_error() {
        let response = unreadable_body(read_error(), Error::InvalidResponseBody);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn redacts_owner_token() {
        let mut headers = HeaderMap::new();
        headers.insert(OWNER_TOKEN_HEADER, HeaderValue::from_static("secret-owner"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let redacted = redacted_headers(&headers);

        assert_eq!(redacted.get(OWNER_TOKEN_HEADER).unwrap(), REDACTED);
        assert_eq!(redacted.get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn leaves_headers_without_token_alone() {
        let headers = HeaderMap::new();

        assert!(redacted_headers(&headers).is_empty());
    }

    #[test]
    fn truncates_long_bodies() {
        let body = "a".repeat(LOG_BODY_LENGTH_LIMIT * 2);

        assert_eq!(truncate(&body).len(), LOG_BODY_LENGTH_LIMIT);
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn truncation_respects_character_boundaries() {
        let body = format!("{}é", "a".repeat(LOG_BODY_LENGTH_LIMIT - 1));

        assert_eq!(truncate(&body), "a".repeat(LOG_BODY_LENGTH_LIMIT - 1));
    }
}
