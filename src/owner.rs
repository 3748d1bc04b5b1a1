//! Owner tokens that partition data between users.
//!
//! The client generates an opaque token once, keeps it in local storage and
//! sends it with every API request. The token is not a credential: it only
//! decides whose records a request reads and writes.

use std::fmt::Display;

use axum::{
    RequestPartsExt,
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{self, Header},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The request header that carries the owner token.
pub const OWNER_TOKEN_HEADER: &str = "x-owner-token";

static OWNER_TOKEN: HeaderName = HeaderName::from_static(OWNER_TOKEN_HEADER);

/// Identifies the user that owns a record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create an owner ID from a client token.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingOwnerToken] if `token` is empty or only whitespace.
    pub fn new(token: &str) -> Result<Self, Error> {
        if token.trim().is_empty() {
            Err(Error::MissingOwnerToken)
        } else {
            Ok(Self(token.to_owned()))
        }
    }

    /// Create an owner ID without validation, e.g. when reading from the database.
    pub fn new_unchecked(token: &str) -> Self {
        Self(token.to_owned())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The typed `X-Owner-Token` header.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerToken(pub OwnerId);

impl Header for OwnerToken {
    fn name() -> &'static HeaderName {
        &OWNER_TOKEN
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let token = value.to_str().map_err(|_| headers::Error::invalid())?;

        OwnerId::new(token)
            .map(OwnerToken)
            .map_err(|_| headers::Error::invalid())
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(self.0.as_str()) {
            values.extend(std::iter::once(value));
        }
    }
}

/// Middleware that requires a valid owner token on every request.
///
/// The [OwnerId] is placed into the request extensions and the request executed normally if the
/// header is present and non-blank, otherwise a 400 response is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(owner_id): Extension<OwnerId>` to receive the owner ID.
pub async fn owner_guard(request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let owner_id = match parts.extract::<TypedHeader<OwnerToken>>().await {
        Ok(TypedHeader(OwnerToken(owner_id))) => owner_id,
        Err(rejection) => {
            tracing::warn!(
                "Rejected {} {} without a valid owner token: {rejection}",
                parts.method,
                parts.uri
            );
            return Error::MissingOwnerToken.into_response();
        }
    };

    parts.extensions.insert(owner_id);
    next.run(Request::from_parts(parts, body)).await
}

#[cfg(test)]
mod owner_guard_tests {
    use axum::{Extension, Router, middleware, routing::get};
    use axum_test::TestServer;

    use crate::{
        ApiMessage,
        owner::{OWNER_TOKEN_HEADER, OwnerId, owner_guard},
    };

    async fn echo_owner(Extension(owner_id): Extension<OwnerId>) -> String {
        owner_id.to_string()
    }

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route("/api/owner", get(echo_owner))
            .layer(middleware::from_fn(owner_guard));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn passes_owner_id_to_handler() {
        let server = get_test_server();

        let response = server
            .get("/api/owner")
            .add_header(OWNER_TOKEN_HEADER, "alice-123")
            .await;

        response.assert_status_ok();
        response.assert_text("alice-123");
    }

    #[tokio::test]
    async fn rejects_missing_token() {
        let server = get_test_server();

        let response = server.get("/api/owner").await;

        response.assert_status_bad_request();
        let body = response.json::<ApiMessage>();
        assert!(body.message.contains(OWNER_TOKEN_HEADER));
    }

    #[tokio::test]
    async fn rejects_blank_token() {
        let server = get_test_server();

        let response = server
            .get("/api/owner")
            .add_header(OWNER_TOKEN_HEADER, "   ")
            .await;

        response.assert_status_bad_request();
    }
}
