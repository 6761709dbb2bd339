// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated callers.
//!
//! Use the `Auth` extractor in handlers to require a valid access token:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user_id): Auth) -> impl IntoResponse {
//!     // user_id is the token subject
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, Identity};
use crate::state::AppState;

/// Extractor for the identity behind a verified access token.
pub struct Auth(pub Identity);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|value| value.to_str().map_err(|_| AuthError::MalformedAuthHeader))
            .transpose()?;

        let identity = state.sessions.authenticate(header)?;
        Ok(Auth(identity))
    }
}

/// Extractor for a raw bearer token (refresh and revoke endpoints).
///
/// Only the header shape is checked; the token itself is validated by the
/// handler.
pub struct BearerToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = super::bearer::bearer_token(&parts.headers)?;
        Ok(BearerToken(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::Request;
    use chrono::Duration;

    use crate::auth::{issue_access_token, Secret, SessionService};
    use crate::storage::MemoryStore;

    const SECRET: &str = "extractor-secret";

    fn create_test_state() -> AppState {
        AppState::new(SessionService::new(
            Arc::new(MemoryStore::new()),
            Secret::new(SECRET),
        ))
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let state = create_test_state();
        let mut parts = parts_with_auth(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_valid_token() {
        let state = create_test_state();
        let id = Identity::generate();
        let token = issue_access_token(id, &Secret::new(SECRET), Duration::hours(1)).unwrap();
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));

        let Auth(user_id) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user_id, id);
    }

    #[tokio::test]
    async fn auth_extractor_rejects_foreign_signature() {
        let state = create_test_state();
        let token =
            issue_access_token(Identity::generate(), &Secret::new("nope"), Duration::hours(1)).unwrap();
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::BadSignature)));
    }

    #[tokio::test]
    async fn bearer_token_extractor_returns_raw_token() {
        let mut parts = parts_with_auth(Some("Bearer abc123"));
        let BearerToken(token) = BearerToken::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(token, "abc123");

        let mut parts = parts_with_auth(Some("Token abc123"));
        let result = BearerToken::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MalformedAuthHeader)));
    }
}
