// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::StoreError;

/// Authentication and session error type.
///
/// Every failure of the auth core is one of these kinds. They are all
/// recoverable and are rendered to the caller by [`IntoResponse`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown email or wrong password (deliberately indistinguishable)
    #[error("Incorrect email or password")]
    InvalidCredentials,
    /// No authorization header present
    #[error("Authorization header is required")]
    MissingAuthHeader,
    /// Authorization header is not `Bearer <token>`
    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    MalformedAuthHeader,
    /// Access token is structurally invalid
    #[error("Token is malformed")]
    MalformedToken,
    /// Refresh token does not exist
    #[error("Invalid refresh token")]
    InvalidToken,
    /// Access token MAC does not match, or the token names a non-HMAC algorithm
    #[error("Token signature is invalid")]
    BadSignature,
    /// Access token has expired
    #[error("Token has expired")]
    Expired,
    /// Refresh token has expired
    #[error("Refresh token has expired")]
    TokenExpired,
    /// Refresh token was revoked
    #[error("Refresh token has been revoked")]
    TokenRevoked,
    /// Record does not exist
    #[error("Not found")]
    NotFound,
    /// Access token subject is not a valid identity
    #[error("Token subject is not a valid identity")]
    MalformedSubject,
    /// Signing secret is empty
    #[error("Signing secret must not be empty")]
    InvalidSecret,
    /// Token lifetime is zero or negative
    #[error("Token lifetime must be positive")]
    InvalidTtl,
    /// Attempt to issue a token for the nil identity
    #[error("Token subject must not be the nil identity")]
    InvalidSubject,
    /// Underlying store failed
    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[from] StoreError),
    /// Secure random source failed
    #[error("Failed to generate token: {0}")]
    GenerationFailure(String),
    /// Password hashing failed or the stored hash is malformed
    #[error("Password hashing failure: {0}")]
    HashingFailure(String),
    /// Access token could not be signed
    #[error("Failed to sign token: {0}")]
    SigningFailure(String),
    /// Email already belongs to another account
    #[error("Email already taken")]
    EmailTaken,
    /// Request payload failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::MalformedAuthHeader => "malformed_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidToken => "invalid_token",
            AuthError::BadSignature => "bad_signature",
            AuthError::Expired => "expired",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenRevoked => "token_revoked",
            AuthError::NotFound => "not_found",
            AuthError::MalformedSubject => "malformed_subject",
            AuthError::InvalidSecret => "invalid_secret",
            AuthError::InvalidTtl => "invalid_ttl",
            AuthError::InvalidSubject => "invalid_subject",
            AuthError::PersistenceFailure(_) => "persistence_failure",
            AuthError::GenerationFailure(_) => "generation_failure",
            AuthError::HashingFailure(_) => "hashing_failure",
            AuthError::SigningFailure(_) => "signing_failure",
            AuthError::EmailTaken => "email_taken",
            AuthError::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingAuthHeader
            | AuthError::MalformedAuthHeader
            | AuthError::MalformedToken
            | AuthError::InvalidToken
            | AuthError::BadSignature
            | AuthError::Expired
            | AuthError::TokenExpired
            | AuthError::TokenRevoked
            | AuthError::MalformedSubject => StatusCode::UNAUTHORIZED,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidSecret
            | AuthError::InvalidTtl
            | AuthError::InvalidSubject
            | AuthError::PersistenceFailure(_)
            | AuthError::GenerationFailure(_)
            | AuthError::HashingFailure(_)
            | AuthError::SigningFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, error_code = self.error_code(), "Auth request failed");
        }
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
