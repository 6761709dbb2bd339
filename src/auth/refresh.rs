// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Opaque long-lived refresh tokens.
//!
//! A refresh token is 32 bytes from the OS CSPRNG, hex-encoded to 64
//! lowercase characters, and persisted through the [`AuthStore`]. This
//! module is a plain ledger: it does not decide whether a token may still
//! be used. Expiry and revocation are judged by the session service.
//!
//! ```text
//! Active --(now >= expires_at)--> Expired   (derived, never stored)
//! Active --(revoke)-------------> Revoked   (stored, terminal)
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};

use super::{AuthError, Identity};
use crate::storage::{AuthStore, RefreshToken};

/// Number of random bytes in a refresh token.
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Lifetime of a refresh token (60 days).
pub fn refresh_token_ttl() -> Duration {
    Duration::days(60)
}

/// Generate a new refresh token string (64 lowercase hex chars).
pub fn generate_refresh_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::GenerationFailure(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Issues, looks up and revokes persisted refresh tokens.
#[derive(Clone)]
pub struct RefreshTokenStore {
    store: Arc<dyn AuthStore>,
}

impl RefreshTokenStore {
    pub fn new(store: Arc<dyn AuthStore>) -> Self {
        Self { store }
    }

    /// Mint and persist a refresh token for `owner`, valid 60 days from `now`.
    pub fn issue(&self, owner: Identity, now: DateTime<Utc>) -> Result<RefreshToken, AuthError> {
        if owner.is_nil() {
            return Err(AuthError::InvalidSubject);
        }

        let token = RefreshToken {
            token: generate_refresh_token()?,
            owner,
            created_at: now,
            expires_at: now + refresh_token_ttl(),
            revoked_at: None,
        };
        self.store.create_refresh_token(&token)?;
        Ok(token)
    }

    /// Fetch a refresh token record. Expiry and revocation are not checked.
    pub fn lookup(&self, token: &str) -> Result<RefreshToken, AuthError> {
        self.store
            .get_refresh_token(token)?
            .ok_or(AuthError::NotFound)
    }

    /// Revoke a refresh token. Revoking twice keeps the first timestamp.
    pub fn revoke(&self, token: &str, now: DateTime<Utc>) -> Result<RefreshToken, AuthError> {
        self.store
            .revoke_refresh_token(token, now)?
            .ok_or(AuthError::NotFound)
    }
}
