// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session orchestration: login, refresh, revoke, authenticate.
//!
//! This is the only part of the auth core that the HTTP layer talks to.
//! It owns the process signing secret and a handle to the store; nothing
//! else is kept between calls.

use std::sync::Arc;

use chrono::Duration;

use super::{
    bearer::extract_bearer,
    clock::{Clock, SystemClock},
    password::{hash_password, verify_password, verify_password_decoy},
    refresh::RefreshTokenStore,
    token::{issue_access_token_at, verify_access_token_at},
    AuthError, Identity, Secret,
};
use crate::storage::{AuthStore, Credential, RefreshToken, StoreError};

/// Access token lifetime handed out at login.
pub fn login_access_token_ttl() -> Duration {
    Duration::hours(1)
}

/// Access token lifetime handed out when exchanging a refresh token.
///
/// Matches the refresh token lifetime rather than the login TTL. This is
/// the long-standing behaviour of the refresh endpoint and is kept as-is.
pub fn refreshed_access_token_ttl() -> Duration {
    Duration::days(60)
}

/// Tokens returned by a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub credential: Credential,
    pub access_token: String,
    pub refresh_token: RefreshToken,
}

/// Login, token refresh and revocation flows.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn AuthStore>,
    refresh_tokens: RefreshTokenStore,
    secret: Secret,
    clock: Arc<dyn Clock>,
}

impl SessionService {
    pub fn new(store: Arc<dyn AuthStore>, secret: Secret) -> Self {
        Self::with_clock(store, secret, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn AuthStore>, secret: Secret, clock: Arc<dyn Clock>) -> Self {
        Self {
            refresh_tokens: RefreshTokenStore::new(store.clone()),
            store,
            secret,
            clock,
        }
    }

    /// Register a new credential.
    pub fn register(&self, email: &str, password: &str) -> Result<Credential, AuthError> {
        validate_credentials(email, password)?;

        let now = self.clock.now();
        let credential = Credential {
            id: Identity::generate(),
            email: email.to_string(),
            hashed_password: hash_password(password)?,
            created_at: now,
            updated_at: now,
        };

        match self.store.create_credential(&credential) {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => return Err(AuthError::EmailTaken),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = %credential.id, "Registered credential");
        Ok(credential)
    }

    /// Replace the email and password of an existing credential.
    pub fn update_credentials(
        &self,
        id: Identity,
        email: &str,
        password: &str,
    ) -> Result<Credential, AuthError> {
        validate_credentials(email, password)?;

        let hashed_password = hash_password(password)?;
        let updated = match self
            .store
            .update_credential(id, email, &hashed_password, self.clock.now())
        {
            Ok(Some(credential)) => credential,
            Ok(None) => return Err(AuthError::NotFound),
            Err(StoreError::Conflict(_)) => return Err(AuthError::EmailTaken),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = %id, "Updated credential");
        Ok(updated)
    }

    /// Verify email and password and mint an access/refresh token pair.
    ///
    /// Unknown email and wrong password fail identically.
    pub fn login(&self, email: &str, password: &str) -> Result<LoginSession, AuthError> {
        let Some(credential) = self.store.get_credential_by_email(email)? else {
            verify_password_decoy(password);
            tracing::debug!("Login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &credential.hashed_password)? {
            tracing::debug!(user_id = %credential.id, "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        let access_token =
            issue_access_token_at(credential.id, &self.secret, login_access_token_ttl(), now)?;
        let refresh_token = self.refresh_tokens.issue(credential.id, now)?;

        tracing::info!(user_id = %credential.id, "Login succeeded");
        Ok(LoginSession {
            credential,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated.
    pub fn refresh(&self, token: &str) -> Result<String, AuthError> {
        let record = self.refresh_tokens.lookup(token).map_err(not_found_as_invalid)?;

        if record.is_revoked() {
            tracing::debug!(user_id = %record.owner, "Refresh rejected: token revoked");
            return Err(AuthError::TokenRevoked);
        }

        let now = self.clock.now();
        if record.is_expired_at(now) {
            tracing::debug!(user_id = %record.owner, "Refresh rejected: token expired");
            return Err(AuthError::TokenExpired);
        }

        let access_token =
            issue_access_token_at(record.owner, &self.secret, refreshed_access_token_ttl(), now)?;
        tracing::info!(user_id = %record.owner, "Issued access token from refresh token");
        Ok(access_token)
    }

    /// Revoke a refresh token. Revoking an already revoked token succeeds.
    pub fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let record = self
            .refresh_tokens
            .revoke(token, self.clock.now())
            .map_err(not_found_as_invalid)?;

        tracing::info!(user_id = %record.owner, "Revoked refresh token");
        Ok(())
    }

    /// Resolve the caller identity from an `Authorization` header value.
    pub fn authenticate(&self, header: Option<&str>) -> Result<Identity, AuthError> {
        let token = extract_bearer(header)?;
        verify_access_token_at(token, &self.secret, self.clock.now())
    }
}

fn not_found_as_invalid(err: AuthError) -> AuthError {
    match err {
        AuthError::NotFound => AuthError::InvalidToken,
        other => other,
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() {
        return Err(AuthError::InvalidRequest("email is required".to_string()));
    }
    if password.is_empty() {
        return Err(AuthError::InvalidRequest("password is required".to_string()));
    }
    Ok(())
}
