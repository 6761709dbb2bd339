// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the auth endpoints. All types derive
//! `ToSchema` for the OpenAPI document.
//!
//! Password hashes never appear in any response type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Identity, LoginSession};
use crate::storage::Credential;

// =============================================================================
// Requests
// =============================================================================

/// Email and password, used to register, update and log in.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

// =============================================================================
// Responses
// =============================================================================

/// Public view of a registered user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserResponse {
    pub id: Identity,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Credential> for UserResponse {
    fn from(credential: Credential) -> Self {
        Self {
            id: credential.id,
            email: credential.email,
            created_at: credential.created_at,
            updated_at: credential.updated_at,
        }
    }
}

/// Successful login: the user plus a token pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    /// Access token (HS256 JWT, valid 1 hour)
    pub token: String,
    /// Refresh token (64 hex characters, valid 60 days)
    pub refresh_token: String,
}

impl From<LoginSession> for LoginResponse {
    fn from(session: LoginSession) -> Self {
        Self {
            user: session.credential.into(),
            token: session.access_token,
            refresh_token: session.refresh_token.token,
        }
    }
}

/// A freshly minted access token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}
