// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Persistence Collaborator
//!
//! The auth core never talks to a database directly. It issues single,
//! atomic read or write intents through [`AuthStore`]; each adapter is
//! responsible for making every call atomic on its own.
//!
//! ## Adapters
//!
//! - [`RedbStore`] - embedded ACID database (pure Rust), used by the server
//! - [`MemoryStore`] - `RwLock<HashMap>` store for tests and throwaway runs
//!
//! ## Records
//!
//! ```text
//! credentials         id    -> Credential (JSON)
//! credential_emails   email -> id
//! refresh_tokens      token -> RefreshToken (JSON)
//! ```
//!
//! Refresh tokens are never deleted by this service. Revocation stamps
//! `revoked_at` once; bulk cleanup is an administrative job elsewhere.

pub mod database;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Identity;

pub use database::RedbStore;
pub use memory::MemoryStore;

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Unique key already taken (email, refresh token)
    #[error("already exists: {0}")]
    Conflict(String),

    /// Store cannot serve requests (poisoned lock, closed handle)
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Stored password credential of a principal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    /// Principal identity
    pub id: Identity,
    /// Login email (unique)
    pub email: String,
    /// Argon2 PHC string, salt embedded
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persisted refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshToken {
    /// 64 lowercase hex characters; primary key
    pub token: String,
    /// Identity the token was issued to
    pub owner: Identity,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Set once, never cleared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// Whether the token has passed its expiry as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

/// Persistence operations required by the auth core.
///
/// Every method is a single atomic call. Implementations must make
/// [`AuthStore::revoke_refresh_token`] and [`AuthStore::update_credential`]
/// atomic read-modify-writes.
pub trait AuthStore: Send + Sync {
    /// Insert a new credential. Fails with [`StoreError::Conflict`] if the
    /// email is already registered.
    fn create_credential(&self, credential: &Credential) -> StoreResult<()>;

    /// Look up a credential by its exact email.
    fn get_credential_by_email(&self, email: &str) -> StoreResult<Option<Credential>>;

    /// Replace email and password hash of an existing credential.
    ///
    /// Returns `None` if no credential has this id, and
    /// [`StoreError::Conflict`] if the email belongs to another credential.
    fn update_credential(
        &self,
        id: Identity,
        email: &str,
        hashed_password: &str,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<Credential>>;

    /// Persist a freshly issued refresh token.
    fn create_refresh_token(&self, token: &RefreshToken) -> StoreResult<()>;

    /// Look up a refresh token by its string.
    fn get_refresh_token(&self, token: &str) -> StoreResult<Option<RefreshToken>>;

    /// Stamp `revoked_at = at` if the token is not revoked yet.
    ///
    /// Returns the record as stored after the call, or `None` if unknown.
    fn revoke_refresh_token(
        &self,
        token: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<RefreshToken>>;
}
