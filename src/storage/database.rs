// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded auth database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `credentials`: identity → serialized Credential
//! - `credential_emails`: email → identity
//! - `refresh_tokens`: token string → serialized RefreshToken
//!
//! Every trait call runs in exactly one redb transaction, so concurrent
//! revocations of the same token serialize on the write lock.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::{AuthStore, Credential, RefreshToken, StoreError, StoreResult};
use crate::auth::Identity;

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: identity (hyphenated UUID) → Credential (JSON bytes).
const CREDENTIALS: TableDefinition<&str, &[u8]> = TableDefinition::new("credentials");

/// Unique index: email → identity.
const CREDENTIAL_EMAILS: TableDefinition<&str, &str> = TableDefinition::new("credential_emails");

/// Primary table: token string → RefreshToken (JSON bytes).
const REFRESH_TOKENS: TableDefinition<&str, &[u8]> = TableDefinition::new("refresh_tokens");

// =============================================================================
// RedbStore
// =============================================================================

/// Embedded ACID auth store.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CREDENTIALS)?;
            let _ = write_txn.open_table(CREDENTIAL_EMAILS)?;
            let _ = write_txn.open_table(REFRESH_TOKENS)?;
        }
        write_txn.commit()?;

        tracing::debug!(path = %path.display(), "Opened auth database");
        Ok(Self { db })
    }
}

impl AuthStore for RedbStore {
    fn create_credential(&self, credential: &Credential) -> StoreResult<()> {
        let id = credential.id.to_string();
        let json = serde_json::to_vec(credential)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut emails = write_txn.open_table(CREDENTIAL_EMAILS)?;
            if emails.get(credential.email.as_str())?.is_some() {
                return Err(StoreError::Conflict(format!("email {}", credential.email)));
            }

            let mut credentials = write_txn.open_table(CREDENTIALS)?;
            if credentials.get(id.as_str())?.is_some() {
                return Err(StoreError::Conflict(format!("credential {id}")));
            }

            credentials.insert(id.as_str(), json.as_slice())?;
            emails.insert(credential.email.as_str(), id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get_credential_by_email(&self, email: &str) -> StoreResult<Option<Credential>> {
        let read_txn = self.db.begin_read()?;
        let emails = read_txn.open_table(CREDENTIAL_EMAILS)?;
        let Some(id) = emails.get(email)?.map(|v| v.value().to_string()) else {
            return Ok(None);
        };

        let credentials = read_txn.open_table(CREDENTIALS)?;
        match credentials.get(id.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn update_credential(
        &self,
        id: Identity,
        email: &str,
        hashed_password: &str,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<Credential>> {
        let key = id.to_string();

        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut credentials = write_txn.open_table(CREDENTIALS)?;
            let mut emails = write_txn.open_table(CREDENTIAL_EMAILS)?;

            // Read existing value and deserialize before mutating
            let Some(existing_bytes) = credentials.get(key.as_str())?.map(|v| v.value().to_vec())
            else {
                return Ok(None);
            };
            let mut credential: Credential = serde_json::from_slice(&existing_bytes)?;

            let taken_by_other = emails
                .get(email)?
                .is_some_and(|owner| owner.value() != key);
            if taken_by_other {
                return Err(StoreError::Conflict(format!("email {email}")));
            }

            emails.remove(credential.email.as_str())?;
            emails.insert(email, key.as_str())?;

            credential.email = email.to_string();
            credential.hashed_password = hashed_password.to_string();
            credential.updated_at = updated_at;

            let json = serde_json::to_vec(&credential)?;
            credentials.insert(key.as_str(), json.as_slice())?;
            credential
        };
        write_txn.commit()?;
        Ok(Some(updated))
    }

    fn create_refresh_token(&self, token: &RefreshToken) -> StoreResult<()> {
        let json = serde_json::to_vec(token)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(REFRESH_TOKENS)?;
            if table.get(token.token.as_str())?.is_some() {
                return Err(StoreError::Conflict("refresh token".to_string()));
            }
            table.insert(token.token.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get_refresh_token(&self, token: &str) -> StoreResult<Option<RefreshToken>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(REFRESH_TOKENS)?;
        match table.get(token)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn revoke_refresh_token(
        &self,
        token: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<RefreshToken>> {
        let write_txn = self.db.begin_write()?;
        let record = {
            let mut table = write_txn.open_table(REFRESH_TOKENS)?;

            let Some(existing_bytes) = table.get(token)?.map(|v| v.value().to_vec()) else {
                return Ok(None);
            };
            let mut record: RefreshToken = serde_json::from_slice(&existing_bytes)?;

            if record.revoked_at.is_none() {
                record.revoked_at = Some(at);
                let json = serde_json::to_vec(&record)?;
                table.insert(token, json.as_slice())?;
            }
            record
        };
        write_txn.commit()?;
        Ok(Some(record))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn temp_db() -> (RedbStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = RedbStore::open(&dir.path().join("auth.redb")).unwrap();
        (db, dir)
    }

    fn credential(email: &str) -> Credential {
        let now = Utc::now();
        Credential {
            id: Identity::generate(),
            email: email.to_string(),
            hashed_password: "$argon2id$fake".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn refresh_token(token: &str, owner: Identity) -> RefreshToken {
        let now = Utc::now();
        RefreshToken {
            token: token.to_string(),
            owner,
            created_at: now,
            expires_at: now + Duration::days(60),
            revoked_at: None,
        }
    }

    #[test]
    fn create_and_get_credential() {
        let (db, _dir) = temp_db();
        let cred = credential("walt@breakingbad.com");
        db.create_credential(&cred).unwrap();

        let loaded = db.get_credential_by_email("walt@breakingbad.com").unwrap();
        assert_eq!(loaded, Some(cred));
        assert!(db.get_credential_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_rejected() {
        let (db, _dir) = temp_db();
        db.create_credential(&credential("dup@example.com")).unwrap();

        let result = db.create_credential(&credential("dup@example.com"));
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[test]
    fn update_credential_moves_email_index() {
        let (db, _dir) = temp_db();
        let cred = credential("old@example.com");
        db.create_credential(&cred).unwrap();

        let updated = db
            .update_credential(cred.id, "new@example.com", "$argon2id$new", Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, cred.id);
        assert_eq!(updated.email, "new@example.com");

        assert!(db.get_credential_by_email("old@example.com").unwrap().is_none());
        let loaded = db.get_credential_by_email("new@example.com").unwrap().unwrap();
        assert_eq!(loaded.hashed_password, "$argon2id$new");
    }

    #[test]
    fn update_credential_conflict_leaves_state_untouched() {
        let (db, _dir) = temp_db();
        let a = credential("a@example.com");
        let b = credential("b@example.com");
        db.create_credential(&a).unwrap();
        db.create_credential(&b).unwrap();

        let result = db.update_credential(a.id, "b@example.com", "h", Utc::now());
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        assert_eq!(db.get_credential_by_email("a@example.com").unwrap(), Some(a));
        assert_eq!(db.get_credential_by_email("b@example.com").unwrap(), Some(b));
    }

    #[test]
    fn refresh_token_round_trip() {
        let (db, _dir) = temp_db();
        let token = refresh_token(&"0f".repeat(32), Identity::generate());
        db.create_refresh_token(&token).unwrap();

        assert_eq!(db.get_refresh_token(&token.token).unwrap(), Some(token.clone()));
        assert!(db.get_refresh_token("unknown").unwrap().is_none());

        let again = db.create_refresh_token(&token);
        assert!(matches!(again, Err(StoreError::Conflict(_))));
    }

    #[test]
    fn revoke_sets_timestamp_once() {
        let (db, _dir) = temp_db();
        let token = refresh_token("tok", Identity::generate());
        db.create_refresh_token(&token).unwrap();

        let first_at = Utc::now();
        let first = db.revoke_refresh_token("tok", first_at).unwrap().unwrap();
        assert_eq!(first.revoked_at, Some(first_at));

        let second = db
            .revoke_refresh_token("tok", first_at + Duration::minutes(5))
            .unwrap()
            .unwrap();
        assert_eq!(second.revoked_at, Some(first_at));

        let stored = db.get_refresh_token("tok").unwrap().unwrap();
        assert_eq!(stored.revoked_at, Some(first_at));
    }

    #[test]
    fn revoke_unknown_returns_none() {
        let (db, _dir) = temp_db();
        assert!(db.revoke_refresh_token("missing", Utc::now()).unwrap().is_none());
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.redb");
        let cred = credential("persist@example.com");
        {
            let db = RedbStore::open(&path).unwrap();
            db.create_credential(&cred).unwrap();
        }

        let db = RedbStore::open(&path).unwrap();
        assert_eq!(db.get_credential_by_email("persist@example.com").unwrap(), Some(cred));
    }

    #[test]
    fn concurrent_revokes_keep_first_timestamp() {
        let (db, _dir) = temp_db();
        db.create_refresh_token(&refresh_token("tok", Identity::generate()))
            .unwrap();
        let base = Utc::now();

        let results: Vec<RefreshToken> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let db = &db;
                    s.spawn(move || {
                        db.revoke_refresh_token("tok", base + Duration::seconds(i))
                            .unwrap()
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let stored = db.get_refresh_token("tok").unwrap().unwrap().revoked_at;
        assert!(stored.is_some());
        assert!(results.iter().all(|record| record.revoked_at == stored));
    }
}
