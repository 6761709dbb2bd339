// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory store.
//!
//! Nothing survives a restart. Each call holds the lock for its whole
//! read-modify-write, which gives the same atomicity as the redb adapter.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use super::{AuthStore, Credential, RefreshToken, StoreError, StoreResult};
use crate::auth::Identity;

#[derive(Default)]
struct Tables {
    credentials: HashMap<Identity, Credential>,
    emails: HashMap<String, Identity>,
    refresh_tokens: HashMap<String, RefreshToken>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl AuthStore for MemoryStore {
    fn create_credential(&self, credential: &Credential) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.emails.contains_key(&credential.email) {
            return Err(StoreError::Conflict(format!("email {}", credential.email)));
        }
        if tables.credentials.contains_key(&credential.id) {
            return Err(StoreError::Conflict(format!("credential {}", credential.id)));
        }

        tables.emails.insert(credential.email.clone(), credential.id);
        tables.credentials.insert(credential.id, credential.clone());
        Ok(())
    }

    fn get_credential_by_email(&self, email: &str) -> StoreResult<Option<Credential>> {
        let tables = self.read()?;
        Ok(tables
            .emails
            .get(email)
            .and_then(|id| tables.credentials.get(id))
            .cloned())
    }

    fn update_credential(
        &self,
        id: Identity,
        email: &str,
        hashed_password: &str,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<Credential>> {
        let mut tables = self.write()?;
        let Some(old_email) = tables.credentials.get(&id).map(|c| c.email.clone()) else {
            return Ok(None);
        };
        if matches!(tables.emails.get(email), Some(owner) if *owner != id) {
            return Err(StoreError::Conflict(format!("email {email}")));
        }

        tables.emails.remove(&old_email);
        tables.emails.insert(email.to_string(), id);

        let Some(credential) = tables.credentials.get_mut(&id) else {
            return Ok(None);
        };
        credential.email = email.to_string();
        credential.hashed_password = hashed_password.to_string();
        credential.updated_at = updated_at;
        Ok(Some(credential.clone()))
    }

    fn create_refresh_token(&self, token: &RefreshToken) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.refresh_tokens.contains_key(&token.token) {
            return Err(StoreError::Conflict("refresh token".to_string()));
        }
        tables
            .refresh_tokens
            .insert(token.token.clone(), token.clone());
        Ok(())
    }

    fn get_refresh_token(&self, token: &str) -> StoreResult<Option<RefreshToken>> {
        Ok(self.read()?.refresh_tokens.get(token).cloned())
    }

    fn revoke_refresh_token(
        &self,
        token: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<RefreshToken>> {
        let mut tables = self.write()?;
        Ok(tables.refresh_tokens.get_mut(token).map(|record| {
            record.revoked_at.get_or_insert(at);
            record.clone()
        }))
    }
}
