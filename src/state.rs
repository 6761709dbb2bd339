// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{Secret, SessionService};
use crate::storage::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionService>,
}

impl AppState {
    pub fn new(sessions: SessionService) -> Self {
        Self {
            sessions: Arc::new(sessions),
        }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(secret: Secret) -> Self {
        Self::new(SessionService::new(Arc::new(MemoryStore::new()), secret))
    }
}
