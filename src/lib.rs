// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chirpy Auth - Authentication & Session Lifecycle Service
//!
//! This crate issues and verifies signed access tokens, manages opaque
//! refresh tokens and stores hashed password credentials.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec, password hashing and session lifecycle
//! - `config` - Environment configuration
//! - `storage` - Credential and refresh token persistence (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod state;
pub mod storage;
