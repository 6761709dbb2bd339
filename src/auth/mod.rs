// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Access tokens, refresh tokens and password credentials for the Chirpy API.
//!
//! ## Auth Flow
//!
//! 1. Client logs in with email + password (`POST /api/login`)
//! 2. Server verifies the Argon2 hash and returns:
//!    - an HS256 access token valid for 1 hour
//!    - an opaque refresh token valid for 60 days (persisted)
//! 3. Client sends `Authorization: Bearer <access token>` to protected routes;
//!    the server verifies signature, issuer and expiry and extracts `sub`
//! 4. Client exchanges the refresh token (`POST /api/refresh`) for a new
//!    access token, or revokes it (`POST /api/revoke`)
//!
//! ## Security
//!
//! - The signing secret is passed explicitly, never read from globals
//! - Verification only accepts HMAC algorithms (no `none`, no RSA/EC)
//! - Login failures never reveal whether the email exists
//! - Revocation is permanent and wins over any remaining lifetime

pub mod bearer;
pub mod clock;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod password;
pub mod refresh;
pub mod session;
pub mod token;

pub use bearer::{bearer_token, extract_bearer};
pub use clock::{Clock, SystemClock};
pub use error::AuthError;
pub use extractor::{Auth, BearerToken};
pub use identity::{Identity, Secret};
pub use password::{hash_password, verify_password};
pub use refresh::RefreshTokenStore;
pub use session::{LoginSession, SessionService};
pub use token::{issue_access_token, verify_access_token};
