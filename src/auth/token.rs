// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Short-lived signed access tokens (HS256 JWTs).
//!
//! ## Claims
//!
//! | Claim | Value |
//! |-------|-------|
//! | `iss` | always [`ISSUER`] |
//! | `sub` | subject [`Identity`] as a hyphenated UUID |
//! | `iat` | issue time, seconds since epoch |
//! | `exp` | expiry, seconds since epoch, strictly after `iat` |
//!
//! Verification only accepts the HMAC family. A token whose header names an
//! asymmetric algorithm is rejected before any key is consulted, so a public
//! key can never be replayed as an HMAC secret.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use super::{AuthError, Identity, Secret};

/// Issuer claim stamped on every access token.
pub const ISSUER: &str = "chirpy";

/// Algorithm used when signing.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Algorithms accepted when verifying.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Registered claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Issuer
    pub iss: String,
    /// Subject (identity)
    pub sub: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Issue an access token for `subject` valid for `ttl` from now.
pub fn issue_access_token(
    subject: Identity,
    secret: &Secret,
    ttl: Duration,
) -> Result<String, AuthError> {
    issue_access_token_at(subject, secret, ttl, Utc::now())
}

/// Issue an access token as of `now`.
///
/// The lifetime is rounded up to whole seconds so that `exp > iat` holds
/// even for sub-second TTLs.
pub fn issue_access_token_at(
    subject: Identity,
    secret: &Secret,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }
    if ttl <= Duration::zero() {
        return Err(AuthError::InvalidTtl);
    }
    if subject.is_nil() {
        return Err(AuthError::InvalidSubject);
    }

    let issued_at = now.timestamp();
    let mut ttl_secs = ttl.num_seconds();
    if ttl.subsec_nanos() > 0 {
        ttl_secs = ttl_secs.saturating_add(1);
    }
    let claims = AccessClaims {
        iss: ISSUER.to_string(),
        sub: subject.to_string(),
        iat: issued_at,
        exp: issued_at.saturating_add(ttl_secs.max(1)),
    };

    encode(
        &Header::new(SIGNING_ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::SigningFailure(e.to_string()))
}

/// Verify an access token and return its subject.
pub fn verify_access_token(token: &str, secret: &Secret) -> Result<Identity, AuthError> {
    verify_access_token_at(token, secret, Utc::now())
}

/// Verify an access token as of `now`.
///
/// Pure function of its arguments: no store or cache is consulted.
pub fn verify_access_token_at(
    token: &str,
    secret: &Secret,
    now: DateTime<Utc>,
) -> Result<Identity, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let mut validation = Validation::new(SIGNING_ALGORITHM);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);
    validation.validate_aud = false;
    // Expiry is checked below against the caller's clock, without leeway.
    validation.validate_exp = false;
    validation.leeway = 0;

    let token_data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm => AuthError::BadSignature,
        _ => AuthError::MalformedToken,
    })?;

    let claims = token_data.claims;
    if claims.exp <= now.timestamp() {
        return Err(AuthError::Expired);
    }

    let subject: Identity = claims
        .sub
        .parse()
        .map_err(|_| AuthError::MalformedSubject)?;
    if subject.is_nil() {
        return Err(AuthError::MalformedSubject);
    }

    Ok(subject)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    fn secret() -> Secret {
        Secret::new("jwt-test-secret")
    }

    fn forge(header: &str, claims: &str) -> String {
        let header_b64 = URL_SAFE_NO_PAD.encode(header.as_bytes());
        let claims_b64 = URL_SAFE_NO_PAD.encode(claims.as_bytes());
        format!("{header_b64}.{claims_b64}.fake_signature")
    }

    fn claims_json(sub: &str, iat: i64, exp: i64) -> String {
        format!(r#"{{"iss":"chirpy","sub":"{sub}","iat":{iat},"exp":{exp}}}"#)
    }

    #[test]
    fn issue_then_verify_returns_subject() {
        let id = Identity::generate();
        let token = issue_access_token(id, &secret(), Duration::hours(1)).unwrap();
        assert_eq!(verify_access_token(&token, &secret()).unwrap(), id);
    }

    #[test]
    fn sub_second_ttl_rounds_up() {
        let id = Identity::generate();
        let now = Utc::now();
        let token = issue_access_token_at(id, &secret(), Duration::milliseconds(10), now).unwrap();
        assert_eq!(verify_access_token_at(&token, &secret(), now).unwrap(), id);
        assert!(matches!(
            verify_access_token_at(&token, &secret(), now + Duration::seconds(1)),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn maximal_ttl_does_not_overflow() {
        let id = Identity::generate();
        let now = Utc::now();
        let token = issue_access_token_at(id, &secret(), Duration::MAX, now).unwrap();

        assert_eq!(
            verify_access_token_at(&token, &secret(), now + Duration::days(365 * 1000)).unwrap(),
            id
        );
    }

    #[test]
    fn expires_exactly_at_iat_plus_ttl() {
        let id = Identity::generate();
        let issued = Utc::now();
        let ttl = Duration::hours(1);
        let token = issue_access_token_at(id, &secret(), ttl, issued).unwrap();

        let just_before = issued + ttl - Duration::seconds(1);
        assert_eq!(verify_access_token_at(&token, &secret(), just_before).unwrap(), id);

        assert!(matches!(
            verify_access_token_at(&token, &secret(), issued + ttl),
            Err(AuthError::Expired)
        ));
        assert!(matches!(
            verify_access_token_at(&token, &secret(), issued + Duration::days(3)),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn wrong_secret_is_bad_signature() {
        let token = issue_access_token(Identity::generate(), &secret(), Duration::hours(1)).unwrap();
        assert!(matches!(
            verify_access_token(&token, &Secret::new("other-secret")),
            Err(AuthError::BadSignature)
        ));
    }

    #[test]
    fn tampered_payload_is_bad_signature() {
        let token = issue_access_token(Identity::generate(), &secret(), Duration::hours(1)).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let now = Utc::now().timestamp();
        let other = URL_SAFE_NO_PAD.encode(claims_json(&Identity::generate().to_string(), now, now + 3600));
        let tampered = format!("{}.{}.{}", parts[0], other, parts[2]);
        assert!(matches!(
            verify_access_token(&tampered, &secret()),
            Err(AuthError::BadSignature)
        ));
    }

    #[test]
    fn issue_rejects_invalid_inputs() {
        let id = Identity::generate();
        assert!(matches!(
            issue_access_token(id, &Secret::new(""), Duration::hours(1)),
            Err(AuthError::InvalidSecret)
        ));
        assert!(matches!(
            issue_access_token(id, &secret(), Duration::zero()),
            Err(AuthError::InvalidTtl)
        ));
        assert!(matches!(
            issue_access_token(id, &secret(), -Duration::hours(1)),
            Err(AuthError::InvalidTtl)
        ));
        assert!(matches!(
            issue_access_token(Identity::nil(), &secret(), Duration::hours(1)),
            Err(AuthError::InvalidSubject)
        ));
    }

    #[test]
    fn verify_rejects_empty_secret() {
        let token = issue_access_token(Identity::generate(), &secret(), Duration::hours(1)).unwrap();
        assert!(matches!(
            verify_access_token(&token, &Secret::new("")),
            Err(AuthError::InvalidSecret)
        ));
    }

    #[test]
    fn asymmetric_header_is_rejected() {
        let now = Utc::now().timestamp();
        let token = forge(
            r#"{"alg":"RS256","typ":"JWT"}"#,
            &claims_json(&Identity::generate().to_string(), now, now + 3600),
        );
        assert!(matches!(
            verify_access_token(&token, &secret()),
            Err(AuthError::BadSignature)
        ));
    }

    #[test]
    fn none_algorithm_is_rejected() {
        let now = Utc::now().timestamp();
        let header_b64 = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let claims_b64 = URL_SAFE_NO_PAD.encode(claims_json(
            &Identity::generate().to_string(),
            now,
            now + 3600,
        ));
        let token = format!("{header_b64}.{claims_b64}.");
        assert!(verify_access_token(&token, &secret()).is_err());
    }

    #[test]
    fn malformed_subject_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = claims_json("user_123", now, now + 3600);
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::from_str::<serde_json::Value>(&claims).unwrap(),
            &EncodingKey::from_secret(secret().as_bytes()),
        )
        .unwrap();
        assert!(matches!(
            verify_access_token(&token, &secret()),
            Err(AuthError::MalformedSubject)
        ));
    }

    #[test]
    fn nil_subject_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = claims_json(&Identity::nil().to_string(), now, now + 3600);
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::from_str::<serde_json::Value>(&claims).unwrap(),
            &EncodingKey::from_secret(secret().as_bytes()),
        )
        .unwrap();
        assert!(matches!(
            verify_access_token(&token, &secret()),
            Err(AuthError::MalformedSubject)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            verify_access_token("not.a.jwt", &secret()),
            Err(AuthError::MalformedToken)
        ));
        assert!(matches!(
            verify_access_token("", &secret()),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = serde_json::json!({
            "iss": "someone-else",
            "sub": Identity::generate().to_string(),
            "iat": now,
            "exp": now + 3600,
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret().as_bytes()),
        )
        .unwrap();
        assert!(matches!(
            verify_access_token(&token, &secret()),
            Err(AuthError::MalformedToken)
        ));
    }
}
