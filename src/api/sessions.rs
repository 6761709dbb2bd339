// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login, refresh and revoke endpoints.

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    auth::{AuthError, BearerToken},
    models::{CredentialsRequest, LoginResponse, TokenResponse},
    state::AppState,
};

/// Log in with email and password.
///
/// Returns the user together with a 1-hour access token and a 60-day
/// refresh token.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = CredentialsRequest,
    tag = "Sessions",
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Incorrect email or password"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let session = state.sessions.login(&request.email, &request.password)?;
    Ok(Json(session.into()))
}

/// Exchange a refresh token (sent as bearer) for a new access token.
#[utoipa::path(
    post,
    path = "/api/refresh",
    tag = "Sessions",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "New access token", body = TokenResponse),
        (status = 401, description = "Unknown, revoked or expired refresh token"),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<TokenResponse>, AuthError> {
    let token = state.sessions.refresh(&token)?;
    Ok(Json(TokenResponse { token }))
}

/// Revoke a refresh token (sent as bearer).
#[utoipa::path(
    post,
    path = "/api/revoke",
    tag = "Sessions",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Refresh token revoked"),
        (status = 401, description = "Unknown refresh token"),
    )
)]
pub async fn revoke(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, AuthError> {
    state.sessions.revoke(&token)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{verify_access_token, Secret};

    const SECRET: &str = "sessions-secret";

    fn state_with_user() -> AppState {
        let state = AppState::in_memory(Secret::new(SECRET));
        state.sessions.register("walt@breakingbad.com", "123456").unwrap();
        state
    }

    fn credentials(password: &str) -> Json<CredentialsRequest> {
        Json(CredentialsRequest {
            email: "walt@breakingbad.com".to_string(),
            password: password.to_string(),
        })
    }

    #[tokio::test]
    async fn login_then_refresh() {
        let state = state_with_user();

        let Json(login) = login(State(state.clone()), credentials("123456")).await.unwrap();
        assert_eq!(login.refresh_token.len(), 64);
        assert_eq!(
            verify_access_token(&login.token, &Secret::new(SECRET)).unwrap(),
            login.user.id
        );

        let Json(refreshed) = refresh(State(state), BearerToken(login.refresh_token))
            .await
            .unwrap();
        assert_eq!(
            verify_access_token(&refreshed.token, &Secret::new(SECRET)).unwrap(),
            login.user.id
        );
    }

    #[tokio::test]
    async fn login_wrong_password() {
        let state = state_with_user();
        let result = login(State(state), credentials("654321")).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn revoke_then_refresh_fails() {
        let state = state_with_user();
        let Json(login) = login(State(state.clone()), credentials("123456")).await.unwrap();

        let status = revoke(State(state.clone()), BearerToken(login.refresh_token.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let result = refresh(State(state), BearerToken(login.refresh_token)).await;
        assert!(matches!(result, Err(AuthError::TokenRevoked)));
    }

    #[tokio::test]
    async fn revoke_unknown_token() {
        let state = state_with_user();
        let result = revoke(State(state), BearerToken("0".repeat(64))).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }
}
