// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User credential endpoints.

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    auth::{Auth, AuthError},
    models::{CredentialsRequest, UserResponse},
    state::AppState,
};

/// Register a new user.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CredentialsRequest,
    tag = "Users",
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing email or password"),
        (status = 409, description = "Email already taken"),
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AuthError> {
    let credential = state.sessions.register(&request.email, &request.password)?;
    Ok((StatusCode::CREATED, Json(credential.into())))
}

/// Replace the caller's email and password.
#[utoipa::path(
    put,
    path = "/api/users",
    request_body = CredentialsRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 409, description = "Email already taken"),
    )
)]
pub async fn update_user(
    Auth(user_id): Auth,
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<UserResponse>, AuthError> {
    let credential = state
        .sessions
        .update_credentials(user_id, &request.email, &request.password)?;
    Ok(Json(credential.into()))
}
