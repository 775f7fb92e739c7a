// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ride provider OAuth authorization routes.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/url", post(auth_url))
        .route("/auth/callback", get(auth_redirect).post(auth_callback))
}

#[derive(Deserialize)]
pub struct AuthUrlRequest {
    phone: String,
}

#[derive(Serialize)]
pub struct AuthUrlResponse {
    pub url: String,
}

/// Issue the provider authorization URL for a phone number.
async fn auth_url(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<AuthUrlRequest>, JsonRejection>,
) -> Result<Json<AuthUrlResponse>> {
    let Json(req) = body?;
    let url = state.ride_service.authorize_url(req.phone.trim())?;
    tracing::info!(phone = %req.phone.trim(), "Issued authorization URL");
    Ok(Json(AuthUrlResponse { url }))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
pub struct CallbackResponse {
    pub status: String,
}

/// Provider redirect target (query string).
async fn auth_redirect(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<CallbackParams>, QueryRejection>,
) -> Result<Json<CallbackResponse>> {
    let Query(params) = query?;
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from ride provider");
        return Err(AppError::BadRequest(format!("authorization denied: {}", error)));
    }
    complete(&state, &params.code, &params.state).await
}

/// Callback relayed by a frontend (JSON body).
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<CallbackParams>, JsonRejection>,
) -> Result<Json<CallbackResponse>> {
    let Json(params) = body?;
    complete(&state, &params.code, &params.state).await
}

async fn complete(
    state: &AppState,
    code: &str,
    oauth_state: &str,
) -> Result<Json<CallbackResponse>> {
    state
        .ride_service
        .handle_authorize_redirect(code, oauth_state)
        .await?;

    Ok(Json(CallbackResponse {
        status: "success".to_string(),
    }))
}
