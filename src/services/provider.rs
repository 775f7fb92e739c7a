// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ride provider API client.
//!
//! Handles:
//! - Authorization URL construction
//! - Authorization code exchange and token refresh (HTTP Basic client auth)
//! - Ride creation and cost estimates (Bearer auth)
//!
//! No retries or timeouts: a failed call fails the whole operation.

use crate::error::AppError;
use crate::models::{EstimateResult, Location, RideResult, RideType};
use serde::{Deserialize, Serialize};

/// Scopes requested at authorization, already percent-encoded.
const AUTHORIZE_SCOPE: &str = "public%20profile%20rides.read%20rides.request%20offline";
const TOKEN_PATH: &str = "oauth/token";
const RIDES_PATH: &str = "v1/rides";
const COST_PATH: &str = "v1/cost";

/// Ride provider API client.
#[derive(Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl ProviderClient {
    /// Create a new provider client with OAuth client credentials.
    pub fn new(base_url: String, client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
        }
    }

    /// Build the authorization URL carrying an already-encoded `state`.
    ///
    /// Parameter order and scope string are fixed by the provider.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}/oauth/authorize?\
             client_id={}&\
             scope={}&\
             response_type=code&\
             state={}",
            self.base_url,
            urlencoding::encode(&self.client_id),
            AUTHORIZE_SCOPE,
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AppError> {
        self.token_request(&TokenRequest {
            grant_type: "authorization_code",
            code: Some(code),
            refresh_token: None,
        })
        .await
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        self.token_request(&TokenRequest {
            grant_type: "refresh_token",
            code: None,
            refresh_token: Some(refresh_token),
        })
        .await
    }

    /// Request a new ride.
    pub async fn request_ride(
        &self,
        access_token: &str,
        ride_type: RideType,
        origin: Location,
        destination: Location,
    ) -> Result<RideResult, AppError> {
        let url = format!("{}/{}", self.base_url, RIDES_PATH);

        let body = RideRequestBody {
            ride_type,
            origin,
            destination,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::UpstreamRequest(format!("Ride request failed: {}", e)))?;

        check_response_json(response).await
    }

    /// Estimate the cost of a ride.
    pub async fn estimate_ride(
        &self,
        access_token: &str,
        ride_type: RideType,
        origin: Location,
        destination: Location,
    ) -> Result<EstimateResult, AppError> {
        let url = format!("{}/{}", self.base_url, COST_PATH);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("ride_type", ride_type.as_str().to_string()),
                ("start_lat", origin.lat.to_string()),
                ("start_lng", origin.lng.to_string()),
                ("end_lat", destination.lat.to_string()),
                ("end_lng", destination.lng.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::UpstreamRequest(format!("Cost estimate failed: {}", e)))?;

        check_response_json(response).await
    }

    async fn token_request(&self, body: &TokenRequest<'_>) -> Result<TokenResponse, AppError> {
        let url = format!("{}/{}", self.base_url, TOKEN_PATH);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::AuthExchange(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Token endpoint rejected request");
            return Err(AppError::AuthExchange(format!(
                "Token endpoint returned {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::AuthExchange(format!("Failed to parse token response: {}", e)))
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 429 {
            tracing::warn!("Ride provider rate limit hit (429)");
        }
        return Err(AppError::UpstreamRequest(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::UpstreamRequest(format!("JSON parse error: {}", e)))
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

#[derive(Serialize)]
struct RideRequestBody {
    ride_type: RideType,
    origin: Location,
    destination: Location,
}

/// Token endpoint response.
///
/// Every field is optional on the wire; completeness is checked by the
/// caller, which knows what each grant must return.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}
