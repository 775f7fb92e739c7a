// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! High-level ride service with credential lifecycle management.
//!
//! This service encapsulates:
//! - Authorization URL issuance with encrypted state
//! - Authorization code exchange and credential upsert
//! - Expiry detection and transparent refresh before every ride call
//! - Ride creation, cost estimates and ride status events
//!
//! Credentials are never cached in memory; every call reads and writes
//! through the [`Store`].
//!
//! Two concurrent calls for the same phone that both see an expired token
//! will both refresh, and the later write wins. Nothing serializes them.

use crate::config::Config;
use crate::db::Store;
use crate::error::AppError;
use crate::models::{
    EstimateResult, Location, RideRecord, RideResult, RideStatusEvent, RideType, UserCredential,
};
use crate::services::provider::ProviderClient;
use crate::services::state::{StateCodec, StatePayload};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct RideService {
    client: ProviderClient,
    codec: StateCodec,
    store: Arc<dyn Store>,
    clock: Clock,
}

impl RideService {
    /// Create a ride service from configuration and a store.
    pub fn new(config: &Config, store: Arc<dyn Store>) -> Result<Self, AppError> {
        Ok(Self {
            client: ProviderClient::new(
                config.api_base_url.clone(),
                config.client_id.clone(),
                config.client_secret.clone(),
            ),
            codec: StateCodec::new(&config.state_secret, config.state_cipher)?,
            store,
            clock: Arc::new(Utc::now),
        })
    }

    /// Replace the clock used for expiry checks and `updated_at` stamps.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    // ─── Authorization ───────────────────────────────────────────────────────

    /// Provider authorization URL whose `state` carries `phone`.
    pub fn authorize_url(&self, phone: &str) -> Result<String, AppError> {
        require_non_empty("phone", phone)?;
        let state = self.codec.encode(&StatePayload {
            phone: phone.to_string(),
        })?;
        Ok(self.client.authorize_url(&state))
    }

    /// Handle the provider redirect: recover the phone from `state`, then
    /// exchange `code` for that phone.
    pub async fn handle_authorize_redirect(
        &self,
        code: &str,
        state: &str,
    ) -> Result<UserCredential, AppError> {
        require_non_empty("code", code)?;
        require_non_empty("state", state)?;

        let payload = self.codec.decode(state)?;
        self.complete_authorization(code, &payload.phone).await
    }

    /// Exchange an authorization code and upsert the phone's credential.
    ///
    /// Last write wins when called repeatedly for the same phone.
    pub async fn complete_authorization(
        &self,
        code: &str,
        phone: &str,
    ) -> Result<UserCredential, AppError> {
        require_non_empty("code", code)?;
        require_non_empty("phone", phone)?;

        tracing::info!(phone, "Exchanging authorization code for tokens");
        let tokens = self.client.exchange_code(code).await?;

        let credential = UserCredential {
            phone: phone.to_string(),
            access_token: tokens
                .access_token
                .filter(|t| !t.is_empty())
                .ok_or_else(|| AppError::AuthExchange("no access token returned".to_string()))?,
            refresh_token: tokens
                .refresh_token
                .filter(|t| !t.is_empty())
                .ok_or_else(|| AppError::AuthExchange("no refresh token returned".to_string()))?,
            expires_in: tokens
                .expires_in
                .ok_or_else(|| AppError::AuthExchange("no expiry returned".to_string()))?,
            updated_at: (self.clock)(),
        };

        // If this fails the exchanged tokens are gone and the user has to
        // authorize again.
        self.store.upsert_credential(&credential).await?;

        tracing::info!(phone, "Authorization complete, credential stored");
        Ok(credential)
    }

    // ─── Token Management ────────────────────────────────────────────────────

    /// Get a non-expired access token for `phone`, refreshing first if the
    /// stored one has reached its expiry.
    pub async fn get_valid_access_token(&self, phone: &str) -> Result<String, AppError> {
        let credential = self
            .store
            .find_credential(phone)
            .await?
            .ok_or_else(|| AppError::UnknownUser(phone.to_string()))?;

        let now = (self.clock)();
        if !credential.is_expired_at(now) {
            return Ok(credential.access_token);
        }

        tracing::info!(phone, "Access token expired, refreshing");
        self.refresh(credential, now).await
    }

    async fn refresh(
        &self,
        credential: UserCredential,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let tokens = self.client.refresh_token(&credential.refresh_token).await?;

        let access_token = tokens
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::AuthExchange("no access token returned".to_string()))?;

        // The provider may keep the refresh token and validity window unchanged.
        let updated = UserCredential {
            access_token: access_token.clone(),
            refresh_token: tokens
                .refresh_token
                .filter(|t| !t.is_empty())
                .unwrap_or(credential.refresh_token),
            expires_in: tokens.expires_in.unwrap_or(credential.expires_in),
            updated_at: now,
            phone: credential.phone,
        };

        self.store.upsert_credential(&updated).await?;

        tracing::info!(phone = %updated.phone, "Token refreshed");
        Ok(access_token)
    }

    // ─── Ride API Wrappers ───────────────────────────────────────────────────

    /// Request a ride and record it.
    pub async fn request_ride(
        &self,
        phone: &str,
        ride_type: RideType,
        origin: Location,
        destination: Location,
    ) -> Result<RideResult, AppError> {
        let access_token = self.get_valid_access_token(phone).await?;
        let ride = self
            .client
            .request_ride(&access_token, ride_type, origin, destination)
            .await?;

        match &ride.ride_id {
            Some(ride_id) => {
                let record = RideRecord {
                    phone: phone.to_string(),
                    ride_id: ride_id.clone(),
                    status: ride.status.clone().unwrap_or_default(),
                    can_cancel: Vec::new(),
                };
                if let Err(e) = self.store.insert_ride(&record).await {
                    tracing::warn!(error = %e, ride_id = %ride_id, "Failed to store ride, continuing anyway");
                } else {
                    tracing::info!(phone, ride_id = %ride_id, ride_type = %ride_type, "Ride requested");
                }
            }
            None => tracing::warn!(phone, "Ride response carried no ride_id, not recorded"),
        }

        Ok(ride)
    }

    /// Estimate the cost of a ride.
    pub async fn estimate_ride(
        &self,
        phone: &str,
        ride_type: RideType,
        origin: Location,
        destination: Location,
    ) -> Result<EstimateResult, AppError> {
        let access_token = self.get_valid_access_token(phone).await?;
        self.client
            .estimate_ride(&access_token, ride_type, origin, destination)
            .await
    }

    /// Apply a ride status notification to the stored ride.
    ///
    /// Returns `false` if the ride is unknown.
    pub async fn apply_ride_event(&self, event: &RideStatusEvent) -> Result<bool, AppError> {
        let updated = self
            .store
            .upsert_ride_status(&event.ride_id, &event.status, &event.can_cancel)
            .await?;

        if updated {
            tracing::info!(ride_id = %event.ride_id, status = %event.status, "Ride status updated");
        } else {
            tracing::warn!(ride_id = %event.ride_id, "Status event for unknown ride ignored");
        }
        Ok(updated)
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}
