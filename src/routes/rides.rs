// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ride routes: request, estimate, and provider status events.

use crate::error::{AppError, Result};
use crate::models::{EstimateResult, Location, RideResult, RideStatusEvent, RideType};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rides", post(request_ride))
        .route("/estimate", post(estimate_ride))
        .route("/rides/events", post(ride_event))
}

/// Body shared by ride requests and estimates.
#[derive(Deserialize)]
pub struct RideParams {
    phone: String,
    #[serde(default)]
    ride_type: RideType,
    origin: Location,
    destination: Location,
}

impl RideParams {
    fn phone(&self) -> Result<&str> {
        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(AppError::BadRequest("phone is required".to_string()));
        }
        Ok(phone)
    }
}

async fn request_ride(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<RideParams>, JsonRejection>,
) -> Result<Json<RideResult>> {
    let Json(params) = body?;
    let ride = state
        .ride_service
        .request_ride(
            params.phone()?,
            params.ride_type,
            params.origin,
            params.destination,
        )
        .await?;
    Ok(Json(ride))
}

async fn estimate_ride(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<RideParams>, JsonRejection>,
) -> Result<Json<EstimateResult>> {
    let Json(params) = body?;
    let estimate = state
        .ride_service
        .estimate_ride(
            params.phone()?,
            params.ride_type,
            params.origin,
            params.destination,
        )
        .await?;
    Ok(Json(estimate))
}

/// Status event envelope as posted by the provider.
#[derive(Deserialize)]
pub struct EventEnvelope {
    event: RideStatusEvent,
}

#[derive(Serialize)]
pub struct EventResponse {
    pub status: String,
}

async fn ride_event(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<EventEnvelope>, JsonRejection>,
) -> Result<Json<EventResponse>> {
    let Json(envelope) = body?;
    let updated = state.ride_service.apply_ride_event(&envelope.event).await?;
    let status = if updated { "updated" } else { "ignored" };
    Ok(Json(EventResponse {
        status: status.to_string(),
    }))
}
