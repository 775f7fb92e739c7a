// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Ride-Relay: phone-identified ride booking through a ride provider's API
//!
//! This crate provides the backend that links phone numbers to ride
//! provider OAuth credentials, keeps those credentials fresh, and relays
//! ride requests and cost estimates on the user's behalf.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::RideService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub ride_service: RideService,
}
