// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod credential;
pub mod ride;

pub use credential::UserCredential;
pub use ride::{
    CostEstimate, EstimateResult, Location, RideRecord, RideResult, RideStatusEvent, RideType,
};
