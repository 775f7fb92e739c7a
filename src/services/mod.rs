// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod provider;
pub mod rides;
pub mod state;

pub use provider::{ProviderClient, TokenResponse};
pub use rides::{Clock, RideService};
pub use state::{StateCipher, StateCodec, StatePayload};
