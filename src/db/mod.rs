// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! The [`Store`] trait is the single source of truth for credentials and
//! rides. Services never keep their own copies between calls.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{RideRecord, UserCredential};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// Credentials keyed by phone number
    pub const USERS: &str = "ride_users";
    /// Ride records keyed by provider ride ID
    pub const RIDES: &str = "rides";
}

/// Persistence contract for credentials and ride records.
#[async_trait]
pub trait Store: Send + Sync {
    /// Look up the credential stored for a phone number.
    async fn find_credential(&self, phone: &str) -> Result<Option<UserCredential>, AppError>;

    /// Create or overwrite the credential for `credential.phone`.
    async fn upsert_credential(&self, credential: &UserCredential) -> Result<(), AppError>;

    /// Look up a ride by provider ride ID.
    async fn find_ride(&self, ride_id: &str) -> Result<Option<RideRecord>, AppError>;

    /// Store a newly requested ride.
    async fn insert_ride(&self, ride: &RideRecord) -> Result<(), AppError>;

    /// Update status fields of an existing ride.
    ///
    /// Returns `false` when no ride with `ride_id` exists.
    async fn upsert_ride_status(
        &self,
        ride_id: &str,
        status: &str,
        can_cancel: &[String],
    ) -> Result<bool, AppError>;
}
