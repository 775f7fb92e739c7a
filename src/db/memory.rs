// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store backed by concurrent maps.
//!
//! Used for local development (`STORE_BACKEND=memory`) and tests. Clones
//! share the same underlying maps.

use crate::db::Store;
use crate::error::AppError;
use crate::models::{RideRecord, UserCredential};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<DashMap<String, UserCredential>>,
    rides: Arc<DashMap<String, RideRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_credential(&self, phone: &str) -> Result<Option<UserCredential>, AppError> {
        Ok(self.users.get(phone).map(|c| c.clone()))
    }

    async fn upsert_credential(&self, credential: &UserCredential) -> Result<(), AppError> {
        self.users
            .insert(credential.phone.clone(), credential.clone());
        Ok(())
    }

    async fn find_ride(&self, ride_id: &str) -> Result<Option<RideRecord>, AppError> {
        Ok(self.rides.get(ride_id).map(|r| r.clone()))
    }

    async fn insert_ride(&self, ride: &RideRecord) -> Result<(), AppError> {
        self.rides.insert(ride.ride_id.clone(), ride.clone());
        Ok(())
    }

    async fn upsert_ride_status(
        &self,
        ride_id: &str,
        status: &str,
        can_cancel: &[String],
    ) -> Result<bool, AppError> {
        match self.rides.get_mut(ride_id) {
            Some(mut ride) => {
                ride.status = status.to_string();
                ride.can_cancel = can_cancel.to_vec();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
