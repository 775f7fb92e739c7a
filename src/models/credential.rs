// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stored OAuth credential for a phone-identified user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's linkage to the ride provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredential {
    /// Phone number (also used as document ID)
    pub phone: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Provider-supplied validity window of the access token, in seconds
    pub expires_in: i64,
    /// When the access token was last issued or refreshed
    pub updated_at: DateTime<Utc>,
}

impl UserCredential {
    /// Whether the access token must be refreshed before use at `now`.
    ///
    /// Compares whole elapsed seconds; a token exactly at its boundary
    /// counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        (now - self.updated_at).num_seconds() >= self.expires_in
    }
}
