// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ride models: stored ride records and the provider's ride payloads.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Ride types offered by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideType {
    Lyft,
    LyftPlus,
    #[default]
    LyftLine,
    LyftPremier,
    LyftLux,
    LyftLuxsuv,
}

impl RideType {
    /// Wire name used by the provider API.
    pub fn as_str(&self) -> &'static str {
        match self {
            RideType::Lyft => "lyft",
            RideType::LyftPlus => "lyft_plus",
            RideType::LyftLine => "lyft_line",
            RideType::LyftPremier => "lyft_premier",
            RideType::LyftLux => "lyft_lux",
            RideType::LyftLuxsuv => "lyft_luxsuv",
        }
    }
}

impl fmt::Display for RideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// Stored ride record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideRecord {
    /// Phone number of the rider
    pub phone: String,
    /// Provider ride ID (also used as document ID)
    pub ride_id: String,
    /// Provider-defined status ("pending", "accepted", ...)
    pub status: String,
    /// Parties currently allowed to cancel the ride
    #[serde(default)]
    pub can_cancel: Vec<String>,
}

/// Ride status notification pushed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RideStatusEvent {
    #[serde(deserialize_with = "string_or_number")]
    pub ride_id: String,
    pub status: String,
    #[serde(default)]
    pub can_cancel: Vec<String>,
}

/// Response from the provider's create-ride endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideResult {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub ride_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Remaining provider fields, passed through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response from the provider's cost endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResult {
    #[serde(default)]
    pub cost_estimates: Vec<CostEstimate>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single cost estimate line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEstimate {
    pub ride_type: String,
    pub display_name: Option<String>,
    pub currency: Option<String>,
    pub estimated_cost_cents_min: Option<i64>,
    pub estimated_cost_cents_max: Option<i64>,
    pub estimated_duration_seconds: Option<i64>,
    pub estimated_distance_miles: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(v: StringOrNumber) -> Self {
        match v {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

// The provider documents ride IDs as strings but some responses carry numbers.
fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(d).map(String::from)
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<StringOrNumber>::deserialize(d)?.map(String::from))
}
