// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup and passed explicitly into the services that
//! need it. Nothing here is read lazily from the process environment.

use crate::services::state::StateCipher;
use std::env;

/// Default ride provider API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.lyft.com";

/// Which persistence backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// In-process store; contents are lost on restart.
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Ride provider OAuth client ID (public)
    pub client_id: String,
    /// Ride provider API root, without trailing slash
    pub api_base_url: String,
    /// Cipher used for the OAuth state parameter
    pub state_cipher: StateCipher,
    /// Persistence backend
    pub store_backend: StoreBackend,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// Ride provider OAuth client secret, as sent to the token endpoint
    pub client_secret: String,
    /// Secret the state encryption key is derived from
    pub state_secret: Vec<u8>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            client_id: "test_client_id".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            state_cipher: StateCipher::Aes256Gcm,
            store_backend: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            client_secret: "test_secret".to_string(),
            state_secret: b"test_state_secret_32_bytes_min!!".to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local
    /// development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from a variable lookup.
    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_secret = var("RIDE_CLIENT_SECRET")
            .map(|v| v.trim().to_string())
            .ok_or(ConfigError::Missing("RIDE_CLIENT_SECRET"))?;

        // The provider's sandbox expects the secret with a fixed prefix.
        let sandbox = var("RIDE_SANDBOX")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let state_cipher = match var("STATE_CIPHER") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid("STATE_CIPHER", v))?,
            None => StateCipher::Aes256Gcm,
        };

        let store_backend = match var("STORE_BACKEND").as_deref() {
            Some("memory") => StoreBackend::Memory,
            Some("firestore") | None => StoreBackend::Firestore,
            Some(other) => {
                return Err(ConfigError::Invalid("STORE_BACKEND", other.to_string()))
            }
        };

        let state_secret = var("STATE_SECRET")
            .ok_or(ConfigError::Missing("STATE_SECRET"))?
            .into_bytes();
        if state_secret.is_empty() {
            return Err(ConfigError::Invalid("STATE_SECRET", String::new()));
        }

        let port = match var("PORT") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", v))?,
            None => 8080,
        };

        Ok(Self {
            client_id: var("RIDE_CLIENT_ID").ok_or(ConfigError::Missing("RIDE_CLIENT_ID"))?,
            api_base_url: var("RIDE_API_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            state_cipher,
            store_backend,
            gcp_project_id: var("GCP_PROJECT_ID").unwrap_or_else(|| "local-dev".to_string()),
            port,
            client_secret: sandbox_secret(&raw_secret, sandbox),
            state_secret,
        })
    }
}

/// Apply the sandbox prefix to a client secret when requested.
fn sandbox_secret(secret: &str, sandbox: bool) -> String {
    if sandbox {
        format!("SANDBOX-{}", secret)
    } else {
        secret.to_string()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("RIDE_CLIENT_ID", "test_id");
        env::set_var("RIDE_CLIENT_SECRET", " test_secret \n");
        env::set_var("STATE_SECRET", "some_state_secret");
        env::set_var("RIDE_API_BASE_URL", "http://127.0.0.1:9999/");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.client_id, "test_id");
        assert_eq!(config.client_secret, "test_secret");
        assert_eq!(config.api_base_url, "http://127.0.0.1:9999");
        assert_eq!(config.state_cipher, StateCipher::Aes256Gcm);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_sandbox_secret_prefix() {
        assert_eq!(sandbox_secret("abc", true), "SANDBOX-abc");
        assert_eq!(sandbox_secret("abc", false), "abc");
    }

    /// Minimal valid variable set, with `overrides` applied on top.
    /// A `None` override removes the variable.
    fn load(overrides: &[(&str, Option<&str>)]) -> Result<Config, ConfigError> {
        let mut vars: HashMap<String, String> = [
            ("RIDE_CLIENT_ID", "id"),
            ("RIDE_CLIENT_SECRET", "s"),
            ("STATE_SECRET", "state"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        for (key, value) in overrides {
            match value {
                Some(v) => vars.insert(key.to_string(), v.to_string()),
                None => vars.remove(*key),
            };
        }

        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_from_minimal_vars() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.state_cipher, StateCipher::Aes256Gcm);
        assert_eq!(config.store_backend, StoreBackend::Firestore);
        assert_eq!(config.gcp_project_id, "local-dev");
        assert_eq!(config.port, 8080);
        assert_eq!(config.client_secret, "s");
    }

    #[test]
    fn test_missing_required_vars() {
        for key in ["RIDE_CLIENT_ID", "RIDE_CLIENT_SECRET", "STATE_SECRET"] {
            match load(&[(key, None)]) {
                Err(ConfigError::Missing(missing)) => assert_eq!(missing, key),
                other => panic!("{key}: expected Missing, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_state_secret_rejected() {
        assert!(matches!(
            load(&[("STATE_SECRET", Some(""))]),
            Err(ConfigError::Invalid("STATE_SECRET", _))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            ("STATE_CIPHER", "des"),
            ("STORE_BACKEND", "mongo"),
            ("PORT", "notaport"),
            ("PORT", "70000"),
        ];
        for (key, value) in cases {
            match load(&[(key, Some(value))]) {
                Err(ConfigError::Invalid(name, got)) => {
                    assert_eq!(name, key);
                    assert_eq!(got, value);
                }
                other => panic!("{key}={value}: expected Invalid, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_explicit_values() {
        let config = load(&[
            ("STATE_CIPHER", Some("chacha20-poly1305")),
            ("STORE_BACKEND", Some("memory")),
            ("PORT", Some("3000")),
            ("GCP_PROJECT_ID", Some("rides-prod")),
        ])
        .unwrap();
        assert_eq!(config.state_cipher, StateCipher::ChaCha20Poly1305);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.port, 3000);
        assert_eq!(config.gcp_project_id, "rides-prod");
    }

    #[test]
    fn test_sandbox_flag_prefixes_secret() {
        let config = load(&[("RIDE_SANDBOX", Some("true"))]).unwrap();
        assert_eq!(config.client_secret, "SANDBOX-s");

        let config = load(&[("RIDE_SANDBOX", Some("false"))]).unwrap();
        assert_eq!(config.client_secret, "s");
    }
}
