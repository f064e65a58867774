//! Configuration loading and representation.
//!
//! Everything comes from environment variables, read once at startup:
//!
//! | variable | default |
//! |----------|---------|
//! | `STOREOPS_BIND_ADDR` | `0.0.0.0:8080` |
//! | `STOREOPS_STORE` | `memory` (`memory` or `postgres`) |
//! | `DATABASE_URL` | required with `postgres` |
//! | `STOREOPS_TX_MAX_ATTEMPTS` | `5` (at least 1) |
//! | `STOREOPS_CHANGE_BUFFER` | `256` (at least 1) |
//! | `STOREOPS_LOG_FORMAT` | `json` (`json` or `pretty`) |
//!
//! `RUST_LOG` is read by the tracing filter directly.

use std::net::SocketAddr;

use thiserror::Error;

use storeops_observability::LogFormat;

use crate::ledger::LedgerConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Which document store backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOpsConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub ledger: LedgerConfig,
    pub log_format: LogFormat,
}

impl StoreOpsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset and blank values take the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get("STOREOPS_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| invalid("STOREOPS_BIND_ADDR", e))?;

        let store = match get("STOREOPS_STORE").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("memory") => StoreBackend::Memory,
            Some("postgres") => StoreBackend::Postgres {
                database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            Some(other) => {
                return Err(invalid(
                    "STOREOPS_STORE",
                    format!("'{other}' (expected 'memory' or 'postgres')"),
                ));
            }
        };

        let defaults = LedgerConfig::default();
        let ledger = LedgerConfig {
            max_attempts: positive(get("STOREOPS_TX_MAX_ATTEMPTS"), "STOREOPS_TX_MAX_ATTEMPTS")?
                .unwrap_or(defaults.max_attempts),
            change_buffer: positive(get("STOREOPS_CHANGE_BUFFER"), "STOREOPS_CHANGE_BUFFER")?
                .unwrap_or(defaults.change_buffer),
        };

        let log_format = match get("STOREOPS_LOG_FORMAT") {
            Some(v) => v.parse().map_err(|e| invalid("STOREOPS_LOG_FORMAT", e))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            store,
            ledger,
            log_format,
        })
    }
}

fn invalid(var: &'static str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}

fn positive<N>(value: Option<String>, var: &'static str) -> Result<Option<N>, ConfigError>
where
    N: core::str::FromStr + PartialOrd + From<u8>,
    N::Err: std::fmt::Display,
{
    let Some(raw) = value else {
        return Ok(None);
    };
    let n: N = raw.trim().parse().map_err(|e| invalid(var, e))?;
    if n < N::from(1) {
        return Err(invalid(var, "must be at least 1"));
    }
    Ok(Some(n))
}
