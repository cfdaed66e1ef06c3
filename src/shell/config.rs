use crate::modules::scores::use_cases::submit_votes::backoff::{
    DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, RetryPolicy,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const ADDR_VAR: &str = "VOTE_TALLY_ADDR";
pub const STORE_VAR: &str = "VOTE_TALLY_STORE";
pub const DATA_PATH_VAR: &str = "VOTE_TALLY_DATA_PATH";
pub const MAX_ATTEMPTS_VAR: &str = "VOTE_TALLY_MAX_ATTEMPTS";
pub const BACKOFF_MS_VAR: &str = "VOTE_TALLY_BACKOFF_MS";
pub const DEADLINE_MS_VAR: &str = "VOTE_TALLY_DEADLINE_MS";

const DEFAULT_DATA_PATH: &str = "data/scores.json";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub store: StoreBackend,
    pub retry: RetryPolicy,
    pub request_deadline: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = parse_var(&lookup, ADDR_VAR)?
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));

        let store = match lookup(STORE_VAR).as_deref() {
            None | Some("memory") => StoreBackend::Memory,
            Some("file") => StoreBackend::File(
                lookup(DATA_PATH_VAR)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            ),
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: STORE_VAR,
                    value: other.to_string(),
                    reason: "expected \"memory\" or \"file\"".into(),
                });
            }
        };

        let max_attempts: u32 =
            parse_var(&lookup, MAX_ATTEMPTS_VAR)?.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                var: MAX_ATTEMPTS_VAR,
                value: "0".into(),
                reason: "at least one attempt is required".into(),
            });
        }
        let base_delay = parse_var::<u64>(&lookup, BACKOFF_MS_VAR)?
            .map_or(DEFAULT_BASE_DELAY, Duration::from_millis);
        let request_deadline =
            parse_var::<u64>(&lookup, DEADLINE_MS_VAR)?.map(Duration::from_millis);

        Ok(Self {
            addr,
            store,
            retry: RetryPolicy::new(max_attempts, base_delay),
            request_deadline,
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            }),
    }
}
