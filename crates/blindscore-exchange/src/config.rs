use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ExchangeError, ExchangeResult};

/// Where the exchange objects live and how long the Owner waits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Prepended to every object key; empty keeps the bare names
    #[serde(default)]
    pub key_prefix: String,
    #[serde(default)]
    pub poll: PollPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            key_prefix: String::new(),
            poll: PollPolicy::default(),
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_bucket() -> String {
    "alice_data".into()
}
fn default_max_attempts() -> u32 {
    10
}
fn default_interval_secs() -> u64 {
    5
}

impl PollPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn validate(&self) -> ExchangeResult<()> {
        if self.max_attempts == 0 {
            return Err(ExchangeError::InvalidInput(
                "poll.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl ExchangeConfig {
    pub fn validate(&self) -> ExchangeResult<()> {
        let invalid = |e: blindscore_storage::StorageError| ExchangeError::InvalidInput(e.to_string());
        blindscore_storage::validate_bucket(&self.bucket).map_err(invalid)?;
        if !self.key_prefix.is_empty() {
            blindscore_storage::validate_key(self.key_prefix.trim_end_matches('/')).map_err(invalid)?;
        }
        self.poll.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExchangeConfig::default();
        assert_eq!(config.bucket, "alice_data");
        assert_eq!(config.key_prefix, "");
        assert_eq!(config.poll.max_attempts, 10);
        assert_eq!(config.poll.interval(), Duration::from_secs(5));
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_deserialize() {
        let config: ExchangeConfig =
            serde_json::from_str(r#"{"poll": {"max_attempts": 3}}"#).unwrap();
        assert_eq!(config.bucket, "alice_data");
        assert_eq!(config.poll.max_attempts, 3);
        assert_eq!(config.poll.interval_secs, 5);
    }

    #[test]
    fn test_invalid() {
        let zero = ExchangeConfig {
            poll: PollPolicy {
                max_attempts: 0,
                ..PollPolicy::default()
            },
            ..ExchangeConfig::default()
        };
        assert!(zero.validate().is_err());

        let escaping = ExchangeConfig {
            key_prefix: "../other".into(),
            ..ExchangeConfig::default()
        };
        assert!(escaping.validate().is_err());
    }
}
