// Process configuration, read once at startup.
//
// Environment
// - PORT: listening port, 3000 when unset.
// - EVENT_STORE_BACKEND: "memory" (default) or "dynamodb".
// - DYNAMODB_TABLE, AWS_REGION, AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY: required by "dynamodb".
// - APPEND_LOCK_TIMEOUT_MS: optional bound on waiting for a busy stream.
// - LOCK_EVICTION_INTERVAL_MS: optional period for dropping locks of idle streams.

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Must set {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    DynamoDb { table: String, region: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub backend: StoreBackend,
    pub lock_timeout: Option<Duration>,
    pub lock_eviction_interval: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any variable source; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let port = match get("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let backend = match get("EVENT_STORE_BACKEND").as_deref() {
            None | Some("memory") => StoreBackend::InMemory,
            Some("dynamodb") => {
                require("AWS_ACCESS_KEY_ID")?;
                require("AWS_SECRET_ACCESS_KEY")?;
                StoreBackend::DynamoDb {
                    region: require("AWS_REGION")?,
                    table: require("DYNAMODB_TABLE")?,
                }
            }
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "EVENT_STORE_BACKEND",
                    value: other.to_owned(),
                });
            }
        };

        let millis = |name: &'static str| match get(name) {
            Some(value) => match value.parse::<u64>() {
                Ok(0) | Err(_) => Err(ConfigError::Invalid { name, value }),
                Ok(ms) => Ok(Some(Duration::from_millis(ms))),
            },
            None => Ok(None),
        };

        Ok(Self {
            port,
            backend,
            lock_timeout: millis("APPEND_LOCK_TIMEOUT_MS")?,
            lock_eviction_interval: millis("LOCK_EVICTION_INTERVAL_MS")?,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    const DYNAMODB: [(&str, &str); 5] = [
        ("EVENT_STORE_BACKEND", "dynamodb"),
        ("AWS_ACCESS_KEY_ID", "key"),
        ("AWS_SECRET_ACCESS_KEY", "secret"),
        ("AWS_REGION", "eu-west-1"),
        ("DYNAMODB_TABLE", "events"),
    ];

    #[rstest]
    fn it_should_default_to_an_in_memory_store_on_port_3000() {
        let config = config_from(&[]).unwrap();
        assert_eq!(
            config,
            Config {
                port: 3000,
                backend: StoreBackend::InMemory,
                lock_timeout: None,
                lock_eviction_interval: None,
            }
        );
        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:3000");
    }

    #[rstest]
    fn it_should_read_port_and_lock_settings() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("APPEND_LOCK_TIMEOUT_MS", "250"),
            ("LOCK_EVICTION_INTERVAL_MS", "60000"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.lock_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.lock_eviction_interval, Some(Duration::from_secs(60)));
    }

    #[rstest]
    fn it_should_treat_an_empty_port_as_unset() {
        assert_eq!(config_from(&[("PORT", "")]).unwrap().port, DEFAULT_PORT);
    }

    #[rstest]
    fn it_should_configure_dynamodb() {
        let config = config_from(&DYNAMODB).unwrap();
        assert_eq!(
            config.backend,
            StoreBackend::DynamoDb {
                table: "events".into(),
                region: "eu-west-1".into(),
            }
        );
    }

    #[rstest]
    #[case("AWS_ACCESS_KEY_ID")]
    #[case("AWS_SECRET_ACCESS_KEY")]
    #[case("AWS_REGION")]
    #[case("DYNAMODB_TABLE")]
    fn it_should_require_every_dynamodb_variable(#[case] missing: &'static str) {
        let vars: Vec<(&str, &str)> = DYNAMODB
            .into_iter()
            .filter(|(name, _)| *name != missing)
            .collect();
        assert_eq!(config_from(&vars), Err(ConfigError::Missing(missing)));
    }

    #[rstest]
    #[case("PORT", "not-a-port")]
    #[case("PORT", "70000")]
    #[case("EVENT_STORE_BACKEND", "postgres")]
    #[case("APPEND_LOCK_TIMEOUT_MS", "soon")]
    #[case("LOCK_EVICTION_INTERVAL_MS", "-5")]
    #[case("LOCK_EVICTION_INTERVAL_MS", "0")]
    fn it_should_reject_invalid_values(#[case] name: &'static str, #[case] value: &str) {
        assert_eq!(
            config_from(&[(name, value)]),
            Err(ConfigError::Invalid {
                name,
                value: value.to_string(),
            })
        );
    }
}
