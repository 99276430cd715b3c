use std::{
    env,
    fmt::Display,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    str::FromStr,
};

use chrono::TimeDelta;
use mileage_tracker_data_management::DataManager;
use mileage_tracker_lib::ReimbursementRate;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    IncompleteTls,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TlsPaths {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Server settings, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: IpAddr,
    pub port: u16,
    pub jwt_secret: Vec<u8>,
    /// True when no secret was configured and a random one was generated.
    pub jwt_secret_generated: bool,
    pub token_ttl: TimeDelta,
    pub database_path: PathBuf,
    pub distance_table_path: Option<PathBuf>,
    pub reimbursement_rate: ReimbursementRate,
    pub log_dir: PathBuf,
    pub tls: Option<TlsPaths>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());

        let (jwt_secret, jwt_secret_generated) = match var("JWT_SECRET") {
            Some(secret) => (secret.into_bytes(), false),
            None => (rand::random::<[u8; 32]>().to_vec(), true),
        };

        let token_ttl_days: u32 = try_load(&var, "TOKEN_TTL_DAYS", "7")?;
        if token_ttl_days == 0 {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_DAYS",
                value: "0".into(),
                reason: "must be at least one day".into(),
            });
        }

        let rate: f64 = try_load(&var, "REIMBURSEMENT_RATE", "0.70")?;
        let reimbursement_rate = ReimbursementRate::new(rate).map_err(|e| ConfigError::Invalid {
            key: "REIMBURSEMENT_RATE",
            value: rate.to_string(),
            reason: e.to_string(),
        })?;

        let tls = match (var("TLS_CERT_PATH"), var("TLS_KEY_PATH")) {
            (Some(cert_path), Some(key_path)) => Some(TlsPaths {
                cert_path: cert_path.into(),
                key_path: key_path.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        Ok(Self {
            bind_address: try_load(&var, "BIND_ADDRESS", "0.0.0.0")?,
            port: try_load(&var, "PORT", "4000")?,
            jwt_secret,
            jwt_secret_generated,
            token_ttl: TimeDelta::days(token_ttl_days.into()),
            database_path: var("DATABASE_PATH").map(PathBuf::from).unwrap_or_else(DataManager::default_database_path),
            distance_table_path: var("DISTANCE_TABLE_PATH").map(PathBuf::from),
            reimbursement_rate,
            log_dir: var("LOG_DIR").unwrap_or_else(|| "server/log".into()).into(),
            tls,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

fn try_load<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = var(key).unwrap_or_else(|| default.to_string());

    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}
