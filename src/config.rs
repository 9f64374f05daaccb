use crate::domain::{parse_address, parse_amount, Address};
use primitive_types::U256;
use std::collections::HashMap;
use thiserror::Error;

/// 0.3% of every fill, per 10^18.
pub const DEFAULT_LEDGER_FEE: &str = "3000000000000000";

/// One million ether, in wei.
pub const DEFAULT_GENESIS_BALANCE: &str = "1000000000000000000000000";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub ledger_fee: U256,
    pub ledger_owner: Address,
    pub genesis_accounts: Vec<Address>,
    pub genesis_balance: U256,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8545")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let ledger_fee = parse_amount(
            env_map
                .get("LEDGER_FEE")
                .map(|s| s.as_str())
                .unwrap_or(DEFAULT_LEDGER_FEE),
        )
        .map_err(|_| {
            ConfigError::InvalidValue(
                "LEDGER_FEE".to_string(),
                "must be a decimal or 0x hex amount".to_string(),
            )
        })?;
        if ledger_fee > U256::exp10(18) {
            return Err(ConfigError::InvalidValue(
                "LEDGER_FEE".to_string(),
                "must not exceed 10^18".to_string(),
            ));
        }

        let ledger_owner = env_map
            .get("LEDGER_OWNER")
            .ok_or_else(|| ConfigError::MissingEnv("LEDGER_OWNER".to_string()))
            .and_then(|s| {
                parse_address(s).map_err(|e| {
                    ConfigError::InvalidValue("LEDGER_OWNER".to_string(), e.to_string())
                })
            })?;

        let genesis_accounts = parse_genesis_accounts(&env_map)?;

        let genesis_balance = parse_amount(
            env_map
                .get("GENESIS_BALANCE")
                .map(|s| s.as_str())
                .unwrap_or(DEFAULT_GENESIS_BALANCE),
        )
        .map_err(|_| {
            ConfigError::InvalidValue(
                "GENESIS_BALANCE".to_string(),
                "must be a decimal or 0x hex amount".to_string(),
            )
        })?;

        Ok(Config {
            port,
            database_path,
            ledger_fee,
            ledger_owner,
            genesis_accounts,
            genesis_balance,
        })
    }
}

fn parse_genesis_accounts(env_map: &HashMap<String, String>) -> Result<Vec<Address>, ConfigError> {
    let Some(raw) = env_map.get("GENESIS_ACCOUNTS") else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            parse_address(s)
                .map_err(|e| ConfigError::InvalidValue("GENESIS_ACCOUNTS".to_string(), e.to_string()))
        })
        .collect()
}
