use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::{
    ledger::{
        AccountId, LedgerConfig,
        metadata::{MAX_SUPPLY, START_SUPPLY},
    },
    logging,
};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[clap(
    version = "0.1.0",
    about = "Peet",
    long_about = r#"Peet is a capped fungible token ledger with a single minting authority"#
)]
pub struct Config {
    #[clap(
        long,
        env = "LOG_FORMAT",
        help = "Log format (plain, json)",
        default_value = "plain"
    )]
    pub log_format: logging::Format,

    #[clap(
        long,
        env = "API_PORT",
        help = "Port number for the API server (e.g., 8080)",
        default_value = "9333"
    )]
    pub api_port: u16,

    #[clap(
        long,
        env = "DATA_DIR",
        help = "Directory path for the ledger database and TLS cert.pem/key.pem"
    )]
    pub data_dir: PathBuf,

    #[clap(
        long,
        env = "AUTHORITY",
        help = "Hex encoded 20-byte account allowed to mint"
    )]
    pub authority: AccountId,

    #[clap(
        long,
        env = "START_SUPPLY",
        help = "Whole tokens issued to the authority on deploy",
        default_value_t = START_SUPPLY
    )]
    pub start_supply: u64,

    #[clap(
        long,
        env = "MAX_SUPPLY",
        help = "Cap on the total supply in whole tokens",
        default_value_t = MAX_SUPPLY
    )]
    pub max_supply: u64,
}

impl Config {
    pub fn new_test(data_dir: PathBuf, authority: AccountId) -> Self {
        Self {
            log_format: logging::Format::Plain,
            api_port: 0,
            data_dir,
            authority,
            start_supply: START_SUPPLY,
            max_supply: MAX_SUPPLY,
        }
    }

    pub fn ledger_config(&self) -> Result<LedgerConfig> {
        if self.start_supply == 0 {
            bail!("Start supply must be greater than 0");
        }
        if self.start_supply > self.max_supply {
            bail!(
                "Start supply {} exceeds max supply {}",
                self.start_supply,
                self.max_supply
            );
        }
        let config = LedgerConfig::builder()
            .authority(self.authority)
            .start_supply(self.start_supply)
            .max_supply(self.max_supply)
            .build();
        // balances travel as i64 through dispatch and the database
        match config.supply_cap() {
            Ok(cap) if i64::try_from(cap).is_ok() => Ok(config),
            _ => bail!("Max supply {} is too large", self.max_supply),
        }
    }

    pub fn should_use_tls(&self) -> bool {
        let cert_path = self.data_dir.join("cert.pem");
        let key_path = self.data_dir.join("key.pem");
        cert_path.exists() && key_path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let config = Config::try_parse_from([
            "peet",
            "--data-dir",
            "/tmp/peet",
            "--authority",
            "0x0505050505050505050505050505050505050505",
        ])
        .unwrap();
        assert_eq!(config.api_port, 9333);
        assert_eq!(config.log_format, logging::Format::Plain);
        assert_eq!(config.authority, AccountId::new([5; 20]));
        let ledger_config = config.ledger_config().unwrap();
        assert_eq!(ledger_config.start_supply, 10_000);
        assert_eq!(ledger_config.max_supply, 100_000);
    }

    #[test]
    fn test_rejects_bad_supplies() {
        let mut config = Config::new_test("/tmp".into(), AccountId::new([5; 20]));
        config.start_supply = 200_000;
        assert!(config.ledger_config().is_err());

        config.start_supply = 0;
        assert!(config.ledger_config().is_err());

        config.start_supply = 1;
        config.max_supply = u64::MAX / 10;
        assert!(config.ledger_config().is_err());
    }
}
