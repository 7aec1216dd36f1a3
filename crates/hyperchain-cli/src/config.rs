//! CLI configuration
//!
//! Loaded from a TOML file, then overridden by `HYPERCHAIN__<SECTION>__<KEY>`
//! environment variables.

use chrono::{DateTime, Duration, TimeZone, Utc};
use hyperchain_bridge::bank::DEFAULT_HRP;
use hyperchain_bridge::{Host, StaticChainRegistry, StoreBank};
use hyperchain_core::{Address, BlockHeader, ChainId, Coin, Params};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Host clock and addressing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_block_time_secs")]
    pub block_time_secs: i64,

    #[serde(default = "default_start_height")]
    pub start_height: u64,

    #[serde(default = "default_start_time")]
    pub start_time: DateTime<Utc>,

    /// Human-readable prefix of module account addresses
    #[serde(default = "default_address_prefix")]
    pub address_prefix: String,
}

fn default_block_time_secs() -> i64 {
    5
}

fn default_start_height() -> u64 {
    1
}

fn default_start_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_704_067_200, 0).single().unwrap_or_default() // 2024-01-01
}

fn default_address_prefix() -> String {
    DEFAULT_HRP.to_string()
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            block_time_secs: default_block_time_secs(),
            start_height: default_start_height(),
            start_time: default_start_time(),
            address_prefix: default_address_prefix(),
        }
    }
}

/// Registered chain and its admin of record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub id: String,
    pub admin: String,
}

/// Genesis balance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceConfig {
    pub address: String,
    pub denom: String,
    pub amount: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub params: Params,

    #[serde(default)]
    pub host: HostConfig,

    #[serde(default)]
    pub chains: Vec<ChainConfig>,

    #[serde(default)]
    pub balances: Vec<BalanceConfig>,
}

impl CliConfig {
    /// Load `path` (optional) with environment overrides
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("HYPERCHAIN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Self::from_settings(settings)
    }

    /// Parse a TOML document without touching the environment
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .build()?;
        Self::from_settings(settings)
    }

    fn from_settings(settings: config::Config) -> anyhow::Result<Self> {
        // `Coin` amounts in `[params]` are u128, which `config` cannot deserialize
        let value: serde_json::Value = settings.try_deserialize()?;
        let config: CliConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.params.validate()?;
        if self.host.block_time_secs <= 0 {
            anyhow::bail!("host.block_time_secs must be positive");
        }
        if self.host.start_height == 0 {
            anyhow::bail!("host.start_height must be at least 1");
        }
        for chain in &self.chains {
            ChainId::parse(&chain.id)?;
            Address::parse(&chain.admin)?;
        }
        for balance in &self.balances {
            Address::parse(&balance.address)?;
            Coin::new(&balance.denom, balance.amount.into()).validate()?;
        }
        Ok(())
    }

    /// Build an in-memory host with the configured chains and balances
    pub fn build_host(&self) -> anyhow::Result<Host> {
        let mut registry = StaticChainRegistry::new();
        for chain in &self.chains {
            registry.register(ChainId::parse(&chain.id)?, Address::parse(&chain.admin)?);
        }

        let genesis = BlockHeader::genesis(self.host.start_time);
        let header = BlockHeader::new(self.host.start_height, genesis.time, genesis.hash);

        let mut host = Host::with_bank(registry, StoreBank::new(&self.host.address_prefix), header);
        host.set_block_time(Duration::seconds(self.host.block_time_secs));
        host.set_params(&self.params)?;
        for balance in &self.balances {
            let address = Address::parse(&balance.address)?;
            host.mint(&address, &Coin::new(&balance.denom, balance.amount.into()))?;
        }

        tracing::info!(
            chains = self.chains.len(),
            balances = self.balances.len(),
            height = host.header().height,
            "host initialized"
        );
        Ok(host)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> anyhow::Result<String> {
        // toml cannot serialize the u128 `Coin` amounts in `params`; go through serde_json
        let value = serde_json::to_value(self)?;
        Ok(toml::to_string_pretty(&value)?)
    }

    /// Example configuration written by `hyperchain init`
    pub fn example() -> Self {
        Self {
            params: Params::default(),
            host: HostConfig::default(),
            chains: vec![
                ChainConfig {
                    id: "alpha".into(),
                    admin: "nmx1admin".into(),
                },
                ChainConfig {
                    id: "beta".into(),
                    admin: "nmx1admin".into(),
                },
            ],
            balances: vec![BalanceConfig {
                address: "nmx1alice".into(),
                denom: "gold".into(),
                amount: 1_000,
            }],
        }
    }
}
