use ethers::prelude::*;
use std::str::FromStr;
use url::Url;
use crate::chain::sepolia::{self, SEPOLIA_CHAIN_ID};
use crate::chain::{ChainTarget, NativeCurrency};
use crate::error::{Result, WalletError};

const ENV_PREFIX: &str = "ESCROW";
const DEFAULT_TOKEN_DECIMALS: u8 = 6;

#[derive(Debug, Clone)]
pub struct ContractAddresses {
    pub escrow: Address,
    pub token: Address,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub contracts: ContractAddresses,
    pub token_decimals: u8,
    pub chain: ChainTarget,
    /// Endpoint of a wallet that speaks EIP-1193 over JSON-RPC; only the binary needs it.
    pub wallet_rpc_url: Option<Url>,
    pub metrics_port: Option<u16>,
}

impl Config {
    fn var_name(section: &str, key: &str) -> String {
        format!("{}_{}_{}", ENV_PREFIX, section, key)
    }

    fn get_var<F>(lookup: &F, section: &str, key: &str) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_name = Self::var_name(section, key);
        lookup(&var_name)
            .ok_or_else(|| WalletError::Config(format!("Environment variable {} not found", var_name)))
    }

    fn get_var_optional<F>(lookup: &F, section: &str, key: &str, default: &str) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(&Self::var_name(section, key)).unwrap_or_else(|| default.to_string())
    }

    fn parse_address(value: &str, what: &str) -> Result<Address> {
        Address::from_str(value.trim())
            .map_err(|e| WalletError::Config(format!("Invalid {} address: {}", what, e)))
    }

    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contracts = ContractAddresses {
            escrow: Self::parse_address(&Self::get_var(&lookup, "CONTRACTS", "ESCROW_ADDRESS")?, "escrow")?,
            token: Self::parse_address(&Self::get_var(&lookup, "CONTRACTS", "TOKEN_ADDRESS")?, "token")?,
        };

        let token_decimals = Self::get_var_optional(&lookup, "TOKEN", "DECIMALS", &DEFAULT_TOKEN_DECIMALS.to_string())
            .parse::<u8>()
            .map_err(|e| WalletError::Config(format!("Invalid token decimals: {}", e)))?;

        let chain_id = Self::get_var_optional(&lookup, "CHAIN", "ID", &SEPOLIA_CHAIN_ID.to_string())
            .parse::<u64>()
            .map_err(|e| WalletError::Config(format!("Invalid chain id: {}", e)))?;
        let rpc_url = Self::get_var_optional(&lookup, "CHAIN", "RPC_URL", sepolia::SEPOLIA_RPC_URL);
        let explorer_url = Self::get_var_optional(&lookup, "CHAIN", "EXPLORER_URL", sepolia::SEPOLIA_EXPLORER_URL);

        let chain = if chain_id == SEPOLIA_CHAIN_ID {
            sepolia::create_sepolia_target(&rpc_url, &explorer_url)?
        } else {
            // Any other network must be described in full
            ChainTarget::new(
                chain_id,
                Self::get_var(&lookup, "CHAIN", "NAME")?,
                NativeCurrency {
                    name: Self::get_var_optional(&lookup, "CHAIN", "CURRENCY_NAME", "ETH"),
                    symbol: Self::get_var_optional(&lookup, "CHAIN", "CURRENCY_SYMBOL", "ETH"),
                    decimals: 18,
                },
                &rpc_url,
                &explorer_url,
            )?
        };

        let wallet_rpc_url = lookup(&Self::var_name("WALLET", "RPC_URL"))
            .map(|value| {
                Url::parse(&value).map_err(|e| WalletError::Config(format!("Invalid wallet RPC URL: {}", e)))
            })
            .transpose()?;

        let metrics_port = lookup(&Self::var_name("METRICS", "PORT"))
            .map(|value| {
                value
                    .parse::<u16>()
                    .map_err(|e| WalletError::Config(format!("Invalid metrics port: {}", e)))
            })
            .transpose()?;

        Ok(Config {
            contracts,
            token_decimals,
            chain,
            wallet_rpc_url,
            metrics_port,
        })
    }
}
