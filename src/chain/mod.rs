use serde::{Deserialize, Serialize};
use url::Url;
use crate::error::{Result, WalletError};

pub mod sepolia;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Network a session must be connected to, plus everything a wallet needs to register it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTarget {
    pub chain_id: u64,
    pub name: String,
    pub native_currency: NativeCurrency,
    pub rpc_url: Url,
    pub explorer_url: Url,
}

/// `wallet_addEthereumChain` parameter object (EIP-3085).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

/// `wallet_switchEthereumChain` parameter object (EIP-3326).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchChainParams {
    pub chain_id: String,
}

pub fn hex_chain_id(chain_id: u64) -> String {
    format!("{:#x}", chain_id)
}

pub fn parse_hex_chain_id(value: &str) -> Result<u64> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| WalletError::Rpc(format!("Chain id is not hex encoded: {}", value)))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| WalletError::Rpc(format!("Invalid chain id {}: {}", value, e)))
}

impl ChainTarget {
    pub fn new(
        chain_id: u64,
        name: impl Into<String>,
        native_currency: NativeCurrency,
        rpc_url: &str,
        explorer_url: &str,
    ) -> Result<Self> {
        let rpc_url = Url::parse(rpc_url)
            .map_err(|e| WalletError::Config(format!("Invalid chain RPC URL: {}", e)))?;
        let explorer_url = Url::parse(explorer_url)
            .map_err(|e| WalletError::Config(format!("Invalid block explorer URL: {}", e)))?;

        Ok(Self {
            chain_id,
            name: name.into(),
            native_currency,
            rpc_url,
            explorer_url,
        })
    }

    pub fn hex_chain_id(&self) -> String {
        hex_chain_id(self.chain_id)
    }

    pub fn switch_chain_params(&self) -> SwitchChainParams {
        SwitchChainParams {
            chain_id: self.hex_chain_id(),
        }
    }

    pub fn add_chain_params(&self) -> AddChainParams {
        AddChainParams {
            chain_id: self.hex_chain_id(),
            chain_name: self.name.clone(),
            native_currency: self.native_currency.clone(),
            rpc_urls: vec![self.rpc_url.to_string()],
            block_explorer_urls: vec![self.explorer_url.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ChainTarget {
        sepolia::create_sepolia_target(
            "https://sepolia.infura.io/v3/test-key",
            sepolia::SEPOLIA_EXPLORER_URL,
        )
        .unwrap()
    }

    #[test]
    fn test_hex_chain_id() {
        assert_eq!(hex_chain_id(11155111), "0xaa36a7");
        assert_eq!(parse_hex_chain_id("0xaa36a7").unwrap(), 11155111);
        assert_eq!(parse_hex_chain_id("0x1").unwrap(), 1);
        assert!(parse_hex_chain_id("11155111").is_err());
        assert!(parse_hex_chain_id("0xzz").is_err());
    }

    #[test]
    fn test_add_chain_params_wire_format() {
        let params = serde_json::to_value(target().add_chain_params()).unwrap();

        assert_eq!(params["chainId"], "0xaa36a7");
        assert_eq!(params["chainName"], "Sepolia Test Network");
        assert_eq!(params["nativeCurrency"]["symbol"], "ETH");
        assert_eq!(params["nativeCurrency"]["decimals"], 18);
        assert_eq!(params["rpcUrls"][0], "https://sepolia.infura.io/v3/test-key");
        assert_eq!(params["blockExplorerUrls"][0], "https://sepolia.etherscan.io/");
    }

    #[test]
    fn test_switch_chain_params_wire_format() {
        let params = serde_json::to_value(target().switch_chain_params()).unwrap();
        assert_eq!(params, serde_json::json!({ "chainId": "0xaa36a7" }));
    }

    #[test]
    fn test_rejects_bad_urls() {
        let currency = NativeCurrency {
            name: "ETH".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        };
        let result = ChainTarget::new(1, "Test", currency, "not a url", "https://example.org/");
        assert!(matches!(result, Err(WalletError::Config(_))));
    }
}
