use super::{ChainTarget, NativeCurrency};
use crate::error::Result;

pub const SEPOLIA_CHAIN_ID: u64 = 11155111;
pub const SEPOLIA_NAME: &str = "Sepolia Test Network";
pub const SEPOLIA_RPC_URL: &str = "https://rpc.sepolia.org/";
pub const SEPOLIA_EXPLORER_URL: &str = "https://sepolia.etherscan.io/";

pub fn create_sepolia_target(rpc_url: &str, explorer_url: &str) -> Result<ChainTarget> {
    ChainTarget::new(
        SEPOLIA_CHAIN_ID,
        SEPOLIA_NAME,
        NativeCurrency {
            name: "ETH".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        },
        rpc_url,
        explorer_url,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sepolia_target() {
        let target = create_sepolia_target(SEPOLIA_RPC_URL, SEPOLIA_EXPLORER_URL).unwrap();

        assert_eq!(target.chain_id, 11155111);
        assert_eq!(target.hex_chain_id(), "0xaa36a7");
        assert_eq!(target.native_currency.decimals, 18);
        assert_eq!(target.explorer_url.as_str(), SEPOLIA_EXPLORER_URL);
    }
}
