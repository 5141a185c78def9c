use thiserror::Error;

pub type Result<T> = std::result::Result<T, WalletError>;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("No wallet provider available, install a browser wallet")]
    ProviderUnavailable,

    #[error("Wallet returned no accounts")]
    NoAccounts,

    #[error("Chain switch failed: {0}")]
    ChainSwitchFailed(String),

    #[error("Chain registration failed: {0}")]
    ChainRegistrationFailed(String),

    /// Raised by a wallet when asked to switch to a chain it does not know (EIP-1193 code 4902).
    #[error("Chain {0} is not registered in the wallet")]
    UnrecognizedChain(u64),

    #[error("A connected signer is required")]
    SignerRequired,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Contract interaction error: {0}")]
    Contract(String),
}
