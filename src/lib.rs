pub mod error;
pub mod chain;
pub mod config;
pub mod contracts;
pub mod metrics;
pub mod session;
pub mod store;
pub mod units;
pub mod wallet;

pub use error::{Result, WalletError};
pub use chain::{AddChainParams, ChainTarget, NativeCurrency};
pub use config::{Config, ContractAddresses};
pub use contracts::{Erc20, EscrowContract, EscrowInfo, TokenContract, TuitionEscrow};
pub use metrics::Metrics;
pub use session::{AddressConsistency, Connection, ConnectionState, WalletSession};
pub use store::Store;
pub use units::{format_address, format_amount, parse_amount};
pub use wallet::{RpcWallet, WalletEvent, WalletProvider, WalletSigner};
