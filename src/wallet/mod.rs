//! Wallet-injection capability.
//!
//! A [`WalletProvider`] is whatever hands out accounts and controls the active
//! network for the session: a browser extension behind a bridge, a desktop wallet
//! exposing EIP-1193 over JSON-RPC, or a scripted fake in tests.

use async_trait::async_trait;
use ethers::prelude::*;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use crate::chain::AddChainParams;
use crate::error::Result;

mod rpc;

pub use rpc::{RpcWallet, UNRECOGNIZED_CHAIN_CODE, USER_REJECTED_CODE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
    Disconnected,
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    type Client: Middleware + 'static;

    /// Asks the user for account access; may open the wallet's permission prompt.
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Accounts currently exposed to the page, without prompting.
    async fn accounts(&self) -> Result<Vec<Address>>;

    async fn chain_id(&self) -> Result<u64>;

    /// Fails with `WalletError::UnrecognizedChain` when the wallet has never seen `chain_id`.
    async fn switch_chain(&self, chain_id: u64) -> Result<()>;

    async fn add_chain(&self, params: &AddChainParams) -> Result<()>;

    fn client(&self) -> Arc<Self::Client>;

    fn signer(&self, address: Address) -> WalletSigner<Self::Client>;

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;
}

/// Handle able to authorize transactions for one account.
pub struct WalletSigner<M> {
    address: Address,
    client: Arc<M>,
}

impl<M> WalletSigner<M> {
    pub fn new(address: Address, client: Arc<M>) -> Self {
        Self { address, client }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn client(&self) -> Arc<M> {
        self.client.clone()
    }
}

impl<M> Clone for WalletSigner<M> {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            client: self.client.clone(),
        }
    }
}

impl<M> fmt::Debug for WalletSigner<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
