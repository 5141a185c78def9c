use async_trait::async_trait;
use ethers::prelude::*;
use ethers::providers::RpcError;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{debug, info};
use url::Url;
use super::{WalletEvent, WalletProvider, WalletSigner};
use crate::chain::{hex_chain_id, AddChainParams, SwitchChainParams};
use crate::error::{Result, WalletError};

/// EIP-1193 error code for a chain the wallet has not been told about.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;
/// EIP-1193 error code for a request the user declined.
pub const USER_REJECTED_CODE: i64 = 4001;

const EVENT_CAPACITY: usize = 16;

/// Wallet reached over JSON-RPC, speaking the EIP-1193 method set.
pub struct RpcWallet<P> {
    provider: Provider<P>,
    events: broadcast::Sender<WalletEvent>,
    known_accounts: Mutex<Vec<Address>>,
}

impl RpcWallet<Http> {
    pub fn http(url: &Url) -> Result<Self> {
        let provider = Provider::<Http>::try_from(url.as_str())
            .map_err(|e| WalletError::Config(format!("Failed to create wallet provider: {}", e)))?;
        Ok(Self::new(provider))
    }
}

impl<P: JsonRpcClient + Clone + 'static> RpcWallet<P> {
    pub fn new(provider: Provider<P>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            provider,
            events,
            known_accounts: Mutex::new(Vec::new()),
        }
    }

    fn publish_accounts(&self, accounts: &[Address]) {
        let changed = match self.known_accounts.lock() {
            Ok(mut known) if known.as_slice() != accounts => {
                *known = accounts.to_vec();
                true
            }
            Ok(_) => false,
            // A poisoned lock only loses change detection
            Err(_) => true,
        };

        if changed {
            let _ = self.events.send(if accounts.is_empty() {
                WalletEvent::Disconnected
            } else {
                WalletEvent::AccountsChanged(accounts.to_vec())
            });
        }
    }
}

pub(crate) fn rpc_error_code(err: &ProviderError) -> Option<i64> {
    RpcError::as_error_response(err).map(|response| response.code)
}

pub(crate) fn classify_switch_error(chain_id: u64, code: Option<i64>, message: String) -> WalletError {
    match code {
        Some(UNRECOGNIZED_CHAIN_CODE) => WalletError::UnrecognizedChain(chain_id),
        Some(USER_REJECTED_CODE) => {
            WalletError::ChainSwitchFailed(format!("user rejected switch to chain {}: {}", chain_id, message))
        }
        _ => WalletError::ChainSwitchFailed(message),
    }
}

#[async_trait]
impl<P: JsonRpcClient + Clone + 'static> WalletProvider for RpcWallet<P> {
    type Client = Provider<P>;

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        let accounts: Vec<Address> = self
            .provider
            .request("eth_requestAccounts", ())
            .await
            .map_err(|e| WalletError::Rpc(e.to_string()))?;

        debug!(count = accounts.len(), "wallet granted accounts");
        self.publish_accounts(&accounts);
        Ok(accounts)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        self.provider
            .get_accounts()
            .await
            .map_err(|e| WalletError::Rpc(e.to_string()))
    }

    async fn chain_id(&self) -> Result<u64> {
        let chain_id = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| WalletError::Rpc(e.to_string()))?;

        if chain_id > U256::from(u64::MAX) {
            return Err(WalletError::Rpc(format!("Chain id out of range: {}", chain_id)));
        }
        Ok(chain_id.as_u64())
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        let params = SwitchChainParams {
            chain_id: hex_chain_id(chain_id),
        };

        self.provider
            .request::<_, serde_json::Value>("wallet_switchEthereumChain", [params])
            .await
            .map_err(|e| classify_switch_error(chain_id, rpc_error_code(&e), e.to_string()))?;

        info!(chain_id, "wallet switched chain");
        let _ = self.events.send(WalletEvent::ChainChanged(chain_id));
        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParams) -> Result<()> {
        self.provider
            .request::<_, serde_json::Value>("wallet_addEthereumChain", [params])
            .await
            .map_err(|e| WalletError::ChainRegistrationFailed(e.to_string()))?;

        info!(chain_id = %params.chain_id, chain_name = %params.chain_name, "wallet registered chain");
        Ok(())
    }

    fn client(&self) -> Arc<Provider<P>> {
        Arc::new(self.provider.clone())
    }

    fn signer(&self, address: Address) -> WalletSigner<Provider<P>> {
        WalletSigner::new(address, Arc::new(self.provider.clone().with_sender(address)))
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}
