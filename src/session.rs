//! Wallet session owned by the UI root.
//!
//! The session connects the wallet, keeps it on the configured chain and publishes
//! the resulting connection through a [`Store`] so views can re-render on change.
//! Callers are expected to serialize `connect` calls, e.g. by disabling the connect
//! button while one is in flight.

use ethers::prelude::*;
use ethers::utils::to_checksum;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};
use crate::chain::ChainTarget;
use crate::config::Config;
use crate::contracts::{self, Erc20, EscrowContract, TokenContract, TuitionEscrow};
use crate::error::{Result, WalletError};
use crate::metrics::{Metrics, Timer};
use crate::store::Store;
use crate::units::format_address;
use crate::wallet::{WalletEvent, WalletProvider, WalletSigner};

/// Connection published to the UI. Either fully connected or fully empty.
pub struct ConnectionState<M> {
    address: Option<Address>,
    connected: bool,
    provider: Option<Arc<M>>,
    signer: Option<WalletSigner<M>>,
}

impl<M> ConnectionState<M> {
    pub fn connected(address: Address, provider: Arc<M>, signer: WalletSigner<M>) -> Self {
        Self {
            address: Some(address),
            connected: true,
            provider: Some(provider),
            signer: Some(signer),
        }
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    /// Checksummed address, or an empty string while disconnected.
    pub fn address_string(&self) -> String {
        self.address
            .map(|address| to_checksum(&address, None))
            .unwrap_or_default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn provider(&self) -> Option<Arc<M>> {
        self.provider.clone()
    }

    pub fn signer(&self) -> Option<&WalletSigner<M>> {
        self.signer.as_ref()
    }
}

impl<M> Default for ConnectionState<M> {
    fn default() -> Self {
        Self {
            address: None,
            connected: false,
            provider: None,
            signer: None,
        }
    }
}

impl<M> Clone for ConnectionState<M> {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            connected: self.connected,
            provider: self.provider.clone(),
            signer: self.signer.clone(),
        }
    }
}

impl<M> fmt::Debug for ConnectionState<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionState")
            .field("address", &self.address)
            .field("connected", &self.connected)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

pub struct Connection<M> {
    pub address: Address,
    pub provider: Arc<M>,
    pub signer: WalletSigner<M>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressConsistency {
    pub is_valid: bool,
    pub current_address: Address,
    pub active_address: Address,
}

pub struct WalletSession<W: WalletProvider> {
    config: Config,
    wallet: Option<W>,
    state: Store<ConnectionState<W::Client>>,
}

impl<W: WalletProvider> WalletSession<W> {
    /// `wallet` is `None` when no wallet is injected into the page.
    pub fn new(config: Config, wallet: Option<W>) -> Self {
        Self {
            config,
            wallet,
            state: Store::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn chain_target(&self) -> &ChainTarget {
        &self.config.chain
    }

    pub fn state(&self) -> ConnectionState<W::Client> {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState<W::Client>> {
        self.state.subscribe()
    }

    pub fn address(&self) -> Option<Address> {
        self.state.get().address()
    }

    pub fn is_connected(&self) -> bool {
        self.state.get().is_connected()
    }

    pub fn provider(&self) -> Option<Arc<W::Client>> {
        self.state.get().provider()
    }

    pub fn signer(&self) -> Option<WalletSigner<W::Client>> {
        self.state.get().signer().cloned()
    }

    fn wallet(&self) -> Result<&W> {
        self.wallet.as_ref().ok_or(WalletError::ProviderUnavailable)
    }

    pub async fn connect(&self) -> Result<Connection<W::Client>> {
        let timer = Timer::new();
        let result = self.try_connect().await;
        Metrics::record_connect(self.config.chain.chain_id, result.is_ok(), timer.elapsed());

        match result {
            Ok(connection) => {
                info!(
                    address = %format_address(&to_checksum(&connection.address, None)),
                    chain_id = self.config.chain.chain_id,
                    "wallet connected"
                );
                Ok(connection)
            }
            Err(e) => {
                error!(error = %e, "wallet connection failed");
                Err(e)
            }
        }
    }

    async fn try_connect(&self) -> Result<Connection<W::Client>> {
        let wallet = self.wallet()?;

        let accounts = wallet.request_accounts().await?;
        let address = accounts.first().copied().ok_or(WalletError::NoAccounts)?;

        self.ensure_chain(wallet).await?;

        let provider = wallet.client();
        let signer = wallet.signer(address);

        // Single write once every check has passed
        self.state.set(ConnectionState::connected(address, provider.clone(), signer.clone()));
        Metrics::record_connected(true);

        Ok(Connection {
            address,
            provider,
            signer,
        })
    }

    async fn ensure_chain(&self, wallet: &W) -> Result<()> {
        let target = &self.config.chain;
        let current = wallet.chain_id().await?;
        if current == target.chain_id {
            return Ok(());
        }

        info!(current, target = target.chain_id, "wallet on wrong chain, requesting switch");

        match wallet.switch_chain(target.chain_id).await {
            Ok(()) => Metrics::record_chain_switch(target.chain_id, "switched"),
            Err(WalletError::UnrecognizedChain(_)) => {
                warn!(chain_id = target.chain_id, chain_name = %target.name, "wallet does not know target chain, registering it");
                Metrics::record_chain_switch(target.chain_id, "unrecognized");

                self.register_chain(wallet).await?;

                wallet.switch_chain(target.chain_id).await.map_err(|e| {
                    Metrics::record_chain_switch(target.chain_id, "failed");
                    switch_failure(e)
                })?;
                Metrics::record_chain_switch(target.chain_id, "switched");
            }
            Err(e) => {
                Metrics::record_chain_switch(target.chain_id, "failed");
                return Err(switch_failure(e));
            }
        }

        let active = wallet.chain_id().await?;
        if active != target.chain_id {
            return Err(WalletError::ChainSwitchFailed(format!(
                "wallet reports chain {} after switching to {}",
                active, target.chain_id
            )));
        }
        Ok(())
    }

    async fn register_chain(&self, wallet: &W) -> Result<()> {
        let target = &self.config.chain;
        let result = wallet.add_chain(&target.add_chain_params()).await;
        Metrics::record_chain_registration(target.chain_id, result.is_ok());

        result.map_err(|e| match e {
            WalletError::ChainRegistrationFailed(reason) => WalletError::ChainRegistrationFailed(reason),
            other => WalletError::ChainRegistrationFailed(other.to_string()),
        })
    }

    /// Forgets the connection locally. Wallet permissions are left untouched.
    pub fn disconnect(&self) {
        self.state.set(ConnectionState::default());
        Metrics::record_connected(false);
        info!("wallet disconnected");
    }

    pub fn get_escrow_binding(
        &self,
        signer: Option<&WalletSigner<W::Client>>,
    ) -> Result<TuitionEscrow<W::Client>> {
        contracts::escrow_binding(self.config.contracts.escrow, signer)
    }

    pub fn get_token_binding(
        &self,
        signer: Option<&WalletSigner<W::Client>>,
    ) -> Result<Erc20<W::Client>> {
        contracts::token_binding(self.config.contracts.token, signer)
    }

    /// Escrow contract bound to the currently connected signer.
    pub fn escrow_contract(&self) -> Result<EscrowContract<W::Client>> {
        let signer = self.signer();
        self.get_escrow_binding(signer.as_ref()).map(EscrowContract::new)
    }

    pub fn token_contract(&self) -> Result<TokenContract<W::Client>> {
        let signer = self.signer();
        self.get_token_binding(signer.as_ref()).map(TokenContract::new)
    }

    /// Compares the bound signer with the account the wallet currently exposes.
    pub async fn check_address_consistency(&self) -> Result<AddressConsistency> {
        let wallet = self.wallet()?;
        let current_address = self
            .signer()
            .map(|signer| signer.address())
            .ok_or(WalletError::SignerRequired)?;

        let active_address = wallet
            .accounts()
            .await?
            .first()
            .copied()
            .ok_or(WalletError::NoAccounts)?;

        let is_valid = current_address == active_address;
        if !is_valid {
            warn!(
                current = %to_checksum(&current_address, None),
                active = %to_checksum(&active_address, None),
                "bound signer no longer matches the wallet's active account"
            );
        }

        Ok(AddressConsistency {
            is_valid,
            current_address,
            active_address,
        })
    }

    /// Lets the user pick another account, then reconnects with it.
    pub async fn request_address_switch(&self) -> Result<Connection<W::Client>> {
        let wallet = self.wallet()?;
        wallet.request_accounts().await.map_err(|e| {
            error!(error = %e, "account switch request failed");
            e
        })?;
        self.connect().await
    }

    /// Reacts to wallet notifications until the wallet's event stream closes.
    pub async fn watch_wallet_events(&self) -> Result<()> {
        let mut events = self.wallet()?.subscribe();
        loop {
            match events.recv().await {
                Ok(event) => self.handle_wallet_event(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "wallet event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(()),
            }
        }
    }

    pub fn handle_wallet_event(&self, event: WalletEvent) {
        match event {
            WalletEvent::Disconnected => self.disconnect(),
            WalletEvent::AccountsChanged(accounts) => match (accounts.first(), self.address()) {
                (None, _) => self.disconnect(),
                (Some(active), Some(current)) if *active != current => {
                    warn!(
                        active = %to_checksum(active, None),
                        "wallet switched accounts, reconnect to bind the new account"
                    );
                }
                _ => {}
            },
            WalletEvent::ChainChanged(chain_id) if chain_id != self.config.chain.chain_id => {
                warn!(chain_id, target = self.config.chain.chain_id, "wallet left the target chain");
            }
            WalletEvent::ChainChanged(_) => {}
        }
    }
}

fn switch_failure(err: WalletError) -> WalletError {
    match err {
        WalletError::ChainSwitchFailed(reason) => WalletError::ChainSwitchFailed(reason),
        other => WalletError::ChainSwitchFailed(other.to_string()),
    }
}
