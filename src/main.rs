use anyhow::Context;
use escrow_wallet::units::format_amount_with;
use escrow_wallet::{format_address, format_amount, Config, Metrics, RpcWallet, WalletSession};
use ethers::providers::Http;
use ethers::utils::to_checksum;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with env filter
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().context("loading configuration")?;

    if let Some(port) = config.metrics_port {
        Metrics::init(port)?;
        info!("Metrics exposed on :{}/metrics", port);
    }

    let wallet = config.wallet_rpc_url.as_ref().map(|url| RpcWallet::<Http>::http(url)).transpose()?;
    if wallet.is_none() {
        warn!("ESCROW_WALLET_RPC_URL is not set, no wallet available");
    }

    let session = WalletSession::new(config, wallet);
    let connection = session.connect().await.context("connecting wallet")?;
    let address = to_checksum(&connection.address, None);

    info!("Connected {} on {}", format_address(&address), session.chain_target().name);

    let token = session.token_contract()?;
    let (balance, decimals) = futures::try_join!(token.balance_of(connection.address), token.decimals())?;
    info!("Token balance: {}", format_amount_with(balance, decimals));

    if let Some(invoice_ref) = std::env::args().nth(1) {
        let escrow = session.escrow_contract()?;
        let escrow_info = escrow.escrow_info(&invoice_ref).await?;
        info!(
            "Escrow {}: payer {} university {} amount {} status {}",
            escrow_info.invoice_ref,
            format_address(&to_checksum(&escrow_info.payer, None)),
            format_address(&to_checksum(&escrow_info.university, None)),
            format_amount(escrow_info.amount),
            escrow_info.status
        );
    }

    let consistency = session.check_address_consistency().await?;
    if !consistency.is_valid {
        warn!("Wallet account changed since connecting, run again to rebind");
    }

    // Follow wallet notifications until interrupted
    tokio::select! {
        result = session.watch_wallet_events() => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    session.disconnect();
    Ok(())
}
