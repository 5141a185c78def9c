use ethers::prelude::*;
use crate::error::{Result, WalletError};
use crate::metrics::Metrics;
use crate::wallet::WalletSigner;

abigen!(
    TuitionEscrow,
    r#"[
        function initialize(address payer, address university, uint256 amount, string calldata invoiceRef) external
        function deposit(string calldata invoiceRef, uint256 amount) external
        function release(string calldata invoiceRef) external
        function refund(string calldata invoiceRef) external
        function getEscrowInfo(string calldata invoiceRef) external view returns ((address payer, address university, uint256 amount, string invoiceRef, uint8 status))
        function getEscrowStatus(string calldata invoiceRef) external view returns (uint8)
        event Deposited(string indexed invoiceRef, address indexed payer, address indexed university, uint256 amount)
        event Released(string indexed invoiceRef, address indexed university, uint256 amount)
        event Refunded(string indexed invoiceRef, address indexed payer, uint256 amount)
    ]"#
);

abigen!(
    Erc20,
    r#"[
        function approve(address spender, uint256 amount) external returns (bool)
        function allowance(address owner, address spender) external view returns (uint256)
        function balanceOf(address account) external view returns (uint256)
        function decimals() external view returns (uint8)
    ]"#
);

/// Builds a fresh escrow binding; nothing is cached between calls.
pub fn escrow_binding<M: Middleware>(
    address: Address,
    signer: Option<&WalletSigner<M>>,
) -> Result<TuitionEscrow<M>> {
    let signer = signer.ok_or(WalletError::SignerRequired)?;
    Metrics::record_binding("escrow");
    Ok(TuitionEscrow::new(address, signer.client()))
}

pub fn token_binding<M: Middleware>(
    address: Address,
    signer: Option<&WalletSigner<M>>,
) -> Result<Erc20<M>> {
    let signer = signer.ok_or(WalletError::SignerRequired)?;
    Metrics::record_binding("token");
    Ok(Erc20::new(address, signer.client()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowInfo {
    pub payer: Address,
    pub university: Address,
    pub amount: U256,
    pub invoice_ref: String,
    pub status: u8,
}

impl From<(Address, Address, U256, String, u8)> for EscrowInfo {
    fn from((payer, university, amount, invoice_ref, status): (Address, Address, U256, String, u8)) -> Self {
        Self {
            payer,
            university,
            amount,
            invoice_ref,
            status,
        }
    }
}

pub struct EscrowContract<M> {
    binding: TuitionEscrow<M>,
}

impl<M: Middleware + 'static> EscrowContract<M> {
    pub fn new(binding: TuitionEscrow<M>) -> Self {
        Self { binding }
    }

    pub fn address(&self) -> Address {
        self.binding.address()
    }

    pub fn binding(&self) -> &TuitionEscrow<M> {
        &self.binding
    }

    pub async fn initialize(
        &self,
        payer: Address,
        university: Address,
        amount: U256,
        invoice_ref: &str,
    ) -> Result<H256> {
        let tx = self.binding.initialize(payer, university, amount, invoice_ref.to_string());
        let pending_tx = tx
            .send()
            .await
            .map_err(|e| WalletError::Contract(e.to_string()))?;

        Ok(pending_tx.tx_hash())
    }

    pub async fn deposit(&self, invoice_ref: &str, amount: U256) -> Result<H256> {
        let tx = self.binding.deposit(invoice_ref.to_string(), amount);
        let pending_tx = tx
            .send()
            .await
            .map_err(|e| WalletError::Contract(e.to_string()))?;

        Ok(pending_tx.tx_hash())
    }

    pub async fn release(&self, invoice_ref: &str) -> Result<H256> {
        let tx = self.binding.release(invoice_ref.to_string());
        let pending_tx = tx
            .send()
            .await
            .map_err(|e| WalletError::Contract(e.to_string()))?;

        Ok(pending_tx.tx_hash())
    }

    pub async fn refund(&self, invoice_ref: &str) -> Result<H256> {
        let tx = self.binding.refund(invoice_ref.to_string());
        let pending_tx = tx
            .send()
            .await
            .map_err(|e| WalletError::Contract(e.to_string()))?;

        Ok(pending_tx.tx_hash())
    }

    pub async fn escrow_info(&self, invoice_ref: &str) -> Result<EscrowInfo> {
        self.binding
            .get_escrow_info(invoice_ref.to_string())
            .call()
            .await
            .map(EscrowInfo::from)
            .map_err(|e| WalletError::Contract(e.to_string()))
    }

    pub async fn escrow_status(&self, invoice_ref: &str) -> Result<u8> {
        self.binding
            .get_escrow_status(invoice_ref.to_string())
            .call()
            .await
            .map_err(|e| WalletError::Contract(e.to_string()))
    }
}

pub struct TokenContract<M> {
    binding: Erc20<M>,
}

impl<M: Middleware + 'static> TokenContract<M> {
    pub fn new(binding: Erc20<M>) -> Self {
        Self { binding }
    }

    pub fn address(&self) -> Address {
        self.binding.address()
    }

    pub fn binding(&self) -> &Erc20<M> {
        &self.binding
    }

    pub async fn approve(&self, spender: Address, amount: U256) -> Result<H256> {
        let tx = self.binding.approve(spender, amount);
        let pending_tx = tx
            .send()
            .await
            .map_err(|e| WalletError::Contract(e.to_string()))?;

        Ok(pending_tx.tx_hash())
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        self.binding
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| WalletError::Contract(e.to_string()))
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256> {
        self.binding
            .balance_of(account)
            .call()
            .await
            .map_err(|e| WalletError::Contract(e.to_string()))
    }

    pub async fn decimals(&self) -> Result<u8> {
        self.binding
            .decimals()
            .call()
            .await
            .map_err(|e| WalletError::Contract(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::utils::id;
    use std::str::FromStr;
    use std::sync::Arc;

    const ESCROW_ADDRESS: &str = "0x1234567890123456789012345678901234567890";
    const TOKEN_ADDRESS: &str = "0x2234567890123456789012345678901234567890";
    const ACCOUNT: &str = "0x3234567890123456789012345678901234567890";

    fn setup_signer() -> WalletSigner<Provider<Http>> {
        let account = Address::from_str(ACCOUNT).unwrap();
        let provider = Provider::<Http>::try_from("http://127.0.0.1:8545")
            .unwrap()
            .with_sender(account);
        WalletSigner::new(account, Arc::new(provider))
    }

    #[test]
    fn test_bindings_require_signer() {
        let escrow = Address::from_str(ESCROW_ADDRESS).unwrap();
        let token = Address::from_str(TOKEN_ADDRESS).unwrap();

        assert!(matches!(
            escrow_binding::<Provider<Http>>(escrow, None),
            Err(WalletError::SignerRequired)
        ));
        assert!(matches!(
            token_binding::<Provider<Http>>(token, None),
            Err(WalletError::SignerRequired)
        ));
    }

    #[test]
    fn test_escrow_binding_interface() {
        let signer = setup_signer();
        let escrow = escrow_binding(Address::from_str(ESCROW_ADDRESS).unwrap(), Some(&signer)).unwrap();

        assert_eq!(escrow.address(), Address::from_str(ESCROW_ADDRESS).unwrap());
        for function in ["initialize", "deposit", "release", "refund", "getEscrowInfo", "getEscrowStatus"] {
            assert!(escrow.abi().function(function).is_ok(), "missing function {}", function);
        }
        for event in ["Deposited", "Released", "Refunded"] {
            assert!(escrow.abi().event(event).is_ok(), "missing event {}", event);
        }
    }

    #[test]
    fn test_token_binding_interface() {
        let signer = setup_signer();
        let token = token_binding(Address::from_str(TOKEN_ADDRESS).unwrap(), Some(&signer)).unwrap();

        assert_eq!(token.address(), Address::from_str(TOKEN_ADDRESS).unwrap());
        for function in ["approve", "allowance", "balanceOf", "decimals"] {
            assert!(token.abi().function(function).is_ok(), "missing function {}", function);
        }
    }

    #[test]
    fn test_calls_are_bound_to_signer() {
        let signer = setup_signer();
        let escrow = escrow_binding(Address::from_str(ESCROW_ADDRESS).unwrap(), Some(&signer)).unwrap();

        let call = escrow.deposit("INV-2024-001".to_string(), U256::from(12_500_000u64));
        let calldata = call.calldata().unwrap();

        assert_eq!(&calldata[..4], &id("deposit(string,uint256)")[..]);
        assert_eq!(escrow.client().default_sender(), Some(signer.address()));
    }

    #[test]
    fn test_escrow_info_from_tuple() {
        let payer = Address::from_str(ACCOUNT).unwrap();
        let university = Address::from_str(ESCROW_ADDRESS).unwrap();

        let info = EscrowInfo::from((payer, university, U256::from(5u64), "INV-1".to_string(), 1u8));

        assert_eq!(info.payer, payer);
        assert_eq!(info.university, university);
        assert_eq!(info.invoice_ref, "INV-1");
        assert_eq!(info.status, 1);
    }
}
