//! Wallet management and transaction signing.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::consensus::{SignableTransaction, TxLegacy};
use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::{Signature, Signer};
use std::future::Future;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// An identity able to authorize transactions.
///
/// Both bundle participants (funding and spender) are key holders; the
/// funding key holder also signs relay authentication headers.
pub trait KeyHolder: Send + Sync {
    /// Address the signatures recover to.
    fn address(&self) -> Address;

    /// Chain ID the key holder signs for (EIP-155).
    fn chain_id(&self) -> u64;

    /// Sign the signature hash of a legacy transaction.
    fn sign_transaction(
        &self,
        tx: &TxLegacy,
    ) -> impl Future<Output = BlockchainResult<Signature>> + Send;

    /// Sign arbitrary message bytes (with Ethereum prefix).
    fn sign_message(
        &self,
        message: &[u8],
    ) -> impl Future<Output = BlockchainResult<Signature>> + Send;
}

/// Wallet backed by a local private key.
#[derive(Debug, Clone)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID for transaction signing
    ///
    /// # Security
    /// The private key is parsed and stored securely. It is never logged.
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        // Strip 0x prefix if present
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;
        let signer = signer.with_chain_id(Some(chain_id));

        tracing::debug!(
            address = %signer.address(),
            chain_id = chain_id,
            "Wallet initialized"
        );

        Ok(Self { signer, chain_id })
    }

    /// Sign a 32-byte hash.
    pub async fn sign_hash(&self, hash: B256) -> BlockchainResult<Signature> {
        self.signer
            .sign_hash(&hash)
            .await
            .map_err(|e| BlockchainError::Wallet(format!("Signing failed: {}", e)))
    }
}

impl KeyHolder for Wallet {
    fn address(&self) -> Address {
        self.signer.address()
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn sign_transaction(&self, tx: &TxLegacy) -> BlockchainResult<Signature> {
        if tx.chain_id != Some(self.chain_id) {
            return Err(BlockchainError::Wallet(format!(
                "Transaction chain ID {:?} does not match wallet chain ID {}",
                tx.chain_id, self.chain_id
            )));
        }
        self.sign_hash(tx.signature_hash()).await
    }

    async fn sign_message(&self, message: &[u8]) -> BlockchainResult<Signature> {
        self.signer
            .sign_message(message)
            .await
            .map_err(|e| BlockchainError::Wallet(format!("Message signing failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{TxKind, U256};

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn legacy_tx(chain_id: u64) -> TxLegacy {
        TxLegacy {
            chain_id: Some(chain_id),
            nonce: 0,
            gas_price: 30_000_000_000,
            gas_limit: 21_000,
            to: TxKind::Call(Address::ZERO),
            value: U256::from(1u64),
            input: Default::default(),
        }
    }

    #[test]
    fn test_wallet_from_private_key() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 1).unwrap();
        // This is the corresponding address for the test key
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_wallet_with_0x_prefix() {
        let wallet = Wallet::from_private_key(&format!("0x{}", TEST_PRIVATE_KEY), 1).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_invalid_private_key() {
        let result = Wallet::from_private_key("invalid_key", 1);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid private key"));
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 1).unwrap();
        assert!(!format!("{:?}", wallet).contains(TEST_PRIVATE_KEY));
    }

    #[tokio::test]
    async fn test_sign_message() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 1).unwrap();
        let message = b"Hello, World!";
        let signature = wallet.sign_message(message).await.unwrap();
        // Signature should be 65 bytes (r, s, v)
        assert_eq!(signature.as_bytes().len(), 65);
        let recovered = signature.recover_address_from_msg(&message[..]).unwrap();
        assert_eq!(recovered, wallet.address());
    }

    #[tokio::test]
    async fn test_sign_transaction_recovers_to_wallet() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 1).unwrap();
        let tx = legacy_tx(1);
        let signature = wallet.sign_transaction(&tx).await.unwrap();
        let recovered = signature.recover_address_from_prehash(&tx.signature_hash()).unwrap();
        assert_eq!(recovered, wallet.address());
    }

    #[tokio::test]
    async fn test_sign_transaction_rejects_foreign_chain() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 1).unwrap();
        let result = wallet.sign_transaction(&legacy_tx(5)).await;
        assert!(matches!(result, Err(BlockchainError::Wallet(_))));
    }
}
