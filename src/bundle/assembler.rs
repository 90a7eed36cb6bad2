//! Bundle assembly: pair descriptors with signers, resolve nonces, sign, encode.

use alloy::consensus::{SignableTransaction, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::Address;
use std::collections::HashMap;

use crate::blockchain::{ChainReader, KeyHolder};
use crate::bundle::types::{Bundle, SignedEntry, TransactionDescriptor};
use crate::error::{BundlerError, BundlerResult};

/// Turns `(signer, descriptor)` pairs into a signed, ordered [`Bundle`].
#[derive(Debug)]
pub struct BundleAssembler<'a, C> {
    chain: &'a C,
}

impl<'a, C: ChainReader> BundleAssembler<'a, C> {
    pub const fn new(chain: &'a C) -> Self {
        Self { chain }
    }

    /// Sign every entry in input order.
    ///
    /// Each signer's starting nonce is read from the chain once; a signer
    /// appearing again later in the bundle gets the next nonce locally.
    pub async fn assemble<K: KeyHolder>(
        &self,
        entries: &[(&K, TransactionDescriptor)],
    ) -> BundlerResult<Bundle> {
        let mut nonces: HashMap<Address, u64> = HashMap::new();
        let mut signed = Vec::with_capacity(entries.len());

        for (index, (signer, descriptor)) in entries.iter().enumerate() {
            let address = signer.address();
            let nonce = match nonces.get(&address) {
                Some(last) => last + 1,
                None => self
                    .chain
                    .transaction_count(address)
                    .await
                    .map_err(BundlerError::ChainRead)?,
            };
            nonces.insert(address, nonce);

            let entry = sign_entry(*signer, descriptor.clone(), nonce)
                .await
                .map_err(|e| match e {
                    BundlerError::Signing(msg) => BundlerError::Signing(format!("entry {}: {}", index, msg)),
                    other => other,
                })?;

            tracing::debug!(
                index,
                signer = %address,
                nonce,
                tx_hash = %entry.tx_hash(),
                "Signed bundle entry"
            );
            signed.push(entry);
        }

        Ok(Bundle::new(signed))
    }
}

/// Sign one descriptor at `nonce` and encode it for the wire.
pub async fn sign_entry<K: KeyHolder>(
    signer: &K,
    descriptor: TransactionDescriptor,
    nonce: u64,
) -> BundlerResult<SignedEntry> {
    if descriptor.gas_limit() == 0 || descriptor.gas_price() == 0 {
        return Err(BundlerError::Signing(
            "descriptor has zero gas limit or gas price".to_string(),
        ));
    }

    let tx = descriptor.to_legacy(signer.chain_id(), nonce);
    let signature = signer
        .sign_transaction(&tx)
        .await
        .map_err(|e| BundlerError::Signing(e.to_string()))?;

    let envelope = TxEnvelope::from(tx.into_signed(signature));
    let tx_hash = *envelope.tx_hash();
    let raw = envelope.encoded_2718();

    Ok(SignedEntry::new(signer.address(), nonce, descriptor, tx_hash, raw.into()))
}
