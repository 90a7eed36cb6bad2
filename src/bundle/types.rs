//! Bundle data model.

use alloy::consensus::TxLegacy;
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};

/// An unsigned transaction as built for the bundle. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDescriptor {
    to: Address,
    value: U256,
    gas_price: u128,
    gas_limit: u64,
    input: Bytes,
}

impl TransactionDescriptor {
    /// A plain value transfer.
    pub fn transfer(to: Address, value: U256, gas_price: u128, gas_limit: u64) -> Self {
        Self { to, value, gas_price, gas_limit, input: Bytes::new() }
    }

    /// A contract call carrying no value.
    pub fn call(to: Address, input: Bytes, gas_price: u128, gas_limit: u64) -> Self {
        Self { to, value: U256::ZERO, gas_price, gas_limit, input }
    }

    pub const fn to(&self) -> Address {
        self.to
    }

    pub const fn value(&self) -> U256 {
        self.value
    }

    pub const fn gas_price(&self) -> u128 {
        self.gas_price
    }

    pub const fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// Call data; empty for plain transfers.
    pub const fn input(&self) -> &Bytes {
        &self.input
    }

    /// The most this transaction can spend on gas: `gas_limit × gas_price`.
    pub fn max_gas_cost(&self) -> U256 {
        U256::from(self.gas_limit) * U256::from(self.gas_price)
    }

    /// Materialize as an EIP-155 legacy transaction.
    pub fn to_legacy(&self, chain_id: u64, nonce: u64) -> TxLegacy {
        TxLegacy {
            chain_id: Some(chain_id),
            nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value: self.value,
            input: self.input.clone(),
        }
    }
}

/// A descriptor bound to exactly one signer's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEntry {
    signer: Address,
    nonce: u64,
    descriptor: TransactionDescriptor,
    tx_hash: TxHash,
    raw: Bytes,
}

impl SignedEntry {
    pub(crate) fn new(
        signer: Address,
        nonce: u64,
        descriptor: TransactionDescriptor,
        tx_hash: TxHash,
        raw: Bytes,
    ) -> Self {
        Self { signer, nonce, descriptor, tx_hash, raw }
    }

    pub const fn signer(&self) -> Address {
        self.signer
    }

    pub const fn nonce(&self) -> u64 {
        self.nonce
    }

    pub const fn descriptor(&self) -> &TransactionDescriptor {
        &self.descriptor
    }

    pub const fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// EIP-2718 encoded signed transaction.
    pub const fn raw(&self) -> &Bytes {
        &self.raw
    }
}

/// Ordered signed entries, executed strictly in sequence within one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    entries: Vec<SignedEntry>,
}

impl Bundle {
    pub(crate) const fn new(entries: Vec<SignedEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SignedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw transactions in bundle order, as sent to the relay.
    pub fn raw_txs(&self) -> Vec<Bytes> {
        self.entries.iter().map(|e| e.raw.clone()).collect()
    }
}

/// The single block height a run's simulation and submission are scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetBlock(u64);

impl TargetBlock {
    /// `height + offset`, or `None` on overflow.
    pub const fn from_height(height: u64, offset: u64) -> Option<Self> {
        match height.checked_add(offset) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    pub const fn number(self) -> u64 {
        self.0
    }
}

impl From<u64> for TargetBlock {
    fn from(number: u64) -> Self {
        Self(number)
    }
}

impl std::fmt::Display for TargetBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
