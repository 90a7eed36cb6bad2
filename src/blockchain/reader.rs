//! The read side of the chain as seen by the bundle workflow.

use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;
use std::future::Future;

use crate::blockchain::types::{BlockchainResult, EntryReceipt};

/// Chain state queries the workflow and the relay client depend on.
///
/// Implemented by [`BlockchainClient`] for real nodes; tests substitute
/// in-memory chains.
///
/// [`BlockchainClient`]: crate::blockchain::BlockchainClient
pub trait ChainReader: Send + Sync {
    /// Current block height.
    fn block_number(&self) -> impl Future<Output = BlockchainResult<u64>> + Send;

    /// Next nonce for `address`.
    fn transaction_count(
        &self,
        address: Address,
    ) -> impl Future<Output = BlockchainResult<u64>> + Send;

    /// Node-reported gas price in wei.
    fn gas_price(&self) -> impl Future<Output = BlockchainResult<u128>> + Send;

    /// Execute a read-only contract call against the latest state.
    fn call(
        &self,
        request: TransactionRequest,
    ) -> impl Future<Output = BlockchainResult<Bytes>> + Send;

    /// Receipt for `tx_hash`, if mined.
    fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = BlockchainResult<Option<EntryReceipt>>> + Send;
}
