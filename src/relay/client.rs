//! Flashbots-style relay client.
//!
//! # Responsibilities
//! - Sign and send `eth_callBundle` / `eth_sendBundle` JSON-RPC requests
//! - Classify simulation results by their first reverting entry
//! - Watch the chain until the target block resolves the submission

use alloy::primitives::{hex, keccak256, B256};
use alloy::rpc::types::mev::{EthBundleHash, EthCallBundle, EthSendBundle};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::{BlockchainResult, ChainReader, KeyHolder};
use crate::bundle::{Bundle, TargetBlock};
use crate::config::{RelayConfig, WorkflowConfig};
use crate::error::{BundlerError, BundlerResult};
use crate::relay::error::{RelayError, RelayResult};
use crate::relay::types::{
    BundleRelay, Resolution, SimulationOutcome, SimulationReport, SubmissionHandle,
};

/// Header carrying `<address>:<signature>` over the request body.
pub const SIGNATURE_HEADER: &str = "X-Flashbots-Signature";

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: [P; 1],
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    #[serde(default)]
    code: i64,
    message: String,
}

/// Relay client authenticated by one key holder.
///
/// The chain reader is used only while awaiting resolution.
pub struct FlashbotsRelay<C, K> {
    http: reqwest::Client,
    url: url::Url,
    auth: K,
    chain: C,
    poll_interval: Duration,
    grace_blocks: u64,
    /// Blocks assumed outstanding when the height can't be read.
    target_offset: u64,
    block_time: Duration,
}

impl<C, K> std::fmt::Debug for FlashbotsRelay<C, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlashbotsRelay")
            .field("url", &self.url.as_str())
            .field("poll_interval", &self.poll_interval)
            .field("grace_blocks", &self.grace_blocks)
            .finish_non_exhaustive()
    }
}

impl<C: ChainReader, K: KeyHolder> FlashbotsRelay<C, K> {
    /// Create a relay client.
    ///
    /// # Arguments
    /// * `relay` - Endpoint and request timeout
    /// * `workflow` - Polling cadence and resolution budget
    /// * `auth` - Key holder whose signature authenticates every request
    /// * `chain` - Reader used to observe the target block
    pub fn new(relay: &RelayConfig, workflow: &WorkflowConfig, auth: K, chain: C) -> BundlerResult<Self> {
        let url: url::Url = relay
            .url
            .parse()
            .map_err(|e| BundlerError::Configuration(format!("invalid relay URL: {}", e)))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(relay.request_timeout_secs))
            .build()
            .map_err(|e| BundlerError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url,
            auth,
            chain,
            poll_interval: Duration::from_millis(workflow.poll_interval_ms),
            grace_blocks: workflow.grace_blocks,
            target_offset: workflow.target_block_offset,
            block_time: Duration::from_secs(workflow.block_time_secs),
        })
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// `<address>:<signature>` where the signature is an EIP-191 message
    /// signature over the hex-encoded keccak256 of `body`.
    pub async fn signature_header(&self, body: &[u8]) -> RelayResult<String> {
        let digest = hex::encode_prefixed(keccak256(body));
        let signature = self
            .auth
            .sign_message(digest.as_bytes())
            .await
            .map_err(|e| RelayError::Auth(e.to_string()))?;
        Ok(format!("{}:{}", self.auth.address(), hex::encode_prefixed(signature.as_bytes())))
    }

    async fn request<P, T>(&self, method: &str, params: P) -> RelayResult<T>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let body = serde_json::to_vec(&JsonRpcRequest { jsonrpc: "2.0", id: 1, method, params: [params] })
            .map_err(|e| RelayError::Decode(format!("failed to encode request: {}", e)))?;
        let signature = self.signature_header(&body).await?;

        tracing::debug!(method, url = %self.url, bytes = body.len(), "Sending relay request");

        let response = self
            .http
            .post(self.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(RelayError::Http { status: status.as_u16(), body: text });
        }

        let parsed: JsonRpcResponse<T> =
            serde_json::from_str(&text).map_err(|e| RelayError::Decode(format!("{}: {}", e, text)))?;
        if let Some(error) = parsed.error {
            return Err(RelayError::Rpc { code: error.code, message: error.message });
        }
        parsed
            .result
            .ok_or_else(|| RelayError::Decode(format!("response has neither result nor error: {}", text)))
    }

    /// Walk the chain until `handle`'s target block exists, then classify it.
    ///
    /// Read failures are logged and retried on the next tick; the caller
    /// bounds the whole wait.
    async fn resolve(&self, handle: &SubmissionHandle) -> Resolution {
        let target = handle.target_block.number();
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.chain.block_number().await {
                Ok(height) if height >= target => break,
                Ok(height) => {
                    tracing::debug!(height, target, "Waiting for target block");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Block number poll failed, retrying");
                }
            }
        }

        loop {
            match self.classify(handle).await {
                Ok(resolution) => return resolution,
                Err(e) => {
                    tracing::warn!(error = %e, target, "Resolution lookup failed, retrying");
                }
            }
            ticker.tick().await;
        }
    }

    /// Inclusion or the reason for non-inclusion, once the target is mined.
    async fn classify(&self, handle: &SubmissionHandle) -> BlockchainResult<Resolution> {
        let mut receipts = Vec::with_capacity(handle.entries.len());
        for entry in &handle.entries {
            match self.chain.transaction_receipt(entry.tx_hash).await? {
                Some(receipt) => receipts.push(receipt),
                None => break,
            }
        }
        if receipts.len() == handle.entries.len() {
            return Ok(Resolution::Included(receipts));
        }

        for entry in &handle.entries {
            let nonce = self.chain.transaction_count(entry.signer).await?;
            if nonce > entry.nonce {
                tracing::debug!(signer = %entry.signer, chain_nonce = nonce, bundle_nonce = entry.nonce, "Signer nonce moved past bundle");
                return Ok(Resolution::AccountNonceTooHigh);
            }
        }

        Ok(Resolution::BlockPassedWithoutInclusion)
    }

    /// Upper bound on waiting: the blocks still to come plus the grace
    /// allowance, at the configured block time. Never less than one block.
    fn resolution_budget(&self, height: u64, target: u64) -> Duration {
        let blocks = target.saturating_sub(height).saturating_add(self.grace_blocks).max(1);
        self.block_time.saturating_mul(u32::try_from(blocks).unwrap_or(u32::MAX))
    }
}

impl<C: ChainReader, K: KeyHolder> BundleRelay for FlashbotsRelay<C, K> {
    async fn simulate(&self, bundle: &Bundle, target: TargetBlock) -> BundlerResult<SimulationOutcome> {
        let params = EthCallBundle {
            txs: bundle.raw_txs(),
            block_number: target.number(),
            ..Default::default()
        };
        let report: SimulationReport = self
            .request("eth_callBundle", params)
            .await
            .map_err(|e| BundlerError::Relay(e.to_string()))?;

        tracing::debug!(
            target_block = %target,
            total_gas_used = report.total_gas_used,
            entries = report.results.len(),
            "Simulation report received"
        );

        Ok(SimulationOutcome::from_report(report))
    }

    async fn submit(&self, bundle: &Bundle, target: TargetBlock) -> BundlerResult<SubmissionHandle> {
        let params = EthSendBundle {
            txs: bundle.raw_txs(),
            block_number: target.number(),
            ..Default::default()
        };
        let response: EthBundleHash = self
            .request("eth_sendBundle", params)
            .await
            .map_err(|e| BundlerError::Submission(e.to_string()))?;

        let bundle_hash: B256 = response.bundle_hash;
        Ok(SubmissionHandle::new(bundle_hash, target, bundle))
    }

    async fn await_resolution(&self, handle: &SubmissionHandle) -> BundlerResult<Resolution> {
        let target = handle.target_block.number();
        let height = match self.chain.block_number().await {
            Ok(height) => height,
            Err(e) => {
                tracing::warn!(error = %e, "Block number read failed, assuming the full target offset remains");
                target.saturating_sub(self.target_offset)
            }
        };
        let budget = self.resolution_budget(height, target);

        tracing::debug!(height, target, budget_secs = budget.as_secs(), "Awaiting bundle resolution");

        match timeout(budget, self.resolve(handle)).await {
            Ok(resolution) => Ok(resolution),
            Err(_) => Err(BundlerError::ConfirmationTimeout {
                target_block: target,
                waited_secs: budget.as_secs(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{EntryReceipt, Wallet};
    use alloy::primitives::{Address, Bytes, Signature, TxHash};
    use alloy::rpc::types::TransactionRequest;

    const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    struct IdleChain;

    impl ChainReader for IdleChain {
        async fn block_number(&self) -> BlockchainResult<u64> {
            Ok(0)
        }
        async fn transaction_count(&self, _address: Address) -> BlockchainResult<u64> {
            Ok(0)
        }
        async fn gas_price(&self) -> BlockchainResult<u128> {
            Ok(1)
        }
        async fn call(&self, _request: TransactionRequest) -> BlockchainResult<Bytes> {
            Ok(Bytes::new())
        }
        async fn transaction_receipt(&self, _tx_hash: TxHash) -> BlockchainResult<Option<EntryReceipt>> {
            Ok(None)
        }
    }

    fn relay(grace_blocks: u64) -> FlashbotsRelay<IdleChain, Wallet> {
        let workflow = WorkflowConfig { grace_blocks, block_time_secs: 12, ..WorkflowConfig::default() };
        let wallet = Wallet::from_private_key(KEY, 1).unwrap();
        FlashbotsRelay::new(&RelayConfig::default(), &workflow, wallet, IdleChain).unwrap()
    }

    #[tokio::test]
    async fn test_signature_header_recovers_to_auth_address() {
        let relay = relay(2);
        let body = br#"{"jsonrpc":"2.0","id":1,"method":"eth_callBundle","params":[]}"#;
        let header = relay.signature_header(body).await.unwrap();

        let (address, signature) = header.split_once(':').unwrap();
        assert_eq!(address.parse::<Address>().unwrap(), relay.auth.address());

        let bytes = hex::decode(signature).unwrap();
        let signature = Signature::try_from(bytes.as_slice()).unwrap();
        let digest = hex::encode_prefixed(keccak256(body));
        let recovered = signature.recover_address_from_msg(digest.as_bytes()).unwrap();
        assert_eq!(recovered, relay.auth.address());
    }

    #[test]
    fn test_resolution_budget() {
        let relay = relay(2);
        assert_eq!(relay.resolution_budget(100, 103), Duration::from_secs(5 * 12));
        assert_eq!(relay.resolution_budget(110, 103), Duration::from_secs(2 * 12));

        let relay = self::relay(0);
        assert_eq!(relay.resolution_budget(110, 103), Duration::from_secs(12));
    }

    #[test]
    fn test_rejects_invalid_url() {
        let config = RelayConfig { url: "not a url".to_string(), ..RelayConfig::default() };
        let wallet = Wallet::from_private_key(KEY, 1).unwrap();
        let result = FlashbotsRelay::new(&config, &WorkflowConfig::default(), wallet, IdleChain);
        assert!(matches!(result, Err(BundlerError::Configuration(_))));
    }

    #[test]
    fn test_debug_omits_key() {
        let rendered = format!("{:?}", relay(2));
        assert!(rendered.contains("relay.flashbots.net"));
        assert!(!rendered.contains(KEY));
    }
}
