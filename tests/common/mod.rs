//! Shared fakes and mock servers for integration tests.
#![allow(dead_code)]

use alloy::consensus::TxLegacy;
use alloy::primitives::{Address, Bytes, Signature, TxHash, B256, U256};
use alloy::rpc::types::TransactionRequest;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use relay_bundler::blockchain::{
    BlockchainError, BlockchainResult, ChainReader, EntryReceipt, KeyHolder, Wallet,
};
use relay_bundler::bundle::{Bundle, TargetBlock};
use relay_bundler::config::{BundlerConfig, TransferParams};
use relay_bundler::error::{BundlerError, BundlerResult};
use relay_bundler::relay::{
    BundleRelay, EntryTrace, Resolution, SimulationOutcome, SimulationReport, SubmissionHandle,
};

/// Anvil account #0.
pub const FUNDING_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
/// Anvil account #1.
pub const SPENDER_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub const GWEI: u128 = 1_000_000_000;

pub fn funding_wallet() -> Wallet {
    Wallet::from_private_key(FUNDING_KEY, 1).unwrap()
}

pub fn spender_wallet() -> Wallet {
    Wallet::from_private_key(SPENDER_KEY, 1).unwrap()
}

pub fn transfer_params() -> TransferParams {
    TransferParams {
        base_gas_price_gwei: "10".to_string(),
        token: Address::repeat_byte(0xaa),
        amount: "2.5".to_string(),
        recipient: "0x000000000000000000000000000000000000dEaD".to_string(),
    }
}

/// Defaults with fast polling.
pub fn test_config() -> BundlerConfig {
    let mut config = BundlerConfig::default();
    config.workflow.poll_interval_ms = 10;
    config.workflow.block_time_secs = 1;
    config
}

pub fn receipt(tx_hash: TxHash, block: u64) -> EntryReceipt {
    EntryReceipt { tx_hash, block_number: Some(block), gas_used: 21_000, status: true }
}

/// In-memory chain. The height advances by `step` on every read.
pub struct FakeChain {
    height: AtomicU64,
    step: u64,
    decimals: Option<u8>,
    gas_price: u128,
    nonces: Mutex<HashMap<Address, u64>>,
    receipts: Mutex<HashMap<TxHash, EntryReceipt>>,
    failures: Mutex<HashMap<&'static str, u64>>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeChain {
    pub fn new(height: u64) -> Self {
        Self {
            height: AtomicU64::new(height),
            step: 0,
            decimals: Some(6),
            gas_price: 7 * GWEI,
            nonces: Mutex::new(HashMap::new()),
            receipts: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn advancing(mut self, step: u64) -> Self {
        self.step = step;
        self
    }

    /// Make every `eth_call` fail, as if the node were unreachable.
    pub fn without_decimals(mut self) -> Self {
        self.decimals = None;
        self
    }

    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.nonces.lock().unwrap().insert(address, nonce);
    }

    pub fn add_receipt(&self, receipt: EntryReceipt) {
        self.receipts.lock().unwrap().insert(receipt.tx_hash, receipt);
    }

    /// Fail the next `count` calls of `method` with a transient RPC error.
    pub fn fail_next(&self, method: &'static str, count: u64) {
        self.failures.lock().unwrap().insert(method, count);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) -> BlockchainResult<()> {
        self.calls.lock().unwrap().push(call);
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(call) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(BlockchainError::Rpc("transient".to_string()))
            }
            _ => Ok(()),
        }
    }
}

impl ChainReader for FakeChain {
    async fn block_number(&self) -> BlockchainResult<u64> {
        self.record("block_number")?;
        Ok(self.height.fetch_add(self.step, Ordering::SeqCst))
    }

    async fn transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        self.record("transaction_count")?;
        Ok(self.nonces.lock().unwrap().get(&address).copied().unwrap_or(0))
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        self.record("gas_price")?;
        Ok(self.gas_price)
    }

    async fn call(&self, _request: TransactionRequest) -> BlockchainResult<Bytes> {
        self.record("call")?;
        match self.decimals {
            Some(decimals) => Ok(Bytes::from(U256::from(decimals).to_be_bytes::<32>().to_vec())),
            None => Err(BlockchainError::Rpc("All providers failed to execute call".to_string())),
        }
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<EntryReceipt>> {
        self.record("transaction_receipt")?;
        Ok(self.receipts.lock().unwrap().get(&tx_hash).cloned())
    }
}

/// A key holder whose key material is unreachable.
pub struct BrokenKeyHolder;

impl KeyHolder for BrokenKeyHolder {
    fn address(&self) -> Address {
        Address::repeat_byte(0xbb)
    }

    fn chain_id(&self) -> u64 {
        1
    }

    async fn sign_transaction(&self, _tx: &TxLegacy) -> BlockchainResult<Signature> {
        Err(BlockchainError::Wallet("hardware signer disconnected".to_string()))
    }

    async fn sign_message(&self, _message: &[u8]) -> BlockchainResult<Signature> {
        Err(BlockchainError::Wallet("hardware signer disconnected".to_string()))
    }
}

/// Recording relay with scripted answers.
pub struct FakeRelay {
    /// Entry index that simulation reports as reverting.
    pub revert_at: Option<usize>,
    pub submit_error: Option<String>,
    pub resolution: Resolution,
    pub bundle_hash: B256,
    simulated: Mutex<Vec<TargetBlock>>,
    submitted: Mutex<Vec<TargetBlock>>,
    bundles: Mutex<Vec<Bundle>>,
}

impl FakeRelay {
    pub fn resolving(resolution: Resolution) -> Self {
        Self {
            revert_at: None,
            submit_error: None,
            resolution,
            bundle_hash: B256::repeat_byte(0x42),
            simulated: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            bundles: Mutex::new(Vec::new()),
        }
    }

    pub fn simulated(&self) -> Vec<TargetBlock> {
        self.simulated.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<TargetBlock> {
        self.submitted.lock().unwrap().clone()
    }

    /// Bundles seen by `simulate` and `submit`, in call order.
    pub fn bundles(&self) -> Vec<Bundle> {
        self.bundles.lock().unwrap().clone()
    }
}

impl BundleRelay for FakeRelay {
    async fn simulate(&self, bundle: &Bundle, target: TargetBlock) -> BundlerResult<SimulationOutcome> {
        self.simulated.lock().unwrap().push(target);
        self.bundles.lock().unwrap().push(bundle.clone());

        let results = bundle
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let reverts = self.revert_at == Some(index);
                EntryTrace {
                    tx_hash: entry.tx_hash(),
                    gas_used: if reverts { 0 } else { 21_000 },
                    from_address: Some(entry.signer()),
                    to_address: Some(entry.descriptor().to()),
                    error: reverts.then(|| "execution reverted".to_string()),
                    revert: reverts.then(|| "ERC20: transfer amount exceeds balance".to_string()),
                }
            })
            .collect::<Vec<_>>();
        let total_gas_used = results.iter().map(|r| r.gas_used).sum();

        Ok(SimulationOutcome::from_report(SimulationReport {
            bundle_hash: None,
            total_gas_used,
            coinbase_diff: None,
            state_block_number: Some(target.number() - 1),
            results,
        }))
    }

    async fn submit(&self, bundle: &Bundle, target: TargetBlock) -> BundlerResult<SubmissionHandle> {
        self.submitted.lock().unwrap().push(target);
        self.bundles.lock().unwrap().push(bundle.clone());
        match &self.submit_error {
            Some(message) => Err(BundlerError::Submission(message.clone())),
            None => Ok(SubmissionHandle::new(self.bundle_hash, target, bundle)),
        }
    }

    async fn await_resolution(&self, handle: &SubmissionHandle) -> BundlerResult<Resolution> {
        match &self.resolution {
            // Fill receipts from the real handle so hashes line up.
            Resolution::Included(_) => Ok(Resolution::Included(
                handle
                    .entries
                    .iter()
                    .map(|e| receipt(e.tx_hash, handle.target_block.number()))
                    .collect(),
            )),
            other => Ok(other.clone()),
        }
    }
}

/// One request captured by [`MockRelayServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Lower-cased header names.
    pub headers: HashMap<String, String>,
    pub body: serde_json::Value,
}

/// Raw-TCP JSON-RPC endpoint answering with `(status, body)` from a handler.
pub struct MockRelayServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockRelayServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler = Arc::new(handler);

        let recorded = requests.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((mut socket, _)) => {
                        let handler = handler.clone();
                        let recorded = recorded.clone();
                        tokio::spawn(async move {
                            let Some(request) = read_request(&mut socket).await else {
                                return;
                            };
                            let (status, body) = handler(&request);
                            recorded.lock().unwrap().push(request);

                            let status_text = match status {
                                200 => "200 OK",
                                400 => "400 Bad Request",
                                500 => "500 Internal Server Error",
                                503 => "503 Service Unavailable",
                                _ => "200 OK",
                            };
                            let response = format!(
                                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                status_text,
                                body.len(),
                                body
                            );
                            let _ = socket.write_all(response.as_bytes()).await;
                            let _ = socket.shutdown().await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Self { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let headers: HashMap<String, String> = head
        .lines()
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();
    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let end = (header_end + content_length).min(buf.len());
    let body = serde_json::from_slice(&buf[header_end..end]).unwrap_or(serde_json::Value::Null);
    Some(RecordedRequest { headers, body })
}

/// JSON-RPC success envelope.
pub fn rpc_result(result: serde_json::Value) -> String {
    serde_json::json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string()
}

/// JSON-RPC error envelope.
pub fn rpc_error(code: i64, message: &str) -> String {
    serde_json::json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": code, "message": message } })
        .to_string()
}
