//! Scripted chain endpoint and signer shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};

use omnicall::domain::{
    AggregateCall, AggregateOutcome, CallRequest, FeeEstimate, Receipt, UnsignedTransaction,
};
use omnicall::infrastructure::abi::{encode_call, resolve_function};
use omnicall::{ChainEndpoint, ChainId, EndpointError, TransactionSigner};

pub const TOKEN_A: Address = Address::repeat_byte(0xaa);
pub const TOKEN_B: Address = Address::repeat_byte(0xbb);
pub const HOLDER: Address = Address::repeat_byte(0x11);
pub const ACCOUNT: Address = Address::repeat_byte(0x22);

pub fn token_abi() -> Arc<JsonAbi> {
    Arc::new(
        JsonAbi::parse([
            "function balanceOf(address owner) view returns (uint256)",
            "function totalSupply() view returns (uint256)",
            "function transfer(address to, uint256 amount) returns (bool)",
            "error InsufficientBalance(uint256 available, uint256 required)",
        ])
        .unwrap(),
    )
}

pub fn calldata(abi: &JsonAbi, function: &str, args: &[DynSolValue]) -> Bytes {
    encode_call(resolve_function(abi, function, args.len()).unwrap(), args).unwrap()
}

pub fn uint(value: u64) -> DynSolValue {
    DynSolValue::Uint(U256::from(value), 256)
}

pub fn encoded_uint(value: u64) -> Bytes {
    uint(value).abi_encode().into()
}

pub fn insufficient_balance(available: u64, required: u64) -> Bytes {
    let mut data = keccak256("InsufficientBalance(uint256,uint256)")[..4].to_vec();
    data.extend(DynSolValue::Tuple(vec![uint(available), uint(required)]).abi_encode_params());
    data.into()
}

/// Wrap revert bytes the way a node error surfaces them
pub fn reverted(data: impl Into<Bytes>) -> EndpointError {
    EndpointError::new("server returned an error response")
        .caused_by(EndpointError::new("execution reverted").caused_by(EndpointError::revert(
            "execution reverted",
            data,
        )))
}

#[derive(Default)]
pub struct Counters {
    pub call: AtomicUsize,
    pub aggregate: AtomicUsize,
    pub estimate_gas: AtomicUsize,
    pub estimate_fees: AtomicUsize,
    pub nonce: AtomicUsize,
    pub broadcast: AtomicUsize,
    pub wait_for_receipt: AtomicUsize,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        [
            &self.call,
            &self.aggregate,
            &self.estimate_gas,
            &self.estimate_fees,
            &self.nonce,
            &self.broadcast,
            &self.wait_for_receipt,
        ]
        .iter()
        .map(|counter| Counters::get(counter))
        .sum()
    }
}

/// Endpoint answering calls from a calldata -> response script
///
/// Aggregated calls are answered from the same script: an `Ok` entry is a
/// successful item, an error carrying revert data is a failed item.
pub struct MockEndpoint {
    chain_id: ChainId,
    aggregation: bool,
    responses: HashMap<Bytes, Result<Bytes, EndpointError>>,
    aggregate_error: Option<EndpointError>,
    gas_error: Option<EndpointError>,
    delay: Option<Duration>,
    pub counters: Counters,
    pub aggregate_sizes: Mutex<Vec<usize>>,
    pub simulated_from: Mutex<Vec<Option<Address>>>,
}

impl MockEndpoint {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id: ChainId(chain_id),
            aggregation: false,
            responses: HashMap::new(),
            aggregate_error: None,
            gas_error: None,
            delay: None,
            counters: Counters::default(),
            aggregate_sizes: Mutex::new(Vec::new()),
            simulated_from: Mutex::new(Vec::new()),
        }
    }

    pub fn with_aggregation(mut self) -> Self {
        self.aggregation = true;
        self
    }

    pub fn respond(mut self, calldata: Bytes, output: Bytes) -> Self {
        self.responses.insert(calldata, Ok(output));
        self
    }

    pub fn fail(mut self, calldata: Bytes, error: EndpointError) -> Self {
        self.responses.insert(calldata, Err(error));
        self
    }

    pub fn fail_aggregate(mut self, error: EndpointError) -> Self {
        self.aggregate_error = Some(error);
        self
    }

    pub fn fail_gas(mut self, error: EndpointError) -> Self {
        self.gas_error = Some(error);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn lookup(&self, data: &Bytes) -> Result<Bytes, EndpointError> {
        self.responses
            .get(data)
            .cloned()
            .unwrap_or_else(|| Err(EndpointError::new(format!("no response scripted for {:?}", data))))
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait::async_trait]
impl ChainEndpoint for MockEndpoint {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    fn supports_aggregation(&self) -> bool {
        self.aggregation
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, EndpointError> {
        self.counters.call.fetch_add(1, Ordering::SeqCst);
        self.simulated_from.lock().unwrap().push(request.from);
        self.pause().await;
        self.lookup(&request.data)
    }

    async fn aggregate(
        &self,
        calls: Vec<AggregateCall>,
        allow_failure: bool,
    ) -> Result<Vec<AggregateOutcome>, EndpointError> {
        self.counters.aggregate.fetch_add(1, Ordering::SeqCst);
        self.aggregate_sizes.lock().unwrap().push(calls.len());
        assert!(allow_failure, "batches always allow per-item failure");
        self.pause().await;

        if let Some(error) = &self.aggregate_error {
            return Err(error.clone());
        }

        calls
            .iter()
            .map(|call| match self.lookup(&call.call_data) {
                Ok(return_data) => Ok(AggregateOutcome {
                    success: true,
                    return_data,
                }),
                Err(error) => match error.find_revert_data() {
                    Some(data) => Ok(AggregateOutcome {
                        success: false,
                        return_data: data.clone(),
                    }),
                    None => Err(error),
                },
            })
            .collect()
    }

    async fn estimate_gas(&self, _request: CallRequest) -> Result<u64, EndpointError> {
        self.counters.estimate_gas.fetch_add(1, Ordering::SeqCst);
        match &self.gas_error {
            Some(error) => Err(error.clone()),
            None => Ok(52_000),
        }
    }

    async fn estimate_fees(&self) -> Result<FeeEstimate, EndpointError> {
        self.counters.estimate_fees.fetch_add(1, Ordering::SeqCst);
        Ok(FeeEstimate {
            max_fee_per_gas: 30_000_000_000,
            max_priority_fee_per_gas: 1_000_000_000,
        })
    }

    async fn nonce(&self, _account: Address) -> Result<u64, EndpointError> {
        self.counters.nonce.fetch_add(1, Ordering::SeqCst);
        Ok(7)
    }

    async fn broadcast(&self, raw: Bytes) -> Result<B256, EndpointError> {
        self.counters.broadcast.fetch_add(1, Ordering::SeqCst);
        Ok(keccak256(&raw))
    }

    async fn wait_for_receipt(&self, hash: B256) -> Result<Receipt, EndpointError> {
        self.counters.wait_for_receipt.fetch_add(1, Ordering::SeqCst);
        Ok(Receipt {
            transaction_hash: hash,
            block_number: Some(100),
            gas_used: 51_000,
            success: true,
        })
    }
}

/// Signer that records what it was asked to sign
pub struct MockSigner {
    account: Option<Address>,
    pub signed: Mutex<Vec<(UnsignedTransaction, ChainId)>>,
}

impl MockSigner {
    pub fn new(account: Option<Address>) -> Arc<Self> {
        Arc::new(Self {
            account,
            signed: Mutex::new(Vec::new()),
        })
    }

    pub fn sign_count(&self) -> usize {
        self.signed.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl TransactionSigner for MockSigner {
    fn account(&self) -> Option<Address> {
        self.account
    }

    async fn sign_transaction(
        &self,
        tx: &UnsignedTransaction,
        chain_id: ChainId,
    ) -> Result<Bytes, EndpointError> {
        self.signed.lock().unwrap().push((tx.clone(), chain_id));
        let mut raw = vec![0x02];
        raw.extend_from_slice(&chain_id.get().to_be_bytes());
        raw.extend_from_slice(&tx.data);
        Ok(raw.into())
    }
}
