//! Chain endpoint capability and signer contracts
//!
//! These traits are the only way the client layer talks to a chain. The
//! alloy-backed implementations live in `infrastructure::ethereum`; tests
//! plug in scripted endpoints.

use std::fmt;

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::EndpointError;

/// Numeric chain identifier (EIP-155)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        ChainId(id)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A read or simulation request against a single contract
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

impl CallRequest {
    pub fn new(to: Address, data: Bytes) -> Self {
        Self {
            to,
            data,
            ..Default::default()
        }
    }

    pub fn from(mut self, account: Option<Address>) -> Self {
        self.from = account;
        self
    }
}

/// One entry of an aggregated call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateCall {
    pub target: Address,
    pub call_data: Bytes,
}

/// Per-entry result of an aggregated call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOutcome {
    pub success: bool,
    pub return_data: Bytes,
}

/// EIP-1559 fee parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeEstimate {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// Final state of a mined transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub success: bool,
}

/// Per-chain capability handle
///
/// An endpoint is bound to exactly one chain for its whole lifetime.
/// Every async method is a network round trip.
#[async_trait::async_trait]
pub trait ChainEndpoint: Send + Sync + 'static {
    /// Chain this endpoint is bound to
    fn chain_id(&self) -> ChainId;

    /// Whether `aggregate` is available on this chain
    fn supports_aggregation(&self) -> bool;

    /// Execute a read-only call (eth_call)
    async fn call(&self, request: CallRequest) -> Result<Bytes, EndpointError>;

    /// Execute many calls in one round trip
    ///
    /// With `allow_failure` set, a reverting entry yields `success: false`
    /// instead of failing the whole request. The returned list is
    /// index-aligned with `calls`.
    async fn aggregate(
        &self,
        calls: Vec<AggregateCall>,
        allow_failure: bool,
    ) -> Result<Vec<AggregateOutcome>, EndpointError>;

    /// Estimate gas for a call
    async fn estimate_gas(&self, request: CallRequest) -> Result<u64, EndpointError>;

    /// Estimate current fee parameters
    async fn estimate_fees(&self) -> Result<FeeEstimate, EndpointError>;

    /// Next nonce for an account
    async fn nonce(&self, account: Address) -> Result<u64, EndpointError>;

    /// Broadcast a signed transaction, returning its hash
    async fn broadcast(&self, raw: Bytes) -> Result<B256, EndpointError>;

    /// Wait until the transaction is mined
    async fn wait_for_receipt(&self, hash: B256) -> Result<Receipt, EndpointError>;

    /// Display name for logs
    fn endpoint_name(&self) -> String {
        format!("chain-{}", self.chain_id())
    }
}

/// Unsigned EIP-1559 transaction fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub gas_limit: u64,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    pub nonce: Option<u64>,
}

/// Signs transactions for one account
#[async_trait::async_trait]
pub trait TransactionSigner: Send + Sync + 'static {
    /// Signing account, if the signer currently exposes one
    fn account(&self) -> Option<Address>;

    /// Sign and serialize (EIP-2718) a transaction for `chain_id`
    async fn sign_transaction(
        &self,
        tx: &UnsignedTransaction,
        chain_id: ChainId,
    ) -> Result<Bytes, EndpointError>;
}
