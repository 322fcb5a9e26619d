//! Write pipeline values
//!
//! Each stage consumes the previous stage's value by move, so a prepared
//! or signed transaction cannot be reused or skipped over.

use alloy_primitives::{Bytes, B256};

use crate::domain::chain::{ChainId, Receipt, UnsignedTransaction};

/// Output of `prepare`: simulated, estimated, ready to sign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransaction {
    pub request: UnsignedTransaction,
    pub chain_id: ChainId,
    pub gas_estimate: u64,
}

/// Output of `sign`: serialized bytes ready to broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Bytes,
    pub chain_id: ChainId,
}

/// Options for `execute`
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    /// Block until the transaction is mined and return its receipt
    pub wait_for_receipt: bool,
}

impl ExecuteOptions {
    pub fn wait() -> Self {
        Self {
            wait_for_receipt: true,
        }
    }
}

/// Result of `execute`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// Broadcast, not waited on
    Submitted(B256),
    /// Mined
    Confirmed(Receipt),
}

impl Execution {
    pub fn hash(&self) -> B256 {
        match self {
            Execution::Submitted(hash) => *hash,
            Execution::Confirmed(receipt) => receipt.transaction_hash,
        }
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            Execution::Submitted(_) => None,
            Execution::Confirmed(receipt) => Some(receipt),
        }
    }
}
