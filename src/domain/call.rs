//! Batched read requests and their per-call / per-chain outcomes

use std::collections::BTreeMap;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::Address;

use crate::domain::chain::ChainId;
use crate::error::Error;

/// One read call inside a batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchCallSpec {
    pub address: Address,
    pub function: String,
    pub args: Vec<DynSolValue>,
}

impl BatchCallSpec {
    pub fn new(address: Address, function: impl Into<String>, args: Vec<DynSolValue>) -> Self {
        Self {
            address,
            function: function.into(),
            args,
        }
    }
}

/// Outcome of one call in a batch
#[derive(Debug)]
pub enum CallOutcome<T> {
    Success(T),
    Failure(Error),
}

impl<T> CallOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            CallOutcome::Success(value) => Some(value),
            CallOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            CallOutcome::Success(_) => None,
            CallOutcome::Failure(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<T, Error> {
        match self {
            CallOutcome::Success(value) => Ok(value),
            CallOutcome::Failure(err) => Err(err),
        }
    }
}

impl<T> From<Result<T, Error>> for CallOutcome<T> {
    fn from(result: Result<T, Error>) -> Self {
        match result {
            Ok(value) => CallOutcome::Success(value),
            Err(err) => CallOutcome::Failure(err),
        }
    }
}

/// Result of a batch on one chain
///
/// `results[i]` is the outcome of `calls[i]`.
#[derive(Debug)]
pub struct BatchResult<T = DynSolValue> {
    pub chain_id: ChainId,
    pub results: Vec<CallOutcome<T>>,
    pub calls: Vec<BatchCallSpec>,
}

impl<T> BatchResult<T> {
    pub fn empty(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            results: Vec::new(),
            calls: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Failed calls paired with their errors, in input order
    pub fn failures(&self) -> Vec<(&BatchCallSpec, &Error)> {
        self.calls
            .iter()
            .zip(&self.results)
            .filter_map(|(call, outcome)| outcome.error().map(|err| (call, err)))
            .collect()
    }

    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|o| !o.is_success()).count()
    }

    /// True when every call succeeded
    pub fn is_complete(&self) -> bool {
        self.results.iter().all(CallOutcome::is_success)
    }

    /// All values in input order, or a summary fault if any call failed
    pub fn into_values(self) -> Result<Vec<T>, Error> {
        let failed = self.failure_count();
        if failed > 0 {
            return Err(Error::PartialBatchFailure {
                chain_id: self.chain_id,
                failed,
                total: self.results.len(),
            });
        }
        self.results.into_iter().map(CallOutcome::into_result).collect()
    }
}

/// A chain whose whole operation failed during a fan-out
#[derive(Debug)]
pub struct ChainFailure {
    pub chain_id: ChainId,
    pub error: Error,
}

/// Merged outcome of one operation run across several chains
///
/// Every requested chain appears in exactly one of the two collections.
#[derive(Debug)]
pub struct CrossChainBatchResult<T> {
    pub results_by_chain: BTreeMap<ChainId, T>,
    pub failed_chains: Vec<ChainFailure>,
}

impl<T> Default for CrossChainBatchResult<T> {
    fn default() -> Self {
        Self {
            results_by_chain: BTreeMap::new(),
            failed_chains: Vec::new(),
        }
    }
}

impl<T> CrossChainBatchResult<T> {
    pub fn get(&self, chain_id: ChainId) -> Option<&T> {
        self.results_by_chain.get(&chain_id)
    }

    pub fn failure(&self, chain_id: ChainId) -> Option<&Error> {
        self.failed_chains
            .iter()
            .find(|failure| failure.chain_id == chain_id)
            .map(|failure| &failure.error)
    }

    pub fn succeeded_chains(&self) -> Vec<ChainId> {
        self.results_by_chain.keys().copied().collect()
    }

    pub fn failed_chain_ids(&self) -> Vec<ChainId> {
        self.failed_chains.iter().map(|f| f.chain_id).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failed_chains.is_empty()
    }

    pub fn total(&self) -> usize {
        self.results_by_chain.len() + self.failed_chains.len()
    }

    /// Per-chain values, or a summary fault if any chain failed
    pub fn into_result(self) -> Result<BTreeMap<ChainId, T>, Error> {
        if self.failed_chains.is_empty() {
            Ok(self.results_by_chain)
        } else {
            Err(Error::PartialCrossChainFailure {
                failed: self.failed_chains.len(),
                total: self.total(),
            })
        }
    }
}
