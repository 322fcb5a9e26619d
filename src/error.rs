//! Fault types shared by every layer

use std::fmt;

use alloy_primitives::Bytes;
use thiserror::Error;

use crate::domain::chain::ChainId;
use crate::domain::revert::ContractFault;

/// Maximum number of links `EndpointError::find` will visit
const MAX_CAUSE_DEPTH: usize = 16;

/// Error reported by a chain endpoint or signer
///
/// Carries an explicit cause chain. Any link may hold the raw revert
/// payload returned by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointError {
    message: String,
    revert_data: Option<Bytes>,
    source: Option<Box<EndpointError>>,
}

impl EndpointError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            revert_data: None,
            source: None,
        }
    }

    /// An error whose payload is the raw revert bytes
    pub fn revert(message: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            message: message.into(),
            revert_data: Some(data.into()),
            source: None,
        }
    }

    /// Attach an underlying cause
    pub fn caused_by(mut self, cause: EndpointError) -> Self {
        self.source = Some(Box::new(cause));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn revert_data(&self) -> Option<&Bytes> {
        self.revert_data.as_ref()
    }

    pub fn cause(&self) -> Option<&EndpointError> {
        self.source.as_deref()
    }

    /// Iterate this error and its causes, outermost first
    pub fn chain(&self) -> impl Iterator<Item = &EndpointError> {
        std::iter::successors(Some(self), |err| err.cause()).take(MAX_CAUSE_DEPTH)
    }

    /// First link in the cause chain matching `predicate`
    pub fn find(&self, predicate: impl Fn(&EndpointError) -> bool) -> Option<&EndpointError> {
        self.chain().find(|err| predicate(err))
    }

    /// First revert payload anywhere in the cause chain
    pub fn find_revert_data(&self) -> Option<&Bytes> {
        self.find(|err| err.revert_data.is_some())
            .and_then(|err| err.revert_data.as_ref())
    }
}

impl fmt::Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EndpointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// Library fault
#[derive(Debug, Error)]
pub enum Error {
    // === Configuration ===
    #[error("chain {chain_id} is not configured (configured chains: {})", format_ids(.configured))]
    UnsupportedChain {
        chain_id: ChainId,
        configured: Vec<ChainId>,
    },

    #[error("chain {chain_id} is configured more than once")]
    DuplicateChain { chain_id: ChainId },

    #[error("invalid configuration: {0}")]
    Config(String),

    // === Transport ===
    #[error(transparent)]
    Transport(#[from] EndpointError),

    #[error("aggregated call of {call_count} calls failed on chain {chain_id}: {source}")]
    BatchRequestFailed {
        chain_id: ChainId,
        call_count: usize,
        #[source]
        source: EndpointError,
    },

    // === Identity ===
    #[error("chain mismatch: expected chain {expected}, got chain {actual}")]
    ChainMismatch { expected: ChainId, actual: ChainId },

    #[error("a signer is required to sign transactions on chain {chain_id}")]
    SignerRequired { chain_id: ChainId },

    #[error("the signer on chain {chain_id} does not expose an account")]
    AccountRequired { chain_id: ChainId },

    // === Contract ===
    #[error(transparent)]
    Contract(#[from] ContractFault),

    #[error("abi error: {0}")]
    Abi(String),

    // === Aggregate ===
    #[error("{failed} of {total} calls failed on chain {chain_id}")]
    PartialBatchFailure {
        chain_id: ChainId,
        failed: usize,
        total: usize,
    },

    #[error("{failed} of {total} chains failed")]
    PartialCrossChainFailure { failed: usize, total: usize },

    #[error("task panicked: {0}")]
    Panicked(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Wrap an ABI encoding or decoding failure
    pub(crate) fn abi(err: impl fmt::Display) -> Self {
        Error::Abi(err.to_string())
    }

    /// Convert a caught panic payload into a fault
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Error::Panicked(message)
    }
}

fn format_ids(ids: &[ChainId]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter()
        .map(ChainId::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
