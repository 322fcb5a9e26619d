//! Omnicall: typed contract access across many EVM chains
//!
//! - `client`: one contract on one chain (reads, batched reads, write pipeline)
//! - `multichain`: the same contract across a registry of chains
//! - `domain`: chain-agnostic types and the endpoint/signer/decoder traits
//! - `infrastructure`: alloy-backed endpoints, signers and ABI handling

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod multichain;

pub use client::{ContractClient, ContractReader, MulticallMode};
pub use domain::{
    BatchCallSpec, BatchResult, CallOutcome, ChainEndpoint, ChainFailure, ChainId, ContractFault,
    CrossChainBatchResult, DecoderChain, ExecuteOptions, Execution, PreparedTransaction,
    RevertDecoder, RevertReason, SignedTransaction, TransactionSigner,
};
pub use error::{EndpointError, Error, Result};
pub use infrastructure::ethereum::{AlloyEndpoint, LocalSigner};
pub use multichain::{ChainRegistry, ClientOptions, MultichainContract, RegistrySource};
