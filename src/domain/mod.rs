//! Domain models and contracts
//!
//! Pure types and the capability traits the client layer is written
//! against. Nothing in here performs I/O.

pub mod call;
pub mod chain;
pub mod revert;
pub mod transaction;

pub use call::{BatchCallSpec, BatchResult, CallOutcome, ChainFailure, CrossChainBatchResult};
pub use chain::{
    AggregateCall, AggregateOutcome, CallRequest, ChainEndpoint, ChainId, FeeEstimate, Receipt,
    TransactionSigner, UnsignedTransaction,
};
pub use revert::{
    ContractFault, DecodedArg, DecoderChain, ErrorRegistry, ErrorSignature, ParamSpec,
    RevertDecoder, RevertReason,
};
pub use transaction::{ExecuteOptions, Execution, PreparedTransaction, SignedTransaction};
