//! Revert decoding domain models and contracts
//!
//! Defines the decoder trait, the first-match-wins decoder chain and the
//! typed fault a revert payload is translated into, independent of the
//! ABI library doing the actual decoding.

mod decoder;
mod registry;

pub use decoder::{ContractFault, DecodedArg, DecoderChain, RevertDecoder, RevertReason};
pub use registry::{ErrorRegistry, ErrorSignature, ParamSpec};
