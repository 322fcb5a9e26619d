//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based chain endpoint and signer implementations
//! - ABI loading, call encoding and revert decoding using alloy-dyn-abi

pub mod abi;
pub mod ethereum;
