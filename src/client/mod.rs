//! Single-chain contract access
//!
//! `ContractReader` covers reads and batched reads; `ContractClient` adds
//! the prepare/sign/send pipeline on top when a signer is bound.

mod batch;
mod contract;
mod reader;
mod transaction;

pub use batch::MulticallMode;
pub use contract::ContractClient;
pub use reader::ContractReader;
