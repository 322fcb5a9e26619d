//! Cross-chain access: registry of endpoints and concurrent fan-out

mod contract;
mod fanout;
mod registry;

pub use contract::{ClientOptions, MultichainContract};
pub use fanout::{fan_out, group_by_chain};
pub use registry::{ChainRegistry, RegistrySource};
