//! Ethereum infrastructure - Alloy provider and signer implementations

mod multicall;
mod provider;
mod signer;
mod types;

use std::sync::Arc;

use futures::future::try_join_all;

use crate::config::ChainConfig;
use crate::domain::chain::ChainEndpoint;
use crate::error::Result;

pub use multicall::canonical_address;
pub use provider::{AlloyEndpoint, ProviderConfig};
pub use signer::LocalSigner;

/// Connect to every configured chain concurrently
pub async fn connect_all(configs: &[ChainConfig]) -> Result<Vec<Arc<dyn ChainEndpoint>>> {
    let endpoints = try_join_all(configs.iter().map(AlloyEndpoint::connect)).await?;
    Ok(endpoints
        .into_iter()
        .map(|endpoint| Arc::new(endpoint) as Arc<dyn ChainEndpoint>)
        .collect())
}
