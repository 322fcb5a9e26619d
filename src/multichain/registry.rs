//! Chain id -> endpoint registry

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ChainConfig;
use crate::domain::chain::{ChainEndpoint, ChainId};
use crate::error::{Error, Result};
use crate::infrastructure::ethereum::connect_all;

/// Where a registry's endpoints come from
pub enum RegistrySource {
    /// An existing registry, used as-is
    Registry(ChainRegistry),
    /// Ready endpoints, one per chain
    Endpoints(Vec<Arc<dyn ChainEndpoint>>),
    /// Chain configs to connect to
    Configs(Vec<ChainConfig>),
}

/// Immutable set of chain endpoints keyed by chain id
///
/// Updates produce a new registry; existing ones are never modified.
#[derive(Clone, Default)]
pub struct ChainRegistry {
    endpoints: BTreeMap<ChainId, Arc<dyn ChainEndpoint>>,
}

impl ChainRegistry {
    /// Build from endpoints, rejecting two endpoints for the same chain
    pub fn new(endpoints: impl IntoIterator<Item = Arc<dyn ChainEndpoint>>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for endpoint in endpoints {
            let chain_id = endpoint.chain_id();
            if map.insert(chain_id, endpoint).is_some() {
                return Err(Error::DuplicateChain { chain_id });
            }
        }
        Ok(Self { endpoints: map })
    }

    /// Connect to every configured chain
    pub async fn connect(configs: &[ChainConfig]) -> Result<Self> {
        let mut seen = std::collections::BTreeSet::new();
        for config in configs {
            if !seen.insert(config.chain_id()) {
                return Err(Error::DuplicateChain {
                    chain_id: config.chain_id(),
                });
            }
        }
        Self::new(connect_all(configs).await?)
    }

    pub async fn from_source(source: RegistrySource) -> Result<Self> {
        match source {
            RegistrySource::Registry(registry) => Ok(registry),
            RegistrySource::Endpoints(endpoints) => Self::new(endpoints),
            RegistrySource::Configs(configs) => Self::connect(&configs).await,
        }
    }

    pub fn get(&self, chain_id: ChainId) -> Result<&Arc<dyn ChainEndpoint>> {
        self.endpoints
            .get(&chain_id)
            .ok_or_else(|| Error::UnsupportedChain {
                chain_id,
                configured: self.chain_ids(),
            })
    }

    pub fn has(&self, chain_id: ChainId) -> bool {
        self.endpoints.contains_key(&chain_id)
    }

    /// Configured chain ids, ascending
    pub fn chain_ids(&self) -> Vec<ChainId> {
        self.endpoints.keys().copied().collect()
    }

    /// A new registry with `endpoint` added or replacing its chain's entry
    pub fn with_chain(&self, endpoint: Arc<dyn ChainEndpoint>) -> Self {
        let mut endpoints = self.endpoints.clone();
        endpoints.insert(endpoint.chain_id(), endpoint);
        Self { endpoints }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChainId, &Arc<dyn ChainEndpoint>)> {
        self.endpoints.iter().map(|(id, endpoint)| (*id, endpoint))
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl std::fmt::Debug for ChainRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.endpoints
                    .iter()
                    .map(|(id, endpoint)| (id, endpoint.endpoint_name())),
            )
            .finish()
    }
}
