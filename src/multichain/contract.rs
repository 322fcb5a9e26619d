//! One contract ABI addressed across many chains

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use tracing::debug;

use super::fanout::{fan_out, group_by_chain};
use super::registry::{ChainRegistry, RegistrySource};
use crate::client::{ContractClient, MulticallMode};
use crate::domain::call::{BatchCallSpec, BatchResult, CrossChainBatchResult};
use crate::domain::chain::{ChainEndpoint, ChainId, TransactionSigner};
use crate::domain::revert::DecoderChain;
use crate::domain::transaction::{ExecuteOptions, Execution};
use crate::error::{Error, Result};

/// Settings applied to every per-chain client
#[derive(Clone, Default)]
pub struct ClientOptions {
    pub signer: Option<Arc<dyn TransactionSigner>>,
    pub decoder: Option<DecoderChain>,
    pub multicall: MulticallMode,
    /// Per-chain overrides of `multicall`
    pub multicall_overrides: BTreeMap<ChainId, MulticallMode>,
}

impl ClientOptions {
    pub fn with_signer(mut self, signer: Arc<dyn TransactionSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_decoder(mut self, decoder: DecoderChain) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn with_multicall(mut self, mode: MulticallMode) -> Self {
        self.multicall = mode;
        self
    }

    pub fn with_chain_multicall(mut self, chain_id: ChainId, mode: MulticallMode) -> Self {
        self.multicall_overrides.insert(chain_id, mode);
        self
    }

    fn multicall_for(&self, chain_id: ChainId) -> MulticallMode {
        self.multicall_overrides
            .get(&chain_id)
            .copied()
            .unwrap_or(self.multicall)
    }
}

/// A contract deployed on several chains
///
/// Holds one `ContractClient` per registry entry, all sharing the same ABI
/// and options.
#[derive(Clone)]
pub struct MultichainContract {
    abi: Arc<JsonAbi>,
    registry: ChainRegistry,
    clients: BTreeMap<ChainId, ContractClient>,
    options: ClientOptions,
}

impl MultichainContract {
    pub fn new(abi: Arc<JsonAbi>, registry: ChainRegistry, options: ClientOptions) -> Self {
        let clients = registry
            .iter()
            .map(|(chain_id, endpoint)| {
                (
                    chain_id,
                    build_client(&abi, Arc::clone(endpoint), &options),
                )
            })
            .collect();

        Self {
            abi,
            registry,
            clients,
            options,
        }
    }

    pub async fn from_source(
        abi: Arc<JsonAbi>,
        source: RegistrySource,
        options: ClientOptions,
    ) -> Result<Self> {
        let registry = ChainRegistry::from_source(source).await?;
        Ok(Self::new(abi, registry, options))
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub fn chain_ids(&self) -> Vec<ChainId> {
        self.registry.chain_ids()
    }

    pub fn has_chain(&self, chain_id: ChainId) -> bool {
        self.clients.contains_key(&chain_id)
    }

    pub fn get_client(&self, chain_id: ChainId) -> Result<&ContractClient> {
        self.clients
            .get(&chain_id)
            .ok_or_else(|| Error::UnsupportedChain {
                chain_id,
                configured: self.chain_ids(),
            })
    }

    /// A new contract with `endpoint` added; `self` is left untouched
    pub fn with_chain(&self, endpoint: Arc<dyn ChainEndpoint>) -> Self {
        let chain_id = endpoint.chain_id();
        let registry = self.registry.with_chain(Arc::clone(&endpoint));
        let mut clients = self.clients.clone();
        clients.insert(chain_id, build_client(&self.abi, endpoint, &self.options));

        Self {
            abi: Arc::clone(&self.abi),
            registry,
            clients,
            options: self.options.clone(),
        }
    }

    /// Run `op` against each requested chain's client concurrently
    ///
    /// Unknown chains fail with `UnsupportedChain` in `failed_chains`
    /// without affecting the others.
    pub async fn fan_out<T, F, Fut>(&self, chain_ids: &[ChainId], op: F) -> CrossChainBatchResult<T>
    where
        F: Fn(ContractClient) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        fan_out(chain_ids, |chain_id| {
            let dispatched = self.get_client(chain_id).cloned().map(&op);
            async move { dispatched?.await }
        })
        .await
    }

    /// Same read on every requested chain
    pub async fn read_across(
        &self,
        chain_ids: &[ChainId],
        address: Address,
        function: &str,
        args: &[DynSolValue],
    ) -> CrossChainBatchResult<DynSolValue> {
        debug!(chains = chain_ids.len(), function, "read across chains");
        self.fan_out(chain_ids, |client| async move {
            client.read(address, function, args).await
        })
        .await
    }

    /// Same batch on every requested chain
    pub async fn read_batch_across(
        &self,
        chain_ids: &[ChainId],
        calls: &[BatchCallSpec],
    ) -> CrossChainBatchResult<BatchResult> {
        debug!(chains = chain_ids.len(), calls = calls.len(), "batch read across chains");
        self.fan_out(chain_ids, |client| async move {
            client.read_batch(calls.to_vec()).await
        })
        .await
    }

    /// Different calls per chain, one batch per chain
    ///
    /// Within a chain, results follow the order the calls were given in.
    pub async fn read_per_chain(
        &self,
        queries: impl IntoIterator<Item = (ChainId, BatchCallSpec)>,
    ) -> CrossChainBatchResult<BatchResult> {
        let groups = group_by_chain(queries);
        let chain_ids: Vec<ChainId> = groups.keys().copied().collect();
        debug!(chains = chain_ids.len(), "per-chain batch read");

        self.fan_out(&chain_ids, |client| {
            let calls = groups.get(&client.chain_id()).cloned().unwrap_or_default();
            async move { client.read_batch(calls).await }
        })
        .await
    }

    /// Same write on every requested chain
    pub async fn execute_across(
        &self,
        chain_ids: &[ChainId],
        address: Address,
        function: &str,
        args: &[DynSolValue],
        options: ExecuteOptions,
    ) -> CrossChainBatchResult<Execution> {
        debug!(chains = chain_ids.len(), function, "execute across chains");
        self.fan_out(chain_ids, |client| async move {
            client.execute(address, function, args, options).await
        })
        .await
    }
}

fn build_client(
    abi: &Arc<JsonAbi>,
    endpoint: Arc<dyn ChainEndpoint>,
    options: &ClientOptions,
) -> ContractClient {
    let chain_id = endpoint.chain_id();
    let mut client =
        ContractClient::new(Arc::clone(abi), endpoint).with_multicall(options.multicall_for(chain_id));
    if let Some(signer) = &options.signer {
        client = client.with_signer(Arc::clone(signer));
    }
    if let Some(decoder) = &options.decoder {
        client = client.with_decoder(decoder.clone());
    }
    client
}
