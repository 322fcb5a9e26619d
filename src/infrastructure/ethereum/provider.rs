//! Alloy-backed chain endpoint over HTTP, WebSocket or IPC

#[cfg(unix)]
use std::path::PathBuf;

use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, PendingTransactionBuilder, Provider, ProviderBuilder, RootProvider,
};
use tracing::{debug, info};

use super::multicall::{canonical_address, decode_aggregate, encode_aggregate};
use super::types::{convert_receipt, transaction_request};
use crate::config::ChainConfig;
use crate::domain::chain::{
    AggregateCall, AggregateOutcome, CallRequest, ChainEndpoint, ChainId, FeeEstimate, Receipt,
};
use crate::error::{EndpointError, Error, Result};

/// Provider configuration
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }
}

type FilledProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// Concrete provider per transport
enum AlloyProvider {
    Http(FilledProvider),
    WebSocket(FilledProvider),
    #[cfg(unix)]
    Ipc(FilledProvider),
}

// Dispatch a provider method across transports
macro_rules! impl_provider_method {
    ($provider:expr, $method:ident $(, $arg:expr)*) => {
        match $provider {
            AlloyProvider::Http(provider) => provider.$method($($arg),*).await,
            AlloyProvider::WebSocket(provider) => provider.$method($($arg),*).await,
            #[cfg(unix)]
            AlloyProvider::Ipc(provider) => provider.$method($($arg),*).await,
        }
    };
}

impl AlloyProvider {
    async fn connect(config: &ProviderConfig) -> Result<Self> {
        let connect_failed = |err: &dyn std::fmt::Display| {
            Error::Transport(EndpointError::new(format!(
                "failed to connect to {}: {}",
                config.display(),
                err
            )))
        };

        match config {
            ProviderConfig::Http(url) => {
                let rpc_url = url
                    .parse()
                    .map_err(|err| Error::Config(format!("invalid HTTP URL '{}': {}", url, err)))?;
                Ok(AlloyProvider::Http(ProviderBuilder::new().connect_http(rpc_url)))
            }
            ProviderConfig::WebSocket(url) => {
                let provider = ProviderBuilder::new()
                    .connect(url)
                    .await
                    .map_err(|err| connect_failed(&err))?;
                Ok(AlloyProvider::WebSocket(provider))
            }
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => {
                use alloy::providers::IpcConnect;
                let ipc = IpcConnect::new(path.to_string_lossy().to_string());
                let provider = ProviderBuilder::new()
                    .connect_ipc(ipc)
                    .await
                    .map_err(|err| connect_failed(&err))?;
                Ok(AlloyProvider::Ipc(provider))
            }
        }
    }

    fn root(&self) -> &RootProvider {
        match self {
            AlloyProvider::Http(provider) => provider.root(),
            AlloyProvider::WebSocket(provider) => provider.root(),
            #[cfg(unix)]
            AlloyProvider::Ipc(provider) => provider.root(),
        }
    }
}

/// A chain endpoint backed by an alloy provider
///
/// Bound to the chain id verified at connect time.
pub struct AlloyEndpoint {
    provider: AlloyProvider,
    chain_id: ChainId,
    name: String,
    endpoint: String,
    multicall: Option<Address>,
}

impl AlloyEndpoint {
    /// Connect and verify the node reports the configured chain id
    pub async fn connect(config: &ChainConfig) -> Result<Self> {
        let provider_config = config.provider_config()?;
        let expected = config.chain_id();
        let provider = AlloyProvider::connect(&provider_config).await?;

        let reported = impl_provider_method!(&provider, get_chain_id).map_err(EndpointError::from)?;
        if reported != expected.get() {
            return Err(Error::ChainMismatch {
                expected,
                actual: ChainId(reported),
            });
        }

        let multicall = config
            .multicall_address()?
            .or_else(|| canonical_address(expected));

        info!(
            chain_id = %expected,
            name = %config.display_name(),
            endpoint = %provider_config.display(),
            aggregation = multicall.is_some(),
            "connected"
        );

        Ok(Self {
            provider,
            chain_id: expected,
            name: config.display_name(),
            endpoint: provider_config.display(),
            multicall,
        })
    }

    pub fn multicall_address(&self) -> Option<Address> {
        self.multicall
    }
}

#[async_trait::async_trait]
impl ChainEndpoint for AlloyEndpoint {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    fn supports_aggregation(&self) -> bool {
        self.multicall.is_some()
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, EndpointError> {
        let tx = transaction_request(request);
        Ok(impl_provider_method!(&self.provider, call, tx)?)
    }

    async fn aggregate(
        &self,
        calls: Vec<AggregateCall>,
        allow_failure: bool,
    ) -> Result<Vec<AggregateOutcome>, EndpointError> {
        let multicall = self.multicall.ok_or_else(|| {
            EndpointError::new(format!(
                "aggregated calls are not supported on chain {}",
                self.chain_id
            ))
        })?;

        debug!(chain_id = %self.chain_id, calls = calls.len(), %multicall, "aggregate3");
        let data = encode_aggregate(calls, allow_failure);
        let output = self.call(CallRequest::new(multicall, data)).await?;
        decode_aggregate(&output)
    }

    async fn estimate_gas(&self, request: CallRequest) -> Result<u64, EndpointError> {
        let tx = transaction_request(request);
        Ok(impl_provider_method!(&self.provider, estimate_gas, tx)?)
    }

    async fn estimate_fees(&self) -> Result<FeeEstimate, EndpointError> {
        let estimate = impl_provider_method!(&self.provider, estimate_eip1559_fees)?;
        Ok(FeeEstimate {
            max_fee_per_gas: estimate.max_fee_per_gas,
            max_priority_fee_per_gas: estimate.max_priority_fee_per_gas,
        })
    }

    async fn nonce(&self, account: Address) -> Result<u64, EndpointError> {
        Ok(impl_provider_method!(&self.provider, get_transaction_count, account)?)
    }

    async fn broadcast(&self, raw: Bytes) -> Result<B256, EndpointError> {
        let pending = impl_provider_method!(&self.provider, send_raw_transaction, &raw)?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, hash: B256) -> Result<Receipt, EndpointError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), hash)
            .get_receipt()
            .await
            .map_err(|err| EndpointError::new(format!("waiting for {}: {}", hash, err)))?;
        Ok(convert_receipt(&receipt))
    }

    fn endpoint_name(&self) -> String {
        format!("{} ({})", self.name, self.endpoint)
    }
}
