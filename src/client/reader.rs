//! Single-chain read access to one contract ABI

use std::sync::Arc;

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use tracing::debug;

use super::batch::MulticallMode;
use crate::domain::chain::{CallRequest, ChainEndpoint, ChainId};
use crate::domain::revert::{ContractFault, DecoderChain, RevertDecoder};
use crate::error::{EndpointError, Error, Result};
use crate::infrastructure::abi::{decode_output, encode_call, resolve_function};

/// A contract ABI bound to one chain endpoint
///
/// The chain id is captured from the endpoint at construction and never
/// changes afterwards.
#[derive(Clone)]
pub struct ContractReader {
    pub(super) abi: Arc<JsonAbi>,
    pub(super) chain_id: ChainId,
    pub(super) endpoint: Arc<dyn ChainEndpoint>,
    pub(super) decoder: Option<DecoderChain>,
    pub(super) multicall: MulticallMode,
}

impl ContractReader {
    pub fn new(abi: Arc<JsonAbi>, endpoint: Arc<dyn ChainEndpoint>) -> Self {
        Self {
            abi,
            chain_id: endpoint.chain_id(),
            endpoint,
            decoder: None,
            multicall: MulticallMode::Auto,
        }
    }

    pub fn with_decoder(mut self, decoder: DecoderChain) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn with_multicall(mut self, mode: MulticallMode) -> Self {
        self.multicall = mode;
        self
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    pub fn endpoint(&self) -> &Arc<dyn ChainEndpoint> {
        &self.endpoint
    }

    pub fn decoder(&self) -> Option<&DecoderChain> {
        self.decoder.as_ref()
    }

    pub fn multicall(&self) -> MulticallMode {
        self.multicall
    }

    /// Call a view function and decode its return value
    ///
    /// Transport failures (including reverts) are returned as
    /// `Error::Transport` without running the revert decoder.
    pub async fn read(
        &self,
        address: Address,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<DynSolValue> {
        let abi_function = resolve_function(&self.abi, function, args.len())?;
        let data = encode_call(abi_function, args)?;

        debug!(chain_id = %self.chain_id, %address, function, "eth_call");
        let output = self.endpoint.call(CallRequest::new(address, data)).await?;

        decode_output(abi_function, &output)
    }

    /// Turn revert bytes into a contract fault, never failing
    pub(super) fn revert_fault(&self, data: &[u8]) -> ContractFault {
        self.decoder
            .as_ref()
            .and_then(|decoder| decoder.decode(data))
            .unwrap_or_else(|| ContractFault::unrecognized(data.to_vec()))
    }

    /// Classify an endpoint failure
    ///
    /// Revert data found anywhere in the cause chain that the decoder
    /// recognizes becomes `Error::Contract`; everything else stays a
    /// transport fault.
    pub(super) fn classify(&self, err: EndpointError) -> Error {
        let fault = match (&self.decoder, err.find_revert_data()) {
            (Some(decoder), Some(data)) => decoder.decode(data),
            _ => None,
        };

        match fault {
            Some(fault) => Error::Contract(fault),
            None => Error::Transport(err),
        }
    }
}

impl std::fmt::Debug for ContractReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractReader")
            .field("chain_id", &self.chain_id)
            .field("endpoint", &self.endpoint.endpoint_name())
            .field("decoder", &self.decoder)
            .field("multicall", &self.multicall)
            .finish()
    }
}
