//! Contract client: reads plus an optional signing identity

use std::sync::Arc;

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;

use super::batch::MulticallMode;
use super::reader::ContractReader;
use crate::domain::call::{BatchCallSpec, BatchResult};
use crate::domain::chain::{ChainEndpoint, ChainId, TransactionSigner};
use crate::domain::revert::DecoderChain;
use crate::error::Result;

/// A contract ABI bound to one chain, able to read and (with a signer) write
#[derive(Clone)]
pub struct ContractClient {
    pub(super) reader: ContractReader,
    pub(super) signer: Option<Arc<dyn TransactionSigner>>,
}

impl ContractClient {
    pub fn new(abi: Arc<JsonAbi>, endpoint: Arc<dyn ChainEndpoint>) -> Self {
        Self::from_reader(ContractReader::new(abi, endpoint))
    }

    pub fn from_reader(reader: ContractReader) -> Self {
        Self {
            reader,
            signer: None,
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn TransactionSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_decoder(mut self, decoder: DecoderChain) -> Self {
        self.reader = self.reader.with_decoder(decoder);
        self
    }

    pub fn with_multicall(mut self, mode: MulticallMode) -> Self {
        self.reader = self.reader.with_multicall(mode);
        self
    }

    pub fn reader(&self) -> &ContractReader {
        &self.reader
    }

    pub fn chain_id(&self) -> ChainId {
        self.reader.chain_id()
    }

    pub fn abi(&self) -> &JsonAbi {
        self.reader.abi()
    }

    pub fn endpoint(&self) -> &Arc<dyn ChainEndpoint> {
        self.reader.endpoint()
    }

    pub fn signer(&self) -> Option<&Arc<dyn TransactionSigner>> {
        self.signer.as_ref()
    }

    /// Signing account, if a signer is bound and exposes one
    pub fn account(&self) -> Option<Address> {
        self.signer.as_ref().and_then(|signer| signer.account())
    }

    pub async fn read(
        &self,
        address: Address,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<DynSolValue> {
        self.reader.read(address, function, args).await
    }

    pub async fn read_batch(&self, calls: Vec<BatchCallSpec>) -> Result<BatchResult> {
        self.reader.read_batch(calls).await
    }
}

impl std::fmt::Debug for ContractClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractClient")
            .field("reader", &self.reader)
            .field("account", &self.account())
            .finish()
    }
}
