//! Local private-key signer

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;

use crate::config::SignerConfig;
use crate::domain::chain::{ChainId, TransactionSigner, UnsignedTransaction};
use crate::error::{EndpointError, Error, Result};

/// Signs EIP-1559 transactions with an in-memory key
#[derive(Clone)]
pub struct LocalSigner {
    address: Address,
    wallet: EthereumWallet,
}

impl LocalSigner {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self {
            address: signer.address(),
            wallet: EthereumWallet::from(signer),
        }
    }

    /// Parse a hex private key (with or without `0x`)
    pub fn from_hex(key: &str) -> Result<Self> {
        key.trim()
            .parse::<PrivateKeySigner>()
            .map(Self::new)
            .map_err(|err| Error::Config(format!("invalid private key: {}", err)))
    }

    /// Read the key from the environment variable named in the config
    pub fn from_config(config: &SignerConfig) -> Result<Self> {
        let key = std::env::var(&config.private_key_env).map_err(|_| {
            Error::Config(format!(
                "environment variable {} is not set",
                config.private_key_env
            ))
        })?;
        Self::from_hex(&key)
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait::async_trait]
impl TransactionSigner for LocalSigner {
    fn account(&self) -> Option<Address> {
        Some(self.address)
    }

    async fn sign_transaction(
        &self,
        tx: &UnsignedTransaction,
        chain_id: ChainId,
    ) -> Result<Bytes, EndpointError> {
        let nonce = tx
            .nonce
            .ok_or_else(|| EndpointError::new("transaction has no nonce"))?;

        let request = TransactionRequest::default()
            .with_from(tx.from.unwrap_or(self.address))
            .with_to(tx.to)
            .with_input(tx.data.clone())
            .with_value(tx.value)
            .with_nonce(nonce)
            .with_chain_id(chain_id.get())
            .with_gas_limit(tx.gas_limit)
            .with_max_fee_per_gas(tx.max_fee_per_gas)
            .with_max_priority_fee_per_gas(tx.max_priority_fee_per_gas);

        let envelope = <TransactionRequest as TransactionBuilder<Ethereum>>::build(request, &self.wallet)
            .await
            .map_err(|err| EndpointError::new(format!("failed to sign transaction: {}", err)))?;

        Ok(envelope.encoded_2718().into())
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
