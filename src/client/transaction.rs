//! Write pipeline: prepare -> sign -> send -> wait
//!
//! Each stage consumes the previous stage's output, so the order is fixed
//! by the types.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, U256};
use tracing::{debug, info};

use super::contract::ContractClient;
use crate::domain::chain::{CallRequest, ChainId, Receipt, UnsignedTransaction};
use crate::domain::transaction::{ExecuteOptions, Execution, PreparedTransaction, SignedTransaction};
use crate::error::{EndpointError, Error, Result};
use crate::infrastructure::abi::{encode_call, resolve_function};

impl ContractClient {
    /// Simulate a state-changing call and gather everything needed to sign it
    ///
    /// The simulation runs from the signer's account when one is bound.
    /// Reverts during simulation or estimation are decoded into contract
    /// faults when the decoder recognizes them.
    pub async fn prepare(
        &self,
        address: Address,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<PreparedTransaction> {
        self.prepare_with_value(address, function, args, U256::ZERO).await
    }

    /// `prepare` for a payable function
    pub async fn prepare_with_value(
        &self,
        address: Address,
        function: &str,
        args: &[DynSolValue],
        value: U256,
    ) -> Result<PreparedTransaction> {
        let chain_id = self.chain_id();
        let abi_function = resolve_function(self.abi(), function, args.len())?;
        let data = encode_call(abi_function, args)?;
        let account = self.account();

        let mut request = CallRequest::new(address, data).from(account);
        request.value = value;

        debug!(%chain_id, %address, function, "simulating transaction");
        self.endpoint()
            .call(request.clone())
            .await
            .map_err(|err| self.reader.classify(err))?;

        let endpoint = self.endpoint();
        let nonce = async {
            match account {
                Some(account) => endpoint.nonce(account).await.map(Some),
                None => Ok::<_, EndpointError>(None),
            }
        };
        let (gas_estimate, fees, nonce) = futures::try_join!(
            endpoint.estimate_gas(request.clone()),
            endpoint.estimate_fees(),
            nonce,
        )
        .map_err(|err| self.reader.classify(err))?;

        debug!(%chain_id, gas_estimate, ?nonce, "transaction prepared");

        Ok(PreparedTransaction {
            request: UnsignedTransaction {
                from: account,
                to: request.to,
                data: request.data,
                value: request.value,
                gas_limit: gas_estimate,
                max_fee_per_gas: fees.max_fee_per_gas,
                max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
                nonce,
            },
            chain_id,
            gas_estimate,
        })
    }

    /// Sign a prepared transaction with the bound signer
    pub async fn sign(&self, prepared: PreparedTransaction) -> Result<SignedTransaction> {
        self.ensure_chain(prepared.chain_id)?;
        let chain_id = prepared.chain_id;

        let signer = self
            .signer
            .as_ref()
            .ok_or(Error::SignerRequired { chain_id })?;
        let account = signer.account().ok_or(Error::AccountRequired { chain_id })?;

        let mut request = prepared.request;
        request.from.get_or_insert(account);

        let raw = signer.sign_transaction(&request, chain_id).await?;
        Ok(SignedTransaction { raw, chain_id })
    }

    /// Broadcast a signed transaction
    pub async fn send(&self, signed: SignedTransaction) -> Result<B256> {
        self.ensure_chain(signed.chain_id)?;

        let hash = self.endpoint().broadcast(signed.raw).await?;
        info!(chain_id = %signed.chain_id, %hash, "transaction sent");
        Ok(hash)
    }

    /// Wait until a sent transaction is mined
    pub async fn wait_for_receipt(&self, hash: B256) -> Result<Receipt> {
        let receipt = self.endpoint().wait_for_receipt(hash).await?;
        info!(
            chain_id = %self.chain_id(),
            %hash,
            block = ?receipt.block_number,
            success = receipt.success,
            "transaction mined"
        );
        Ok(receipt)
    }

    /// prepare, sign, send, and optionally wait
    pub async fn execute(
        &self,
        address: Address,
        function: &str,
        args: &[DynSolValue],
        options: ExecuteOptions,
    ) -> Result<Execution> {
        let prepared = self.prepare(address, function, args).await?;
        let signed = self.sign(prepared).await?;
        let hash = self.send(signed).await?;

        if options.wait_for_receipt {
            Ok(Execution::Confirmed(self.wait_for_receipt(hash).await?))
        } else {
            Ok(Execution::Submitted(hash))
        }
    }

    fn ensure_chain(&self, actual: ChainId) -> Result<()> {
        let expected = self.chain_id();
        if actual != expected {
            return Err(Error::ChainMismatch { expected, actual });
        }
        Ok(())
    }
}
