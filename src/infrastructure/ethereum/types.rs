//! Conversions between alloy types and domain types

use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::TransportError;

use crate::domain::chain::{CallRequest, Receipt};
use crate::error::EndpointError;

impl From<TransportError> for EndpointError {
    /// Keep the node's revert payload, if any, as the innermost cause
    fn from(err: TransportError) -> Self {
        let revert = err.as_error_resp().and_then(|payload| {
            payload
                .as_revert_data()
                .map(|data| (payload.message.to_string(), data))
        });

        let outer = EndpointError::new(err.to_string());
        match revert {
            Some((message, data)) => outer.caused_by(EndpointError::revert(message, data)),
            None => outer,
        }
    }
}

pub fn transaction_request(request: CallRequest) -> TransactionRequest {
    let tx = TransactionRequest::default()
        .to(request.to)
        .input(request.data.into())
        .value(request.value);

    match request.from {
        Some(from) => tx.from(from),
        None => tx,
    }
}

pub fn convert_receipt(receipt: &TransactionReceipt) -> Receipt {
    Receipt {
        transaction_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
        success: receipt.status(),
    }
}
