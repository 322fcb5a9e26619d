//! Multicall3 `aggregate3` encoding and known deployments

use alloy::primitives::{Address, Bytes};
use alloy::providers::bindings::IMulticall3;
use alloy::providers::MULTICALL3_ADDRESS;
use alloy::sol_types::SolCall;

use crate::domain::chain::{AggregateCall, AggregateOutcome, ChainId};
use crate::error::EndpointError;

/// Chains where Multicall3 is deployed at its canonical address
const CANONICAL_DEPLOYMENTS: &[u64] = &[
    1,        // Ethereum
    10,       // Optimism
    56,       // BNB Smart Chain
    100,      // Gnosis
    137,      // Polygon
    250,      // Fantom
    1101,     // Polygon zkEVM
    5000,     // Mantle
    8453,     // Base
    17000,    // Holesky
    42161,    // Arbitrum One
    42220,    // Celo
    43114,    // Avalanche C-Chain
    59144,    // Linea
    81457,    // Blast
    534352,   // Scroll
    11155111, // Sepolia
    11155420, // OP Sepolia
    84532,    // Base Sepolia
    421614,   // Arbitrum Sepolia
];

/// Canonical Multicall3 address for a chain, if one is known
pub fn canonical_address(chain_id: ChainId) -> Option<Address> {
    CANONICAL_DEPLOYMENTS
        .contains(&chain_id.get())
        .then_some(MULTICALL3_ADDRESS)
}

pub fn encode_aggregate(calls: Vec<AggregateCall>, allow_failure: bool) -> Bytes {
    let calls = calls
        .into_iter()
        .map(|call| IMulticall3::Call3 {
            target: call.target,
            allowFailure: allow_failure,
            callData: call.call_data,
        })
        .collect();

    IMulticall3::aggregate3Call { calls }.abi_encode().into()
}

pub fn decode_aggregate(data: &[u8]) -> Result<Vec<AggregateOutcome>, EndpointError> {
    let results = IMulticall3::aggregate3Call::abi_decode_returns(data)
        .map_err(|err| EndpointError::new(format!("invalid aggregate3 response: {}", err)))?;

    Ok(results
        .into_iter()
        .map(|result| AggregateOutcome {
            success: result.success,
            return_data: result.returnData,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolValue;

    #[test]
    fn test_canonical_address() {
        assert_eq!(canonical_address(ChainId(1)), Some(MULTICALL3_ADDRESS));
        assert_eq!(canonical_address(ChainId(8453)), Some(MULTICALL3_ADDRESS));
        assert_eq!(canonical_address(ChainId(31337)), None);
    }

    #[test]
    fn test_encode_uses_aggregate3_selector() {
        let data = encode_aggregate(
            vec![AggregateCall {
                target: Address::ZERO,
                call_data: Bytes::from(vec![0x18, 0x16, 0x0d, 0xdd]),
            }],
            true,
        );
        assert_eq!(&data[..4], IMulticall3::aggregate3Call::SELECTOR.as_slice());
    }

    #[test]
    fn test_decode_results() {
        let encoded = vec![
            IMulticall3::Result {
                success: true,
                returnData: Bytes::from(vec![0x01]),
            },
            IMulticall3::Result {
                success: false,
                returnData: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
            },
        ]
        .abi_encode();

        let outcomes = decode_aggregate(&encoded).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].success);
        assert!(!outcomes[1].success);
        assert_eq!(outcomes[1].return_data.as_ref(), &[0xde, 0xad, 0xbe, 0xef]);

        assert!(decode_aggregate(&[0x00]).is_err());
    }
}
