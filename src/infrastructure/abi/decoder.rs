//! Revert decoder implementations using alloy-dyn-abi and alloy-sol-types

use std::collections::HashMap;

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_json_abi::JsonAbi;
use alloy_primitives::keccak256;
use alloy_sol_types::{Panic, Revert, SolError};

use super::format::format_value;
use super::loader::error_registry;
use crate::domain::revert::{
    ContractFault, DecodedArg, DecoderChain, ErrorRegistry, ErrorSignature, RevertDecoder,
    RevertReason,
};

/// Decodes custom errors declared in an ABI
pub struct AbiErrorDecoder {
    registry: ErrorRegistry,
}

impl AbiErrorDecoder {
    pub fn new(registry: ErrorRegistry) -> Self {
        Self { registry }
    }

    pub fn from_abi(abi: &JsonAbi) -> Self {
        Self::new(error_registry(abi))
    }

    pub fn registry(&self) -> &ErrorRegistry {
        &self.registry
    }

    fn decode_arguments(error: &ErrorSignature, args_data: &[u8]) -> Option<Vec<DecodedArg>> {
        if error.inputs.is_empty() {
            return Some(Vec::new());
        }

        let types: Vec<DynSolType> = error
            .inputs
            .iter()
            .map(|param| param.kind.parse::<DynSolType>().ok())
            .collect::<Option<Vec<_>>>()?;

        let decoded = DynSolType::Tuple(types).abi_decode_params(args_data).ok()?;
        let values = match decoded {
            DynSolValue::Tuple(values) => values,
            other => vec![other],
        };

        Some(
            error
                .inputs
                .iter()
                .zip(values.iter())
                .enumerate()
                .map(|(idx, (param, value))| DecodedArg {
                    name: if param.name.trim().is_empty() {
                        format!("arg{}", idx)
                    } else {
                        param.name.clone()
                    },
                    kind: param.kind.clone(),
                    value: format_value(value),
                })
                .collect(),
        )
    }
}

impl RevertDecoder for AbiErrorDecoder {
    fn decode(&self, data: &[u8]) -> Option<ContractFault> {
        let selector: [u8; 4] = data.get(..4)?.try_into().ok()?;
        let error = self.registry.lookup(selector)?;
        // A known selector with undecodable arguments is left to later decoders
        let arguments = Self::decode_arguments(error, &data[4..])?;

        Some(ContractFault::new(
            RevertReason::Custom {
                name: error.name.clone(),
                signature: error.signature.clone(),
                arguments,
            },
            data.to_vec(),
        ))
    }
}

/// Names bare selectors without decoding their arguments
#[derive(Debug, Default, Clone)]
pub struct SelectorDecoder {
    names: HashMap<[u8; 4], (String, String)>,
}

impl SelectorDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name for a raw selector
    pub fn register(mut self, selector: [u8; 4], name: impl Into<String>) -> Self {
        let name = name.into();
        self.names
            .entry(selector)
            .or_insert_with(|| (name.clone(), name));
        self
    }

    /// Register an error by its signature, e.g. `InsufficientBalance(uint256)`
    pub fn register_signature(mut self, signature: &str) -> Self {
        let signature: String = signature.split_whitespace().collect();
        let hash = keccak256(signature.as_bytes());
        let selector = [hash[0], hash[1], hash[2], hash[3]];
        let name = signature
            .split('(')
            .next()
            .unwrap_or(&signature)
            .to_string();
        self.names.entry(selector).or_insert((name, signature));
        self
    }
}

impl RevertDecoder for SelectorDecoder {
    fn decode(&self, data: &[u8]) -> Option<ContractFault> {
        let selector: [u8; 4] = data.get(..4)?.try_into().ok()?;
        let (name, signature) = self.names.get(&selector)?;
        Some(ContractFault::new(
            RevertReason::Custom {
                name: name.clone(),
                signature: signature.clone(),
                arguments: Vec::new(),
            },
            data.to_vec(),
        ))
    }
}

/// Solidity's built-in `Error(string)` and `Panic(uint256)` reverts
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardRevertDecoder;

impl RevertDecoder for StandardRevertDecoder {
    fn decode(&self, data: &[u8]) -> Option<ContractFault> {
        if let Ok(revert) = Revert::abi_decode(data) {
            return Some(ContractFault::new(
                RevertReason::Message(revert.reason),
                data.to_vec(),
            ));
        }

        if let Ok(panic) = Panic::abi_decode(data) {
            let description = panic.kind().map(|kind| kind.as_str().to_string());
            return Some(ContractFault::new(
                RevertReason::Panic {
                    code: panic.code,
                    description,
                },
                data.to_vec(),
            ));
        }

        None
    }
}

/// Catch-all: every payload becomes an unrecognized revert
#[derive(Debug, Default, Clone, Copy)]
pub struct RawRevertDecoder;

impl RevertDecoder for RawRevertDecoder {
    fn decode(&self, data: &[u8]) -> Option<ContractFault> {
        Some(ContractFault::unrecognized(data.to_vec()))
    }
}

impl DecoderChain {
    /// The ABI's own custom errors, then the built-in revert conventions
    pub fn for_abi(abi: &JsonAbi) -> Self {
        DecoderChain::new()
            .with(AbiErrorDecoder::from_abi(abi))
            .with(StandardRevertDecoder)
    }
}
