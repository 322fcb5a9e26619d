//! Revert decoder trait, decoded fault types and the decoder chain

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Bytes, U256};
use serde::{Deserialize, Serialize};

/// A decoded error argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedArg {
    /// Parameter name (or "arg{n}" if unnamed)
    pub name: String,
    /// Solidity type (e.g., "address", "uint256", "(uint256,address)")
    pub kind: String,
    /// Decoded value as a formatted string
    pub value: String,
}

/// What a revert payload was recognized as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertReason {
    /// A named custom error, e.g. `InsufficientBalance(uint256,uint256)`
    Custom {
        name: String,
        signature: String,
        arguments: Vec<DecodedArg>,
    },
    /// Legacy `Error(string)` revert
    Message(String),
    /// Compiler-inserted `Panic(uint256)`
    Panic { code: U256, description: Option<String> },
    /// Payload was not recognized by any specific decoder
    Unrecognized,
}

/// A contract revert translated into a typed fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractFault {
    pub reason: RevertReason,
    /// Raw revert payload
    pub data: Bytes,
}

impl ContractFault {
    pub fn new(reason: RevertReason, data: impl Into<Bytes>) -> Self {
        Self {
            reason,
            data: data.into(),
        }
    }

    /// Generic fault for a payload nobody recognized
    pub fn unrecognized(data: impl Into<Bytes>) -> Self {
        Self::new(RevertReason::Unrecognized, data)
    }

    /// Custom error name, if this is a custom error
    pub fn name(&self) -> Option<&str> {
        match &self.reason {
            RevertReason::Custom { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Check for a custom error by name
    pub fn is(&self, name: &str) -> bool {
        self.name() == Some(name)
    }
}

impl fmt::Display for ContractFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            RevertReason::Custom {
                name, arguments, ..
            } => {
                let args: Vec<String> = arguments
                    .iter()
                    .map(|arg| format!("{}: {}", arg.name, arg.value))
                    .collect();
                write!(f, "execution reverted: {}({})", name, args.join(", "))
            }
            RevertReason::Message(message) => write!(f, "execution reverted: {}", message),
            RevertReason::Panic { code, description } => match description {
                Some(description) => write!(f, "panic 0x{:x}: {}", code, description),
                None => write!(f, "panic 0x{:x}", code),
            },
            RevertReason::Unrecognized => {
                write!(f, "execution reverted with data 0x{}", hex::encode(&self.data))
            }
        }
    }
}

impl std::error::Error for ContractFault {}

/// Turns raw revert bytes into a typed fault
///
/// Returning `None` means "not mine"; the next decoder in a chain gets a
/// turn.
pub trait RevertDecoder: Send + Sync + 'static {
    fn decode(&self, data: &[u8]) -> Option<ContractFault>;
}

impl<F> RevertDecoder for F
where
    F: Fn(&[u8]) -> Option<ContractFault> + Send + Sync + 'static,
{
    fn decode(&self, data: &[u8]) -> Option<ContractFault> {
        self(data)
    }
}

/// Ordered set of decoders, first match wins
///
/// A chain is itself a decoder, so chains nest.
#[derive(Clone, Default)]
pub struct DecoderChain {
    decoders: Vec<Arc<dyn RevertDecoder>>,
}

impl DecoderChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decoder after the existing ones
    pub fn with(mut self, decoder: impl RevertDecoder) -> Self {
        self.decoders.push(Arc::new(decoder));
        self
    }

    /// Append an already shared decoder
    pub fn with_shared(mut self, decoder: Arc<dyn RevertDecoder>) -> Self {
        self.decoders.push(decoder);
        self
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl RevertDecoder for DecoderChain {
    fn decode(&self, data: &[u8]) -> Option<ContractFault> {
        self.decoders.iter().find_map(|decoder| decoder.decode(data))
    }
}

impl fmt::Debug for DecoderChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderChain")
            .field("decoders", &self.decoders.len())
            .finish()
    }
}
