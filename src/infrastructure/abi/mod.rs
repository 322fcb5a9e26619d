//! ABI infrastructure - alloy-based call encoding and revert decoding

mod codec;
mod decoder;
mod format;
mod loader;

pub use codec::{decode_output, encode_call, parse_args, resolve_function};
pub use decoder::{
    AbiErrorDecoder, RawRevertDecoder, SelectorDecoder, StandardRevertDecoder,
};
pub use format::{format_value, to_json};
pub use loader::{error_registry, load_abi, parse_abi};
