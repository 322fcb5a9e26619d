//! ABI file loading - reads compiler artifacts or raw ABI arrays

use std::fs;
use std::path::Path;

use alloy_json_abi::JsonAbi;

use crate::domain::revert::{ErrorRegistry, ErrorSignature, ParamSpec};
use crate::error::{Error, Result};

/// Load an ABI from a JSON file
///
/// Accepts either a raw ABI array or an artifact object with an `abi` field
/// (Foundry `out/`, Hardhat `artifacts/`).
pub fn load_abi(path: &Path) -> Result<JsonAbi> {
    let content = fs::read_to_string(path)
        .map_err(|err| Error::Config(format!("{}: {}", path.display(), err)))?;
    parse_abi(&content).map_err(|err| Error::Abi(format!("{}: {}", path.display(), err)))
}

/// Parse ABI JSON text (raw array or artifact object)
pub fn parse_abi(content: &str) -> Result<JsonAbi> {
    let value: serde_json::Value = serde_json::from_str(content).map_err(Error::abi)?;

    let abi_value = if value.is_array() {
        value
    } else if let Some(abi) = value.get("abi") {
        abi.clone()
    } else {
        return Err(Error::Abi("no ABI array found".to_string()));
    };

    serde_json::from_value(abi_value).map_err(Error::abi)
}

/// Collect the custom errors declared in an ABI
pub fn error_registry(abi: &JsonAbi) -> ErrorRegistry {
    let mut registry = ErrorRegistry::new();

    for error in abi.errors() {
        let inputs: Vec<ParamSpec> = error
            .inputs
            .iter()
            .map(|input| ParamSpec {
                name: input.name.clone(),
                kind: input.selector_type().into_owned(),
            })
            .collect();

        registry.insert(ErrorSignature {
            selector: error.selector().0,
            name: error.name.clone(),
            signature: error.signature(),
            inputs,
        });
    }

    registry
}
