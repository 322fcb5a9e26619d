//! Function resolution and call encoding using alloy-dyn-abi

use alloy_dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt, Specifier};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::Bytes;

use crate::error::{Error, Result};

/// Find the function `name` whose arity matches `arg_count`
///
/// Overloads are disambiguated by argument count only; the first match in
/// ABI order wins.
pub fn resolve_function<'a>(abi: &'a JsonAbi, name: &str, arg_count: usize) -> Result<&'a Function> {
    let overloads = abi
        .function(name)
        .ok_or_else(|| Error::Abi(format!("function '{}' not found in abi", name)))?;

    overloads
        .iter()
        .find(|function| function.inputs.len() == arg_count)
        .ok_or_else(|| {
            Error::Abi(format!(
                "no overload of '{}' takes {} argument{}",
                name,
                arg_count,
                if arg_count == 1 { "" } else { "s" }
            ))
        })
}

/// Encode calldata (selector + arguments)
pub fn encode_call(function: &Function, args: &[DynSolValue]) -> Result<Bytes> {
    function
        .abi_encode_input(args)
        .map(Bytes::from)
        .map_err(|err| Error::Abi(format!("failed to encode '{}': {}", function.name, err)))
}

/// Decode return data into a single value
///
/// One output is returned as-is; zero or several outputs become a tuple.
pub fn decode_output(function: &Function, data: &[u8]) -> Result<DynSolValue> {
    let mut values = function
        .abi_decode_output(data)
        .map_err(|err| Error::Abi(format!("failed to decode '{}' output: {}", function.name, err)))?;

    if values.len() == 1 {
        Ok(values.remove(0))
    } else {
        Ok(DynSolValue::Tuple(values))
    }
}

/// Parse textual arguments according to the function's input types
pub fn parse_args(function: &Function, raw: &[String]) -> Result<Vec<DynSolValue>> {
    if raw.len() != function.inputs.len() {
        return Err(Error::Abi(format!(
            "argument count mismatch: '{}' expects {} arguments, got {}",
            function.name,
            function.inputs.len(),
            raw.len()
        )));
    }

    function
        .inputs
        .iter()
        .zip(raw)
        .enumerate()
        .map(|(idx, (param, arg))| {
            let ty: DynSolType = param.resolve().map_err(Error::abi)?;
            ty.coerce_str(arg).map_err(|err| {
                Error::Abi(format!("failed to parse argument {} ({}): {}", idx + 1, ty, err))
            })
        })
        .collect()
}
