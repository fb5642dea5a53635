use alloy::json_abi::{Function, JsonAbi, StateMutability};

use super::params::ParamKind;

/// Read-only (`view` / `pure`) functions of a contract, ordered by name.
pub fn read_functions(abi: &JsonAbi) -> Vec<&Function> {
    abi.functions()
        .filter(|f| {
            matches!(
                f.state_mutability,
                StateMutability::View | StateMutability::Pure
            )
        })
        .collect()
}

/// `name(type name, ...) -> (types)`
pub fn describe(function: &Function) -> String {
    let inputs = function
        .inputs
        .iter()
        .map(|p| format!("{} {}", p.ty, p.name).trim_end().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let outputs = function
        .outputs
        .iter()
        .map(|p| p.ty.clone())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}({}) -> ({})", function.name, inputs, outputs)
}

/// Functions shaped like `(bytesN poolId, uintN epoch)` are driven by the
/// configured pool set instead of a free-form first argument.
pub fn is_pool_epoch_call(function: &Function) -> bool {
    if function.inputs.len() != 2 {
        return false;
    }
    let first = ParamKind::from_param(&function.inputs[0]);
    let second = ParamKind::from_param(&function.inputs[1]);
    matches!(
        (first, second),
        (Ok(ParamKind::Bytes { .. }), Ok(ParamKind::Integer { .. }))
    )
}

/// Parameter names, empty where the ABI leaves a parameter unnamed.
pub fn input_names(function: &Function) -> Vec<String> {
    function.inputs.iter().map(|p| p.name.clone()).collect()
}

/// Display label for parameter `index`: its name or `input N`.
pub fn input_label(function: &Function, index: usize) -> String {
    function
        .inputs
        .get(index)
        .map(|p| p.name.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("input {}", index + 1))
}
