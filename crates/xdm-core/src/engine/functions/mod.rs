use crate::consts::{FNS, XS};
use crate::engine::runtime::FunctionRegistry;
use crate::xdm::{IntegerType, StringType};

pub mod boolean;
mod common;
pub mod constructors;
pub mod numeric;
pub mod sequences;
pub mod strings;

fn register_default_functions<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    reg: &mut FunctionRegistry<N>,
) {
    // ===== Boolean and atomization =====
    reg.register_ns(FNS, "true", 0, boolean::fn_true::<N>);
    reg.register_ns(FNS, "false", 0, boolean::fn_false::<N>);
    reg.register_ns(FNS, "not", 1, boolean::fn_not::<N>);
    reg.register_ns_range(FNS, "boolean", 0, Some(1), boolean::fn_boolean::<N>);
    reg.register_ns_range(FNS, "data", 0, Some(1), boolean::data_fn::<N>);

    // ===== Numeric and aggregates =====
    reg.register_ns(FNS, "abs", 1, numeric::abs_fn::<N>);
    reg.register_ns_range(FNS, "sum", 1, Some(2), numeric::sum_fn::<N>);
    reg.register_ns(FNS, "avg", 1, numeric::avg_fn::<N>);
    reg.register_ns_range(FNS, "min", 1, Some(2), numeric::min_fn::<N>);
    reg.register_ns_range(FNS, "max", 1, Some(2), numeric::max_fn::<N>);

    // ===== Sequences =====
    reg.register_ns_range(FNS, "distinct-values", 1, Some(2), sequences::distinct_values_fn::<N>);

    // ===== Strings (collation-aware) =====
    reg.register_ns_range(FNS, "substring-before", 2, Some(3), strings::substring_before_fn::<N>);
    reg.register_ns_range(FNS, "substring-after", 2, Some(3), strings::substring_after_fn::<N>);
    reg.register_ns_range(FNS, "contains", 2, Some(3), strings::contains_fn::<N>);
    reg.register_ns_range(FNS, "starts-with", 2, Some(3), strings::starts_with_fn::<N>);
    reg.register_ns_range(FNS, "ends-with", 2, Some(3), strings::ends_with_fn::<N>);
    reg.register_ns_range(FNS, "compare", 2, Some(3), strings::compare_fn::<N>);

    // ===== xs: constructors =====
    let derived = IntegerType::ALL
        .into_iter()
        .map(IntegerType::local_name)
        .chain(StringType::ALL.into_iter().map(StringType::local_name));
    for local in constructors::PRIMITIVE_CONSTRUCTORS.into_iter().chain(derived) {
        reg.register_ns(XS, local, 1, move |ctx, args| {
            constructors::constructor_fn::<N>(ctx, args, local)
        });
    }
}

/// Registry with every built-in `fn:` function and `xs:` constructor.
pub fn default_function_registry<N: 'static + Send + Sync + crate::model::XdmNode + Clone>()
-> FunctionRegistry<N> {
    let mut reg = FunctionRegistry::new();
    register_default_functions(&mut reg);
    tracing::debug!(functions = reg.len(), "built default function registry");
    reg
}
