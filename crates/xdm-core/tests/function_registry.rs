use rstest::{fixture, rstest};
use std::sync::Arc;
use xdm_core::consts::{FNS, SIMPLE_CASE_URI, XS};
use xdm_core::engine::runtime::FunctionRegistry;
use xdm_core::simple_node::{elem, text};
use xdm_core::{
    DynamicContext, DynamicContextBuilder, ErrorCode, ExpandedName, SimpleNode,
    XdmAtomicValue as A, XdmItem, XdmSequence,
};

type N = SimpleNode;

#[fixture]
fn ctx() -> DynamicContext<N> {
    DynamicContextBuilder::default().build()
}

fn seq(values: &[A]) -> XdmSequence<N> {
    values.iter().cloned().map(XdmItem::Atomic).collect()
}

fn call(ctx: &DynamicContext<N>, name: &str, args: &[XdmSequence<N>]) -> Result<Vec<A>, xdm_core::Error> {
    let out = ctx.call_function(&ExpandedName::new(None, name), args)?;
    Ok(out
        .into_iter()
        .map(|i| match i {
            XdmItem::Atomic(a) => a,
            XdmItem::Node(n) => panic!("unexpected node {n:?}"),
        })
        .collect())
}

fn xs(ctx: &DynamicContext<N>, ty: &str, lexical: &str) -> A {
    let out = ctx
        .call_function(&ExpandedName::ns(XS, ty), &[seq(&[A::string(lexical)])])
        .unwrap();
    match out.as_slice() {
        [XdmItem::Atomic(a)] => a.clone(),
        other => panic!("expected one atomic, got {other:?}"),
    }
}

#[rstest]
fn end_to_end_examples(ctx: DynamicContext<N>) {
    let five = xs(&ctx, "decimal", "5.0");
    let min = call(&ctx, "min", &[seq(&[A::integer(3), five])]).unwrap();
    assert_eq!(min.len(), 1);
    assert_eq!(min[0].to_string(), "3");
    assert_eq!(min[0].type_name(), "xs:decimal");

    let two = xs(&ctx, "decimal", "2.0");
    let distinct = call(
        &ctx,
        "distinct-values",
        &[seq(&[A::integer(1), two, A::integer(3), A::integer(2)])],
    )
    .unwrap();
    assert_eq!(distinct.len(), 3);

    let d1 = xs(&ctx, "dayTimeDuration", "P1D");
    let d2 = xs(&ctx, "dayTimeDuration", "PT1H");
    let total = call(&ctx, "sum", &[seq(&[d1, d2])]).unwrap();
    assert_eq!(total[0].to_string(), "P1DT1H");

    let before = call(
        &ctx,
        "substring-before",
        &[seq(&[A::string("tattoo")]), seq(&[A::string("attoo")])],
    )
    .unwrap();
    assert_eq!(before, vec![A::string("t")]);
}

#[rstest]
#[case::unknown_name("no-such-function", 1)]
#[case::abs_arity("abs", 2)]
#[case::substring_before_arity("substring-before", 1)]
#[case::min_arity("min", 3)]
fn unresolvable_calls_are_static_errors(ctx: DynamicContext<N>, #[case] name: &str, #[case] arity: usize) {
    let args = vec![seq(&[A::integer(1)]); arity];
    let err = call(&ctx, name, &args).unwrap_err();
    assert_eq!(err.code_enum(), ErrorCode::XPST0017);
}

#[rstest]
fn empty_arguments(ctx: DynamicContext<N>) {
    assert!(call(&ctx, "abs", &[vec![]]).unwrap().is_empty());
    assert!(call(&ctx, "avg", &[vec![]]).unwrap().is_empty());
    assert!(call(&ctx, "min", &[vec![]]).unwrap().is_empty());
    assert_eq!(call(&ctx, "sum", &[vec![]]).unwrap(), vec![A::integer(0)]);
    assert!(call(&ctx, "sum", &[vec![], vec![]]).unwrap().is_empty());
    assert!(call(&ctx, "compare", &[vec![], seq(&[A::string("a")])]).unwrap().is_empty());
    assert_eq!(
        call(&ctx, "substring-before", &[vec![], seq(&[A::string("a")])]).unwrap(),
        vec![A::string("")]
    );
    let short = ctx
        .call_function(&ExpandedName::ns(XS, "short"), &[vec![]])
        .unwrap();
    assert!(short.is_empty());
}

#[rstest]
fn boolean_and_not(ctx: DynamicContext<N>) {
    let t = call(&ctx, "boolean", &[seq(&[A::string("x")])]).unwrap();
    assert_eq!(t, vec![A::Boolean(true)]);
    let f = call(&ctx, "not", &[seq(&[A::string("x")])]).unwrap();
    assert_eq!(f, vec![A::Boolean(false)]);
    let err = call(&ctx, "not", &[seq(&[A::integer(1), A::integer(2)])]).unwrap_err();
    assert_eq!(err.code_enum(), ErrorCode::FORG0006);
    assert_eq!(call(&ctx, "true", &[]).unwrap(), vec![A::Boolean(true)]);
    assert_eq!(call(&ctx, "false", &[]).unwrap(), vec![A::Boolean(false)]);
}

#[rstest]
fn context_item_boolean(ctx: DynamicContext<N>) {
    let err = call(&ctx, "boolean", &[]).unwrap_err();
    assert_eq!(err.code_enum(), ErrorCode::XPDY0002);

    let with_node: DynamicContext<N> = DynamicContextBuilder::default()
        .with_context_item(elem("a").build())
        .build();
    assert_eq!(call(&with_node, "boolean", &[]).unwrap(), vec![A::Boolean(true)]);

    let with_zero: DynamicContext<N> = DynamicContextBuilder::default()
        .with_context_item(XdmItem::Atomic(A::integer(0)))
        .build();
    assert_eq!(call(&with_zero, "boolean", &[]).unwrap(), vec![A::Boolean(false)]);
}

#[rstest]
fn nodes_atomize_to_untyped(ctx: DynamicContext<N>) {
    let a = elem("v").child(text("1")).build();
    let b = elem("v").child(text("2.5")).build();
    let items: XdmSequence<N> = vec![XdmItem::Node(a), XdmItem::Node(b)];
    assert_eq!(call(&ctx, "sum", &[items.clone()]).unwrap(), vec![A::Double(3.5)]);
    assert_eq!(call(&ctx, "max", &[items.clone()]).unwrap(), vec![A::Double(2.5)]);
    assert_eq!(
        call(&ctx, "data", &[items]).unwrap(),
        vec![A::untyped("1"), A::untyped("2.5")]
    );
}

#[rstest]
fn typed_nodes_keep_their_type(ctx: DynamicContext<N>) {
    let n = elem("n").typed(vec![A::integer(4)]).build();
    let out = call(&ctx, "abs", &[vec![XdmItem::Node(n)]]).unwrap();
    assert_eq!(out, vec![A::integer(4)]);
}

#[rstest]
fn explicit_collation_argument(ctx: DynamicContext<N>) {
    let values = seq(&[A::string("a"), A::string("A")]);
    let uri = seq(&[A::string(SIMPLE_CASE_URI)]);
    let out = call(&ctx, "distinct-values", &[values.clone(), uri.clone()]).unwrap();
    assert_eq!(out, vec![A::string("a")]);
    let found = call(
        &ctx,
        "contains",
        &[seq(&[A::string("Hello")]), seq(&[A::string("ELL")]), uri],
    )
    .unwrap();
    assert_eq!(found, vec![A::Boolean(true)]);
}

#[rstest]
#[case::distinct_values("distinct-values", vec![seq(&[A::string("a")]), seq(&[A::string("urn:unknown")])])]
#[case::min("min", vec![seq(&[A::string("a")]), seq(&[A::string("urn:unknown")])])]
#[case::substring_before(
    "substring-before",
    vec![seq(&[A::string("a")]), seq(&[A::string("a")]), seq(&[A::string("urn:unknown")])]
)]
fn unknown_collation_is_reported(ctx: DynamicContext<N>, #[case] name: &str, #[case] args: Vec<XdmSequence<N>>) {
    let err = call(&ctx, name, &args).unwrap_err();
    assert_eq!(err.code_enum(), ErrorCode::FOCH0002);
    assert_eq!(err.format_code(), "err:FOCH0002");
}

#[rstest]
#[case::substring_before_integer("substring-before", vec![seq(&[A::integer(12345)]), seq(&[A::string("3")])])]
#[case::contains_boolean_search("contains", vec![seq(&[A::string("true")]), seq(&[A::Boolean(true)])])]
#[case::ends_with_double("ends-with", vec![seq(&[A::Double(1.5)]), seq(&[A::string("5")])])]
#[case::compare_integer_boolean("compare", vec![seq(&[A::integer(1)]), seq(&[A::Boolean(true)])])]
#[case::compare_second_operand("compare", vec![seq(&[A::string("a")]), seq(&[A::integer(1)])])]
#[case::numeric_collation(
    "starts-with",
    vec![seq(&[A::string("a")]), seq(&[A::string("a")]), seq(&[A::integer(1)])]
)]
fn string_arguments_reject_other_types(
    ctx: DynamicContext<N>,
    #[case] name: &str,
    #[case] args: Vec<XdmSequence<N>>,
) {
    let err = call(&ctx, name, &args).unwrap_err();
    assert_eq!(err.code_enum(), ErrorCode::XPTY0004);
}

#[rstest]
fn string_arguments_accept_untyped_and_uri(ctx: DynamicContext<N>) {
    let out = call(
        &ctx,
        "substring-after",
        &[seq(&[A::untyped("key=value")]), seq(&[A::AnyUri("=".to_string())])],
    )
    .unwrap();
    assert_eq!(out, vec![A::string("value")]);
    let node = elem("n").child(text("b")).build();
    let cmp = call(&ctx, "compare", &[seq(&[A::string("a")]), vec![XdmItem::Node(node)]]).unwrap();
    assert_eq!(cmp, vec![A::integer(-1)]);
}

#[rstest]
fn default_collation_from_builder() {
    let folded: DynamicContext<N> = DynamicContextBuilder::default()
        .with_default_collation(SIMPLE_CASE_URI)
        .build();
    let out = call(
        &folded,
        "starts-with",
        &[seq(&[A::string("Hello")]), seq(&[A::string("hE")])],
    )
    .unwrap();
    assert_eq!(out, vec![A::Boolean(true)]);

    let broken: DynamicContext<N> = DynamicContextBuilder::default()
        .with_default_collation("urn:missing")
        .build();
    let err = call(
        &broken,
        "starts-with",
        &[seq(&[A::string("Hello")]), seq(&[A::string("hE")])],
    )
    .unwrap_err();
    assert_eq!(err.code_enum(), ErrorCode::FOCH0002);
}

#[rstest]
fn implicit_timezone_from_builder() {
    let plus_two: DynamicContext<N> = DynamicContextBuilder::default().with_timezone(120).build();
    let local = xs(&plus_two, "dateTime", "2024-01-01T12:00:00");
    let utc = xs(&plus_two, "dateTime", "2024-01-01T10:00:00Z");
    let out = call(&plus_two, "distinct-values", &[seq(&[local, utc])]).unwrap();
    assert_eq!(out.len(), 1);
}

#[rstest]
fn out_of_range_timezone_is_ignored() {
    let ctx: DynamicContext<N> = DynamicContextBuilder::default()
        .with_timezone(i32::MAX)
        .with_timezone(24 * 60)
        .build();
    assert_eq!(ctx.implicit_timezone.local_minus_utc(), 0);
}

#[rstest]
fn sum_of_constructed_facet_keeps_type(ctx: DynamicContext<N>) {
    let v = xs(&ctx, "unsignedShort", "7");
    let out = call(&ctx, "sum", &[seq(&[v])]).unwrap();
    assert_eq!(out[0].type_name(), "xs:unsignedShort");
}

#[rstest]
#[case::double_to_int("int", A::Double(3.9), "3")]
#[case::decimal_to_integer("integer", A::Decimal(rust_decimal::Decimal::new(-27, 1)), "-2")]
#[case::integer_to_double("double", A::integer(10_000_000_000_i64), "1.0E10")]
#[case::boolean_to_integer("integer", A::Boolean(true), "1")]
#[case::double_to_boolean("boolean", A::Double(0.0), "false")]
#[case::untyped_to_date("date", A::untyped("2024-05-06"), "2024-05-06")]
fn constructors_from_atomics(ctx: DynamicContext<N>, #[case] ty: &str, #[case] input: A, #[case] expected: &str) {
    let out = ctx
        .call_function(&ExpandedName::ns(XS, ty), &[seq(&[input])])
        .unwrap();
    match out.as_slice() {
        [XdmItem::Atomic(a)] => assert_eq!(a.to_string(), expected),
        other => panic!("expected one atomic, got {other:?}"),
    }
}

#[rstest]
fn constructor_range_errors(ctx: DynamicContext<N>) {
    let err = ctx
        .call_function(&ExpandedName::ns(XS, "byte"), &[seq(&[A::integer(300)])])
        .unwrap_err();
    assert_eq!(err.code_enum(), ErrorCode::FORG0001);
    let err = ctx
        .call_function(&ExpandedName::ns(XS, "integer"), &[seq(&[A::Double(f64::NAN)])])
        .unwrap_err();
    assert_eq!(err.code_enum(), ErrorCode::FORG0001);
}

#[rstest]
fn custom_registry() {
    let mut reg: FunctionRegistry<N> = FunctionRegistry::new();
    assert!(reg.is_empty());
    reg.register_ns(FNS, "answer", 0, |_ctx, _args| {
        Ok(vec![XdmItem::Atomic(A::integer(42))])
    });
    let ctx: DynamicContext<N> = DynamicContextBuilder::default()
        .with_functions(Arc::new(reg))
        .build();
    assert_eq!(call(&ctx, "answer", &[]).unwrap(), vec![A::integer(42)]);
    let err = call(&ctx, "abs", &[seq(&[A::integer(1)])]).unwrap_err();
    assert_eq!(err.code_enum(), ErrorCode::XPST0017);
}

#[rstest]
fn default_registry_covers_builtins() {
    let reg = xdm_core::default_function_registry::<N>();
    for local in [
        "abs", "boolean", "not", "min", "max", "sum", "avg", "distinct-values",
        "substring-before", "substring-after", "contains", "starts-with", "ends-with", "compare",
    ] {
        assert!(reg.contains(&ExpandedName::ns(FNS, local)), "{local}");
    }
    assert!(reg.contains(&ExpandedName::ns(XS, "unsignedShort")));
    assert!(reg.contains(&ExpandedName::ns(XS, "NCName")));
}
