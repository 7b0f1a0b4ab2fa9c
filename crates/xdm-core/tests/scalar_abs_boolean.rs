use rstest::rstest;
use rust_decimal::Decimal;
use xdm_core::engine::casting::cast_from_lexical;
use xdm_core::simple_node::{elem, text};
use xdm_core::{ErrorCode, SimpleNode, XdmAtomicValue as A, XdmItem, abs, ebv};

fn lex(ty: &str, s: &str) -> A {
    cast_from_lexical(ty, s).unwrap()
}

#[rstest]
#[case::negative_integer(A::integer(-5), A::integer(5))]
#[case::facet_collapses(lex("xs:short", "-3"), A::integer(3))]
#[case::non_positive_facet(lex("xs:nonPositiveInteger", "-8"), A::integer(8))]
#[case::decimal(lex("xs:decimal", "-2.5"), A::Decimal(Decimal::new(25, 1)))]
#[case::float(A::Float(-1.5), A::Float(1.5))]
#[case::double_infinity(A::Double(f64::NEG_INFINITY), A::Double(f64::INFINITY))]
#[case::untyped_as_double(A::untyped("-4"), A::Double(4.0))]
fn abs_values(#[case] input: A, #[case] expected: A) {
    let got = abs(&input).unwrap();
    assert_eq!(got, expected);
    assert_eq!(got.type_name(), expected.type_name());
}

#[rstest]
fn abs_normalizes_negative_zero() {
    match abs(&A::Double(-0.0)).unwrap() {
        A::Double(d) => assert!(d == 0.0 && d.is_sign_positive()),
        other => panic!("expected double, got {other:?}"),
    }
    match abs(&A::Float(-0.0)).unwrap() {
        A::Float(f) => assert!(f == 0.0 && f.is_sign_positive()),
        other => panic!("expected float, got {other:?}"),
    }
}

#[rstest]
fn abs_nan_stays_nan() {
    assert!(abs(&A::Double(f64::NAN)).unwrap().is_nan());
    assert!(abs(&A::Float(f32::NAN)).unwrap().is_nan());
}

#[rstest]
#[case::string(A::string("1"), ErrorCode::XPTY0004)]
#[case::boolean(A::Boolean(true), ErrorCode::XPTY0004)]
#[case::duration(A::YearMonthDuration(-1), ErrorCode::XPTY0004)]
#[case::overflow(A::integer(i128::MIN), ErrorCode::FOAR0002)]
#[case::bad_untyped(A::untyped("minus one"), ErrorCode::FORG0001)]
fn abs_errors(#[case] input: A, #[case] code: ErrorCode) {
    assert_eq!(abs(&input).unwrap_err().code_enum(), code);
}

fn atoms(values: Vec<A>) -> Vec<XdmItem<SimpleNode>> {
    values.into_iter().map(XdmItem::Atomic).collect()
}

#[rstest]
#[case::empty(vec![], false)]
#[case::true_(vec![A::Boolean(true)], true)]
#[case::false_(vec![A::Boolean(false)], false)]
#[case::empty_string(vec![A::string("")], false)]
#[case::string_zero(vec![A::string("0")], true)]
#[case::string_false(vec![A::string("false")], true)]
#[case::empty_untyped(vec![A::untyped("")], false)]
#[case::any_uri(vec![A::AnyUri("urn:x".into())], true)]
#[case::zero(vec![A::integer(0)], false)]
#[case::one(vec![A::integer(1)], true)]
#[case::decimal(vec![lex("xs:decimal", "0.1")], true)]
#[case::negative_zero(vec![A::Float(-0.0)], false)]
#[case::nan(vec![A::Double(f64::NAN)], false)]
#[case::infinity(vec![A::Double(f64::INFINITY)], true)]
fn ebv_of_atomics(#[case] input: Vec<A>, #[case] expected: bool) {
    assert_eq!(ebv(&atoms(input)).unwrap(), expected);
}

#[rstest]
fn node_first_is_true_regardless_of_length() {
    let node = elem("a").child(text("")).build();
    let single: Vec<XdmItem<SimpleNode>> = vec![XdmItem::Node(node.clone())];
    assert!(ebv(&single).unwrap());
    let mixed = vec![XdmItem::Node(node), XdmItem::Atomic(A::integer(0))];
    assert!(ebv(&mixed).unwrap());
}

#[rstest]
#[case::two_atomics(vec![A::Boolean(true), A::Boolean(true)])]
#[case::qname(vec![A::qname(None, "q")])]
#[case::duration(vec![lex("xs:dayTimeDuration", "PT1S")])]
#[case::date(vec![lex("xs:date", "2024-02-29")])]
#[case::binary(vec![lex("xs:hexBinary", "00")])]
fn ebv_errors(#[case] input: Vec<A>) {
    assert_eq!(ebv(&atoms(input)).unwrap_err().code_enum(), ErrorCode::FORG0006);
}

#[rstest]
fn atomic_then_node_is_an_error() {
    let seq = vec![
        XdmItem::Atomic(A::Boolean(true)),
        XdmItem::Node(elem("a").build()),
    ];
    assert_eq!(ebv(&seq).unwrap_err().code_enum(), ErrorCode::FORG0006);
}
