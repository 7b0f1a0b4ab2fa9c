use rstest::rstest;
use rust_decimal::Decimal;
use std::sync::Arc;
use xdm_core::engine::casting::cast_from_lexical;
use xdm_core::engine::collation::{SimpleCaseAccentCollation, SimpleCaseCollation};
use xdm_core::engine::comparison::Comparator;
use xdm_core::{Collation, XdmAtomicValue as A, distinct_values};

fn lex(ty: &str, s: &str) -> A {
    cast_from_lexical(ty, s).unwrap()
}

fn with(collation: Arc<dyn Collation>) -> Comparator {
    Comparator::new(collation, Comparator::default().implicit_timezone())
}

#[rstest]
fn numerics_dedupe_across_ranks() {
    let input = [
        A::integer(1),
        lex("xs:decimal", "2.0"),
        A::integer(3),
        A::integer(2),
    ];
    let got = distinct_values(&input, &Comparator::default());
    assert_eq!(got.len(), 3);
    // First occurrence wins, including its type.
    assert_eq!(got[1], A::Decimal(Decimal::new(20, 1)));
}

#[rstest]
#[case::doubles(vec![A::Double(f64::NAN), A::Double(f64::NAN)], 1)]
#[case::float_and_double(vec![A::Float(f32::NAN), A::integer(1), A::Double(f64::NAN)], 2)]
#[case::signed_zero(vec![A::Double(0.0), A::Double(-0.0), A::Float(-0.0), A::integer(0)], 1)]
#[case::float_double_same_value(vec![A::Float(0.5), A::Double(0.5), lex("xs:decimal", "0.5")], 1)]
#[case::float_close_but_not_equal(vec![A::Float(0.1), A::Double(0.1)], 2)]
#[case::facets_equal(vec![lex("xs:byte", "5"), lex("xs:unsignedLong", "5"), A::integer(5)], 1)]
#[case::string_and_number_differ(vec![A::string("1"), A::integer(1)], 2)]
#[case::text_kinds_equal(vec![A::string("x"), A::untyped("x"), A::AnyUri("x".into())], 1)]
#[case::booleans(vec![A::Boolean(true), A::Boolean(false), A::Boolean(true)], 2)]
#[case::instants(
    vec![lex("xs:dateTime", "2020-01-01T10:00:00Z"), lex("xs:dateTime", "2020-01-01T12:00:00+02:00")],
    1
)]
#[case::durations_across_kinds(
    vec![lex("xs:yearMonthDuration", "P1Y"), lex("xs:duration", "P12M"), lex("xs:dayTimeDuration", "PT0S")],
    2
)]
#[case::qnames(vec![A::qname(Some("urn:a"), "x"), A::qname(Some("urn:b"), "x"), A::qname(Some("urn:a"), "x")], 2)]
#[case::binaries_do_not_mix(vec![lex("xs:hexBinary", "0F"), lex("xs:base64Binary", "Dw==")], 2)]
fn distinct_count(#[case] input: Vec<A>, #[case] expected: usize) {
    let got = distinct_values(&input, &Comparator::default());
    assert_eq!(got.len(), expected, "{got:?}");
}

#[rstest]
fn preserves_first_occurrence_order() {
    let input = [A::string("b"), A::string("a"), A::string("b"), A::string("c")];
    let got = distinct_values(&input, &Comparator::default());
    assert_eq!(got, vec![A::string("b"), A::string("a"), A::string("c")]);
}

#[rstest]
#[case::codepoint(None, 3)]
#[case::case_insensitive(Some(Arc::new(SimpleCaseCollation) as Arc<dyn Collation>), 2)]
#[case::case_and_accent_insensitive(Some(Arc::new(SimpleCaseAccentCollation) as Arc<dyn Collation>), 1)]
fn collation_controls_string_equality(
    #[case] collation: Option<Arc<dyn Collation>>,
    #[case] expected: usize,
) {
    let input = [A::string("resume"), A::string("RESUME"), A::string("Résumé")];
    let cmp = collation.map_or_else(Comparator::default, with);
    assert_eq!(distinct_values(&input, &cmp).len(), expected);
}

#[rstest]
fn empty_input() {
    assert!(distinct_values(&[], &Comparator::default()).is_empty());
}
