use proptest::prelude::*;
use rust_decimal::Decimal;
use xdm_core::engine::collation::CodepointCollation;
use xdm_core::engine::numeric::{NumKind, compare_numeric, unify_numeric};
use xdm_core::engine::scalar::{substring_after, substring_before};
use xdm_core::{Comparator, XdmAtomicValue as A, distinct_values, max, min, sum};

fn numeric() -> impl Strategy<Value = A> {
    prop_oneof![
        any::<i64>().prop_map(A::integer),
        (any::<i64>(), 0u32..10).prop_map(|(m, s)| A::Decimal(Decimal::new(m, s))),
        any::<f32>().prop_map(A::Float),
        any::<f64>().prop_map(A::Double),
    ]
}

fn kind_of(v: &A) -> NumKind {
    match v {
        A::Integer { value, .. } => NumKind::Int(*value),
        A::Decimal(d) => NumKind::Dec(*d),
        A::Float(f) => NumKind::Float(*f),
        A::Double(d) => NumKind::Double(*d),
        other => panic!("not numeric: {other:?}"),
    }
}

proptest! {
    // Promotion picks the same common rank whichever side comes first.
    #[test]
    fn promotion_is_commutative(a in numeric(), b in numeric()) {
        let (x, y) = (kind_of(&a), kind_of(&b));
        let (ax, ay) = unify_numeric(x, y);
        let (by, bx) = unify_numeric(y, x);
        prop_assert_eq!(ax.kind(), ay.kind());
        prop_assert_eq!(ax.kind(), bx.kind());
        prop_assert_eq!(by.kind(), ay.kind());
        prop_assert_eq!(compare_numeric(x, y), compare_numeric(y, x).map(|o| o.reverse()));
    }

    // The comparator never disagrees with itself when operands are swapped.
    #[test]
    fn comparator_is_antisymmetric(a in numeric(), b in numeric()) {
        let cmp = Comparator::default();
        let ab = cmp.compare(&a, &b).unwrap();
        let ba = cmp.compare(&b, &a).unwrap();
        prop_assert_eq!(ab, ba.map(|o| o.reverse()));
    }

    // However many NaNs the input holds, at most one survives deduplication.
    #[test]
    fn nan_collapses_in_distinct_values(values in proptest::collection::vec(numeric(), 0..20), nans in 1usize..5) {
        let mut input = values.clone();
        for i in 0..nans {
            if i % 2 == 0 {
                input.push(A::Double(f64::NAN));
            } else {
                input.push(A::Float(f32::NAN));
            }
        }
        let out = distinct_values(&input, &Comparator::default());
        prop_assert_eq!(out.iter().filter(|v| v.is_nan()).count(), 1);
        prop_assert!(out.len() <= input.len());
    }

    // Deduplicated output never contains two equal values.
    #[test]
    fn distinct_values_are_pairwise_distinct(values in proptest::collection::vec(-20i64..20, 0..30)) {
        let input: Vec<A> = values.iter().map(|&i| A::integer(i)).collect();
        let out = distinct_values(&input, &Comparator::default());
        let mut expected = values.clone();
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(out.len(), expected.len());
    }

    // Codepoint substring-before agrees with a plain byte search.
    #[test]
    fn substring_before_matches_str_find(s in "[a-c]{0,12}", search in "[a-c]{1,3}") {
        let got = substring_before(&s, &search, &CodepointCollation);
        let expected = s.find(search.as_str()).map_or("", |i| &s[..i]);
        prop_assert_eq!(got.as_str(), expected);
        let after = substring_after(&s, &search, &CodepointCollation);
        if s.contains(search.as_str()) {
            prop_assert_eq!(format!("{got}{search}{after}"), s);
        } else {
            prop_assert!(after.is_empty());
        }
    }

    // min and max bracket every comparable input.
    #[test]
    fn min_le_max(values in proptest::collection::vec(any::<i32>(), 1..20)) {
        let input: Vec<A> = values.iter().map(|&i| A::integer(i)).collect();
        let cmp = Comparator::default();
        let lo = min(&input, &cmp).unwrap().unwrap();
        let hi = max(&input, &cmp).unwrap().unwrap();
        prop_assert_eq!(lo, A::integer(*values.iter().min().unwrap()));
        prop_assert_eq!(hi, A::integer(*values.iter().max().unwrap()));
    }

    // Integer sums are exact.
    #[test]
    fn integer_sum_is_exact(values in proptest::collection::vec(any::<i64>(), 2..20)) {
        let input: Vec<A> = values.iter().map(|&i| A::integer(i)).collect();
        let expected: i128 = values.iter().map(|&i| i128::from(i)).sum();
        prop_assert_eq!(sum(&input).unwrap(), A::integer(expected));
    }
}
