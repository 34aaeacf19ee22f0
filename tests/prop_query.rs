use proptest::prelude::*;
use school_query::query::{PagedResult, QueryParams, parse_filter};
use school_query::{Record, RecordShape, apply_filter, apply_paging, apply_sorting};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq)]
struct Item {
    name: String,
    qty: i64,
}

impl Record for Item {
    fn shape() -> &'static RecordShape<Self> {
        static SHAPE: OnceLock<RecordShape<Item>> = OnceLock::new();
        SHAPE.get_or_init(|| {
            RecordShape::builder("Item")
                .string("Name", |i: &Item| i.name.as_str())
                .long("Qty", |i: &Item| i.qty)
                .build()
        })
    }
}

fn items() -> impl Strategy<Value = Vec<Item>> {
    proptest::collection::vec(("[a-z]{0,6}", -50i64..50), 0..40)
        .prop_map(|v| v.into_iter().map(|(name, qty)| Item { name, qty }).collect())
}

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        cases: 64,
        .. proptest::test_runner::Config::default()
    })]

    #[test]
    fn prop_empty_filter_is_identity(v in items()) {
        let out = apply_filter::<Item, _, _>(v.clone(), Some(""), None, None);
        prop_assert_eq!(out, v);
    }

    #[test]
    fn prop_unknown_field_is_inert(v in items(), needle in "[a-z]{1,4}") {
        let expr = format!("NoSuchField:{needle}");
        let out = apply_filter::<Item, _, _>(v.clone(), Some(&expr), None, None);
        prop_assert_eq!(out, v);
    }

    #[test]
    fn prop_and_within_group(v in items(), needle in "[a-z]{1,2}", min in -50i64..50) {
        let expr = format!("Name:{needle};Qty>{min}");
        let out = apply_filter::<Item, _, _>(&v, Some(&expr), None, None);
        let expected: Vec<&Item> =
            v.iter().filter(|i| i.name.contains(needle.as_str()) && i.qty > min).collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn prop_or_across_groups_has_no_duplicates(v in items(), a in "[a-z]{1,2}", b in "[a-z]{1,2}") {
        let expr = format!("Name:{a}|Name:{b}");
        let out = apply_filter::<Item, _, _>(&v, Some(&expr), None, None);
        let expected: Vec<&Item> = v
            .iter()
            .filter(|i| i.name.contains(a.as_str()) || i.name.contains(b.as_str()))
            .collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn prop_pagination_math(n in 0usize..60, size in 1i32..20, page in 1i32..10) {
        let data: Vec<usize> = (0..n).collect();
        let params = QueryParams::new().with_page(page, size);
        let r: PagedResult<usize> = apply_paging(data, &params, |x| x);
        let p = usize::try_from(size).unwrap();
        let k = usize::try_from(page).unwrap();
        let expected = p.min(n.saturating_sub((k - 1) * p));
        prop_assert_eq!(r.items.len(), expected);
        prop_assert_eq!(r.total_count, n);
        if k > n.div_ceil(p) {
            prop_assert!(r.items.is_empty());
        }
        if let Some(first) = r.items.first() {
            prop_assert_eq!(*first, (k - 1) * p);
        }
    }

    #[test]
    fn prop_page_size_clamp(requested in -100i32..100_000, max in -5i32..500) {
        let params = QueryParams::new().with_page(1, requested).with_max_page_size(max);
        let eff = params.effective_page_size();
        let ceiling = usize::try_from(max.max(1)).unwrap();
        prop_assert!(eff >= 1);
        prop_assert!(eff <= ceiling);
        if requested >= 1 && requested <= max {
            prop_assert_eq!(eff, usize::try_from(requested).unwrap());
        }
    }

    #[test]
    fn prop_sort_missing_field_keeps_order(v in items(), desc in any::<bool>()) {
        let out = apply_sorting::<Item, _>(v.clone(), Some("NoSuchField"), desc);
        prop_assert_eq!(out, v);
    }

    #[test]
    fn prop_sort_is_ordered_and_a_permutation(v in items(), desc in any::<bool>()) {
        let out = apply_sorting::<Item, _>(v.clone(), Some("qty"), desc);
        prop_assert_eq!(out.len(), v.len());
        for w in out.windows(2) {
            if desc {
                prop_assert!(w[0].qty >= w[1].qty);
            } else {
                prop_assert!(w[0].qty <= w[1].qty);
            }
        }
        let mut a: Vec<i64> = out.iter().map(|i| i.qty).collect();
        let mut b: Vec<i64> = v.iter().map(|i| i.qty).collect();
        a.sort_unstable();
        b.sort_unstable();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_parse_never_panics(s in "\\PC{0,64}") {
        let parsed = parse_filter(&s);
        for group in &parsed.groups {
            prop_assert!(!group.is_empty());
        }
        let _ = apply_filter::<Item, _, _>(Vec::<Item>::new(), Some(&s), None, None);
    }
}
