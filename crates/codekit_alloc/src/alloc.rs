//! One-shot and batch code allocation.
//!
//! The batch form amortizes index construction and must answer every request
//! exactly as folding [`allocate_next`] over a shared index would.

use crate::index::PrefixIndex;
use crate::report::ReportAllocation;
use crate::spec::EnumDigitWidth;
use crate::util::format_code;

/// Build a [`PrefixIndex`] from a known-codes table.
pub fn build_index<'a, I>(known_codes: I, digit_width: EnumDigitWidth) -> PrefixIndex
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    PrefixIndex::from_known_codes(known_codes, digit_width)
}

/// Allocate the next code for `tag`, reserving it in `index`.
pub fn allocate_next(tag: Option<&str>, index: &mut PrefixIndex) -> Option<String> {
    index.allocate_next(tag)
}

/// Allocate one code against a freshly built index.
///
/// Rebuilds the index on every call; use [`allocate_batch`] for many tags.
pub fn allocate_one<'a, I>(
    tag: Option<&str>,
    known_codes: I,
    digit_width: EnumDigitWidth,
) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    build_index(known_codes, digit_width).allocate_next(tag)
}

/// Allocate codes for every request in order.
///
/// The output has the same length as `requests`; absent, blank and too-short
/// tags map to `None` at the same position.
pub fn allocate_batch<'a, 'b, I, K>(
    requests: I,
    known_codes: K,
    digit_width: EnumDigitWidth,
) -> Vec<Option<String>>
where
    I: IntoIterator<Item = Option<&'a str>>,
    K: IntoIterator<Item = Option<&'b str>>,
{
    allocate_batch_with_report(requests, known_codes, digit_width).0
}

/// Same as [`allocate_batch`], also returning per-batch counters.
pub fn allocate_batch_with_report<'a, 'b, I, K>(
    requests: I,
    known_codes: K,
    digit_width: EnumDigitWidth,
) -> (Vec<Option<String>>, ReportAllocation)
where
    I: IntoIterator<Item = Option<&'a str>>,
    K: IntoIterator<Item = Option<&'b str>>,
{
    let mut index = build_index(known_codes, digit_width);
    let mut report = ReportAllocation::default();
    let n_number_overflow = digit_width.n_number_overflow();

    let iter_requests = requests.into_iter();
    let mut l_results = Vec::with_capacity(iter_requests.size_hint().0);
    for tag in iter_requests {
        report.cnt_requested += 1;
        let Some((c_prefix, n_number)) = index.reserve_next(tag) else {
            report.cnt_skipped += 1;
            l_results.push(None);
            continue;
        };

        let c_code = format_code(c_prefix, n_number, digit_width);
        if n_number >= n_number_overflow {
            tracing::warn!(
                prefix = c_prefix,
                code = %c_code,
                digit_width = digit_width.n_digits(),
                "code suffix exceeds digit width"
            );
            report.cnt_overflowed += 1;
            report.warn(format!(
                "Prefix {c_prefix:?} exhausted {digit_width}-digit numbers; issued {c_code}."
            ));
        }
        report.cnt_allocated += 1;
        l_results.push(Some(c_code));
    }

    tracing::debug!(
        digit_width = digit_width.n_digits(),
        prefixes = index.len(),
        "{report}"
    );
    (l_results, report)
}

/// Append the minted codes in `results` to `known_codes`; returns how many.
pub fn merge_allocated_codes(
    known_codes: &mut Vec<Option<String>>,
    results: &[Option<String>],
) -> usize {
    let n_len_before = known_codes.len();
    known_codes.extend(results.iter().flatten().cloned().map(Some));
    known_codes.len() - n_len_before
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;
    use crate::util::derive_request_prefix;

    const L_NO_CODES: [Option<&str>; 0] = [];

    fn owned(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn first_code_under_new_prefix_is_one() {
        let l_results = allocate_batch([Some("ABC")], L_NO_CODES, EnumDigitWidth::Four);
        assert_eq!(l_results, owned(&[Some("ABC0001")]));
    }

    #[test]
    fn gap_is_preferred_over_max_plus_one() {
        let l_results = allocate_batch(
            [Some("ABC")],
            [Some("ABC0001"), Some("ABC0002"), Some("ABC0004")],
            EnumDigitWidth::Four,
        );
        assert_eq!(l_results, owned(&[Some("ABC0003")]));
    }

    #[test]
    fn repeated_prefix_in_one_batch_never_collides() {
        let l_results = allocate_batch(
            [Some("ABC"), Some("ABC"), Some("XYZ")],
            L_NO_CODES,
            EnumDigitWidth::Three,
        );
        assert_eq!(l_results, owned(&[Some("ABC001"), Some("ABC002"), Some("XYZ001")]));
    }

    #[test]
    fn absence_passes_through_and_gap_before_five_is_found() {
        let l_results =
            allocate_batch([None, Some("ABC")], [Some("ABC0005")], EnumDigitWidth::Four);
        assert_eq!(l_results, owned(&[None, Some("ABC0001")]));
    }

    #[test]
    fn long_tags_use_first_three_characters() {
        let l_results = allocate_batch(
            [Some("ABCDE"), Some("ABC-9"), Some("AB"), Some("")],
            [Some("ABC0001")],
            EnumDigitWidth::Four,
        );
        assert_eq!(l_results, owned(&[Some("ABC0002"), Some("ABC0003"), None, None]));
    }

    #[test]
    fn prefix_is_case_sensitive() {
        let l_results = allocate_batch(
            [Some("abc"), Some("ABC")],
            [Some("ABC0001")],
            EnumDigitWidth::Four,
        );
        assert_eq!(l_results, owned(&[Some("abc0001"), Some("ABC0002")]));
    }

    #[test]
    fn overflow_is_formatted_counted_and_warned() {
        let l_known: Vec<String> = (1..=999).map(|n| format!("ABC{n:03}")).collect();
        let (l_results, report) = allocate_batch_with_report(
            [Some("ABC"), Some("ABC"), None],
            l_known.iter().map(|c| Some(c.as_str())),
            EnumDigitWidth::Three,
        );

        assert_eq!(l_results, owned(&[Some("ABC1000"), Some("ABC1001"), None]));
        assert_eq!(report.cnt_requested, 3);
        assert_eq!(report.cnt_allocated, 2);
        assert_eq!(report.cnt_skipped, 1);
        assert_eq!(report.cnt_overflowed, 2);
        assert_eq!(report.warning_count(), 2);
    }

    #[test]
    fn merge_appends_only_minted_codes() {
        let mut l_known = owned(&[Some("ABC0001")]);
        let l_results = owned(&[None, Some("ABC0002"), Some("XYZ0001")]);

        assert_eq!(merge_allocated_codes(&mut l_known, &l_results), 2);
        assert_eq!(l_known, owned(&[Some("ABC0001"), Some("ABC0002"), Some("XYZ0001")]));
    }

    #[test]
    fn allocate_one_matches_legacy_per_row_loop() {
        let mut l_known = owned(&[Some("ABC0002")]);
        let mut l_results = Vec::new();
        for tag in [Some("ABC"), None, Some("ABC"), Some("ABC")] {
            let res = allocate_one(tag, l_known.iter().map(Option::as_deref), EnumDigitWidth::Four);
            merge_allocated_codes(&mut l_known, std::slice::from_ref(&res));
            l_results.push(res);
        }
        assert_eq!(
            l_results,
            owned(&[Some("ABC0001"), None, Some("ABC0003"), Some("ABC0004")])
        );
    }

    fn strategy_digit_width() -> impl Strategy<Value = EnumDigitWidth> {
        prop_oneof![Just(EnumDigitWidth::Three), Just(EnumDigitWidth::Four)]
    }

    fn strategy_known_code() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            ("[A-C]{3}", 0u64..40).prop_map(|(c_prefix, n)| Some(format!("{c_prefix}{n:03}"))),
            ("[A-C]{3}", 0u64..40).prop_map(|(c_prefix, n)| Some(format!("{c_prefix}{n:04}"))),
            "[A-C0-9 ]{0,8}".prop_map(Some),
        ]
    }

    fn strategy_request() -> impl Strategy<Value = Option<String>> {
        prop_oneof![Just(None), "[A-C]{0,5}".prop_map(Some), Just(Some("   ".to_string()))]
    }

    proptest! {
        #[test]
        fn batch_equals_fold_of_allocate_next(
            l_known in prop::collection::vec(strategy_known_code(), 0..60),
            l_requests in prop::collection::vec(strategy_request(), 0..40),
            digit_width in strategy_digit_width(),
        ) {
            let l_batch = allocate_batch(
                l_requests.iter().map(Option::as_deref),
                l_known.iter().map(Option::as_deref),
                digit_width,
            );

            let mut index = build_index(l_known.iter().map(Option::as_deref), digit_width);
            let l_folded: Vec<Option<String>> = l_requests
                .iter()
                .map(|tag| allocate_next(tag.as_deref(), &mut index))
                .collect();

            prop_assert_eq!(l_batch.len(), l_requests.len());
            prop_assert_eq!(l_batch, l_folded);
        }

        #[test]
        fn allocate_next_returns_min_unused_and_reserves_it(
            l_known in prop::collection::vec(strategy_known_code(), 0..60),
            l_requests in prop::collection::vec(strategy_request(), 0..40),
            digit_width in strategy_digit_width(),
        ) {
            let mut index = build_index(l_known.iter().map(Option::as_deref), digit_width);
            for tag in &l_requests {
                let prefix = derive_request_prefix(tag.as_deref());
                let set_used_before: BTreeSet<u64> = prefix
                    .and_then(|c_prefix| index.used(c_prefix).cloned())
                    .unwrap_or_default();
                let n_prefixes_before = index.len();

                match (prefix, index.reserve_next(tag.as_deref())) {
                    (None, None) => prop_assert_eq!(index.len(), n_prefixes_before),
                    (Some(c_prefix), Some((c_prefix_reserved, n_number))) => {
                        prop_assert_eq!(c_prefix, c_prefix_reserved);
                        prop_assert!(n_number >= 1);
                        prop_assert!(!set_used_before.contains(&n_number));
                        prop_assert!((1..n_number).all(|n| set_used_before.contains(&n)));

                        let mut set_used_expected = set_used_before;
                        set_used_expected.insert(n_number);
                        prop_assert_eq!(index.used(c_prefix), Some(&set_used_expected));
                    }
                    (prefix, reserved) => {
                        prop_assert!(false, "prefix {:?} vs reservation {:?}", prefix, reserved);
                    }
                }
            }
        }

        #[test]
        fn rebuilding_from_known_plus_results_continues_identically(
            l_known in prop::collection::vec(strategy_known_code(), 0..60),
            l_requests in prop::collection::vec(strategy_request(), 1..30),
            digit_width in strategy_digit_width(),
            n_split_raw in 0usize..30,
        ) {
            let l_batch = allocate_batch(
                l_requests.iter().map(Option::as_deref),
                l_known.iter().map(Option::as_deref),
                digit_width,
            );
            let n_split = n_split_raw % (l_requests.len() + 1);

            let mut l_known_merged = l_known.clone();
            merge_allocated_codes(&mut l_known_merged, &l_batch[..n_split]);
            let l_rest = allocate_batch(
                l_requests[n_split..].iter().map(Option::as_deref),
                l_known_merged.iter().map(Option::as_deref),
                digit_width,
            );

            prop_assert_eq!(&l_batch[n_split..], &l_rest[..]);
        }

        #[test]
        fn folding_allocate_one_with_merge_equals_batch(
            l_known in prop::collection::vec(strategy_known_code(), 0..40),
            l_requests in prop::collection::vec(strategy_request(), 0..20),
            digit_width in strategy_digit_width(),
        ) {
            let l_batch = allocate_batch(
                l_requests.iter().map(Option::as_deref),
                l_known.iter().map(Option::as_deref),
                digit_width,
            );

            let mut l_known_growing = l_known.clone();
            let mut l_one_by_one = Vec::with_capacity(l_requests.len());
            for tag in &l_requests {
                let res = allocate_one(
                    tag.as_deref(),
                    l_known_growing.iter().map(Option::as_deref),
                    digit_width,
                );
                merge_allocated_codes(&mut l_known_growing, std::slice::from_ref(&res));
                l_one_by_one.push(res);
            }

            prop_assert_eq!(l_batch, l_one_by_one);
        }
    }
}
