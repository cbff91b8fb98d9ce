//! Property-based tests for snapshot version ordering.
//!
//! These tests use proptest to verify the ordering laws hold across
//! randomly generated snapshot names.

use std::cmp::Ordering;

use proptest::prelude::*;

use tarball_history::core::version::{compare_versions, VersionFilename, ARCHIVE_SUFFIXES};
use tarball_history::engine::plan::plan;
use tarball_history::source::normalize_listing;

/// Strategy for package names (no digits, so the version is unambiguous).
fn package() -> impl Strategy<Value = String> {
    "[a-z]{1,6}(_[a-z]{1,4})?"
}

/// Strategy for version token sequences.
fn tokens() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..40, 1..5)
}

/// Strategy for archive suffixes, including none.
fn suffix() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(""),
        Just(ARCHIVE_SUFFIXES[0]),
        Just(ARCHIVE_SUFFIXES[1]),
        Just(ARCHIVE_SUFFIXES[2]),
        Just(ARCHIVE_SUFFIXES[3]),
    ]
}

fn render(pkg: &str, tokens: &[u32], suffix: &str) -> String {
    let version: Vec<String> = tokens.iter().map(u32::to_string).collect();
    format!("{}-{}{}", pkg, version.join("."), suffix)
}

/// Strategy for snapshot filenames, occasionally without a version.
fn filename() -> impl Strategy<Value = String> {
    prop_oneof![
        9 => (package(), tokens(), suffix()).prop_map(|(p, t, s)| render(&p, &t, s)),
        1 => package(),
    ]
}

proptest! {
    #[test]
    fn comparison_is_antisymmetric(a in filename(), b in filename()) {
        prop_assert_eq!(compare_versions(&a, &b), compare_versions(&b, &a).reverse());
    }

    #[test]
    fn comparison_is_reflexive(a in filename()) {
        prop_assert_eq!(compare_versions(&a, &a), Ordering::Equal);
    }

    #[test]
    fn comparison_is_transitive(a in filename(), b in filename(), c in filename()) {
        let ab = compare_versions(&a, &b);
        let bc = compare_versions(&b, &c);
        if ab != Ordering::Greater && bc != Ordering::Greater {
            prop_assert_ne!(compare_versions(&a, &c), Ordering::Greater);
        }
    }

    #[test]
    fn matches_token_sequence_order(
        pkg in package(),
        x in tokens(),
        y in tokens(),
        sx in suffix(),
        sy in suffix(),
    ) {
        let a = render(&pkg, &x, sx);
        let b = render(&pkg, &y, sy);
        prop_assert_eq!(compare_versions(&a, &b), x.cmp(&y));
    }

    #[test]
    fn extension_sorts_after_prefix(pkg in package(), t in tokens(), extra in 0u32..40) {
        let mut longer = t.clone();
        longer.push(extra);
        prop_assert_eq!(
            compare_versions(&render(&pkg, &t, ""), &render(&pkg, &longer, "")),
            Ordering::Less
        );
    }

    #[test]
    fn suffix_does_not_change_version(pkg in package(), t in tokens(), s in suffix()) {
        prop_assert_eq!(
            compare_versions(&render(&pkg, &t, s), &render(&pkg, &t, "")),
            Ordering::Equal
        );
    }

    #[test]
    fn unversioned_sorts_first(pkg in package(), other in filename()) {
        prop_assert_ne!(compare_versions(&pkg, &other), Ordering::Greater);
    }

    #[test]
    fn listing_is_sorted_and_unique(names in prop::collection::vec(filename(), 0..20)) {
        let listing = normalize_listing(&names);

        for pair in listing.windows(2) {
            prop_assert!(pair[0] < pair[1]);
            prop_assert_ne!(pair[0].cmp_version(&pair[1]), Ordering::Greater);
        }
        for entry in &listing {
            prop_assert!(entry.as_str().ends_with(".tar.gz"));
        }
    }

    #[test]
    fn plan_keeps_exactly_newer_entries(
        names in prop::collection::vec(filename(), 0..20),
        cutoff in filename(),
    ) {
        let listing = normalize_listing(&names);
        let cutoff = VersionFilename::parse(cutoff);
        let p = plan(&listing, Some(&cutoff));

        prop_assert_eq!(p.entries.len() + p.skipped, listing.len());
        for entry in &p.entries {
            prop_assert_eq!(entry.cmp_version(&cutoff), Ordering::Greater);
        }
        // Order is preserved.
        for pair in p.entries.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }
}
