//! Assertions over aggregate outputs.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::{BuildHasher, Hash};

/// Assert that `actual` holds exactly the keys of `expected`, each within
/// `tolerance` of the expected cost.
///
/// # Panics
///
/// Panics on a missing or extra key, or a cost outside the tolerance.
///
/// # Example
///
/// ```
/// use cur_ingest::testing::assert_costs_close;
/// use std::collections::HashMap;
///
/// let actual = HashMap::from([("i-1".to_string(), 15.500000001)]);
/// assert_costs_close(&actual, &[("i-1", 15.5)], 1e-6);
/// ```
pub fn assert_costs_close<K, S>(actual: &HashMap<K, f64, S>, expected: &[(&str, f64)], tolerance: f64)
where
    K: Debug + Eq + Hash + AsRef<str>,
    S: BuildHasher,
{
    assert_eq!(
        actual.len(),
        expected.len(),
        "Cost map size mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );

    for (key, want) in expected {
        let got = actual
            .iter()
            .find(|(k, _)| k.as_ref() == *key)
            .map(|(_, v)| *v)
            .unwrap_or_else(|| panic!("Missing cost for {key:?}\n  Actual: {actual:?}"));
        assert!(
            (got - want).abs() <= tolerance,
            "Cost mismatch for {key:?}:\n  Expected: {want}\n  Actual: {got}\n  Tolerance: {tolerance}"
        );
    }
}

/// Assert two costs agree within `tolerance`.
///
/// # Panics
///
/// Panics if they differ by more than `tolerance`.
pub fn assert_cost_eq(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "Cost mismatch:\n  Expected: {expected}\n  Actual: {actual}\n  Tolerance: {tolerance}"
    );
}
