//! Market share.

use std::collections::BTreeMap;

/// Each key's percent of the summed values.
///
/// Repeated keys are summed first. The shares add up to 100 when the total
/// is positive; when it is zero every share is 0 rather than NaN.
///
/// # Examples
///
/// ```
/// use evgrowth_metrics::market_share;
///
/// let shares = market_share([("A", 300.0), ("B", 700.0)]);
/// assert!((shares["A"] - 30.0).abs() < 1e-9);
/// assert!((shares["B"] - 70.0).abs() < 1e-9);
/// ```
pub fn market_share<K, I>(values: I) -> BTreeMap<K, f64>
where
    K: Ord,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut sums: BTreeMap<K, f64> = BTreeMap::new();
    for (key, value) in values {
        *sums.entry(key).or_insert(0.0) += value;
    }

    let total: f64 = sums.values().sum();
    if total > 0.0 {
        for share in sums.values_mut() {
            *share = *share / total * 100.0;
        }
    } else {
        for share in sums.values_mut() {
            *share = 0.0;
        }
    }
    sums
}

/// Change in share, in percentage points, from `before` to `after`.
///
/// A key present on one side only counts as 0% on the other.
pub fn market_share_delta<K>(before: &BTreeMap<K, f64>, after: &BTreeMap<K, f64>) -> BTreeMap<K, f64>
where
    K: Ord + Clone,
{
    let mut delta: BTreeMap<K, f64> = after.clone();
    for (key, share) in before {
        *delta.entry(key.clone()).or_insert(0.0) -= share;
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_two_entities() {
        let shares = market_share([("A", 300.0), ("B", 700.0)]);
        assert_relative_eq!(shares["A"], 30.0, epsilon = 1e-9);
        assert_relative_eq!(shares["B"], 70.0, epsilon = 1e-9);
    }

    #[rstest]
    #[case(vec![1.0, 2.0, 3.0])]
    #[case(vec![0.1, 0.2, 0.7, 13.0, 99_999.0])]
    #[case(vec![1e-9, 5.0])]
    fn test_shares_sum_to_hundred(#[case] values: Vec<f64>) {
        let shares = market_share(values.into_iter().enumerate());
        let sum: f64 = shares.values().sum();
        assert_relative_eq!(sum, 100.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_total_gives_zero_shares() {
        let shares = market_share([("A", 0.0), ("B", 0.0)]);
        assert!(shares.values().all(|s| *s == 0.0));
        assert_eq!(shares.len(), 2);
    }

    #[test]
    fn test_repeated_keys_are_summed() {
        let shares = market_share([("A", 1.0), ("B", 2.0), ("A", 1.0)]);
        assert_relative_eq!(shares["A"], 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_delta_handles_entry_and_exit() {
        let before = market_share([("A", 50.0), ("B", 50.0)]);
        let after = market_share([("A", 75.0), ("C", 25.0)]);
        let delta = market_share_delta(&before, &after);
        assert_relative_eq!(delta["A"], 25.0, epsilon = 1e-9);
        assert_relative_eq!(delta["B"], -50.0, epsilon = 1e-9);
        assert_relative_eq!(delta["C"], 25.0, epsilon = 1e-9);
        let net: f64 = delta.values().sum();
        assert_relative_eq!(net, 0.0, epsilon = 1e-9);
    }
}
