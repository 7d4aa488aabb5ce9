//! Order statistics over plain slices.

/// Median of `values`: the middle value, or the mean of the two middle
/// values for an even count. `None` if `values` is empty.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    let sorted = sorted_copy(values);
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2]),
        _ => Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0),
    }
}

/// Quantile `q` of `values` with linear interpolation between the two
/// nearest ranks (position `q * (n - 1)` in sorted order).
///
/// `None` if `values` is empty or `q` is outside `[0, 1]`.
#[must_use]
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&q) {
        return None;
    }
    let sorted = sorted_copy(values);
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = pos - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[7.0]), Some(7.0));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn quantile_interpolates_between_ranks() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 1.0), Some(4.0));
        // pos = 0.75
        assert!((quantile(&values, 0.25).unwrap() - 1.75).abs() < 1e-12);
        // pos = 2.25
        assert!((quantile(&values, 0.75).unwrap() - 3.25).abs() < 1e-12);
    }

    #[test]
    fn quantile_ignores_input_order() {
        let a = quantile(&[10.0, 0.0, 5.0, 2.5], 0.5);
        let b = quantile(&[0.0, 2.5, 5.0, 10.0], 0.5);
        assert_eq!(a, b);
    }

    #[test]
    fn quantile_out_of_range() {
        assert_eq!(quantile(&[1.0, 2.0], 1.5), None);
        assert_eq!(quantile(&[1.0, 2.0], -0.1), None);
        assert_eq!(quantile(&[], 0.5), None);
    }
}
