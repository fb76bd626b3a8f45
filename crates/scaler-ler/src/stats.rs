//! Interval estimates and seed mixing.

/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.959_963_984_540_054;

/// Wilson score interval for a binomial proportion.
///
/// Returns `(0, 1)` when there are no trials. Stays informative with zero
/// successes, where the normal interval collapses to a point.
pub fn wilson_interval(successes: u64, trials: u64, z: f64) -> (f64, f64) {
    if trials == 0 {
        return (0.0, 1.0);
    }

    let n = trials as f64;
    let p = successes as f64 / n;
    let z2 = z * z;

    let denom = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denom;
    let spread = z * ((p * (1.0 - p) + z2 / (4.0 * n)) / n).sqrt() / denom;

    ((center - spread).max(0.0), (center + spread).min(1.0))
}

/// `mean ± z * std_error`, clamped to `[0, 1]`.
pub fn normal_interval(mean: f64, std_error: f64, z: f64) -> (f64, f64) {
    (
        (mean - z * std_error).max(0.0),
        (mean + z * std_error).min(1.0),
    )
}

/// Mean and unbiased sample variance; the variance is zero for fewer than
/// two values.
pub fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (mean, ss / (n - 1.0))
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Seed for block `block` of run `run`.
///
/// Depends only on its arguments, so results do not change with the
/// number of worker threads.
pub fn block_seed(seed: u64, run: u64, block: u64) -> u64 {
    splitmix64(splitmix64(splitmix64(seed) ^ run) ^ block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wilson_no_trials() {
        assert_eq!(wilson_interval(0, 0, Z_95), (0.0, 1.0));
    }

    #[test]
    fn test_wilson_zero_successes() {
        let (lo, hi) = wilson_interval(0, 1000, Z_95);
        assert_eq!(lo, 0.0);
        // Roughly z^2 / n for zero successes.
        assert!(hi > 0.003 && hi < 0.004, "hi = {hi}");
    }

    #[test]
    fn test_wilson_contains_estimate() {
        let (lo, hi) = wilson_interval(50, 1000, Z_95);
        assert!(lo < 0.05 && 0.05 < hi);
        assert!(hi - lo < 0.03);
    }

    #[test]
    fn test_normal_interval_clamped() {
        let (lo, hi) = normal_interval(0.01, 0.02, Z_95);
        assert_eq!(lo, 0.0);
        assert!((hi - (0.01 + Z_95 * 0.02)).abs() < 1e-15);
    }

    #[test]
    fn test_mean_and_variance() {
        let (mean, var) = mean_and_variance(&[1.0, 2.0, 3.0, 4.0]);
        assert!((mean - 2.5).abs() < 1e-15);
        assert!((var - 5.0 / 3.0).abs() < 1e-12);
        assert_eq!(mean_and_variance(&[7.0]), (7.0, 0.0));
    }

    #[test]
    fn test_block_seeds_distinct() {
        let a = block_seed(1, 0, 0);
        assert_eq!(a, block_seed(1, 0, 0));
        assert_ne!(a, block_seed(1, 0, 1));
        assert_ne!(a, block_seed(1, 1, 0));
        assert_ne!(a, block_seed(2, 0, 0));
    }

    mod props {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn wilson_brackets_point_estimate(
                (successes, trials) in (1u64..1_000_000_000)
                    .prop_flat_map(|n| (0..=n, Just(n)))
            ) {
                let p = successes as f64 / trials as f64;
                let (lo, hi) = wilson_interval(successes, trials, Z_95);
                prop_assert!(0.0 <= lo && hi <= 1.0);
                prop_assert!(lo <= p + 1e-12 && p <= hi + 1e-12, "{lo} {p} {hi}");
            }

            #[test]
            fn wilson_narrows_with_more_trials(successes in 1u64..10_000, scale in 2u64..100) {
                let trials = successes * 10;
                let (lo1, hi1) = wilson_interval(successes, trials, Z_95);
                let (lo2, hi2) = wilson_interval(successes * scale, trials * scale, Z_95);
                prop_assert!(hi2 - lo2 < hi1 - lo1);
            }
        }
    }
}
