//! Fault samplers over a detector error model.
//!
//! - [`GeometricSkip`] draws gaps between successes of a Bernoulli(p)
//!   sequence, so rare faults cost time proportional to their count rather
//!   than to the number of sites.
//! - [`FaultSampler`] draws independent trials for Monte Carlo estimation.
//! - [`WeightDistribution`] and [`ConditionalSampler`] give the exact
//!   distribution of the number of effective faults and draw trials
//!   conditioned on that number, for stratified estimation.

use rand::Rng;

use crate::dem::{DetectorErrorModel, SiteModel};
use crate::syndrome::SampleRecord;

/// Gap sampler for Bernoulli(p) sequences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricSkip {
    p: f64,
    ln_q: f64,
}

impl GeometricSkip {
    /// A sampler for success probability `p` (clamped to `[0, 1]`).
    pub fn new(p: f64) -> Self {
        let p = p.clamp(0.0, 1.0);
        Self {
            p,
            ln_q: (-p).ln_1p(),
        }
    }

    /// Success probability.
    pub fn probability(&self) -> f64 {
        self.p
    }

    /// Number of failures before the next success.
    ///
    /// Returns `u64::MAX` when `p` is zero.
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        if self.p <= 0.0 {
            return u64::MAX;
        }
        if self.p >= 1.0 {
            return 0;
        }
        let u: f64 = rng.r#gen();
        // 1 - u lies in (0, 1], so the logarithm is finite.
        ((-u).ln_1p() / self.ln_q).floor() as u64
    }
}

#[inline]
fn pick<R: Rng + ?Sized>(site: &SiteModel, rng: &mut R) -> usize {
    let u = rng.r#gen::<f64>() * site.rate();
    site.pick_class(u)
}

/// Independent-trial sampler with geometric skipping and thinning.
///
/// Candidate positions over the flattened `(trial, site)` index are drawn
/// at the largest site rate and accepted with probability
/// `rate / max_rate`, which reproduces the exact per-site Bernoulli draws.
#[derive(Debug, Clone)]
pub struct FaultSampler<'d> {
    dem: &'d DetectorErrorModel,
    sites: Vec<&'d SiteModel>,
    max_rate: f64,
    skip: GeometricSkip,
}

impl<'d> FaultSampler<'d> {
    /// A sampler over the active sites of `dem`.
    pub fn new(dem: &'d DetectorErrorModel) -> Self {
        let sites: Vec<&SiteModel> = dem.active_sites().iter().map(|&s| dem.site(s)).collect();
        let max_rate = sites.iter().map(|s| s.rate()).fold(0.0, f64::max);
        Self {
            dem,
            sites,
            max_rate,
            skip: GeometricSkip::new(max_rate),
        }
    }

    /// Number of sites that can have an effect.
    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    /// A scratch record sized for this sampler.
    pub fn scratch(&self) -> SampleRecord {
        self.dem.empty_record()
    }

    /// Draw `trials` trials.
    ///
    /// `visit` sees the record of every trial with at least one accepted
    /// fault; the other trials have the all-zero record. Returns the number
    /// of visited trials.
    pub fn sample_block<R, F>(
        &self,
        rng: &mut R,
        trials: u64,
        scratch: &mut SampleRecord,
        mut visit: F,
    ) -> u64
    where
        R: Rng + ?Sized,
        F: FnMut(&SampleRecord),
    {
        let m = self.sites.len() as u64;
        if m == 0 || self.max_rate <= 0.0 {
            return 0;
        }
        let total = trials.saturating_mul(m);
        let mut visited = 0;
        let mut current = u64::MAX;
        let mut dirty = false;
        scratch.clear();

        let mut pos = self.skip.sample(rng);
        while pos < total {
            let trial = pos / m;
            if trial != current {
                if dirty {
                    visit(scratch);
                    visited += 1;
                    scratch.clear();
                    dirty = false;
                }
                current = trial;
            }
            let site = self.sites[(pos % m) as usize];
            let rate = site.rate();
            if rate >= self.max_rate || rng.r#gen::<f64>() * self.max_rate < rate {
                let class = pick(site, rng);
                scratch.xor_assign(&site.classes[class].effect);
                dirty = true;
            }
            pos = pos.saturating_add(1).saturating_add(self.skip.sample(rng));
        }
        if dirty {
            visit(scratch);
            visited += 1;
        }
        visited
    }
}

/// Distribution of the number of sites with a non-trivial effect, exact up
/// to a maximum weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightDistribution {
    pmf: Vec<f64>,
    tail: f64,
}

impl WeightDistribution {
    /// Poisson-binomial distribution of independent Bernoulli(`rates[i]`)
    /// draws, truncated at `max_weight`; the mass above it is kept as the
    /// tail.
    pub fn new(rates: &[f64], max_weight: usize) -> Self {
        // Index max_weight + 1 accumulates every heavier outcome.
        let mut dp = vec![0.0; max_weight + 2];
        dp[0] = 1.0;
        for &r in rates {
            let overflow = max_weight + 1;
            dp[overflow] += dp[overflow - 1] * r;
            for w in (1..=max_weight).rev() {
                dp[w] = dp[w] * (1.0 - r) + dp[w - 1] * r;
            }
            dp[0] *= 1.0 - r;
        }
        let tail = dp.pop().unwrap_or(0.0);
        Self { pmf: dp, tail }
    }

    /// Probability of exactly `weight` effective faults.
    pub fn probability(&self, weight: usize) -> f64 {
        self.pmf.get(weight).copied().unwrap_or(0.0)
    }

    /// Probabilities of weights `0..=max_weight`.
    pub fn pmf(&self) -> &[f64] {
        &self.pmf
    }

    /// Largest tracked weight.
    pub fn max_weight(&self) -> usize {
        self.pmf.len() - 1
    }

    /// Probability of more than `max_weight` effective faults.
    pub fn tail(&self) -> f64 {
        self.tail
    }
}

/// Draws trials with exactly `w` effective faults.
///
/// `back[i][w]` is the probability that sites `i..` contribute exactly `w`
/// effective faults; walking forward, site `i` fires with probability
/// `rate_i * back[i + 1][w - 1] / back[i][w]`.
#[derive(Debug, Clone)]
pub struct ConditionalSampler<'d> {
    dem: &'d DetectorErrorModel,
    sites: Vec<&'d SiteModel>,
    back: Vec<Vec<f64>>,
    max_weight: usize,
}

impl<'d> ConditionalSampler<'d> {
    /// Tables for weights up to `max_weight` over the active sites of `dem`.
    pub fn new(dem: &'d DetectorErrorModel, max_weight: usize) -> Self {
        let sites: Vec<&SiteModel> = dem.active_sites().iter().map(|&s| dem.site(s)).collect();
        let m = sites.len();
        let mut back = vec![vec![0.0; max_weight + 1]; m + 1];
        back[m][0] = 1.0;
        for i in (0..m).rev() {
            let r = sites[i].rate();
            for w in 0..=max_weight {
                let stay = back[i + 1][w] * (1.0 - r);
                let fire = if w > 0 { back[i + 1][w - 1] * r } else { 0.0 };
                back[i][w] = stay + fire;
            }
        }
        Self {
            dem,
            sites,
            back,
            max_weight,
        }
    }

    /// Effective-fault rate of each active site.
    pub fn rates(&self) -> Vec<f64> {
        self.sites.iter().map(|s| s.rate()).collect()
    }

    /// Number of active sites.
    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    /// Largest supported weight.
    pub fn max_weight(&self) -> usize {
        self.max_weight
    }

    /// Weight distribution matching these tables.
    pub fn weight_distribution(&self) -> WeightDistribution {
        WeightDistribution::new(&self.rates(), self.max_weight)
    }

    /// A scratch record sized for this sampler.
    pub fn scratch(&self) -> SampleRecord {
        self.dem.empty_record()
    }

    /// Draw one trial with exactly `weight` effective faults into `record`.
    ///
    /// Returns `false`, leaving `record` cleared, when the weight is
    /// impossible or above the supported maximum.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        weight: usize,
        record: &mut SampleRecord,
    ) -> bool {
        record.clear();
        if weight > self.max_weight || self.back[0][weight] <= 0.0 {
            return false;
        }
        let mut remaining = weight;
        for (i, site) in self.sites.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            let p = site.rate() * self.back[i + 1][remaining - 1] / self.back[i][remaining];
            if rng.r#gen::<f64>() < p {
                let class = pick(site, rng);
                record.xor_assign(&site.classes[class].effect);
                remaining -= 1;
            }
        }
        remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_geometric_skip_mean() {
        let skip = GeometricSkip::new(0.1);
        let mut rng = SmallRng::seed_from_u64(7);
        let n = 20_000;
        let mean = (0..n).map(|_| skip.sample(&mut rng) as f64).sum::<f64>() / n as f64;
        // Mean number of failures is (1 - p) / p = 9.
        assert!((mean - 9.0).abs() < 0.5, "mean = {mean}");
    }

    #[test]
    fn test_geometric_skip_edges() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(GeometricSkip::new(0.0).sample(&mut rng), u64::MAX);
        assert_eq!(GeometricSkip::new(1.0).sample(&mut rng), 0);
    }

    #[test]
    fn test_weight_distribution_binomial() {
        let dist = WeightDistribution::new(&[0.5; 4], 2);
        assert!((dist.probability(0) - 1.0 / 16.0).abs() < 1e-12);
        assert!((dist.probability(1) - 4.0 / 16.0).abs() < 1e-12);
        assert!((dist.probability(2) - 6.0 / 16.0).abs() < 1e-12);
        assert!((dist.tail() - 5.0 / 16.0).abs() < 1e-12);
        assert_eq!(dist.max_weight(), 2);
    }
}
