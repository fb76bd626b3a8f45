//! Exhaustive enumeration of low-weight fault patterns.
//!
//! A pattern picks a set of distinct active sites (in increasing order)
//! and one non-trivial effect class at each. Its probability is the
//! product of the chosen class probabilities and the no-effect
//! probabilities of every other active site.

use crate::dem::{DetectorErrorModel, SiteModel};
use crate::syndrome::SampleRecord;

/// A visited fault pattern.
#[derive(Debug)]
pub struct Pattern<'a> {
    /// `(site, class)` pairs in increasing site order.
    pub faults: &'a [(usize, usize)],
    /// XOR of the chosen class effects.
    pub record: &'a SampleRecord,
    /// Exact pattern probability.
    pub probability: f64,
    /// Product of `class / no_effect` ratios, for ranking patterns.
    pub likelihood: f64,
}

impl Pattern<'_> {
    /// Number of faults.
    pub fn weight(&self) -> usize {
        self.faults.len()
    }
}

/// Number of patterns of each weight `0..=max_weight`, saturating.
pub fn pattern_counts(dem: &DetectorErrorModel, max_weight: usize) -> Vec<u128> {
    let mut counts = vec![0u128; max_weight + 1];
    counts[0] = 1;
    for &s in dem.active_sites() {
        let classes = dem.site(s).classes.len() as u128;
        for w in (1..=max_weight).rev() {
            counts[w] = counts[w].saturating_add(counts[w - 1].saturating_mul(classes));
        }
    }
    counts
}

/// Number of patterns of weight at most `max_weight`, saturating.
pub fn cumulative_pattern_count(dem: &DetectorErrorModel, max_weight: usize) -> u128 {
    pattern_counts(dem, max_weight)
        .into_iter()
        .fold(0u128, u128::saturating_add)
}

/// Largest weight whose cumulative pattern count fits in `budget`.
///
/// Never exceeds the number of active sites.
pub fn auto_weight(dem: &DetectorErrorModel, budget: u128) -> usize {
    let max = dem.active_sites().len();
    let mut total = 0u128;
    for (w, count) in pattern_counts(dem, max).into_iter().enumerate() {
        total = total.saturating_add(count);
        if total > budget {
            return w.saturating_sub(1);
        }
    }
    max
}

struct Walker<'d, F> {
    sites: Vec<&'d SiteModel>,
    suffix: Vec<f64>,
    max_weight: usize,
    faults: Vec<(usize, usize)>,
    record: SampleRecord,
    visit: F,
}

impl<'d, F> Walker<'d, F>
where
    F: FnMut(&Pattern<'_>),
{
    fn new(dem: &'d DetectorErrorModel, max_weight: usize, visit: F) -> Self {
        let sites: Vec<&SiteModel> = dem.active_sites().iter().map(|&s| dem.site(s)).collect();
        let mut suffix = vec![1.0; sites.len() + 1];
        for i in (0..sites.len()).rev() {
            suffix[i] = suffix[i + 1] * sites[i].no_effect();
        }
        Self {
            sites,
            suffix,
            max_weight,
            faults: Vec::with_capacity(max_weight),
            record: dem.empty_record(),
            visit,
        }
    }

    fn prefix(&self, pos: usize) -> f64 {
        self.sites[..pos].iter().map(|s| s.no_effect()).product()
    }

    /// Visit the pattern extended by `class` at position `pos`, then every
    /// extension of it.
    fn extend(&mut self, pos: usize, class: usize, probability: f64, likelihood: f64) {
        let site = self.sites[pos];
        let c = &site.classes[class];
        let probability = probability * c.probability;
        let likelihood = likelihood * c.probability / site.no_effect().max(f64::MIN_POSITIVE);

        self.record.xor_assign(&c.effect);
        self.faults.push((site.site, class));
        (self.visit)(&Pattern {
            faults: &self.faults,
            record: &self.record,
            probability: probability * self.suffix[pos + 1],
            likelihood,
        });
        self.descend(pos + 1, probability, likelihood);
        self.faults.pop();
        self.record.xor_assign(&c.effect);
    }

    fn descend(&mut self, start: usize, probability: f64, likelihood: f64) {
        if self.faults.len() >= self.max_weight {
            return;
        }
        let mut skipped = 1.0;
        for pos in start..self.sites.len() {
            for class in 0..self.sites[pos].classes.len() {
                self.extend(pos, class, probability * skipped, likelihood);
            }
            skipped *= self.sites[pos].no_effect();
        }
    }
}

/// Visit every pattern of weight `0..=max_weight`, the empty one first.
pub fn enumerate_patterns<F>(dem: &DetectorErrorModel, max_weight: usize, visit: F)
where
    F: FnMut(&Pattern<'_>),
{
    let mut walker = Walker::new(dem, max_weight, visit);
    let empty = walker.record.clone();
    let total = walker.suffix[0];
    (walker.visit)(&Pattern {
        faults: &[],
        record: &empty,
        probability: total,
        likelihood: 1.0,
    });
    walker.descend(0, 1.0, 1.0);
}

/// Visit every pattern of weight `1..=max_weight` whose first fault is at
/// active position `first`.
///
/// Running this for every position covers all non-empty patterns exactly
/// once, so positions can be handed to independent workers.
pub fn enumerate_from<F>(dem: &DetectorErrorModel, first: usize, max_weight: usize, visit: F)
where
    F: FnMut(&Pattern<'_>),
{
    let mut walker = Walker::new(dem, max_weight, visit);
    if max_weight == 0 || first >= walker.sites.len() {
        return;
    }
    let prefix = walker.prefix(first);
    for class in 0..walker.sites[first].classes.len() {
        walker.extend(first, class, prefix, 1.0);
    }
}
