//! Detector error models built by single-fault propagation.
//!
//! Pauli propagation through Clifford circuits is linear: the record of a
//! realization is the XOR of the records of its individual faults. The
//! model therefore stores, per noise site, the record of every error term
//! and the terms merged into classes of equal non-trivial effect.

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};

use crate::backend::SimulationBackend;
use crate::error::{SimError, SimResult};
use crate::site::NoiseRealization;
use crate::syndrome::SampleRecord;

/// Error terms of one site that share a non-trivial effect.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectClass {
    /// Detector and observable flips.
    pub effect: SampleRecord,
    /// Total probability of the merged terms.
    pub probability: f64,
}

/// Per-site view of the error model.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteModel {
    /// Site index.
    pub site: usize,
    /// Record of each error term, in term order.
    pub terms: Vec<SampleRecord>,
    /// Non-trivial effect classes, in order of first appearance.
    pub classes: Vec<EffectClass>,
    cumulative: Vec<f64>,
    no_effect: f64,
}

impl SiteModel {
    fn new(site: usize, terms: Vec<(SampleRecord, f64)>) -> Self {
        let mut index: FxHashMap<SampleRecord, usize> = FxHashMap::default();
        let mut classes: Vec<EffectClass> = Vec::new();
        for (effect, probability) in &terms {
            if effect.is_trivial() {
                continue;
            }
            match index.get(effect) {
                Some(&i) => classes[i].probability += probability,
                None => {
                    index.insert(effect.clone(), classes.len());
                    classes.push(EffectClass {
                        effect: effect.clone(),
                        probability: *probability,
                    });
                }
            }
        }
        let mut total = 0.0;
        let cumulative: Vec<f64> = classes
            .iter()
            .map(|c| {
                total += c.probability;
                total
            })
            .collect();
        let no_effect = 1.0 - total;
        let no_effect = if no_effect < f64::EPSILON { 0.0 } else { no_effect };
        Self {
            site,
            terms: terms.into_iter().map(|(effect, _)| effect).collect(),
            classes,
            cumulative,
            no_effect,
        }
    }

    /// Probability that the site produces no detectable effect, counting
    /// both "no error" and errors with a trivial record.
    pub fn no_effect(&self) -> f64 {
        self.no_effect
    }

    /// Probability of a non-trivial effect.
    pub fn rate(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// The class containing cumulative mass `u`, for `0 <= u < rate()`.
    #[inline]
    pub fn pick_class(&self, u: f64) -> usize {
        let i = self.cumulative.partition_point(|&c| c <= u);
        i.min(self.classes.len().saturating_sub(1))
    }
}

/// Detector and observable effects of every fault in a circuit.
#[derive(Debug, Clone)]
pub struct DetectorErrorModel {
    num_detectors: usize,
    num_observables: usize,
    sites: Vec<SiteModel>,
    active: Vec<usize>,
}

impl DetectorErrorModel {
    /// Simulate every `(site, term)` fault once, in parallel over sites.
    #[instrument(skip_all, fields(backend = backend.name()))]
    pub fn from_backend<B: SimulationBackend + ?Sized>(backend: &B) -> SimResult<Self> {
        let sites: Vec<SiteModel> = backend
            .noise_sites()
            .par_iter()
            .map(|site| {
                let terms = site
                    .terms
                    .iter()
                    .enumerate()
                    .map(|(term, t)| {
                        let record =
                            backend.simulate(&NoiseRealization::single(site.index, term))?;
                        Ok((record, t.probability))
                    })
                    .collect::<SimResult<Vec<_>>>()?;
                Ok(SiteModel::new(site.index, terms))
            })
            .collect::<SimResult<Vec<_>>>()?;

        let active: Vec<usize> = sites
            .iter()
            .filter(|s| !s.classes.is_empty())
            .map(|s| s.site)
            .collect();
        debug!(
            sites = sites.len(),
            active = active.len(),
            classes = sites.iter().map(|s| s.classes.len()).sum::<usize>(),
            "Built detector error model"
        );
        Ok(Self {
            num_detectors: backend.num_detectors(),
            num_observables: backend.num_observables(),
            sites,
            active,
        })
    }

    /// Number of detectors.
    pub fn num_detectors(&self) -> usize {
        self.num_detectors
    }

    /// Number of observables.
    pub fn num_observables(&self) -> usize {
        self.num_observables
    }

    /// Number of noise sites.
    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    /// All sites.
    pub fn sites(&self) -> &[SiteModel] {
        &self.sites
    }

    /// Site `index`.
    pub fn site(&self, index: usize) -> &SiteModel {
        &self.sites[index]
    }

    /// Indices of sites with at least one non-trivial class.
    pub fn active_sites(&self) -> &[usize] {
        &self.active
    }

    /// First active site that always has an effect, if any.
    pub fn degenerate_site(&self) -> Option<usize> {
        self.active
            .iter()
            .copied()
            .find(|&s| self.sites[s].no_effect() == 0.0)
    }

    /// An all-zero record sized for this model.
    pub fn empty_record(&self) -> SampleRecord {
        SampleRecord::zeros(self.num_detectors)
    }

    /// Record of `realization` as the XOR of its single-fault records.
    pub fn record_of(&self, realization: &NoiseRealization) -> SimResult<SampleRecord> {
        let mut record = self.empty_record();
        for fault in realization.faults() {
            let effect = self
                .sites
                .get(fault.site)
                .and_then(|s| s.terms.get(fault.term))
                .ok_or(SimError::InvalidFault {
                    site: fault.site,
                    term: fault.term,
                })?;
            record.xor_assign(effect);
        }
        Ok(record)
    }
}
