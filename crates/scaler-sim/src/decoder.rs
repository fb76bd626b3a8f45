//! Decoder contract and the lookup-table decoder.

use rustc_hash::FxHashMap;
use tracing::{debug, instrument};

use crate::dem::DetectorErrorModel;
use crate::enumerate::{auto_weight, enumerate_patterns};
use crate::syndrome::Syndrome;

/// Default pattern budget for [`LookupDecoder::auto`].
pub const DEFAULT_DECODER_PATTERNS: u128 = 100_000;

/// Maps a syndrome to the predicted observable flips.
pub trait Decoder: Send + Sync {
    /// Decoder name.
    fn name(&self) -> &str;

    /// Predicted observable flip mask for `syndrome`.
    fn decode(&self, syndrome: &Syndrome) -> u64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    weight: usize,
    likelihood: f64,
    observables: u64,
}

impl Candidate {
    /// Fewer faults first, then the more likely, then the smaller mask.
    fn beats(&self, other: &Candidate) -> bool {
        if self.weight != other.weight {
            return self.weight < other.weight;
        }
        if self.likelihood != other.likelihood {
            return self.likelihood > other.likelihood;
        }
        self.observables < other.observables
    }
}

/// Minimum-weight lookup table over every pattern up to a fixed weight.
///
/// Unknown syndromes decode to "no flip".
#[derive(Debug, Clone)]
pub struct LookupDecoder {
    table: FxHashMap<Syndrome, Candidate>,
    max_weight: usize,
}

impl LookupDecoder {
    /// Tabulate every pattern of weight at most `max_weight`.
    #[instrument(skip(dem))]
    pub fn build(dem: &DetectorErrorModel, max_weight: usize) -> Self {
        let mut table: FxHashMap<Syndrome, Candidate> = FxHashMap::default();
        enumerate_patterns(dem, max_weight, |pattern| {
            let candidate = Candidate {
                weight: pattern.weight(),
                likelihood: pattern.likelihood,
                observables: pattern.record.observables,
            };
            match table.get_mut(&pattern.record.detectors) {
                Some(best) => {
                    if candidate.beats(best) {
                        *best = candidate;
                    }
                }
                None => {
                    table.insert(pattern.record.detectors.clone(), candidate);
                }
            }
        });
        debug!(syndromes = table.len(), max_weight, "Built lookup decoder");
        Self { table, max_weight }
    }

    /// Tabulate up to the largest weight whose pattern count fits in
    /// `max_patterns`, and at least weight one.
    pub fn auto(dem: &DetectorErrorModel, max_patterns: u128) -> Self {
        let weight = auto_weight(dem, max_patterns).max(1);
        Self::build(dem, weight)
    }

    /// Largest tabulated weight.
    pub fn max_weight(&self) -> usize {
        self.max_weight
    }

    /// Number of distinct syndromes in the table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Decoder for LookupDecoder {
    fn name(&self) -> &str {
        "lookup"
    }

    #[inline]
    fn decode(&self, syndrome: &Syndrome) -> u64 {
        self.table.get(syndrome).map_or(0, |c| c.observables)
    }
}
