//! Detector and observable annotations.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::qubit::ClbitId;

/// Index of a detector within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DetectorId(pub u32);

impl fmt::Display for DetectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// Index of a logical observable within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObservableId(pub u32);

impl fmt::Display for ObservableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// A detector: a parity of measurement records that is deterministic in the
/// absence of noise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detector {
    /// Position of this detector in the circuit's detector list.
    pub id: DetectorId,
    /// Records whose parity forms the detector, sorted and deduplicated.
    pub records: Vec<ClbitId>,
}

/// A logical observable: a parity of measurement records that reveals the
/// value of an encoded logical operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observable {
    /// Position of this observable in the circuit's observable list.
    pub id: ObservableId,
    /// Records whose parity forms the observable, sorted and deduplicated.
    pub records: Vec<ClbitId>,
}

/// Reduce a record list to the set of records appearing an odd number of
/// times, sorted.
pub fn parity_support(records: impl IntoIterator<Item = ClbitId>) -> Vec<ClbitId> {
    let mut sorted: Vec<ClbitId> = records.into_iter().collect();
    sorted.sort_unstable();
    let mut out: Vec<ClbitId> = Vec::with_capacity(sorted.len());
    for r in sorted {
        if out.last() == Some(&r) {
            out.pop();
        } else {
            out.push(r);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parity_support_cancels_pairs() {
        let recs = [ClbitId(3), ClbitId(1), ClbitId(3), ClbitId(2), ClbitId(3)];
        assert_eq!(parity_support(recs), vec![ClbitId(1), ClbitId(2), ClbitId(3)]);
        assert!(parity_support([ClbitId(0), ClbitId(0)]).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(DetectorId(4).to_string(), "D4");
        assert_eq!(ObservableId(0).to_string(), "L0");
    }
}
