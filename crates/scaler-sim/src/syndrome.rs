//! Packed detector bit vectors and per-trial sample records.

use std::fmt;

/// Detector outcomes packed into 64-bit words, one bit per detector.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Syndrome {
    words: Vec<u64>,
    len: usize,
}

impl Syndrome {
    /// An all-zero syndrome over `len` detectors.
    pub fn zeros(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    /// A syndrome with the listed detectors set.
    pub fn from_indices(len: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut syndrome = Self::zeros(len);
        for i in indices {
            syndrome.flip(i);
        }
        syndrome
    }

    /// Number of detectors.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no detectors.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Detector `index`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        debug_assert!(index < self.len);
        (self.words[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Toggle detector `index`.
    #[inline]
    pub fn flip(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.words[index / 64] ^= 1 << (index % 64);
    }

    /// XOR `other` into `self`.
    #[inline]
    pub fn xor_assign(&mut self, other: &Syndrome) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a ^= b;
        }
    }

    /// Reset every detector to zero.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Whether no detector fired.
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of fired detectors.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Indices of fired detectors in increasing order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|&i| self.get(i))
    }

    /// The packed words.
    pub fn words(&self) -> &[u64] {
        &self.words
    }
}

impl fmt::Debug for Syndrome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Syndrome(")?;
        for i in 0..self.len {
            write!(f, "{}", u8::from(self.get(i)))?;
        }
        write!(f, ")")
    }
}

/// Outcome of one trial relative to the noiseless reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SampleRecord {
    /// Fired detectors.
    pub detectors: Syndrome,
    /// Bit `i` set when observable `i` flipped.
    pub observables: u64,
}

impl SampleRecord {
    /// An all-zero record.
    pub fn zeros(num_detectors: usize) -> Self {
        Self {
            detectors: Syndrome::zeros(num_detectors),
            observables: 0,
        }
    }

    /// XOR `other` into `self`.
    #[inline]
    pub fn xor_assign(&mut self, other: &SampleRecord) {
        self.detectors.xor_assign(&other.detectors);
        self.observables ^= other.observables;
    }

    /// Whether nothing fired or flipped.
    pub fn is_trivial(&self) -> bool {
        self.observables == 0 && self.detectors.is_zero()
    }

    /// Reset to all-zero.
    pub fn clear(&mut self) {
        self.detectors.clear();
        self.observables = 0;
    }
}
