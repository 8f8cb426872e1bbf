//! Bitmask enumeration of complete gene/trait hypotheses.
//!
//! Individuals are addressed by their population index; bit `i` of each mask
//! refers to individual `i`. A gene partition is a pair of disjoint masks
//! (`one_copy`, `two_copies`) with everyone else at zero copies, so every
//! individual lands in exactly one bucket. Trait masks are generated only
//! from the unobserved bits, which fixes every observed individual to its
//! observed value without ever materialising a conflicting mask.

use crate::error::{HeredityError, Result};
use crate::genetics::Population;
use crate::types::GeneCount;

/// Largest population the enumerator accepts.
pub const MAX_INDIVIDUALS: usize = 40;

/// Number of individuals a [`Hypothesis`] mask can address.
pub const MASK_BITS: usize = u64::BITS as usize;

fn bit(index: usize) -> u64 {
    assert!(
        index < MASK_BITS,
        "individual index {} does not fit in a {}-bit hypothesis mask",
        index,
        MASK_BITS
    );
    1u64 << index
}

/// One complete assignment of gene count and trait expression to every
/// individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hypothesis {
    one_copy: u64,
    two_copies: u64,
    expressed: u64,
}

impl Hypothesis {
    /// Build a hypothesis from raw masks.
    ///
    /// # Panics
    /// Panics if `one_copy` and `two_copies` overlap.
    pub fn new(one_copy: u64, two_copies: u64, expressed: u64) -> Self {
        assert_eq!(one_copy & two_copies, 0, "gene buckets must be disjoint");
        Self {
            one_copy,
            two_copies,
            expressed,
        }
    }

    /// Gene count assigned to individual `index`.
    ///
    /// # Panics
    /// Panics if `index` is not below [`MASK_BITS`].
    pub fn gene(&self, index: usize) -> GeneCount {
        let mask = bit(index);
        if self.one_copy & mask != 0 {
            GeneCount::One
        } else if self.two_copies & mask != 0 {
            GeneCount::Two
        } else {
            GeneCount::Zero
        }
    }

    /// Whether individual `index` expresses the trait.
    ///
    /// # Panics
    /// Panics if `index` is not below [`MASK_BITS`].
    pub fn expresses(&self, index: usize) -> bool {
        self.expressed & bit(index) != 0
    }
}

/// All submasks of `mask`, from `mask` itself down to zero.
#[derive(Debug, Clone)]
pub struct Submasks {
    mask: u64,
    next: Option<u64>,
}

impl Submasks {
    pub fn of(mask: u64) -> Self {
        Self {
            mask,
            next: Some(mask),
        }
    }
}

impl Iterator for Submasks {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let current = self.next?;
        self.next = if current == 0 {
            None
        } else {
            Some((current - 1) & self.mask)
        };
        Some(current)
    }
}

/// The evidence-consistent hypothesis space of a population.
#[derive(Debug, Clone)]
pub struct HypothesisSpace {
    n: usize,
    full: u64,
    observed: u64,
    observed_true: u64,
}

impl HypothesisSpace {
    /// # Errors
    /// Returns [`HeredityError::PopulationTooLarge`] above [`MAX_INDIVIDUALS`].
    pub fn new(population: &Population) -> Result<Self> {
        let n = population.len();
        if n > MAX_INDIVIDUALS {
            return Err(HeredityError::PopulationTooLarge {
                n,
                max: MAX_INDIVIDUALS,
            });
        }

        let mut observed = 0u64;
        let mut observed_true = 0u64;
        for (i, ind) in population.iter().enumerate() {
            if let Some(t) = ind.observed_trait() {
                observed |= 1u64 << i;
                if t {
                    observed_true |= 1u64 << i;
                }
            }
        }

        Ok(Self {
            n,
            full: (1u64 << n) - 1,
            observed,
            observed_true,
        })
    }

    /// Number of individuals the masks cover.
    pub fn n_individuals(&self) -> usize {
        self.n
    }

    /// Mask with one bit set per individual.
    pub fn full_mask(&self) -> u64 {
        self.full
    }

    /// Whether `expressed` agrees with every observed trait.
    pub fn is_consistent(&self, expressed: u64) -> bool {
        expressed & self.observed == self.observed_true
    }

    /// Every `(one_copy, two_copies)` partition: 3^N pairs.
    pub fn gene_partitions(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        Submasks::of(self.full)
            .flat_map(move |one| self.two_copy_masks(one).map(move |two| (one, two)))
    }

    /// Every two-copy mask compatible with a given one-copy mask.
    pub fn two_copy_masks(&self, one_copy: u64) -> Submasks {
        Submasks::of(self.full & !one_copy)
    }

    /// Every trait mask consistent with the evidence: 2^(unobserved) masks.
    pub fn trait_masks(&self) -> impl Iterator<Item = u64> + '_ {
        let free = self.full & !self.observed;
        Submasks::of(free).map(move |m| m | self.observed_true)
    }

    /// Cartesian product of gene partitions and consistent trait masks.
    pub fn iter(&self) -> impl Iterator<Item = Hypothesis> + '_ {
        self.gene_partitions().flat_map(move |(one, two)| {
            self.trait_masks()
                .map(move |expressed| Hypothesis::new(one, two, expressed))
        })
    }

    /// Number of hypotheses [`HypothesisSpace::iter`] yields.
    pub fn hypothesis_count(&self) -> u128 {
        let unobserved = (self.full & !self.observed).count_ones();
        3u128.pow(self.n as u32) << unobserved
    }
}
