use indexmap::IndexMap;

use crate::error::{HeredityError, Result};
use crate::genetics::Population;
use crate::types::{trait_index, GeneCount, Scalar};

use super::enumerate::Hypothesis;

/// Per-individual probability mass over gene count and trait expression.
///
/// Unnormalized while owned by a [`PosteriorAggregator`]; each of the two
/// tables sums to one once exposed through an [`InferenceResult`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PosteriorDistribution {
    gene: [Scalar; 3],
    trait_: [Scalar; 2],
}

impl PosteriorDistribution {
    /// Probability mass on `gene` copies.
    pub fn gene(&self, gene: GeneCount) -> Scalar {
        self.gene[gene.index()]
    }

    /// Probability mass on the trait being `expressed` (or not).
    pub fn trait_probability(&self, expressed: bool) -> Scalar {
        self.trait_[trait_index(expressed)]
    }

    /// Gene table indexed by copy count.
    pub fn gene_table(&self) -> [Scalar; 3] {
        self.gene
    }

    /// Trait table indexed `[false, true]`.
    pub fn trait_table(&self) -> [Scalar; 2] {
        self.trait_
    }

    fn add(&mut self, gene: GeneCount, expressed: bool, p: Scalar) {
        self.gene[gene.index()] += p;
        self.trait_[trait_index(expressed)] += p;
    }

    fn absorb(&mut self, other: &Self) {
        for (a, b) in self.gene.iter_mut().zip(other.gene) {
            *a += b;
        }
        for (a, b) in self.trait_.iter_mut().zip(other.trait_) {
            *a += b;
        }
    }

    /// Divide each table by its own total.
    fn normalize(&mut self) -> Result<()> {
        let gene_total: Scalar = self.gene.iter().sum();
        let trait_total: Scalar = self.trait_.iter().sum();
        if !(gene_total > 0.0 && gene_total.is_finite())
            || !(trait_total > 0.0 && trait_total.is_finite())
        {
            return Err(HeredityError::UnsatisfiableEvidence);
        }
        self.gene.iter_mut().for_each(|p| *p /= gene_total);
        self.trait_.iter_mut().for_each(|p| *p /= trait_total);
        Ok(())
    }
}

/// Accumulates joint probabilities into per-individual marginals.
///
/// Normalization happens in [`PosteriorAggregator::finalize`], which consumes
/// the aggregator, so it runs once and only after all accumulation.
#[derive(Debug, Clone)]
pub struct PosteriorAggregator {
    posteriors: Vec<PosteriorDistribution>,
    n_hypotheses: u64,
}

impl PosteriorAggregator {
    /// Zero-initialized accumulators for `n` individuals.
    pub fn new(n: usize) -> Self {
        Self {
            posteriors: vec![PosteriorDistribution::default(); n],
            n_hypotheses: 0,
        }
    }

    /// Number of hypotheses accumulated so far.
    pub fn n_hypotheses(&self) -> u64 {
        self.n_hypotheses
    }

    /// Add `p` to the gene and trait entry that `hypothesis` assigns each
    /// individual.
    ///
    /// # Panics
    /// Panics if the aggregator tracks more than
    /// [`MASK_BITS`](super::enumerate::MASK_BITS) individuals.
    pub fn accumulate(&mut self, hypothesis: &Hypothesis, p: Scalar) {
        for (i, post) in self.posteriors.iter_mut().enumerate() {
            post.add(hypothesis.gene(i), hypothesis.expresses(i), p);
        }
        self.n_hypotheses += 1;
    }

    /// Sum another partial accumulator over the same population into this one.
    ///
    /// # Panics
    /// Panics if the two aggregators track different numbers of individuals.
    pub fn merge(mut self, other: Self) -> Self {
        assert_eq!(
            self.posteriors.len(),
            other.posteriors.len(),
            "cannot merge aggregators of different populations"
        );
        for (mine, theirs) in self.posteriors.iter_mut().zip(&other.posteriors) {
            mine.absorb(theirs);
        }
        self.n_hypotheses += other.n_hypotheses;
        self
    }

    /// Normalize every distribution and label it with the individual's name.
    ///
    /// # Errors
    /// Returns [`HeredityError::DimensionMismatch`] if the aggregator was
    /// created for a different number of individuals than `population` holds,
    /// and [`HeredityError::UnsatisfiableEvidence`] if any distribution has no
    /// (or non-finite) probability mass.
    pub fn finalize(self, population: &Population) -> Result<InferenceResult> {
        if self.posteriors.len() != population.len() {
            return Err(HeredityError::DimensionMismatch {
                expected: population.len(),
                got: self.posteriors.len(),
                context: "PosteriorAggregator::finalize".to_string(),
            });
        }
        let mut posteriors = IndexMap::with_capacity(self.posteriors.len());
        for (ind, mut post) in population.iter().zip(self.posteriors) {
            post.normalize()?;
            posteriors.insert(ind.name().to_string(), post);
        }
        Ok(InferenceResult {
            posteriors,
            n_hypotheses: self.n_hypotheses,
        })
    }
}

/// Normalized posteriors for every individual, in population order.
#[derive(Debug, Clone)]
pub struct InferenceResult {
    posteriors: IndexMap<String, PosteriorDistribution>,
    n_hypotheses: u64,
}

impl InferenceResult {
    /// Posterior of the named individual, or `None` if the name is unknown.
    pub fn get(&self, name: &str) -> Option<&PosteriorDistribution> {
        self.posteriors.get(name)
    }

    /// `(name, posterior)` pairs in population order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PosteriorDistribution)> {
        self.posteriors.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of individuals with a posterior.
    pub fn len(&self) -> usize {
        self.posteriors.len()
    }

    /// Whether the population was empty.
    pub fn is_empty(&self) -> bool {
        self.posteriors.is_empty()
    }

    /// Number of hypotheses that were scored.
    pub fn n_hypotheses(&self) -> u64 {
        self.n_hypotheses
    }

    /// Plain-text report, four decimals per probability.
    pub fn summary(&self) -> String {
        let mut s = String::new();
        for (name, post) in &self.posteriors {
            s.push_str(&format!("{}:\n", name));
            s.push_str("  Gene:\n");
            for gene in GeneCount::ALL.iter().rev() {
                s.push_str(&format!("    {}: {:.4}\n", gene, post.gene(*gene)));
            }
            s.push_str("  Trait:\n");
            for expressed in [true, false] {
                let label = if expressed { "True" } else { "False" };
                s.push_str(&format!(
                    "    {}: {:.4}\n",
                    label,
                    post.trait_probability(expressed)
                ));
            }
        }
        s
    }
}
