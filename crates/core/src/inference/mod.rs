//! Exact inference by enumeration.
//!
//! Hypotheses flow from [`HypothesisSpace`] through [`joint_probability`]
//! into a [`PosteriorAggregator`], which is normalized once at the end.

pub mod enumerate;
pub mod joint;
pub mod posterior;

use rayon::prelude::*;

use crate::error::Result;
use crate::genetics::Population;
use crate::model::ConditionalModel;

pub use enumerate::{Hypothesis, HypothesisSpace, MASK_BITS, MAX_INDIVIDUALS};
pub use joint::{inheritance_probability, joint_probability, transmission_probability};
pub use posterior::{InferenceResult, PosteriorAggregator, PosteriorDistribution};

/// Exact posterior inference over a population.
///
/// ```
/// use heredity_core::genetics::{PersonRecord, Population};
/// use heredity_core::inference::ExactInference;
/// use heredity_core::model::ConditionalModel;
///
/// let population = Population::from_records(&[
///     PersonRecord::child("Harry", "Lily", "James", Some(true)),
///     PersonRecord::founder("James", None),
///     PersonRecord::founder("Lily", None),
/// ])
/// .unwrap();
/// let result = ExactInference::new(ConditionalModel::default())
///     .run(&population)
///     .unwrap();
/// assert_eq!(result.get("Harry").unwrap().trait_probability(true), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct ExactInference {
    model: ConditionalModel,
    parallel: bool,
}

impl ExactInference {
    /// Sequential inference under `model`.
    pub fn new(model: ConditionalModel) -> Self {
        Self {
            model,
            parallel: false,
        }
    }

    /// Split the hypothesis space across the rayon thread pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Compute normalized gene and trait posteriors for every individual.
    ///
    /// # Errors
    /// Fails on an invalid model, an inconsistent pedigree, a population
    /// larger than [`MAX_INDIVIDUALS`], or evidence that no hypothesis with
    /// non-zero probability can explain.
    pub fn run(&self, population: &Population) -> Result<InferenceResult> {
        self.model.validate()?;
        population.validate()?;
        let space = HypothesisSpace::new(population)?;

        log::debug!(
            "Enumerating {} hypotheses over {} individuals ({})",
            space.hypothesis_count(),
            space.n_individuals(),
            if self.parallel { "parallel" } else { "sequential" }
        );

        let aggregator = if self.parallel {
            self.accumulate_parallel(population, &space)
        } else {
            self.accumulate_sequential(population, &space)
        };

        let result = aggregator.finalize(population)?;
        log::info!(
            "Scored {} hypotheses for {} individuals",
            result.n_hypotheses(),
            result.len()
        );
        Ok(result)
    }

    fn accumulate_sequential(
        &self,
        population: &Population,
        space: &HypothesisSpace,
    ) -> PosteriorAggregator {
        let mut aggregator = PosteriorAggregator::new(population.len());
        for hypothesis in space.iter() {
            let p = joint_probability(population, &self.model, &hypothesis);
            aggregator.accumulate(&hypothesis, p);
        }
        aggregator
    }

    /// Every integer in `0..=full` is a one-copy mask, so the range itself is
    /// the partition of the work. Each worker folds a local aggregator and the
    /// partials are summed.
    fn accumulate_parallel(
        &self,
        population: &Population,
        space: &HypothesisSpace,
    ) -> PosteriorAggregator {
        let n = population.len();
        (0..=space.full_mask())
            .into_par_iter()
            .fold(
                || PosteriorAggregator::new(n),
                |mut aggregator, one| {
                    for two in space.two_copy_masks(one) {
                        for expressed in space.trait_masks() {
                            let hypothesis = Hypothesis::new(one, two, expressed);
                            let p = joint_probability(population, &self.model, &hypothesis);
                            aggregator.accumulate(&hypothesis, p);
                        }
                    }
                    aggregator
                },
            )
            .reduce(|| PosteriorAggregator::new(n), PosteriorAggregator::merge)
    }
}

/// Sequential exact inference with the given model.
pub fn infer(population: &Population, model: &ConditionalModel) -> Result<InferenceResult> {
    ExactInference::new(model.clone()).run(population)
}
