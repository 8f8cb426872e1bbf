use crate::genetics::Population;
use crate::model::ConditionalModel;
use crate::types::{GeneCount, Scalar};

use super::enumerate::Hypothesis;

/// Probability that a parent with `parent_gene` copies passes the gene on.
///
/// A carrier of two copies always passes one unless it mutates away; a
/// non-carrier only passes one through mutation.
pub fn transmission_probability(model: &ConditionalModel, parent_gene: GeneCount) -> Scalar {
    match parent_gene {
        GeneCount::Zero => model.mutation,
        GeneCount::One => 0.5,
        GeneCount::Two => 1.0 - model.mutation,
    }
}

/// `P(child = g | mother, father)` under independent transmission from each
/// parent.
pub fn inheritance_probability(
    model: &ConditionalModel,
    child: GeneCount,
    mother: GeneCount,
    father: GeneCount,
) -> Scalar {
    let from_mother = transmission_probability(model, mother);
    let from_father = transmission_probability(model, father);
    match child {
        GeneCount::Zero => (1.0 - from_mother) * (1.0 - from_father),
        GeneCount::One => from_mother * (1.0 - from_father) + (1.0 - from_mother) * from_father,
        GeneCount::Two => from_mother * from_father,
    }
}

/// Probability of the complete joint assignment described by `hypothesis`.
///
/// Each individual contributes a gene factor (founder prior, or inheritance
/// from the parents' genes in the same hypothesis) and a trait factor.
///
/// # Panics
/// Panics if `population` has more than
/// [`MASK_BITS`](super::enumerate::MASK_BITS) individuals. Populations
/// accepted by [`HypothesisSpace::new`](super::enumerate::HypothesisSpace::new)
/// always fit.
pub fn joint_probability(
    population: &Population,
    model: &ConditionalModel,
    hypothesis: &Hypothesis,
) -> Scalar {
    let mut joint = 1.0;
    for (i, ind) in population.iter().enumerate() {
        let gene = hypothesis.gene(i);
        let gene_factor = match ind.parents() {
            None => model.gene_prior(gene),
            Some(p) => inheritance_probability(
                model,
                gene,
                hypothesis.gene(p.mother),
                hypothesis.gene(p.father),
            ),
        };
        joint *= gene_factor * model.trait_probability(hypothesis.expresses(i), gene);
        if joint == 0.0 {
            break;
        }
    }
    joint
}
