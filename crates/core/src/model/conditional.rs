use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HeredityError, Result};
use crate::types::{GeneCount, Scalar};

/// Tolerance for the gene prior summing to one.
const PRIOR_SUM_TOL: Scalar = 1e-9;

/// The fixed causal model shared by every individual.
///
/// - `gene_prior[g]`: probability that a founder carries `g` copies.
/// - `trait_given_gene[g]`: probability that an individual with `g` copies
///   expresses the trait. The complementary outcome has `1 - p`.
/// - `mutation`: probability that a transmitted copy flips state.
///
/// Missing fields in a JSON configuration fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionalModel {
    pub gene_prior: [Scalar; 3],
    pub trait_given_gene: [Scalar; 3],
    pub mutation: Scalar,
}

impl Default for ConditionalModel {
    fn default() -> Self {
        Self {
            gene_prior: [0.96, 0.03, 0.01],
            trait_given_gene: [0.01, 0.56, 0.65],
            mutation: 0.01,
        }
    }
}

impl ConditionalModel {
    /// Replace the founder gene prior, indexed by copy count.
    pub fn with_gene_prior(mut self, prior: [Scalar; 3]) -> Self {
        self.gene_prior = prior;
        self
    }

    /// Replace `P(trait = true | gene = g)`, indexed by copy count.
    pub fn with_trait_given_gene(mut self, table: [Scalar; 3]) -> Self {
        self.trait_given_gene = table;
        self
    }

    /// Replace the mutation probability.
    pub fn with_mutation(mut self, mutation: Scalar) -> Self {
        self.mutation = mutation;
        self
    }

    /// Read a model from a JSON file, e.g. `{"mutation": 0.05}`.
    ///
    /// The result is validated before it is returned.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&text)?;
        model.validate()?;
        Ok(model)
    }

    /// `P(gene = g)` for a founder.
    pub fn gene_prior(&self, gene: GeneCount) -> Scalar {
        self.gene_prior[gene.index()]
    }

    /// `P(trait = expressed | gene = g)`.
    pub fn trait_probability(&self, expressed: bool, gene: GeneCount) -> Scalar {
        let p = self.trait_given_gene[gene.index()];
        if expressed {
            p
        } else {
            1.0 - p
        }
    }

    /// Check that every entry is a probability and the prior sums to one.
    ///
    /// # Errors
    /// Returns [`HeredityError::InvalidParameter`] naming the offending entry.
    pub fn validate(&self) -> Result<()> {
        for (g, &p) in self.gene_prior.iter().enumerate() {
            check_probability(&format!("gene_prior[{}]", g), p)?;
        }
        for (g, &p) in self.trait_given_gene.iter().enumerate() {
            check_probability(&format!("trait_given_gene[{}]", g), p)?;
        }
        check_probability("mutation", self.mutation)?;

        let sum: Scalar = self.gene_prior.iter().sum();
        if (sum - 1.0).abs() > PRIOR_SUM_TOL {
            return Err(HeredityError::InvalidParameter(format!(
                "gene_prior sums to {} instead of 1",
                sum
            )));
        }
        Ok(())
    }
}

fn check_probability(name: &str, p: Scalar) -> Result<()> {
    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(HeredityError::InvalidParameter(format!(
            "{} = {} is not a probability",
            name, p
        )))
    }
}
