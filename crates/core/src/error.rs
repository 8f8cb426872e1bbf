use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeredityError {
    #[error("Malformed pedigree: '{individual}' has a {present} but no {missing}")]
    MalformedPedigree {
        individual: String,
        present: &'static str,
        missing: &'static str,
    },

    #[error("'{individual}' references unknown {role} '{parent}'")]
    UnknownIndividualReference {
        individual: String,
        role: &'static str,
        parent: String,
    },

    #[error("Evidence is unsatisfiable: every consistent hypothesis has zero probability")]
    UnsatisfiableEvidence,

    #[error("Pedigree error: {0}")]
    Pedigree(String),

    #[error("Population of {n} individuals exceeds the enumeration limit of {max}")]
    PopulationTooLarge { n: usize, max: usize },

    #[error("Dimension mismatch: expected {expected}, got {got} in {context}")]
    DimensionMismatch {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("Invalid model parameter: {0}")]
    InvalidParameter(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HeredityError>;
