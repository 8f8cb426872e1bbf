// Genetics module
// Population model and its CSV loader

pub mod population;

pub use population::{Individual, Parents, PersonRecord, Population};
