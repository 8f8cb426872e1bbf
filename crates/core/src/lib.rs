pub mod error;
pub mod genetics;
pub mod inference;
pub mod model;
pub mod types;

pub use error::{HeredityError, Result};
