use std::fmt;

/// The scalar type used for all probabilities.
pub type Scalar = f64;

/// Number of copies of the gene an individual carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeneCount {
    Zero = 0,
    One = 1,
    Two = 2,
}

impl GeneCount {
    /// All gene counts in ascending order.
    pub const ALL: [GeneCount; 3] = [GeneCount::Zero, GeneCount::One, GeneCount::Two];

    /// Position of this count in a `[_; 3]` table.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for GeneCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Position of a trait value in a `[_; 2]` table (`false` first).
pub(crate) fn trait_index(expressed: bool) -> usize {
    expressed as usize
}
