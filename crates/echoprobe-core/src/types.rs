use derive_more::{Add, AddAssign};

/// `Sequence` number newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Add, AddAssign)]
pub struct Sequence(pub u16);

