mod dice_roll;
mod envelope;
mod roll;

pub use envelope::{normalize, RollEnvelope};
pub use roll::{RollOutcome, SolveMode};
