use rand::{thread_rng, Rng};

use super::roll::{RollOutcome, SolveMode};
use crate::error::Result;
use crate::parse::RollSpec;

/// The random outcome of a roll together with the lowest and highest
/// outcomes the same roll could have produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RollEnvelope {
    pub random: RollOutcome,
    pub min: RollOutcome,
    pub max: RollOutcome,
}

impl RollEnvelope {
    pub fn solve(spec: &RollSpec) -> Result<Self> {
        Self::solve_with(spec, &mut thread_rng())
    }

    pub fn solve_with(spec: &RollSpec, rng: &mut impl Rng) -> Result<Self> {
        Ok(Self {
            random: spec.evaluate_with(SolveMode::Random, rng)?,
            min: spec.evaluate_with(SolveMode::Min, rng)?,
            max: spec.evaluate_with(SolveMode::Max, rng)?,
        })
    }

    /// Where the random sum sits between the min and max sums, clamped to
    /// `[0, 1]`. A roll that can only produce one sum counts as a full 1.
    pub fn normalized(&self) -> f64 {
        normalize(self.min.sum(), self.max.sum(), self.random.sum())
    }
}

pub fn normalize(min: f64, max: f64, value: f64) -> f64 {
    if value < min {
        0.0
    } else if value > max {
        1.0
    } else if max == min {
        1.0
    } else {
        (value - min) / (max - min)
    }
}
