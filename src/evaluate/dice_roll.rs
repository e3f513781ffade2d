use rand::{thread_rng, Rng};
use tracing::debug;

use super::roll::{RollOutcome, SolveMode};
use crate::error::Result;
use crate::parse::{DiceSpec, RollSpec};

impl DiceSpec {
    /// Generates `count` raw values. Only [`SolveMode::Random`] touches `rng`.
    pub fn solve(&self, mode: SolveMode, rng: &mut impl Rng) -> Vec<f64> {
        let count = self.count as usize;
        match mode {
            SolveMode::Random => (0..count)
                .map(|_| rng.gen_range(self.low..=self.high) as f64)
                .collect(),
            SolveMode::Max => vec![self.high as f64; count],
            SolveMode::Min => vec![self.low as f64; count],
        }
    }
}

impl RollSpec {
    /// Evaluates the roll using `rand::thread_rng()`, if you want to choose the
    /// rng yourself use `evaluate_with()`.
    pub fn evaluate(&self, mode: SolveMode) -> Result<RollOutcome> {
        self.evaluate_with(mode, &mut thread_rng())
    }

    /// Generates the raw values, then applies every uniform modifier followed
    /// by every targeted group, each in the order they were written.
    pub fn evaluate_with(&self, mode: SolveMode, rng: &mut impl Rng) -> Result<RollOutcome> {
        let baseline_values = self.dice.solve(mode, rng);
        let mut final_values = baseline_values.clone();

        for modifier in &self.uniform_modifiers {
            modifier.apply(&mut final_values)?;
        }
        for group in &self.targeted_modifiers {
            group.apply(&mut final_values)?;
        }

        let outcome = RollOutcome::new(&self.source_text, final_values, baseline_values);
        debug!(?mode, sum = outcome.sum(), "evaluated {}", self.source_text);

        Ok(outcome)
    }
}
