//! Roll ranged dice, apply uniform and per-roll modifiers to them and render
//! the results.
//!
//! ```rust
//! # use rollplayer_dice::{parse_expression, render, roll_with, SolveMode};
//! # use rand::rngs::StdRng;
//! # use rand::SeedableRng;
//! #
//! # fn main() -> Result<(), rollplayer_dice::RollError> {
//! // Roll 3 d100, add 20 to the first and third roll and 5 to the second,
//! // highlight everything at or above 50.
//! let spec = parse_expression("3d100i1,3:+20;2,+5>50")?;
//!
//! let lowest = spec.evaluate(SolveMode::Min)?;
//! assert_eq!(lowest.final_values(), [21.0, 6.0, 21.0]);
//!
//! // Use a custom Rng that implements the rand::Rng trait
//! let mut rng = StdRng::seed_from_u64(1);
//! let rolled = spec.evaluate_with(SolveMode::Random, &mut rng)?;
//! for field in render(&rolled, spec.format()) {
//!     println!("{}\n{}", field.title, field.body);
//! }
//!
//! // Parse, roll and render in one go
//! let fields = roll_with("4d6:12s", &mut rng)?;
//! println!("{}", fields[0].body);
//! # Ok(())
//! # }
//! ```

pub mod color;
mod error;
mod evaluate;
mod parse;
mod render;

pub use error::RollError;
pub use evaluate::{normalize, RollEnvelope, RollOutcome, SolveMode};
pub use parse::{
    DiceSpec, FormatDirective, FormatKind, FormatSpec, Operator, RollSpec, Step,
    TargetedModifierGroup, Threshold, ThresholdMode, UniformModifier, DEFAULT_SPLIT_SIZE,
    MAX_DICE_COUNT,
};
pub use render::{format_number, render_within, Field, Rendered, FIELD_LIMIT};

/// Parses the expression, format directives included, without rolling.
pub fn parse_expression(expression: &str) -> Result<RollSpec, RollError> {
    RollSpec::parse(expression)
}

/// Strips the format directives from the expression, returning what is left
/// of it and the parsed format.
pub fn parse_format(expression: &str) -> Result<(&str, FormatSpec), RollError> {
    FormatSpec::parse(expression)
}

/// Evaluates the roll with `rand::thread_rng()`.
pub fn evaluate(spec: &RollSpec, mode: SolveMode) -> Result<RollOutcome, RollError> {
    spec.evaluate(mode)
}

/// Same as `evaluate()` but allows you to choose the rng you prefer to use.
pub fn evaluate_with(
    spec: &RollSpec,
    mode: SolveMode,
    rng: &mut impl rand::Rng,
) -> Result<RollOutcome, RollError> {
    spec.evaluate_with(mode, rng)
}

/// Renders the outcome as `(title, body)` fields.
pub fn render(outcome: &RollOutcome, format: &FormatSpec) -> Vec<Field> {
    render::render(outcome, format)
}

/// Parses the expression, rolls it and renders it with its own format.
pub fn roll(expression: &str) -> Result<Vec<Field>, RollError> {
    roll_with(expression, &mut rand::thread_rng())
}

/// Same as `roll()` but allows you to choose the rng you prefer to use.
pub fn roll_with(expression: &str, rng: &mut impl rand::Rng) -> Result<Vec<Field>, RollError> {
    let spec = RollSpec::parse(expression)?;
    let outcome = spec.evaluate_with(SolveMode::Random, rng)?;
    Ok(render::render(&outcome, spec.format()))
}
