mod dice;
mod format;
mod modifier;
mod operand;

use std::collections::BTreeSet;

use tracing::debug;
use winnow::{
    token::{rest, take_till},
    PResult, Parser,
};

pub use format::{
    FormatDirective, FormatKind, FormatSpec, Threshold, ThresholdMode, DEFAULT_SPLIT_SIZE,
};
pub use operand::{Operator, Step};

use crate::error::{Result, RollError};
use operand::{CORE_SIGILS, TARGET_SIGIL};

/// Highest amount of dice a single expression may roll.
pub const MAX_DICE_COUNT: u32 = 10000;

/// `{count}d{high}` or `{count}d{low}:{high}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceSpec {
    pub(crate) count: u32,
    pub(crate) low: i64,
    pub(crate) high: i64,
}

/// `{operator}{operand}`\
/// Applied to every rolled value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformModifier {
    pub(crate) operator: Operator,
    pub(crate) operand: f64,
}

/// `i{index},{index}:{operator}{operand}...`\
/// A chain of steps applied only to the rolls at the 1-based `targets`.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetedModifierGroup {
    pub(crate) targets: BTreeSet<usize>,
    pub(crate) steps: Vec<Step>,
}

/// A fully parsed expression, ready to be evaluated as many times as needed.
#[derive(Debug, Clone, PartialEq)]
pub struct RollSpec {
    pub(crate) source_text: String,
    pub(crate) dice: DiceSpec,
    pub(crate) uniform_modifiers: Vec<UniformModifier>,
    pub(crate) targeted_modifiers: Vec<TargetedModifierGroup>,
    pub(crate) format: FormatSpec,
}

impl RollSpec {
    pub fn new(
        source_text: impl Into<String>,
        dice: DiceSpec,
        uniform_modifiers: Vec<UniformModifier>,
        targeted_modifiers: Vec<TargetedModifierGroup>,
    ) -> Self {
        Self {
            source_text: source_text.into(),
            dice,
            uniform_modifiers,
            targeted_modifiers,
            format: FormatSpec::default(),
        }
    }

    /// Parses a whole expression, format directives included.
    pub fn parse(expression: &str) -> Result<Self> {
        let (core, format) = FormatSpec::parse(expression)?;
        let (dice, uniform, targeted) = core_segments
            .parse(core)
            .map_err(|_| RollError::InvalidNumber(core.to_string()))?;

        let spec = Self {
            source_text: expression.to_string(),
            dice: DiceSpec::parse(dice)?,
            uniform_modifiers: UniformModifier::parse_all(uniform)?,
            targeted_modifiers: TargetedModifierGroup::parse_all(targeted)?,
            format,
        };
        debug!(expression, %spec, "parsed roll");

        Ok(spec)
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }
    pub fn dice(&self) -> &DiceSpec {
        &self.dice
    }
    pub fn uniform_modifiers(&self) -> &[UniformModifier] {
        &self.uniform_modifiers
    }
    pub fn targeted_modifiers(&self) -> &[TargetedModifierGroup] {
        &self.targeted_modifiers
    }
    pub fn format(&self) -> &FormatSpec {
        &self.format
    }
}

/// Splits the core expression into its dice clause, uniform segment and
/// targeted segment. The dice clause ends at the first operator or `i`, the
/// uniform segment at the first `i`.
fn core_segments<'s>(input: &mut &'s str) -> PResult<(&'s str, &'s str, &'s str)> {
    (
        take_till(0.., CORE_SIGILS),
        take_till(0.., TARGET_SIGIL),
        rest,
    )
        .parse_next(input)
}

impl std::fmt::Display for RollSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dice)?;
        for modifier in &self.uniform_modifiers {
            write!(f, "{modifier}")?;
        }
        let groups = self
            .targeted_modifiers
            .iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join(";");
        write!(f, "{groups}{}", self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RollError;

    use crate::parse::Operator::*;

    fn dice(count: u32, low: i64, high: i64) -> DiceSpec {
        DiceSpec::new(count, low, high).unwrap()
    }

    #[test]
    fn test_plain_dice() {
        let spec = RollSpec::parse("d100").unwrap();
        assert_eq!(spec.dice(), &dice(1, 1, 100));
        assert!(spec.uniform_modifiers().is_empty());
        assert!(spec.targeted_modifiers().is_empty());
        assert_eq!(spec.format(), &FormatSpec::default());
    }

    #[test]
    fn test_dice_with_uniform_modifier() {
        let spec = RollSpec::parse("3d6+2").unwrap();
        assert_eq!(spec.dice(), &dice(3, 1, 6));
        assert_eq!(spec.uniform_modifiers(), [UniformModifier::new(Add, 2.0)]);
    }

    #[test]
    fn test_full_expression() {
        let spec = RollSpec::parse("3d100i1,3:+20;2,-5>50").unwrap();
        assert_eq!(spec.source_text(), "3d100i1,3:+20;2,-5>50");
        assert_eq!(spec.dice(), &dice(3, 1, 100));
        assert!(spec.uniform_modifiers().is_empty());
        assert_eq!(
            spec.targeted_modifiers(),
            [
                TargetedModifierGroup::new([1, 3], vec![(Add, 20.0)]),
                TargetedModifierGroup::new([2], vec![(Subtract, 5.0)]),
            ]
        );
        assert_eq!(
            spec.format().threshold,
            Some(Threshold::new(50, ThresholdMode::GreaterEqual))
        );
    }

    #[test]
    fn test_uniform_then_targeted() {
        let spec = RollSpec::parse("2d6:10*2i2:-1").unwrap();
        assert_eq!(spec.dice(), &dice(2, 6, 10));
        assert_eq!(spec.uniform_modifiers(), [UniformModifier::new(Multiply, 2.0)]);
        assert_eq!(
            spec.targeted_modifiers(),
            [TargetedModifierGroup::new([2], vec![(Subtract, 1.0)])]
        );
    }

    #[test]
    fn test_modifiers_without_dice_clause() {
        let spec = RollSpec::parse("+5").unwrap();
        assert_eq!(spec.dice(), &DiceSpec::default());
        assert_eq!(spec.uniform_modifiers(), [UniformModifier::new(Add, 5.0)]);
    }

    #[test]
    fn test_empty_expression() {
        let spec = RollSpec::parse("").unwrap();
        assert_eq!(spec.dice(), &DiceSpec::default());
    }

    #[test]
    fn test_count_limit() {
        assert_eq!(
            RollSpec::parse("10001d6"),
            Err(RollError::InvalidDiceCount { max: MAX_DICE_COUNT })
        );
        assert_eq!(RollSpec::parse("10000d6").unwrap().dice().count(), 10000);
    }

    #[test]
    fn test_core_segments() {
        assert_eq!(
            core_segments.parse("3d6+2*3i1:+1;2,-1").unwrap(),
            ("3d6", "+2*3", "i1:+1;2,-1")
        );
        assert_eq!(core_segments.parse("2d10i2:/2").unwrap(), ("2d10", "", "i2:/2"));
        assert_eq!(core_segments.parse("d20").unwrap(), ("d20", "", ""));
    }

    #[test]
    fn test_malformed_targets_are_rejected() {
        assert_eq!(
            RollSpec::parse("3d6i1,,3:+1"),
            Err(RollError::InvalidTarget(String::new()))
        );
        assert_eq!(
            RollSpec::parse("3d6i,:+5"),
            Err(RollError::InvalidTarget(String::new()))
        );
        assert_eq!(
            RollSpec::parse("3d6i1:+"),
            Err(RollError::InvalidNumber("+".to_string()))
        );
    }

    #[test]
    fn test_display() {
        let spec = RollSpec::parse("3d100+1i1,3:+20;2,-5l4").unwrap();
        assert_eq!(spec.to_string(), "3d100+1i1,3:+20;i2:-5l4");
    }
}
