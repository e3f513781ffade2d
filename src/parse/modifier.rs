use std::collections::BTreeSet;

use tracing::trace;
use winnow::{
    ascii::{dec_uint, space0},
    combinator::{alt, delimited, preceded, separated, separated_pair},
    token::{one_of, rest, take_till, take_while},
    PResult, Parser,
};

use super::{
    operand::{
        scan_steps, split_operators, EmptyOperand, Operator, Step, GROUP_DELIMITERS,
        OPERATOR_SIGILS,
    },
    TargetedModifierGroup, UniformModifier,
};
use crate::error::{Result, RollError};

impl UniformModifier {
    pub fn new(operator: Operator, operand: f64) -> Self {
        Self { operator, operand }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }
    pub fn operand(&self) -> f64 {
        self.operand
    }

    /// Applies the modifier to every value.
    pub fn apply(&self, values: &mut [f64]) -> Result<()> {
        for value in values.iter_mut() {
            *value = self.operator.apply(*value, self.operand)?;
        }
        Ok(())
    }

    /// Parses the uniform segment, e.g. `+5*2`.
    ///
    /// The segment is split on operator sigils first and every operand token
    /// is then scanned again on its own, so fused chains inside one token
    /// still produce one modifier per operator.
    pub fn parse_all(segment: &str) -> Result<Vec<UniformModifier>> {
        let (leading, tokens) = split_operators(segment)?;

        let mut modifiers = Vec::new();
        let mut push_token = |operator: Operator, token: &str| -> Result<()> {
            if token.trim().is_empty() {
                return Ok(());
            }
            let steps = scan_steps(token, operator, EmptyOperand::Skip)?;
            modifiers.extend(steps.into_iter().map(|(op, value)| Self::new(op, value)));
            Ok(())
        };

        push_token(Operator::Add, leading)?;
        for (operator, token) in tokens {
            push_token(operator, token)?;
        }

        Ok(modifiers)
    }
}

impl TargetedModifierGroup {
    pub fn new(targets: impl IntoIterator<Item = usize>, steps: Vec<Step>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            steps,
        }
    }

    pub fn targets(&self) -> &BTreeSet<usize> {
        &self.targets
    }
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Applies every step in order, each one only to the 1-based positions in
    /// `targets`. Other positions keep whatever the previous step left.
    pub fn apply(&self, values: &mut [f64]) -> Result<()> {
        for &(operator, operand) in &self.steps {
            for (_, value) in values
                .iter_mut()
                .enumerate()
                .filter(|(idx, _)| self.targets.contains(&(idx + 1)))
            {
                *value = operator.apply(*value, operand)?;
            }
        }
        Ok(())
    }

    /// Parses the targeted segment, e.g. `i1,3:+20;2,-5`.
    ///
    /// Groups are delimited by `;` and by `i`. Inside a group the targets run
    /// up to the `:`, or up to the first operator sigil when there is none.
    /// Every target must be a positive index and every operator inside a
    /// group needs an operand.
    pub fn parse_all(segment: &str) -> Result<Vec<TargetedModifierGroup>> {
        let groups = group_tokens
            .parse(segment)
            .map_err(|_| RollError::InvalidTarget(segment.to_string()))?;

        groups
            .into_iter()
            .filter(|group| !group.trim().is_empty())
            .map(Self::parse_group)
            .collect()
    }

    fn parse_group(group: &str) -> Result<Self> {
        let (targets, steps) = group_parts
            .parse(group)
            .map_err(|_| RollError::InvalidTarget(group.to_string()))?;

        let targets = parse_targets(targets)?;
        let steps = scan_steps(steps, Operator::Add, EmptyOperand::Reject)?;
        trace!(?targets, ?steps, "parsed targeted group");

        Ok(Self { targets, steps })
    }
}

fn group_tokens<'s>(input: &mut &'s str) -> PResult<Vec<&'s str>> {
    separated(0.., take_till(0.., GROUP_DELIMITERS), one_of(GROUP_DELIMITERS)).parse_next(input)
}

/// Splits a group into its target list and its steps. Without a `:` the
/// comma right before the first operator closes the target list.
fn group_parts<'s>(input: &mut &'s str) -> PResult<(&'s str, &'s str)> {
    alt((
        separated_pair(take_till(0.., ':'), ':', rest),
        (take_till(0.., OPERATOR_SIGILS).map(strip_closing_comma), rest),
    ))
    .parse_next(input)
}

fn strip_closing_comma(targets: &str) -> &str {
    let trimmed = targets.trim_end();
    trimmed.strip_suffix(',').unwrap_or(trimmed)
}

fn target_tokens<'s>(input: &mut &'s str) -> PResult<Vec<&'s str>> {
    separated(1.., take_till(0.., ','), ',').parse_next(input)
}

/// 1-based roll position. Leading zeros are allowed, zero itself is not.
fn target_index(input: &mut &str) -> PResult<usize> {
    delimited(
        space0,
        preceded(take_while(0.., '0'), dec_uint::<_, usize, _>),
        space0,
    )
    .parse_next(input)
}

fn parse_targets(text: &str) -> Result<BTreeSet<usize>> {
    let tokens = target_tokens
        .parse(text)
        .map_err(|_| RollError::InvalidTarget(text.to_string()))?;

    tokens
        .into_iter()
        .map(|token| {
            target_index
                .parse(token)
                .map_err(|_| RollError::InvalidTarget(token.trim().to_string()))
        })
        .collect()
}

impl std::fmt::Display for UniformModifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.operator, self.operand)
    }
}

impl std::fmt::Display for TargetedModifierGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let targets = self
            .targets
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "i{targets}:")?;
        for (operator, operand) in &self.steps {
            write!(f, "{operator}{operand}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::parse::operand::Operator::*;

    fn uniform(input: &str) -> Vec<(Operator, f64)> {
        UniformModifier::parse_all(input)
            .unwrap()
            .iter()
            .map(|m| (m.operator(), m.operand()))
            .collect()
    }

    #[test]
    fn test_uniform_single() {
        assert_eq!(uniform("+2"), [(Add, 2.0)]);
    }

    #[test]
    fn test_uniform_chain_in_order() {
        assert_eq!(
            uniform("+5*3-1/2"),
            [(Add, 5.0), (Multiply, 3.0), (Subtract, 1.0), (Divide, 2.0)]
        );
    }

    #[test]
    fn test_uniform_decimal_and_spaces() {
        assert_eq!(uniform(" + 2.5 "), [(Add, 2.5)]);
    }

    #[test]
    fn test_uniform_bare_operand_defaults_to_add() {
        assert_eq!(uniform("4-1"), [(Add, 4.0), (Subtract, 1.0)]);
    }

    #[test]
    fn test_uniform_trailing_operator_is_ignored() {
        assert_eq!(uniform("+3-"), [(Add, 3.0)]);
        assert!(uniform("").is_empty());
    }

    #[test]
    fn test_uniform_malformed_operand() {
        assert_eq!(
            UniformModifier::parse_all("+3x"),
            Err(RollError::InvalidNumber("3x".to_string()))
        );
    }

    #[test]
    fn test_uniform_apply() {
        let mut values = [1.0, 2.0, 3.0];
        UniformModifier::new(Multiply, 2.0).apply(&mut values).unwrap();
        assert_eq!(values, [2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_targeted_single_group() {
        let groups = TargetedModifierGroup::parse_all("i1,3:+20").unwrap();
        assert_eq!(groups, [TargetedModifierGroup::new([1, 3], vec![(Add, 20.0)])]);
    }

    #[test]
    fn test_targeted_groups_separated_by_semicolon() {
        let groups = TargetedModifierGroup::parse_all("i1,3:+20;2,-5").unwrap();
        assert_eq!(
            groups,
            [
                TargetedModifierGroup::new([1, 3], vec![(Add, 20.0)]),
                TargetedModifierGroup::new([2], vec![(Subtract, 5.0)]),
            ]
        );
    }

    #[test]
    fn test_targeted_groups_separated_by_target_sigil() {
        let groups = TargetedModifierGroup::parse_all("i1:*2-1i2:/4").unwrap();
        assert_eq!(
            groups,
            [
                TargetedModifierGroup::new([1], vec![(Multiply, 2.0), (Subtract, 1.0)]),
                TargetedModifierGroup::new([2], vec![(Divide, 4.0)]),
            ]
        );
    }

    #[test]
    fn test_targeted_trailing_separator() {
        let groups = TargetedModifierGroup::parse_all("i2:+1;").unwrap();
        assert_eq!(groups, [TargetedModifierGroup::new([2], vec![(Add, 1.0)])]);
    }

    #[test]
    fn test_targeted_invalid_index() {
        assert_eq!(
            TargetedModifierGroup::parse_all("ia:+1"),
            Err(RollError::InvalidTarget("a".to_string()))
        );
        assert_eq!(
            TargetedModifierGroup::parse_all("i0:+1"),
            Err(RollError::InvalidTarget("0".to_string()))
        );
    }

    #[test]
    fn test_targeted_empty_index() {
        assert_eq!(
            TargetedModifierGroup::parse_all("i1,,3:+1"),
            Err(RollError::InvalidTarget(String::new()))
        );
        assert_eq!(
            TargetedModifierGroup::parse_all("i,:+5"),
            Err(RollError::InvalidTarget(String::new()))
        );
        assert_eq!(
            TargetedModifierGroup::parse_all("i:+5"),
            Err(RollError::InvalidTarget(String::new()))
        );
    }

    #[test]
    fn test_targeted_group_without_colon() {
        assert_eq!(
            TargetedModifierGroup::parse_all("i2,-5").unwrap(),
            [TargetedModifierGroup::new([2], vec![(Subtract, 5.0)])]
        );
        assert_eq!(
            TargetedModifierGroup::parse_all("i2,,-5"),
            Err(RollError::InvalidTarget(String::new()))
        );
    }

    #[test]
    fn test_targeted_leading_zeros_and_spaces() {
        let groups = TargetedModifierGroup::parse_all("i 01 , 3 :+2").unwrap();
        assert_eq!(groups, [TargetedModifierGroup::new([1, 3], vec![(Add, 2.0)])]);
    }

    #[test]
    fn test_targeted_dangling_operator() {
        assert_eq!(
            TargetedModifierGroup::parse_all("i1:+"),
            Err(RollError::InvalidNumber("+".to_string()))
        );
        assert_eq!(
            TargetedModifierGroup::parse_all("i1:+20;2,-"),
            Err(RollError::InvalidNumber("-".to_string()))
        );
    }

    #[test]
    fn test_targeted_apply_carries_previous_step() {
        let group = TargetedModifierGroup::new([1, 3], vec![(Add, 20.0), (Multiply, 2.0)]);
        let mut values = [1.0, 1.0, 1.0];
        group.apply(&mut values).unwrap();
        assert_eq!(values, [42.0, 1.0, 42.0]);
    }

    #[test]
    fn test_targeted_apply_out_of_range_targets() {
        let group = TargetedModifierGroup::new([4, 9], vec![(Add, 20.0)]);
        let mut values = [1.0, 2.0, 3.0];
        group.apply(&mut values).unwrap();
        assert_eq!(values, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_display() {
        assert_eq!(UniformModifier::new(Subtract, 2.5).to_string(), "-2.5");
        assert_eq!(
            TargetedModifierGroup::new([3, 1], vec![(Add, 20.0), (Divide, 2.0)]).to_string(),
            "i1,3:+20/2"
        );
    }
}
