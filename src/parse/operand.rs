use winnow::{
    ascii::{dec_int, float, space0},
    combinator::{delimited, repeat},
    error::ContextError,
    token::{one_of, take_till},
    PResult, Parser,
};

use crate::error::{Result, RollError};

pub(crate) const OPERATOR_SIGILS: [char; 4] = ['+', '-', '*', '/'];
/// Operators plus the `i` that opens the targeted segment.
pub(crate) const CORE_SIGILS: [char; 5] = ['+', '-', '*', '/', 'i'];
pub(crate) const TARGET_SIGIL: char = 'i';
/// Either one closes a targeted group.
pub(crate) const GROUP_DELIMITERS: [char; 2] = [';', 'i'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`, real division.
    Divide,
}

impl Operator {
    pub fn from_sigil(sigil: char) -> Option<Operator> {
        match sigil {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Subtract),
            '*' => Some(Operator::Multiply),
            '/' => Some(Operator::Divide),
            _ => None,
        }
    }

    pub fn sigil(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    /// Applies the operator with `value` on the left hand side.
    pub fn apply(self, value: f64, operand: f64) -> Result<f64> {
        match self {
            Operator::Add => Ok(value + operand),
            Operator::Subtract => Ok(value - operand),
            Operator::Multiply => Ok(value * operand),
            Operator::Divide if operand == 0.0 => Err(RollError::DivisionByZero),
            Operator::Divide => Ok(value / operand),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sigil())
    }
}

/// One `(operator, operand)` pair produced by the step scanner.
pub type Step = (Operator, f64);

/// Splits `input` on operator sigils the way a regex split with a capture
/// group would: the leading text, then every sigil with the text up to the
/// next one.
pub(crate) fn split_operators(input: &str) -> Result<(&str, Vec<(Operator, &str)>)> {
    operator_tokens
        .parse(input)
        .map_err(|_| RollError::InvalidNumber(input.to_string()))
}

fn operator_tokens<'s>(input: &mut &'s str) -> PResult<(&'s str, Vec<(Operator, &'s str)>)> {
    (
        take_till(0.., OPERATOR_SIGILS),
        repeat(
            0..,
            (
                one_of(OPERATOR_SIGILS).verify_map(Operator::from_sigil),
                take_till(0.., OPERATOR_SIGILS),
            ),
        ),
    )
        .parse_next(input)
}

/// What the step scanner does with an operator that has no operand after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EmptyOperand {
    Skip,
    Reject,
}

/// Pending operand: the operator that opened it and where its digits start.
/// `from` is 0 only for the implicit leading operand.
#[derive(Debug, Clone, Copy)]
struct Pending {
    operator: Operator,
    from: usize,
}

#[derive(Debug)]
struct StepScanner<'s> {
    text: &'s str,
    empty: EmptyOperand,
    pending: Pending,
    steps: Vec<Step>,
}

impl<'s> StepScanner<'s> {
    fn new(text: &'s str, leading: Operator, empty: EmptyOperand) -> Self {
        Self {
            text,
            empty,
            pending: Pending {
                operator: leading,
                from: 0,
            },
            steps: Vec::new(),
        }
    }

    fn advance(mut self, (idx, c): (usize, char)) -> Result<Self> {
        let Some(operator) = Operator::from_sigil(c) else {
            return Ok(self);
        };

        self.flush(idx)?;
        self.pending = Pending {
            operator,
            from: idx + c.len_utf8(),
        };
        Ok(self)
    }

    fn flush(&mut self, until: usize) -> Result<()> {
        let Pending { operator, from } = self.pending;
        let operand = self.text[from..until].trim();
        match (operand.is_empty(), self.empty) {
            (false, _) => self.steps.push((operator, parse_operand(operand)?)),
            (true, EmptyOperand::Reject) if from > 0 => {
                return Err(RollError::InvalidNumber(self.text[from - 1..until].to_string()))
            }
            (true, _) => {}
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Step>> {
        self.flush(self.text.len())?;
        Ok(self.steps)
    }
}

/// Scans `text` character by character into `(operator, value)` steps.
///
/// Every operator sigil closes the operand accumulated so far and opens a
/// new one. Operand text before the first sigil uses `leading`. A stray `i`
/// ends the scan. `empty` decides whether a sigil with nothing after it is an
/// error.
pub(crate) fn scan_steps(
    text: &str,
    leading: Operator,
    empty: EmptyOperand,
) -> Result<Vec<Step>> {
    let text = match text.find(TARGET_SIGIL) {
        Some(end) => &text[..end],
        None => text,
    };

    text.char_indices()
        .try_fold(StepScanner::new(text, leading, empty), StepScanner::advance)?
        .finish()
}

pub(crate) fn parse_operand(text: &str) -> Result<f64> {
    delimited(space0::<_, ContextError>, float.verify(|value: &f64| value.is_finite()), space0)
        .parse(text)
        .map_err(|_| RollError::InvalidNumber(text.to_string()))
}

pub(crate) fn parse_integer(text: &str) -> Result<i64> {
    delimited(space0::<_, ContextError>, dec_int, space0)
        .parse(text)
        .map_err(|_| RollError::InvalidNumber(text.to_string()))
}
