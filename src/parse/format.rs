use winnow::{
    combinator::repeat,
    token::{one_of, take_till},
    PResult, Parser,
};

use super::operand::parse_integer;
use crate::error::{Result, RollError};

const FORMAT_SIGILS: [char; 4] = ['l', 's', '>', '<'];
pub const DEFAULT_SPLIT_SIZE: usize = 20;

/// The sigil that opens a format directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatDirective {
    /// `l`
    List,
    /// `s`
    Sum,
    /// `>`
    Greater,
    /// `<`
    Less,
}

impl FormatDirective {
    pub fn from_sigil(sigil: char) -> Option<FormatDirective> {
        match sigil {
            'l' => Some(FormatDirective::List),
            's' => Some(FormatDirective::Sum),
            '>' => Some(FormatDirective::Greater),
            '<' => Some(FormatDirective::Less),
            _ => None,
        }
    }

    pub fn sigil(self) -> char {
        match self {
            FormatDirective::List => 'l',
            FormatDirective::Sum => 's',
            FormatDirective::Greater => '>',
            FormatDirective::Less => '<',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Comma separated values followed by their sum.
    Default,
    /// `s`\
    /// Only the sum.
    SumOnly,
    /// `l`\
    /// Only the comma separated values.
    ListOnly,
    /// `l{size}`\
    /// Values in lines of `size` each.
    ListSplit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdMode {
    /// `>{limit}`
    GreaterEqual,
    /// `<{limit}`
    LessEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    pub limit: i64,
    pub mode: ThresholdMode,
}

impl Threshold {
    pub fn new(limit: i64, mode: ThresholdMode) -> Self {
        Self { limit, mode }
    }

    pub fn passes(&self, value: f64) -> bool {
        let limit = self.limit as f64;
        match self.mode {
            ThresholdMode::GreaterEqual => value >= limit,
            ThresholdMode::LessEqual => value <= limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    pub kind: FormatKind,
    /// Only used by [`FormatKind::ListSplit`].
    pub split_size: usize,
    pub threshold: Option<Threshold>,
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            kind: FormatKind::Default,
            split_size: DEFAULT_SPLIT_SIZE,
            threshold: None,
        }
    }
}

impl FormatSpec {
    pub fn sum_only() -> Self {
        Self {
            kind: FormatKind::SumOnly,
            ..Self::default()
        }
    }

    /// Strips the trailing format directives from `expression`, returning the
    /// remaining core expression together with the parsed format.
    pub fn parse(expression: &str) -> Result<(&str, FormatSpec)> {
        let (core, directives) = format_tokens
            .parse(expression)
            .map_err(|_| RollError::InvalidNumber(expression.to_string()))?;

        let format = directives
            .into_iter()
            .try_fold(FormatSpec::default(), |format, (directive, argument)| {
                let argument = Some(argument.trim()).filter(|arg| !arg.is_empty());
                format.apply_directive(directive, argument)
            })?;

        Ok((core, format))
    }

    fn apply_directive(
        mut self,
        directive: FormatDirective,
        argument: Option<&str>,
    ) -> Result<Self> {
        match (directive, argument) {
            (FormatDirective::List, Some(argument)) => {
                self.kind = FormatKind::ListSplit;
                self.split_size = match parse_integer(argument) {
                    Ok(size) if size > 0 => size as usize,
                    _ => return Err(invalid_argument(directive, argument)),
                };
            }
            (FormatDirective::List, None) => self.kind = FormatKind::ListOnly,
            // The argument of `s` is swallowed and ignored.
            (FormatDirective::Sum, _) => self.kind = FormatKind::SumOnly,
            (FormatDirective::Greater | FormatDirective::Less, None) => {
                return Err(RollError::MissingThresholdArgument {
                    directive: directive.sigil(),
                })
            }
            (FormatDirective::Greater, Some(argument)) => {
                self.threshold = Some(threshold(directive, argument, ThresholdMode::GreaterEqual)?);
            }
            (FormatDirective::Less, Some(argument)) => {
                self.threshold = Some(threshold(directive, argument, ThresholdMode::LessEqual)?);
            }
        }

        Ok(self)
    }
}

fn threshold(directive: FormatDirective, argument: &str, mode: ThresholdMode) -> Result<Threshold> {
    let limit = parse_integer(argument).map_err(|_| invalid_argument(directive, argument))?;
    Ok(Threshold::new(limit, mode))
}

fn invalid_argument(directive: FormatDirective, argument: &str) -> RollError {
    RollError::InvalidFormatArgument {
        directive: directive.sigil(),
        argument: argument.to_string(),
    }
}

type DirectiveToken<'s> = (FormatDirective, &'s str);

fn format_tokens<'s>(input: &mut &'s str) -> PResult<(&'s str, Vec<DirectiveToken<'s>>)> {
    (
        take_till(0.., FORMAT_SIGILS),
        repeat(0.., (format_directive, take_till(0.., FORMAT_SIGILS))),
    )
        .parse_next(input)
}

fn format_directive(input: &mut &str) -> PResult<FormatDirective> {
    one_of(FORMAT_SIGILS)
        .verify_map(FormatDirective::from_sigil)
        .parse_next(input)
}

impl std::fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            FormatKind::Default => {}
            FormatKind::SumOnly => write!(f, "s")?,
            FormatKind::ListOnly => write!(f, "l")?,
            FormatKind::ListSplit => write!(f, "l{}", self.split_size)?,
        }
        match self.threshold {
            Some(Threshold {
                limit,
                mode: ThresholdMode::GreaterEqual,
            }) => write!(f, ">{limit}"),
            Some(Threshold {
                limit,
                mode: ThresholdMode::LessEqual,
            }) => write!(f, "<{limit}"),
            None => Ok(()),
        }
    }
}
