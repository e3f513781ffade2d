use tracing::trace;
use winnow::{
    ascii::{dec_int, dec_uint, digit1, space0},
    combinator::{alt, delimited, opt, peek, preceded, separated_pair, terminated},
    token::{rest, take_till, take_while},
    PResult, Parser,
};

use super::{DiceSpec, MAX_DICE_COUNT};
use crate::error::{Result, RollError};

const DEFAULT_LOW: i64 = 1;
const DEFAULT_HIGH: i64 = 100;
/// Any count past the limit collapses to this so it always fails.
const COUNT_CEILING: u64 = MAX_DICE_COUNT as u64 + 1;

impl DiceSpec {
    /// Creates a dice specification, swapping `low` and `high` if they were
    /// given in the wrong order.
    pub fn new(count: u32, low: i64, high: i64) -> Result<Self> {
        match count {
            0 => return Err(RollError::ZeroDiceCount),
            c if c > MAX_DICE_COUNT => return Err(RollError::count_exceeded()),
            _ => {}
        }

        let (low, high) = if high < low { (high, low) } else { (low, high) };
        Ok(Self { count, low, high })
    }

    pub fn count(&self) -> u32 {
        self.count
    }
    pub fn low(&self) -> i64 {
        self.low
    }
    pub fn high(&self) -> i64 {
        self.high
    }

    /// Parses the `NdM` / `NdM:K` clause.
    ///
    /// Text without any `d` carries no dice clause and falls back to `1d100`.
    pub fn parse(clause: &str) -> Result<Self> {
        let Ok((count, range)) = (dice_quantity, rest).parse(clause) else {
            trace!(clause, "no dice clause, using default");
            return Ok(Self::default());
        };

        if count >= COUNT_CEILING {
            return Err(RollError::count_exceeded());
        }
        let (low, high) = dice_range
            .parse(range)
            .map_err(|_| RollError::InvalidNumber(range.trim().to_string()))?;

        // Below the ceiling, so it fits.
        Self::new(count as u32, low, high)
    }
}

impl Default for DiceSpec {
    fn default() -> Self {
        Self {
            count: 1,
            low: DEFAULT_LOW,
            high: DEFAULT_HIGH,
        }
    }
}

/// Everything up to and including the `d`. Anything that isn't a plain run of
/// digits means a single die.
fn dice_quantity(input: &mut &str) -> PResult<u64> {
    alt((
        terminated(delimited(space0, dice_count, space0), 'd'),
        terminated(take_till(0.., 'd'), 'd').value(1),
    ))
    .parse_next(input)
}

/// Digits, saturating at [`COUNT_CEILING`].
fn dice_count(input: &mut &str) -> PResult<u64> {
    preceded(
        (peek(digit1), take_while(0.., '0')),
        opt(alt((
            dec_uint::<_, u64, _>.map(|count| count.min(COUNT_CEILING)),
            digit1.value(COUNT_CEILING),
        ))),
    )
    .map(|count| count.unwrap_or(0))
    .parse_next(input)
}

/// `low:high`, `high` or nothing at all.
fn dice_range(input: &mut &str) -> PResult<(i64, i64)> {
    delimited(
        space0,
        opt(alt((
            separated_pair(dec_int, delimited(space0, ':', space0), dec_int),
            dec_int.map(|high| (DEFAULT_LOW, high)),
        ))),
        space0,
    )
    .map(|range| range.unwrap_or((DEFAULT_LOW, DEFAULT_HIGH)))
    .parse_next(input)
}

impl std::fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.low == DEFAULT_LOW {
            write!(f, "{}d{}", self.count, self.high)
        } else {
            write!(f, "{}d{}:{}", self.count, self.low, self.high)
        }
    }
}
