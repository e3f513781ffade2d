use crate::parse::MAX_DICE_COUNT;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RollError {
    #[error("Dice count limit exceeded [max {max}]")]
    InvalidDiceCount { max: u32 },

    #[error("Dice count must be at least 1")]
    ZeroDiceCount,

    #[error("Attempted to use {directive} with non-integer `{argument}`")]
    InvalidFormatArgument { directive: char, argument: String },

    #[error("'{directive}' needs a number to work")]
    MissingThresholdArgument { directive: char },

    #[error("Division by zero")]
    DivisionByZero,

    /// Malformed numeric literal anywhere in the expression.
    #[error("Invalid number: `{0}`")]
    InvalidNumber(String),

    /// Target index that is not a positive integer.
    #[error("Invalid roll index: `{0}`")]
    InvalidTarget(String),
}

impl RollError {
    pub(crate) fn count_exceeded() -> Self {
        RollError::InvalidDiceCount {
            max: MAX_DICE_COUNT,
        }
    }
}

pub type Result<T> = std::result::Result<T, RollError>;
