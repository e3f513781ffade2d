use crate::render::{format_number, format_sum};

const CONSOLE_LINE_SIZE: usize = 20;

/// How each die gets its raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveMode {
    /// Uniformly random in `[low, high]`.
    Random,
    /// Always `high`.
    Max,
    /// Always `low`.
    Min,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollOutcome {
    pub(crate) source_text: String,
    pub(crate) final_values: Vec<f64>,
    pub(crate) baseline_values: Vec<f64>,
}

impl RollOutcome {
    pub fn new(
        source_text: impl Into<String>,
        final_values: Vec<f64>,
        baseline_values: Vec<f64>,
    ) -> Self {
        Self {
            source_text: source_text.into(),
            final_values,
            baseline_values,
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }
    /// Values after every modifier was applied.
    pub fn final_values(&self) -> &[f64] {
        &self.final_values
    }
    /// Values as they were rolled.
    pub fn baseline_values(&self) -> &[f64] {
        &self.baseline_values
    }

    pub fn sum(&self) -> f64 {
        self.final_values.iter().sum()
    }
    pub fn baseline_sum(&self) -> f64 {
        self.baseline_values.iter().sum()
    }

    /// Whether the modifiers changed anything.
    pub fn is_modified(&self) -> bool {
        self.final_values != self.baseline_values
    }
}

impl std::fmt::Display for RollOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines = self
            .final_values
            .chunks(CONSOLE_LINE_SIZE)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|&v| format_number(v))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect::<Vec<_>>()
            .join("\n┃ ");

        writeln!(f, "┏━━━━ {} ━━━━", self.source_text)?;
        writeln!(f, "┃ {lines}")?;
        write!(f, "┃ sum: {}", format_sum(&self.final_values))
    }
}
