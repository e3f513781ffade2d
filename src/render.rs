use tracing::debug;

use crate::evaluate::RollOutcome;
use crate::parse::{FormatKind, FormatSpec, Threshold};

/// Longest body a chat embed field accepts, in characters.
pub const FIELD_LIMIT: usize = 1024;

const INTEGER_TOLERANCE: f64 = 1e-9;

/// One titled block of rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub title: String,
    pub body: String,
}

impl Field {
    fn rolled(source_text: &str, body: String) -> Self {
        Self {
            title: format!("You rolled a {source_text} and got..."),
            body,
        }
    }

    fn rolled_without_modifiers(source_text: &str, body: String) -> Self {
        Self {
            title: format!("You rolled a {source_text} and without modifiers got..."),
            body,
        }
    }

    pub fn fits(&self, limit: usize) -> bool {
        self.body.chars().count() <= limit
    }
}

/// Output of [`render_within`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub fields: Vec<Field>,
    /// The requested format was too long and the sum was rendered instead.
    pub fell_back: bool,
}

/// Renders the final values, plus the unmodified values when the modifiers
/// changed anything.
pub fn render(outcome: &RollOutcome, format: &FormatSpec) -> Vec<Field> {
    let mut fields = vec![Field::rolled(
        outcome.source_text(),
        render_body(outcome.final_values(), format),
    )];

    if outcome.is_modified() {
        fields.push(Field::rolled_without_modifiers(
            outcome.source_text(),
            render_body(outcome.baseline_values(), format),
        ));
    }

    fields
}

/// Same as [`render`] but switches to [`FormatKind::SumOnly`] if any body
/// would be longer than `limit` characters.
pub fn render_within(outcome: &RollOutcome, format: &FormatSpec, limit: usize) -> Rendered {
    let fields = render(outcome, format);
    if fields.iter().all(|field| field.fits(limit)) {
        return Rendered {
            fields,
            fell_back: false,
        };
    }

    debug!(
        source = outcome.source_text(),
        limit, "rendered roll too long, falling back to sum"
    );
    Rendered {
        fields: render(outcome, &FormatSpec::sum_only()),
        fell_back: true,
    }
}

fn render_body(values: &[f64], format: &FormatSpec) -> String {
    let numbers = || format_values(values, format.threshold);

    match format.kind {
        FormatKind::Default if values.len() > 1 => {
            format!("{} (sum: {})", numbers().join(", "), format_sum(values))
        }
        FormatKind::Default | FormatKind::ListOnly => numbers().join(", "),
        FormatKind::SumOnly => format_sum(values),
        FormatKind::ListSplit => numbers()
            .chunks(format.split_size.max(1))
            .map(|chunk| chunk.join(", "))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Renders each value, wrapping the ones that pass `threshold` in bold.
fn format_values(values: &[f64], threshold: Option<Threshold>) -> Vec<String> {
    values
        .iter()
        .map(|&value| {
            let value = snap_to_integer(value);
            match threshold {
                Some(threshold) if threshold.passes(value) => {
                    format!("**{}**", format_number(value))
                }
                _ => format_number(value),
            }
        })
        .collect()
}

fn snap_to_integer(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < INTEGER_TOLERANCE {
        rounded
    } else {
        value
    }
}

/// Values within `1e-9` of an integer are shown as that integer.
pub fn format_number(value: f64) -> String {
    let snapped = snap_to_integer(value);
    if snapped.fract() == 0.0 && snapped.abs() < i64::MAX as f64 {
        (snapped as i64).to_string()
    } else {
        value.to_string()
    }
}

pub fn format_sum(values: &[f64]) -> String {
    format_number(values.iter().sum())
}
