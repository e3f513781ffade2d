use anyhow::{Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rollplayer_dice::{color, render_within, RollEnvelope, RollSpec, FIELD_LIMIT};
use tracing_subscriber::EnvFilter;

/// Roll dice from the command line.
///
/// `xdy+z`: roll x dice between 1 and y (or a range like `50:100`) and apply
/// the modifiers in order. `3d100i1,3:+20;2,-5` adds 20 to the first and third
/// roll and subtracts 5 from the second. Trailing `l`, `l{n}`, `s`, `>{n}` and
/// `<{n}` change how the result is shown.
#[derive(Debug, Parser)]
#[command(name = "rollplayer", version)]
struct Args {
    /// Expressions to roll, e.g. `1d100 2d20 1d6`.
    #[arg(default_value = "1d100")]
    expressions: Vec<String>,

    /// Seed the dice for reproducible rolls.
    #[arg(long, env = "ROLLPLAYER_SEED")]
    seed: Option<u64>,

    /// Longest result body before the output switches to the sum only.
    #[arg(long, env = "ROLLPLAYER_FIELD_LIMIT", default_value_t = FIELD_LIMIT)]
    field_limit: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "rollplayer_dice=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let output = roll_all(&args, &mut rng)?;
    print!("{output}");
    Ok(())
}

/// Rolls every expression first so that a single bad one fails the whole
/// request before anything is printed.
fn roll_all(args: &Args, rng: &mut impl Rng) -> Result<String> {
    let rolls = args
        .expressions
        .iter()
        .map(|expression| {
            let spec = RollSpec::parse(expression)
                .with_context(|| format!("could not parse `{expression}`"))?;
            let envelope = RollEnvelope::solve_with(&spec, &mut *rng)
                .with_context(|| format!("could not roll `{expression}`"))?;
            Ok((spec, envelope))
        })
        .collect::<Result<Vec<_>>>()?;

    let normalized: Vec<f64> = rolls.iter().map(|(_, e)| e.normalized()).collect();
    let colour = color::interpolate(color::average(&normalized).unwrap_or(1.0));

    let mut output = format!("--- {} --- {colour}\n", args.expressions.join(" "));
    for (spec, envelope) in &rolls {
        let rendered = render_within(&envelope.random, spec.format(), args.field_limit);
        if rendered.fell_back {
            output.push_str(&format!(
                "{} - Your result was too long, so the format changed to sum only.\n",
                spec.source_text()
            ));
        }
        for field in rendered.fields {
            output.push_str(&format!("{}\n{}\n\n", field.title, field.body));
        }
    }

    Ok(output)
}
