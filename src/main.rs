use anyhow::{Context, Result};
use clap::Parser;
use healthmate_gpx::{convert, InputPaths, TracePoints};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Turn HealthMate location exports into GPX files, one per activity.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory holding activities.csv and the raw_location_*.csv files
    #[arg(long, default_value = ".")]
    input_dir: PathBuf,

    /// Where the .gpx files are written
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();

    let args = Args::parse();
    info!(input = %args.input_dir.display(), output = %args.output_dir.display(), "startup");

    let inputs = InputPaths::in_dir(&args.input_dir);
    let summary = convert(&inputs, &args.output_dir, TracePoints).with_context(|| {
        format!(
            "converting exports in {} to GPX",
            args.input_dir.display()
        )
    })?;

    for path in &summary.written {
        info!(path = %path.display(), "wrote");
    }
    info!(
        activities = summary.activities,
        written = summary.written.len(),
        "all done"
    );
    Ok(())
}
