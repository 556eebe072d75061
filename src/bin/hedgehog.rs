//! hedgehog CLI entry point.
//!
//! Loads a recorded hedgehog from CSV, reconstructs the track and optionally appends it
//! to a track listing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use nalgebra::Vector3;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hedgehog::{
    constants::Transform,
    spines::{
        csv_reader::{SpineCsvFormat, SpineSchema},
        writer::append_track_listing,
    },
    AnalysisParams, HedgehogAnalysis, HedgehogError,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Schema {
    /// `timepoint, confidence, samples…`
    Minimal,
    /// Full pose and ray columns before the confidence.
    Full,
}

#[derive(Parser, Debug)]
#[command(name = "hedgehog")]
#[command(about = "Reconstruct the track followed by a gaze hedgehog")]
#[command(version)]
struct Cli {
    /// Hedgehog CSV file.
    csv: Utf8PathBuf,

    /// Column layout of the CSV file.
    #[arg(long, value_enum, default_value = "minimal")]
    schema: Schema,

    /// Column separator, defaults to ',' for the minimal schema and ';' for the full one.
    #[arg(long, value_parser = parse_separator)]
    separator: Option<u8>,

    /// Remove path vertices with outlying edge lengths before finalization.
    #[arg(long)]
    prune: bool,

    #[arg(long, default_value = "5.0")]
    too_far_factor: f32,

    #[arg(long, default_value = "2.0")]
    zscore_threshold: f32,

    /// Condition spines in parallel (needs the `parallel` feature).
    #[arg(long)]
    parallel: bool,

    /// Append the track to this listing file.
    #[arg(long)]
    listing: Option<Utf8PathBuf>,

    #[arg(long, default_value = "1")]
    track_id: u32,

    #[arg(long, default_value = "0")]
    parent_id: u32,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn parse_separator(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!("separator must be a single ASCII character, got {s:?}")),
    }
}

fn main() -> Result<(), HedgehogError> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --log-level CLI arg
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)))
        .init();

    let schema = match cli.schema {
        Schema::Minimal => SpineSchema::Minimal,
        Schema::Full => SpineSchema::Full,
    };
    let mut format = SpineCsvFormat::new(schema);
    if let Some(separator) = cli.separator {
        format = format.with_separator(separator);
    }

    let params = AnalysisParams::builder()
        .prune_outliers(cli.prune)
        .too_far_factor(cli.too_far_factor)
        .zscore_threshold(cli.zscore_threshold)
        .parallel_conditioning(cli.parallel)
        .build()?;

    let analysis =
        HedgehogAnalysis::from_csv_format(&cli.csv, &format, Transform::identity())?
            .with_params(params);

    let Some(track) = analysis.run() else {
        warn!("No track returned");
        return Ok(());
    };
    info!("{track}");

    if let Some(listing) = &cli.listing {
        let session = cli.csv.file_stem().unwrap_or("hedgehog");
        append_track_listing(
            listing,
            session,
            &track,
            cli.track_id,
            cli.parent_id,
            &Vector3::new(1.0, 1.0, 1.0),
        )?;
        info!("Track {} appended to {listing}", cli.track_id);
    }
    Ok(())
}
