use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use resto_regions::dedup::unique_restaurants;
use resto_regions::geo::{BELGIUM, validate_points};
use resto_regions::overlap::{NameSet, overlap};
use resto_regions::report::{render_distribution, render_overlap, render_points};
use resto_regions::source::Column;
use resto_regions::vegetarian::vegetarian_subset;
use resto_regions::{
    AliasFallback, CanonicalRegion, InvalidPostalPolicy, NormalizeError, NormalizeOptions,
    NormalizeWarning, OutputFormat, RecordSet, RecordShape,
};

/// Compare restaurant listings of delivery platforms by Belgian province.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Write output to a file instead of stdout.
    #[arg(short, long, value_name = "PATH", global = true)]
    output: Option<PathBuf>,

    /// Emit JSON instead of Markdown.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Restaurants per province, per platform and combined.
    Distribution {
        #[command(flatten)]
        inputs: Inputs,

        /// Treat unknown postal codes and unmatched region labels as errors.
        #[arg(long)]
        strict: bool,

        /// What to do with missing, digit-less, or zero postal codes.
        #[arg(long, value_enum, default_value_t = InvalidPostal::Exclude)]
        invalid_postal: InvalidPostal,

        /// Where region labels without an alias go.
        #[arg(long, value_enum, default_value_t = Fallback::Luxembourg)]
        alias_fallback: Fallback,

        /// Force the record shape instead of detecting it from the columns.
        #[arg(long, value_enum)]
        shape: Option<Shape>,
    },
    /// Restaurant coordinates inside Belgium.
    Points {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Coordinates of restaurants with a vegetarian category.
    Vegetarian {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Restaurant names shared between platforms.
    Overlap {
        #[command(flatten)]
        inputs: Inputs,
    },
}

#[derive(Args)]
struct Inputs {
    /// Platform tables as PATH or PLATFORM=PATH. Omit to read one table from stdin.
    #[arg()]
    tables: Vec<String>,

    /// Format hint (csv, json). Required when reading from stdin.
    #[arg(short, long, value_name = "FMT")]
    format: Option<String>,

    /// Platform name for a table read from stdin.
    #[arg(long, default_value = "stdin")]
    platform: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum InvalidPostal {
    Exclude,
    Unknown,
}

#[derive(Clone, Copy, ValueEnum)]
enum Fallback {
    Luxembourg,
    Unknown,
}

#[derive(Clone, Copy, ValueEnum)]
enum Shape {
    Postal,
    Labels,
    Joined,
}

impl From<Shape> for RecordShape {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Postal => RecordShape::PostalCodes,
            Shape::Labels => RecordShape::RegionLabels,
            Shape::Joined => RecordShape::JoinedLocations,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn describe(e: &NormalizeError) -> String {
    match std::error::Error::source(e) {
        Some(source) => format!("{e}: {source}"),
        None => e.to_string(),
    }
}

fn print_warnings(platform: &str, warnings: &[NormalizeWarning]) {
    for w in warnings {
        let loc = w
            .location
            .as_deref()
            .map(|l| format!(" ({l})"))
            .unwrap_or_default();
        tracing::warn!("{platform}: [{:?}] {}{}", w.code, w.message, loc);
    }
}

/// Split `PLATFORM=PATH`; a bare path takes its platform from the file stem.
fn split_table_arg(arg: &str) -> (Option<&str>, &Path) {
    match arg.split_once('=') {
        Some((platform, path)) if !platform.is_empty() && !path.is_empty() => {
            (Some(platform), Path::new(path))
        }
        _ => (None, Path::new(arg)),
    }
}

/// Load every table. Failures are reported and skipped; the flag records them.
fn load_tables(inputs: &Inputs) -> Result<(Vec<RecordSet>, bool), ExitCode> {
    if inputs.tables.is_empty() {
        let fmt = inputs.format.as_deref().ok_or_else(|| {
            eprintln!("error: --format is required when reading from stdin");
            ExitCode::from(2)
        })?;

        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data).map_err(|e| {
            eprintln!("error: stdin: {e}");
            ExitCode::from(1)
        })?;

        return match resto_regions::load_bytes(&data, fmt, &inputs.platform) {
            Ok(set) => Ok((vec![set], false)),
            Err(e) => {
                eprintln!("error: stdin: {}", describe(&e));
                Err(ExitCode::from(1))
            }
        };
    }

    let mut sets = Vec::new();
    let mut had_error = false;
    for arg in &inputs.tables {
        let (platform, path) = split_table_arg(arg);

        // If --format is given, it overrides detection
        let result = match inputs.format {
            Some(ref fmt) => std::fs::read(path)
                .map_err(NormalizeError::from)
                .and_then(|data| {
                    let platform = platform
                        .map(str::to_string)
                        .or_else(|| resto_regions::detection::platform_from_path(path))
                        .unwrap_or_else(|| inputs.platform.clone());
                    resto_regions::load_bytes(&data, fmt, &platform)
                }),
            None => resto_regions::load_file(path, platform),
        };

        match result {
            Ok(set) => sets.push(set),
            Err(e) => {
                eprintln!("error: {}: {}", path.display(), describe(&e));
                had_error = true;
            }
        }
    }
    Ok((sets, had_error))
}

fn require_columns(sets: &[RecordSet], columns: &[Column]) -> Result<(), NormalizeError> {
    for set in sets {
        for column in columns {
            set.require_column(*column)?;
        }
    }
    Ok(())
}

fn render(
    command: &Command,
    sets: &[RecordSet],
    format: OutputFormat,
) -> Result<String, NormalizeError> {
    match command {
        Command::Distribution {
            strict,
            invalid_postal,
            alias_fallback,
            shape,
            ..
        } => {
            let options = NormalizeOptions {
                invalid_postal: match invalid_postal {
                    InvalidPostal::Exclude => InvalidPostalPolicy::Exclude,
                    InvalidPostal::Unknown => InvalidPostalPolicy::Unknown,
                },
                alias_fallback: match alias_fallback {
                    Fallback::Luxembourg => AliasFallback::Region(CanonicalRegion::Luxembourg),
                    Fallback::Unknown => AliasFallback::Unknown,
                },
                shape: shape.map(RecordShape::from),
                strict: *strict,
            };
            let report = resto_regions::distribution(sets, &options)?;
            for platform in &report.platforms {
                print_warnings(&platform.table.platform, &platform.warnings);
            }
            render_distribution(&report, format)
        }
        Command::Points { .. } => {
            require_columns(sets, &[Column::Latitude, Column::Longitude])?;
            let points = sets
                .iter()
                .map(|set| {
                    let records = unique_restaurants(set)?;
                    Ok(validate_points(&set.platform, &records, &BELGIUM))
                })
                .collect::<Result<Vec<_>, NormalizeError>>()?;
            for p in &points {
                print_warnings(&p.platform, &p.warnings);
            }
            render_points(&points, format)
        }
        Command::Vegetarian { .. } => {
            require_columns(
                sets,
                &[Column::Category, Column::Latitude, Column::Longitude],
            )?;
            let points = sets
                .iter()
                .map(|set| {
                    let subset = vegetarian_subset(&unique_restaurants(set)?);
                    tracing::info!(
                        platform = %set.platform,
                        vegetarian = subset.len(),
                        rows = set.records.len(),
                        "vegetarian subset"
                    );
                    Ok(validate_points(&set.platform, &subset, &BELGIUM))
                })
                .collect::<Result<Vec<_>, NormalizeError>>()?;
            for p in &points {
                print_warnings(&p.platform, &p.warnings);
            }
            render_points(&points, format)
        }
        Command::Overlap { .. } => {
            require_columns(sets, &[Column::Name])?;
            let names: Vec<NameSet> = sets
                .iter()
                .map(|set| NameSet::from_records(&set.platform, &set.records))
                .collect();
            render_overlap(&overlap(&names)?, format)
        }
    }
}

fn inputs(command: &Command) -> &Inputs {
    match command {
        Command::Distribution { inputs, .. }
        | Command::Points { inputs }
        | Command::Vegetarian { inputs }
        | Command::Overlap { inputs } => inputs,
    }
}

fn run(cli: Cli) -> Result<ExitCode, ExitCode> {
    let (sets, had_error) = load_tables(inputs(&cli.command))?;
    if sets.is_empty() {
        return Err(ExitCode::from(1));
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Markdown
    };
    let output_buf = render(&cli.command, &sets, format).map_err(|e| {
        eprintln!("error: {}", describe(&e));
        ExitCode::from(1)
    })?;

    // Write output
    if let Some(ref out_path) = cli.output {
        std::fs::write(out_path, &output_buf).map_err(|e| {
            eprintln!("error: {}: {e}", out_path.display());
            ExitCode::from(1)
        })?;
    } else {
        io::stdout().write_all(output_buf.as_bytes()).map_err(|e| {
            eprintln!("error: stdout: {e}");
            ExitCode::from(1)
        })?;
    }

    if had_error {
        Err(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(code) => code,
    }
}
