//! FARS Reporter - command line front end
//!
//! Loads yearly FARS accident files, prints monthly summaries and renders
//! state accident maps.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fars_reporter::charts::{PlotOutcome, PngMapCanvas, StateMapPlotter};
use fars_reporter::config::FarsConfig;
use fars_reporter::data::{column_names, FileLoader};
use fars_reporter::stats::YearMonthSummarizer;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Monthly summaries and state maps for FARS accident files"
)]
struct Args {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding the accident_<year> files (overrides the config)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load one year and print its shape
    Load {
        #[arg(short, long)]
        year: i32,
    },
    /// Count accidents per month for each year
    Summarize {
        #[arg(short, long, num_args = 1.., required = true)]
        years: Vec<i32>,
        /// Also write the table as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Plot one state's accident locations for a year
    Plot {
        #[arg(short, long)]
        state: i64,
        #[arg(short, long)]
        year: i32,
        #[arg(short, long, default_value = "state_map.png")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env).with_target(false).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => FarsConfig::from_json_file(path)?,
        None => FarsConfig::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    let loader = FileLoader::new(config);

    match args.command {
        Command::Load { year } => {
            let df = loader.load(year)?;
            println!("{}: {} rows", loader.file_name(year), df.height());
            println!("columns: {}", column_names(&df).join(", "));
        }
        Command::Summarize { years, output } => {
            let summary = YearMonthSummarizer::new(&loader).summarize_with_skipped(&years)?;
            println!("{}", summary.table.to_dataframe()?);
            if let Some(path) = output {
                summary
                    .table
                    .write_csv(&path)
                    .with_context(|| format!("writing summary to {}", path.display()))?;
                info!(path = %path.display(), "wrote summary");
            }
        }
        Command::Plot {
            state,
            year,
            output,
        } => {
            let mut canvas = PngMapCanvas::new(&output, &loader.config().plot)
                .with_caption(format!("State {state} accidents, {year}"));
            match StateMapPlotter::new(&loader).plot_state(state, year, &mut canvas)? {
                PlotOutcome::Rendered { points, missing } => {
                    let path = canvas.finish()?;
                    println!(
                        "plotted {points} accidents to {} ({missing} without location)",
                        path.display()
                    );
                }
                PlotOutcome::NoAccidents => println!("no accidents to plot"),
                PlotOutcome::NoLocations { missing } => {
                    println!("no accident locations to plot ({missing} without location)")
                }
            }
        }
    }

    Ok(())
}
