//! Report per-configuration bandwidth from the SST statistics of a Spatter run
use anyhow::Context;
use clap::{Parser, ValueEnum, error::ErrorKind};
use cli_table::print_stdout;
use log::info;
use spatter_stats::{
    CounterNames, ReduceOptions, TimingConvention, header_line, load_kernels, load_stats,
    reduce_with, render_table, row_line,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to SST statistics csv
    stats_path: PathBuf,

    /// Path to Spatter pattern json
    pattern_path: PathBuf,

    /// How config_time values translate to elapsed time
    #[arg(long, value_enum, default_value_t = Timing::PerConfig)]
    timing: Timing,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = Format::Plain)]
    format: Format,

    /// Path to result json
    #[arg(short, long)]
    output_path: Option<PathBuf>,

    /// Counter holding bytes written, default to total_bytes_write
    #[arg(long)]
    bytes_counter: Option<String>,

    /// Counter holding cycles, default to cycles
    #[arg(long)]
    cycles_counter: Option<String>,

    /// Counter closing each configuration, default to config_time
    #[arg(long)]
    boundary_counter: Option<String>,
}

#[derive(Copy, Clone, ValueEnum)]
enum Timing {
    /// config_time is the elapsed time of its configuration
    PerConfig,
    /// config_time is an absolute clock
    Cumulative,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Column-aligned text, rows printed as they complete
    Plain,
    /// Boxed table
    Table,
    /// JSON array of rows
    Json,
}

impl Cli {
    fn reduce_options(&self) -> ReduceOptions {
        let mut counter_names = CounterNames::default();
        if let Some(name) = &self.bytes_counter {
            counter_names.bytes = name.clone();
        }
        if let Some(name) = &self.cycles_counter {
            counter_names.cycles = name.clone();
        }
        if let Some(name) = &self.boundary_counter {
            counter_names.boundary = name.clone();
        }

        ReduceOptions {
            counter_names,
            timing: match self.timing {
                Timing::PerConfig => TimingConvention::PerConfig,
                Timing::Cumulative => TimingConvention::Cumulative,
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // usage errors exit with 1 like load errors do
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                err.print()?;
                std::process::exit(1);
            }
        },
    };

    let observations = load_stats(&args.stats_path).with_context(|| {
        format!(
            "failed to load statistics from {}",
            args.stats_path.display()
        )
    })?;
    let kernels = load_kernels(&args.pattern_path).with_context(|| {
        format!(
            "failed to load patterns from {}",
            args.pattern_path.display()
        )
    })?;

    let streaming = args.format == Format::Plain;
    if streaming {
        println!("{}", header_line());
    }
    let rows = reduce_with(&observations, &kernels, args.reduce_options(), |row| {
        if streaming {
            println!("{}", row_line(row));
        }
    })?;
    info!("Reduced {} configurations", rows.len());

    match args.format {
        Format::Plain => {}
        Format::Table => print_stdout(render_table(&rows))?,
        Format::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }

    if let Some(output_path) = &args.output_path {
        info!("Result written to {}", output_path.display());
        std::fs::write(output_path, serde_json::to_vec_pretty(&rows)?)?;
    }

    Ok(())
}
