use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tracer_cal::core::summary::SUMMARY_HEADER;
use tracer_cal::utils::conf_helper::load_config;
use tracer_cal::{
    CalFileName, CalSummary, CalibrationTable, CheckReport, InverseTable, InvertConfig, Inverter,
    LinearFit,
};

/// Digipot module calibration data processing utility
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Summarize calibration(s) statistics
    #[arg(long)]
    stats: bool,

    /// Calculate and save inverse function register values
    #[arg(long)]
    invert: bool,

    /// Read and print inverse function file(s)
    #[arg(long)]
    itest: bool,

    /// Compare check sweep(s) against commanded resistance
    #[arg(long, conflicts_with_all = ["itest", "invert", "stats"])]
    check: bool,

    /// Print the register setting chosen for this resistance
    #[arg(long, value_name = "OHMS")]
    lookup: Option<f64>,

    /// Emit summaries as JSON
    #[arg(long)]
    json: bool,

    /// Processing config (defaults to ./calproc.json when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log every inversion decision
    #[arg(short, long)]
    verbose: bool,

    /// Calibration, inverse or check file(s)
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if args.files.is_empty() {
        use clap::CommandFactory;
        Args::command().print_help()?;
        return Ok(());
    }

    let config = load_config(args.config.as_deref()).context("loading config")?;

    if args.stats && !args.json {
        println!("# calibration summary");
        println!("{}", SUMMARY_HEADER);
    }

    let mut summaries = Vec::new();
    for path in &args.files {
        if args.check {
            let report = CheckReport::load(path)
                .with_context(|| format!("checking {}", path.display()))?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
            continue;
        }

        if args.itest {
            let inverse = InverseTable::open(path)
                .with_context(|| format!("reading inverse table {}", path.display()))?;
            if inverse.is_empty() {
                warn!("{} holds no rows", path.display());
            }
            print!("{}", inverse.to_text()?);
            print_lookup(&inverse, args.lookup);
            continue;
        }

        let summary = process(path, &config, &args)?;
        if args.stats {
            if args.json {
                summaries.push(summary);
            } else {
                println!("{}", summary);
            }
        }
    }

    if args.json && !summaries.is_empty() {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    }

    Ok(())
}

fn process(path: &Path, config: &InvertConfig, args: &Args) -> Result<CalSummary> {
    let name = CalFileName::parse(path)
        .with_context(|| format!("reading serial and resistor from {}", path.display()))?;
    let table = CalibrationTable::load(path)
        .with_context(|| format!("loading calibration {}", path.display()))?;

    let inverse = Inverter::new(config).invert(&table, &name.serial, &name.resistor);
    if inverse.row_count == 0 {
        warn!("{} produced no nominal rows", path.display());
    }

    if args.invert {
        let out = name.inverse_path(&config.output_dir);
        println!("Writing reg filename: {}", out.display());
        inverse
            .save(&out)
            .with_context(|| format!("writing {}", out.display()))?;
    }

    // reporting only, a short sweep still inverts
    let fit = match LinearFit::from_table(&table) {
        Ok(fit) => {
            info!(
                "{}/{}: slope {:.3} ohms/count, offset {:.3} ohms",
                name.serial, name.resistor, fit.slope, fit.offset
            );
            Some(fit)
        }
        Err(e) => {
            warn!("{}: no linear fit: {}", path.display(), e);
            None
        }
    };

    print_lookup(&inverse, args.lookup);
    Ok(CalSummary::new(&inverse, fit.as_ref()))
}

fn print_lookup(inverse: &InverseTable, ohms: Option<f64>) {
    let Some(ohms) = ohms else {
        return;
    };
    match inverse.lookup(ohms) {
        Some(row) => println!("{}/{} {} ohms -> {}", inverse.serial, inverse.resistor, ohms, row),
        None => println!("{}/{} {} ohms -> not found", inverse.serial, inverse.resistor, ohms),
    }
}
