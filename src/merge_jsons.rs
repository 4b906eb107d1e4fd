/*
cargo run --bin merge_jsons -- \
    -i config/fragments \
    -o config/build \
    -f settings.json

cargo run --bin merge_jsons -- \
    --input locales/en \
    --output dist/locales \
    --filename en.json \
    --sort \
    --log-dir logs
*/

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    process,
};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use json_merge::{batch, MergeConfig};
use log::{error, info, LevelFilter};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Deep-merge all JSON files found under a directory into one file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input directory containing JSON files to merge
    #[arg(short, long, default_value = "./input")]
    input: PathBuf,

    /// Output directory for the merged JSON file
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Name of the output file
    #[arg(short, long, default_value = "merged.json")]
    filename: String,

    /// Merge files in sorted path order instead of directory order
    #[arg(short, long)]
    sort: bool,

    /// Also write a timestamped log file into this directory
    #[arg(long, value_name = "PATH")]
    log_dir: Option<PathBuf>,

    /// Log debug messages
    #[arg(short, long)]
    verbose: bool,
}

impl From<&Args> for MergeConfig {
    fn from(args: &Args) -> Self {
        Self {
            input_dir: args.input.clone(),
            output_dir: args.output.clone(),
            output_filename: args.filename.clone(),
            sort_paths: args.sort,
        }
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = init_logging(level, args.log_dir.as_deref()) {
        eprintln!("Cannot initialise logging: {e:#}");
        process::exit(1);
    }

    let config = MergeConfig::from(&args);
    match batch::run(&config) {
        Ok(report) => {
            if !report.skipped.is_empty() {
                info!("Skipped {} file(s) with errors", report.skipped.len());
            }
            info!(
                "Successfully merged {} of {} files into {}",
                report.merged,
                report.discovered,
                report.output_path.display()
            );
        }
        Err(e) => {
            error!("Error: {e}");
            process::exit(1);
        }
    }
}

fn init_logging(level: LevelFilter, log_dir: Option<&Path>) -> Result<()> {
    let term_config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        term_config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    if let Some(dir) = log_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
        let ts = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = dir.join(format!("merge_jsons_{ts}.log"));
        let file = File::create(&log_path)
            .with_context(|| format!("creating {}", log_path.display()))?;
        loggers.push(WriteLogger::new(
            level,
            ConfigBuilder::new().build(),
            file,
        ));
    }

    CombinedLogger::init(loggers).context("installing logger")?;
    Ok(())
}
