//! Swingscreen CLI: screen, diagnose, and config commands.
//!
//! Commands:
//! - `screen`: run the filter cascade over the universe and save the day's picks
//! - `diagnose`: exhaustive run that reports per-filter failure rates
//! - `config init`: write the default config as TOML
//! - `config show`: print the effective config and its fingerprint

mod logging;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use swingscreen_core::cascade::{CascadeOptions, EvaluationMode};
use swingscreen_core::config::ScreenConfig;
use swingscreen_runner::{
    load_universe, render_diagnostics, render_report, run_screen, save_results, DailyResults,
    Diagnostics, LoadOptions, PipelineOptions,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "swingscreen",
    version,
    about = "Swingscreen: multi-timeframe swing-trade stock screener"
)]
struct Cli {
    /// Emit logs as JSON.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    /// Debug-level logs, including every discarded symbol.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen the universe and save the selected stocks.
    Screen {
        #[command(flatten)]
        input: InputArgs,

        /// Cascade evaluation mode.
        #[arg(long, value_enum, default_value_t = ModeArg::Strict)]
        mode: ModeArg,

        /// Skip the intraday stage (test mode).
        #[arg(long, default_value_t = false)]
        skip_intraday: bool,

        /// Evaluate daily filters only.
        #[arg(long, default_value_t = false, conflicts_with = "skip_intraday")]
        daily_only: bool,

        /// Output directory for the daily results file.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Do not write the results file.
        #[arg(long, default_value_t = false)]
        no_save: bool,

        /// Print the results file to stdout instead of the text report.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Evaluate every filter for every symbol and report failure rates.
    Diagnose {
        #[command(flatten)]
        input: InputArgs,

        /// Print diagnostics as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Config file commands.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default config.
    Init {
        #[arg(long, default_value = "swingscreen.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Print the effective config and its fingerprint.
    Show {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Where candles and settings come from.
#[derive(Args)]
struct InputArgs {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory laid out as <SYMBOL>/{daily,weekly,intraday}.csv.
    #[arg(long, conflicts_with = "synthetic")]
    data_dir: Option<PathBuf>,

    /// Use seeded synthetic candles instead of files.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Session date for synthetic data (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    as_of: Option<String>,

    /// Worker threads. Defaults to one per core.
    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Strict,
    Exhaustive,
}

impl From<ModeArg> for EvaluationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Strict => EvaluationMode::Strict,
            ModeArg::Exhaustive => EvaluationMode::Exhaustive,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_json, cli.verbose);

    match cli.command {
        Commands::Screen {
            input,
            mode,
            skip_intraday,
            daily_only,
            output_dir,
            no_save,
            json,
        } => {
            let base = if daily_only {
                CascadeOptions::daily_only()
            } else if skip_intraday {
                CascadeOptions::test_mode()
            } else {
                CascadeOptions::production()
            };
            let options = base.with_mode(mode.into());
            let save_dir = (!no_save).then_some(output_dir.as_path());
            run_screen_cmd(&input, options, save_dir, json)
        }
        Commands::Diagnose { input, json } => run_diagnose_cmd(&input, json),
        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => run_config_init(&path, force),
            ConfigAction::Show { config } => run_config_show(config.as_deref()),
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<ScreenConfig> {
    match path {
        Some(path) => ScreenConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ScreenConfig::default()),
    }
}

fn load_options(input: &InputArgs) -> Result<LoadOptions> {
    let as_of = input
        .as_of
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("--as-of must be YYYY-MM-DD")?
        .unwrap_or_else(|| Local::now().date_naive());

    match (&input.data_dir, input.synthetic) {
        (Some(dir), _) => Ok(LoadOptions::from_dir(dir, as_of)),
        (None, true) => Ok(LoadOptions::synthetic(as_of)),
        (None, false) => bail!("one of --data-dir or --synthetic is required"),
    }
}

fn run_screen_cmd(
    input: &InputArgs,
    cascade: CascadeOptions,
    save_dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = load_config(input.config.as_deref())?;
    let data = load_universe(&config.universe, &load_options(input)?)?;
    let options = PipelineOptions {
        cascade,
        workers: input.workers,
    };
    let report = run_screen(&data, &config, &options)?;

    let results = DailyResults::from_report(&report, Local::now().naive_local());
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", render_report(&report));
    }

    if let Some(dir) = save_dir {
        let path = save_results(&results, dir)?;
        info!(path = %path.display(), stocks = results.total_selected, "results saved");
    }
    Ok(())
}

fn run_diagnose_cmd(input: &InputArgs, json: bool) -> Result<()> {
    let config = load_config(input.config.as_deref())?;
    let data = load_universe(&config.universe, &load_options(input)?)?;
    let options = PipelineOptions {
        cascade: CascadeOptions::diagnostic(),
        workers: input.workers,
    };
    let report = run_screen(&data, &config, &options)?;
    let diagnostics = Diagnostics::from_candidates(&report.candidates, &Default::default());

    if json {
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
        return Ok(());
    }
    print!("{}", render_diagnostics(&diagnostics));
    if let Some(worst) = diagnostics.bottlenecks().first() {
        println!(
            "\nTightest gate: {} ({:.1}% of evaluated symbols fail)",
            worst.filter_name,
            worst.failure_rate() * 100.0
        );
    }
    Ok(())
}

fn run_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    let toml = ScreenConfig::default().to_toml()?;
    std::fs::write(path, toml).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn run_config_show(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    println!("# fingerprint: {}", config.fingerprint());
    print!("{}", config.to_toml()?);
    Ok(())
}
