//! DataPipes - Main Entry Point
//!
//! Loads a pipeline configuration, builds every run and executes it once.
//!
//! Exit codes: 0 on success, 2 when the configuration is missing or
//! invalid, 1 when a run fails.

use clap::Parser;
use datapipes::{
    config::{PipelineConfig, DEFAULT_CONFIG_FILE},
    logging, DataPipesError, Registry, RunContext,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "datapipes", version, about = "Run a configuration-driven data pipeline")]
struct Cli {
    /// Path to the pipeline configuration
    #[arg(long = "cfg", default_value = DEFAULT_CONFIG_FILE)]
    cfg: PathBuf,
}

fn exit_code(err: &DataPipesError) -> ExitCode {
    if err.is_config_error() {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

fn report(err: DataPipesError) -> ExitCode {
    let code = exit_code(&err);
    tracing::error!("{}", err);
    eprintln!("error: {err}");
    code
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match PipelineConfig::load(&cli.cfg) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return exit_code(&err);
        }
    };

    // Held until exit so buffered log lines are flushed
    let _guard = match logging::init(&config.log_level, config.log_format) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(1);
        }
    };

    tracing::info!("Starting DataPipes with {}", cli.cfg.display());

    if let Err(err) = config.validate() {
        return report(err);
    }

    let registry = Registry::with_builtins();
    let context = match RunContext::new(&config, &registry) {
        Ok(context) => context,
        Err(err) => return report(err.into()),
    };

    match context.execute() {
        Ok(summary) => {
            tracing::info!("Finished: {}", summary);
            ExitCode::SUCCESS
        }
        Err(err) => report(err.into()),
    }
}
