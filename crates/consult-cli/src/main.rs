//! Consultation quality CLI.

use clap::Parser;
use consult_cli::logging::{LogConfig, LogSink};
use consult_cli::pipeline::{error_category, run};
use tracing::level_filters::LevelFilter;
use tracing::{error, info};

mod cli;
mod summary;

use crate::cli::{Cli, LogLevelArg};
use crate::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    let log_config = log_config_from_cli(&cli);
    let sink = match LogSink::open(&log_config) {
        Ok(sink) => sink,
        Err(error) => {
            eprintln!("error: failed to initialize logging: {error}");
            std::process::exit(1);
        }
    };

    let config = cli.pipeline_config();
    let exit_code = sink.in_scope(|| match run(&config) {
        Ok(result) => {
            print_summary(&result);
            0
        }
        Err(error) => {
            let category = error_category(&error)
                .map_or_else(|| "Error".to_string(), |category| category.to_string());
            error!("{category}: {error:#}");
            info!("===== processing aborted =====");
            1
        }
    });

    if let Err(error) = sink.close() {
        eprintln!("error: failed to close log file: {error}");
    }
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let mut config = LogConfig::default()
        .with_level(level_filter)
        .with_log_file(Some(cli.log_file()));
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    config
}
