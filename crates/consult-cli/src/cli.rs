//! CLI argument definitions for the consultation quality pipeline.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};

use consult_cli::pipeline::PipelineConfig;

#[derive(Parser)]
#[command(
    name = "consult-quality",
    version,
    about = "Clean patient and consultation extracts and measure patient id validity per month",
    long_about = "Clean patient and consultation extracts and measure patient id validity per month.\n\n\
                  Reads inputs/patients.csv.gz and inputs/consultations.csv.zip, writes\n\
                  patients.parquet, consultations.parquet and resultat_proportion.parquet\n\
                  to the outputs directory, and logs to logs/processing.log."
)]
pub struct Cli {
    /// Project root holding the inputs, outputs and logs directories.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Directory with the source extracts (default: <ROOT>/inputs).
    #[arg(long = "inputs", value_name = "DIR")]
    pub inputs_dir: Option<PathBuf>,

    /// Directory receiving the Parquet outputs (default: <ROOT>/outputs).
    #[arg(long = "outputs", value_name = "DIR")]
    pub outputs_dir: Option<PathBuf>,

    /// Log file, appended to (default: <ROOT>/logs/processing.log).
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Cli {
    /// Resolve the directory flags against the project root.
    pub fn pipeline_config(&self) -> PipelineConfig {
        let defaults = PipelineConfig::from_root(&self.root);
        PipelineConfig {
            inputs_dir: self.inputs_dir.clone().unwrap_or(defaults.inputs_dir),
            outputs_dir: self.outputs_dir.clone().unwrap_or(defaults.outputs_dir),
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.root.join("logs").join("processing.log"))
    }
}
