use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportlensError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Failed to build glob pattern '{pattern}': {source}")]
    GlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    #[error("Input path does not exist: {0}")]
    MissingInput(PathBuf),

    #[error("No report files found in the given inputs")]
    NoInputs,
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to acquire semaphore: {0}")]
    Semaphore(#[from] tokio::sync::AcquireError),

    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to write report: {0}")]
    WriteReport(std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
