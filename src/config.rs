use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::models::Importance;

pub const CONFIG_FILE: &str = "tally.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// How to start the execution engine when no input or command is given.
#[derive(Debug, Default, Deserialize)]
pub struct EngineConfig {
    /// Command line, split with shell quoting rules.
    /// Example: "dotnet run --project Engine -- --ndjson"
    pub command: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub verbosity: Verbosity,
    /// Hide passing tests and their captured output.
    #[serde(default)]
    pub quiet_passes: bool,
    /// Announce every test as it starts.
    #[serde(default)]
    pub verbose: bool,
    /// Also write every diagnostic as NDJSON to this file.
    pub log: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// MSBuild canonical error format.
    #[default]
    Msbuild,
    /// One JSON object per diagnostic.
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Detailed,
}

impl Verbosity {
    /// Lowest message importance that still gets printed.
    pub fn min_importance(self) -> Importance {
        match self {
            Verbosity::Quiet => Importance::High,
            Verbosity::Normal => Importance::Normal,
            Verbosity::Detailed => Importance::Low,
        }
    }
}

impl Config {
    /// Load `tally.toml` from the working directory, falling back to defaults if absent or invalid.
    pub fn load(workdir: &Path) -> Self {
        let path = workdir.join(CONFIG_FILE);
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        Self::parse(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config");
            Self::default()
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
