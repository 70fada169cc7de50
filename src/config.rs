//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "interval-runner")]
#[command(about = "Interval countdown sequencer for treadmill workouts")]
#[command(version)]
pub struct Config {
    /// Port to bind the control server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Length of one countdown unit in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// File holding saved presets (defaults to the user config directory)
    #[arg(long)]
    pub presets_file: Option<PathBuf>,

    /// Keep presets in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Do not ring the terminal bell when a segment completes
    #[arg(long)]
    pub no_bell: bool,

    /// Withhold permission for visual completion notifications
    #[arg(long)]
    pub deny_notifications: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Where presets live on disk, unless running ephemeral
    pub fn presets_path(&self) -> Option<PathBuf> {
        if self.ephemeral {
            return None;
        }
        let path = self.presets_file.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("interval-runner")
                .join("presets.json")
        });
        Some(path)
    }
}
