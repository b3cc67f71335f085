//! Command-line and environment configuration.
//!
//! Every option can also come from the environment, and a `.env` file in the
//! working directory is loaded before parsing, so the API key does not have
//! to appear on the command line.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use headline_gate::biometric::Capability;
use headline_gate::source::{catalog, NewsApiConfig, SourceKey};

/// Which biometric platform guards the headline screen.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum BiometricsMode {
    /// Show the prompt as a dialog inside the terminal.
    Terminal,
    /// Behave like a host without biometric hardware.
    None,
}

/// Capability the terminal platform reports, for trying out each gate path.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum CapabilityArg {
    Ready,
    NoHardware,
    HardwareUnavailable,
    NoneEnrolled,
}

impl From<CapabilityArg> for Capability {
    fn from(arg: CapabilityArg) -> Self {
        match arg {
            CapabilityArg::Ready => Capability::Ready,
            CapabilityArg::NoHardware => Capability::NoHardware,
            CapabilityArg::HardwareUnavailable => Capability::HardwareUnavailable,
            CapabilityArg::NoneEnrolled => Capability::NoneEnrolled,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about = "Top news headlines in the terminal, behind a biometric gate")]
pub struct Args {
    /// newsapi.org API key.
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// API root URL.
    #[arg(long, env = "NEWS_API_BASE_URL", default_value = NewsApiConfig::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Source shown when the headline screen opens, by label (e.g. "CNN").
    #[arg(long, env = "NEWS_SOURCE", default_value = catalog::default_label())]
    pub source: String,

    #[arg(long, value_enum, env = "HEADLINE_BIOMETRICS", default_value = "terminal")]
    pub biometrics: BiometricsMode,

    /// Capability reported by the terminal platform.
    #[arg(long, value_enum, default_value = "ready")]
    pub capability: CapabilityArg,

    /// HTTP request timeout in seconds.
    #[arg(long, default_value_t = 15)]
    pub timeout_secs: u64,

    /// Write logs to this file.  Logging is off without it, since the terminal
    /// belongs to the UI.
    #[arg(long, env = "HEADLINE_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Load `.env` (if any) and parse the process arguments.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::parse()
    }

    pub fn news_api(&self) -> NewsApiConfig {
        NewsApiConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Resolve `--source` against the catalog.
    pub fn initial_source(&self) -> anyhow::Result<SourceKey> {
        catalog::key_for_label(&self.source).ok_or_else(|| {
            let known: Vec<&str> = catalog::SOURCES.iter().map(|(label, _)| *label).collect();
            anyhow::anyhow!("unknown source {:?}; expected one of {}", self.source, known.join(", "))
        })
    }
}
