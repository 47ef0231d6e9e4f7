//! zia CLI
//!
//! Commands:
//! - `zia regress <csv>` - Predict wine quality from 11 raw features
//! - `zia classify <csv>` - Classify an iris from 4 raw features
//! - `zia shell` - Interactive session sharing one model cache
//! - `zia show-config` - Print the effective configuration

pub mod shell;

use clap::{Parser, Subcommand};

/// Standardized tabular inference client
#[derive(Parser, Debug)]
#[command(name = "zia")]
#[command(author, version, about = "Wine regression and iris classification over ONNX models")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration directory (default.toml, <ZIA_ENV>.toml)
    #[arg(short, long, default_value = "config", env = "ZIA_CONFIG_DIR", global = true)]
    pub config_dir: String,

    /// Print structured JSON instead of display text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Predict wine quality (11 comma-separated raw features)
    Regress {
        /// e.g. "6.9,0.28,0.33,6.5,0.046,36,139,0.994,3.19,0.49,10.5"
        #[arg(allow_hyphen_values = true)]
        features: String,
    },
    /// Classify an iris flower (4 comma-separated raw features)
    Classify {
        /// e.g. "5.1,3.5,1.4,0.2"
        #[arg(allow_hyphen_values = true)]
        features: String,
    },
    /// Interactive shell: `reg <csv>`, `cls <csv>`, `status`, `exit`
    Shell,
    /// Print the effective configuration as JSON
    ShowConfig,
}
