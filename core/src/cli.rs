//! Command-line interface for infer-rs.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Run on-device inference models from the command line.
#[derive(Parser, Debug)]
#[command(name = "infer-rs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run inference on a JSON input tensor.
    Infer {
        /// Path to the model file. Falls back to `model.path` in the config.
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Device to run on (cpu, mock, npu). Overrides the config.
        #[arg(short, long)]
        device: Option<String>,

        /// Path to input data file (JSON `{ "shape": [..], "data": [..] }`).
        #[arg(short, long)]
        input: PathBuf,

        /// Output format (json, pretty).
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Path to optional YAML config file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show build and model information.
    Info {
        /// Path to the model file.
        #[arg(short, long)]
        model: PathBuf,

        /// Device to load the model on.
        #[arg(short, long, default_value = "cpu")]
        device: String,
    },

    /// Build a model file from a JSON model description.
    Pack {
        /// JSON description with inline weights.
        #[arg(short, long)]
        spec: PathBuf,

        /// Where to write the model file.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Load and run a built-in model to check a device.
    Probe {
        /// Device to test.
        #[arg(short, long, default_value = "cpu")]
        device: String,
    },
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_infer() {
        let cli = Cli::try_parse_from([
            "infer-rs", "infer", "--model", "m.infm", "--input", "x.json", "-d", "mock",
        ])
        .unwrap();
        match cli.command {
            Commands::Infer {
                model,
                device,
                input,
                format,
                config,
            } => {
                assert_eq!(model, Some(PathBuf::from("m.infm")));
                assert_eq!(device.as_deref(), Some("mock"));
                assert_eq!(input, PathBuf::from("x.json"));
                assert_eq!(format, "json");
                assert!(config.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_infer_requires_input() {
        assert!(Cli::try_parse_from(["infer-rs", "infer", "--model", "m.infm"]).is_err());
    }
}
