//! CLI Module
//!
//! Command-line interface for the Clipsmith audio toolkit.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::codec::{EncodingRequest, Mp3Bitrate};
use crate::config::Settings;
use crate::error::Result;

/// Clipsmith - cut, merge, trim, normalize and re-encode audio
#[derive(Parser, Debug)]
#[command(name = "clipsmith")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output container on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Wav,
    Mp3,
}

/// Output encoding flags shared by commands that write audio
#[derive(clap::Args, Debug, Clone, Default)]
pub struct EncodeArgs {
    /// Output format (defaults to the configured format)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// MP3 bitrate in kbps: 128, 192 or 320
    #[arg(long)]
    pub bitrate: Option<u32>,
}

impl EncodeArgs {
    /// Resolve against the configured defaults
    pub fn request(&self, settings: &Settings) -> Result<EncodingRequest> {
        let bitrate = match self.bitrate {
            Some(kbps) => Mp3Bitrate::try_from(kbps)?,
            None => settings.export.mp3_bitrate,
        };

        Ok(match self.format {
            Some(FormatArg::Wav) => EncodingRequest::Wav,
            Some(FormatArg::Mp3) => EncodingRequest::Mp3 { bitrate },
            None => match settings.encoding_request() {
                EncodingRequest::Mp3 { .. } => EncodingRequest::Mp3 { bitrate },
                wav => wav,
            },
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show format, length and levels of a WAV file
    #[command(name = "info")]
    Info {
        /// Input WAV file
        input: PathBuf,
    },

    /// Cut one time range out of a file
    #[command(name = "clip")]
    Clip {
        /// Input WAV file
        input: PathBuf,

        /// Start time in seconds
        #[arg(short, long)]
        start: f64,

        /// End time in seconds
        #[arg(short, long)]
        end: f64,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        encode: EncodeArgs,
    },

    /// Cut several time ranges into a directory with a manifest
    #[command(name = "clips")]
    Clips {
        /// Input WAV file
        input: PathBuf,

        /// Time range as START-END in seconds (repeatable)
        #[arg(short, long = "range", required = true)]
        ranges: Vec<String>,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        encode: EncodeArgs,
    },

    /// Join files end to end
    #[command(name = "merge")]
    Merge {
        /// Input WAV files, in order
        inputs: Vec<PathBuf>,

        /// Merge every .wav file in this directory (sorted by name)
        #[arg(short, long, conflicts_with = "inputs")]
        dir: Option<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        encode: EncodeArgs,
    },

    /// Remove silence, normalize and change speed
    #[command(name = "toolkit")]
    Toolkit {
        /// Input WAV file
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Silence threshold in dB
        #[arg(long, allow_hyphen_values = true)]
        threshold_db: Option<f32>,

        /// Padding kept around sound, in seconds
        #[arg(long)]
        padding: Option<f64>,

        /// Keep silent stretches
        #[arg(long)]
        keep_silence: bool,

        /// Skip normalization
        #[arg(long)]
        no_normalize: bool,

        /// Speed factor (0.5 to 3.0)
        #[arg(long)]
        speed: Option<f64>,

        #[command(flatten)]
        encode: EncodeArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_toolkit_negative_threshold() {
        let cli = Cli::parse_from([
            "clipsmith",
            "toolkit",
            "in.wav",
            "-o",
            "out.wav",
            "--threshold-db",
            "-35",
            "--speed",
            "1.5",
        ]);
        match cli.command {
            Some(Commands::Toolkit {
                threshold_db,
                speed,
                ..
            }) => {
                assert_eq!(threshold_db, Some(-35.0));
                assert_eq!(speed, Some(1.5));
            }
            other => panic!("Expected toolkit command, got: {:?}", other),
        }
    }

    #[test]
    fn test_encode_args_resolution() {
        let settings = Settings::default();

        let args = EncodeArgs {
            format: Some(FormatArg::Mp3),
            bitrate: Some(320),
        };
        assert_eq!(
            args.request(&settings).unwrap(),
            EncodingRequest::Mp3 {
                bitrate: Mp3Bitrate::Kbps320
            }
        );

        assert_eq!(
            EncodeArgs::default().request(&settings).unwrap(),
            EncodingRequest::Wav
        );

        let bad = EncodeArgs {
            format: Some(FormatArg::Mp3),
            bitrate: Some(100),
        };
        assert!(bad.request(&settings).is_err());
    }
}
