//! Command-line interface for voxlist
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Streaming voice transcription client
#[derive(Parser, Debug)]
#[command(
    name = "voxlist",
    version,
    about = "Stream microphone or file audio to a Vosk server and print the transcript"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Audio file to transcribe instead of the microphone (16-bit WAV)
    #[arg(long, short = 'f', value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Recognition server endpoint (e.g. ws://localhost:2700)
    #[arg(long, value_name = "URI")]
    pub endpoint: Option<String>,

    /// Recognition language tag (e.g. es, en)
    #[arg(long, short = 'l', value_name = "LANG")]
    pub language: Option<String>,

    /// Audio input device (substring match against device names)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Seconds of silence before a live session stops
    #[arg(long, short = 't', value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_no_args() {
        let cli = Cli::parse_from(["voxlist"]);
        assert!(cli.command.is_none());
        assert!(cli.file.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_parses_file_mode() {
        let cli = Cli::parse_from(["voxlist", "--file", "order.wav", "-l", "en"]);
        assert_eq!(cli.file, Some(PathBuf::from("order.wav")));
        assert_eq!(cli.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_cli_parses_devices_subcommand() {
        let cli = Cli::parse_from(["voxlist", "devices"]);
        assert!(matches!(cli.command, Some(Commands::Devices)));
    }

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::parse_from([
            "voxlist",
            "--endpoint",
            "ws://10.0.0.5:2700",
            "--timeout",
            "10",
            "-vv",
        ]);
        assert_eq!(cli.endpoint.as_deref(), Some("ws://10.0.0.5:2700"));
        assert_eq!(cli.timeout, Some(10));
        assert_eq!(cli.verbose, 2);
    }
}
