use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use voxlist::audio::capture::list_devices;
use voxlist::cli::{Cli, Commands};
use voxlist::config::{Config, SessionConfig};
use voxlist::error::VoxlistError;
use voxlist::{transcribe_file, transcribe_live_session};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Devices) => {
            list_audio_devices()?;
            return Ok(());
        }
        None => {}
    }

    let config = load_session_config(&cli)?;
    config.validate()?;

    let outcome = match &cli.file {
        Some(path) => transcribe_file(path, &config).await,
        None => transcribe_live_session(&config).await,
    };

    match outcome {
        Ok(transcript) => {
            println!("{}", transcript);
            Ok(())
        }
        Err(VoxlistError::SessionAborted {
            message,
            partial_transcript,
        }) => {
            // The transcript accumulated before the failure still has
            // value; print it before reporting the error.
            if !partial_transcript.is_empty() {
                println!("{}", partial_transcript);
            }
            Err(anyhow::anyhow!("session aborted: {}", message))
        }
        Err(e) => Err(e.into()),
    }
}

/// RUST_LOG wins when set; otherwise -v flags pick the level.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "voxlist=info",
        1 => "voxlist=debug",
        _ => "voxlist=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// File config + env overrides + CLI flags, highest priority last.
fn load_session_config(cli: &Cli) -> Result<SessionConfig> {
    let file_config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)?,
            None => Config::default(),
        },
    };
    let file_config = file_config.with_env_overrides();

    let mut config = SessionConfig::from_config(&file_config);
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(language) = &cli.language {
        config.language = language.clone();
    }
    if let Some(device) = &cli.device {
        config.device = Some(device.clone());
    }
    if let Some(timeout) = cli.timeout {
        config.idle_timeout = std::time::Duration::from_secs(timeout);
    }
    Ok(config)
}

fn list_audio_devices() -> Result<()> {
    let devices = list_devices()?;
    if devices.is_empty() {
        println!("No audio input devices found");
        return Ok(());
    }
    println!("Available audio input devices:");
    for name in devices {
        println!("  {}", name);
    }
    Ok(())
}
