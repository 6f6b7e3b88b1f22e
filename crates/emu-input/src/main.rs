//! emu-input entry point.
//!
//! # Usage
//!
//! ```text
//! emu-input [--config FILE] <COMMAND>
//!
//! Commands:
//!   encode   Encode newline-delimited JSON input events and print the payloads
//!   probe    Request a session from the signaling endpoint and report the offer
//!   config   Print the effective configuration (optionally write it to disk)
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable         | Description                                   |
//! |------------------|-----------------------------------------------|
//! | `EMU_CONFIG`     | Config file path (default: platform config dir) |
//! | `EMU_SIGNAL_URL` | Signaling WebSocket URL for `probe`           |
//! | `RUST_LOG`       | Log filter; falls back to `[log] level`       |
//!
//! Logs go to stderr so that `encode` output on stdout stays machine-readable.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use emu_input::application::{replay, InputCaptureAdapter};
use emu_input::infrastructure::input_capture::{ndjson::NdjsonInputSource, CaptureSubscription};
use emu_input::infrastructure::payload_log::PayloadLog;
use emu_input::infrastructure::storage::config::{
    config_file_path, load_config_from, save_config_to, AppConfig,
};
use emu_session::infrastructure::WsSignalingTransport;
use emu_session::{
    IceCandidate, IceServer, InboundSignal, OutboundSignal, SessionDescription,
    SignalingTransport,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "emu-input",
    about = "Forward pointer, keyboard and touch input to a remote emulator",
    version
)]
struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true, env = "EMU_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Encode newline-delimited JSON input events into wire payloads.
    ///
    /// Prints one JSON line per payload: stream, data channel label, hex
    /// bytes and the decoded event.
    Encode {
        /// File to read events from; stdin when omitted.
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Request a session and report what the remote offers.
    Probe {
        /// Signaling endpoint; overrides `[signaling] url`.
        #[arg(long, env = "EMU_SIGNAL_URL")]
        url: Option<String>,

        /// Seconds to wait for signaling messages.
        #[arg(long, default_value_t = 10)]
        timeout: u64,
    },

    /// Print the effective configuration as TOML.
    Config {
        /// Also write it to the config file.
        #[arg(long)]
        write: bool,
    },
}

impl Cli {
    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config_file_path().context("no config path given and no platform config dir"),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config_path()?;
    let config = load_config_from(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    // `RUST_LOG` wins; otherwise the configured level.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log.level)),
        )
        .init();

    match cli.command {
        Command::Encode { input } => encode(&config, input).await,
        Command::Probe { url, timeout } => {
            let url = url.unwrap_or_else(|| config.signaling.url.clone());
            probe(&url, Duration::from_secs(timeout)).await
        }
        Command::Config { write } => {
            print!("{}", toml::to_string_pretty(&config)?);
            if write {
                save_config_to(&config_path, &config)?;
                info!("wrote {}", config_path.display());
            }
            Ok(())
        }
    }
}

async fn encode(config: &AppConfig, input: Option<PathBuf>) -> anyhow::Result<()> {
    let reader: Box<dyn BufRead + Send> = match &input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    let adapter = InputCaptureAdapter::new(
        config.surface.capture_surface(),
        config.device.resolution(),
        config.touch.max_slots,
    )
    .context("invalid surface or device geometry")?;
    let subscription = CaptureSubscription::attach(NdjsonInputSource::new(reader))?;
    let mut out = PayloadLog::new(std::io::stdout(), config.session.clone());

    let stats = replay(subscription, adapter, &mut out).await;
    info!(sent = stats.sent, dropped = stats.dropped(), "encode finished");
    Ok(())
}

/// What the remote sent in reply to a session request.
#[derive(Debug, Default, Serialize)]
struct ProbeReport {
    ice_servers: Vec<IceServer>,
    offer: Option<SessionDescription>,
    candidates: Vec<IceCandidate>,
    ended_by_remote: bool,
}

async fn probe(url: &str, timeout: Duration) -> anyhow::Result<()> {
    let mut transport = WsSignalingTransport::connect(url).await?;
    transport
        .send(OutboundSignal::RequestSession)
        .context("failed to request a session")?;
    info!("session requested from {url}");

    let deadline = tokio::time::Instant::now() + timeout;
    let mut report = ProbeReport::default();
    loop {
        match tokio::time::timeout_at(deadline, transport.recv()).await {
            Err(_elapsed) => break,
            Ok(None) => {
                warn!("signaling closed before the probe finished");
                break;
            }
            Ok(Some(Err(e))) => warn!("signaling error: {e}"),
            Ok(Some(Ok(signal))) => match signal {
                InboundSignal::Start(rtc) => report.ice_servers = rtc.ice_servers,
                InboundSignal::Offer(offer) => report.offer = Some(offer),
                InboundSignal::Candidate(candidate) => report.candidates.push(candidate),
                InboundSignal::Bye => {
                    report.ended_by_remote = true;
                    break;
                }
            },
        }
    }

    if !report.ended_by_remote {
        let _ = transport.send(OutboundSignal::Bye);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.offer.is_none() {
        anyhow::bail!("no offer received from {url} within {}s", timeout.as_secs());
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_encode_defaults_to_stdin() {
        // Arrange / Act
        let cli = Cli::parse_from(["emu-input", "encode"]);

        // Assert
        assert!(matches!(cli.command, Command::Encode { input: None }));
    }

    #[test]
    fn test_cli_encode_input_override() {
        let cli = Cli::parse_from(["emu-input", "encode", "--input", "events.ndjson"]);
        assert!(
            matches!(cli.command, Command::Encode { input: Some(ref p) } if p == &PathBuf::from("events.ndjson"))
        );
    }

    #[test]
    fn test_cli_probe_default_timeout() {
        let cli = Cli::parse_from(["emu-input", "probe"]);
        assert!(matches!(cli.command, Command::Probe { timeout: 10, .. }));
    }

    #[test]
    fn test_cli_probe_url_override() {
        let cli = Cli::parse_from(["emu-input", "probe", "--url", "ws://10.0.0.5:9000/signal"]);
        assert!(
            matches!(cli.command, Command::Probe { url: Some(ref u), .. } if u == "ws://10.0.0.5:9000/signal")
        );
    }

    #[test]
    fn test_cli_config_path_is_global() {
        // Arrange: --config after the subcommand
        let cli = Cli::parse_from(["emu-input", "config", "--config", "/tmp/emu.toml"]);

        // Act
        let path = cli.config_path().expect("explicit path");

        // Assert
        assert_eq!(path, PathBuf::from("/tmp/emu.toml"));
    }

    #[test]
    fn test_cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["emu-input"]).is_err());
    }
}
