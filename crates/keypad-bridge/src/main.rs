//! keypad-bridge: entry point.
//!
//! Connects to a paired Bluetooth keypad and turns each key press into an
//! HTTP request against a small action server (`GET /remote/<action>`).
//!
//! # Usage
//!
//! ```text
//! keypad-bridge [OPTIONS]
//!
//! Options:
//!   --config <PATH>            Config file [default: platform config dir]
//!   --peer <ADDR>              Keypad address, e.g. DC:2C:26:00:37:A9
//!   --server <HOST:PORT>       Action server address
//!   --ready-timeout-ms <MS>    How long to wait for the keypad at startup
//!   --events <SOURCE>          Radio event feed: `-` for stdin or a file
//!   --write-default-config     Write a default config file and exit
//! ```
//!
//! Command-line values override the config file.
//!
//! # Architecture overview
//!
//! ```text
//! radio stack thread                         tokio runtime
//! ──────────────────                         ─────────────
//! HidHost ──► HostEventRouter ──► LinkStateMachine ◄── startup wait_resolved
//!                   │
//!                   └─► KeyDispatcher ──► [queue] ──► sender task ──► HTTP GET
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use keypad_core::{ConnectionState, PeerAddress};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use keypad_bridge::application::dispatch_keys::{spawn_sender_task, KeyDispatcher};
use keypad_bridge::application::link_state::LinkStateMachine;
use keypad_bridge::application::route_events::HostEventRouter;
use keypad_bridge::application::startup::{bring_up_host, pair_at_startup};
use keypad_bridge::infrastructure::http::HttpActionSender;
use keypad_bridge::infrastructure::radio::{event_feed::EventFeedHost, HidHost};
use keypad_bridge::infrastructure::storage::config::{
    config_file_path, load_config_from, save_config_to, AppConfig,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Bluetooth keypad to HTTP action bridge.
#[derive(Debug, Parser)]
#[command(
    name = "keypad-bridge",
    about = "Turns key presses on a paired Bluetooth keypad into HTTP action requests",
    version
)]
struct Cli {
    /// Path to the TOML config file.  Defaults to the platform config dir.
    #[arg(long, env = "KEYPAD_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Bluetooth address of the keypad (overrides `bluetooth.peer_address`).
    #[arg(long, env = "KEYPAD_BRIDGE_PEER")]
    peer: Option<PeerAddress>,

    /// `host:port` of the action server (overrides `server.address`).
    #[arg(long, env = "KEYPAD_BRIDGE_SERVER")]
    server: Option<String>,

    /// Startup connection wait in milliseconds (overrides
    /// `bluetooth.ready_timeout_ms`).
    #[arg(long)]
    ready_timeout_ms: Option<u64>,

    /// Radio event feed: `-` reads stdin, anything else is a replay file.
    #[arg(long, default_value = "-", env = "KEYPAD_BRIDGE_EVENTS")]
    events: String,

    /// Write a config file with every default filled in, then exit.
    #[arg(long)]
    write_default_config: bool,
}

impl Cli {
    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config_file_path().context("no --config given and no platform config dir"),
        }
    }

    /// Applies command-line values on top of the loaded configuration.
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(peer) = self.peer {
            config.bluetooth.peer_address = peer;
        }
        if let Some(server) = &self.server {
            config.server.address = server.clone();
        }
        if let Some(ms) = self.ready_timeout_ms {
            config.bluetooth.ready_timeout_ms = ms;
        }
    }

    fn event_host(&self) -> anyhow::Result<EventFeedHost> {
        if self.events == "-" {
            return Ok(EventFeedHost::stdin());
        }
        EventFeedHost::open(Path::new(&self.events))
            .with_context(|| format!("cannot open event feed '{}'", self.events))
    }
}

/// `RUST_LOG` wins; otherwise `level` from the config file; otherwise `info`.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Logs link transitions as seen from the runtime side.
async fn monitor_link(mut rx: watch::Receiver<ConnectionState>) {
    while rx.changed().await.is_ok() {
        let state = *rx.borrow_and_update();
        match state {
            ConnectionState::Connected => info!("keypad link is up"),
            ConnectionState::Closed => warn!("keypad link is down"),
            other => debug!(state = %other, "keypad link state"),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config_path()?;

    if cli.write_default_config {
        init_logging("info");
        save_config_to(&config_path, &AppConfig::default())
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        info!("wrote default configuration to {}", config_path.display());
        return Ok(());
    }

    let mut config = load_config_from(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    cli.apply_overrides(&mut config);
    init_logging(&config.bridge.log_level);

    info!(
        "keypad-bridge starting: peer={}, server={}",
        config.bluetooth.peer_address, config.server.address
    );

    // ── Key dispatch ──────────────────────────────────────────────────────────
    let table = config.key_table().context("invalid key table")?;
    info!("{} key(s) mapped", table.len());
    let (dispatcher, queue) = KeyDispatcher::new(Arc::new(table), config.server.queue_capacity);
    let sender = Arc::new(
        HttpActionSender::from_config(&config.server).context("failed to build HTTP client")?,
    );
    let sender_task = spawn_sender_task(queue, sender, dispatcher.stats_handle());

    // ── Link state ────────────────────────────────────────────────────────────
    let link = Arc::new(LinkStateMachine::new());
    link.initialize();
    let monitor_task = tokio::spawn(monitor_link(link.subscribe()));

    // ── Radio host ────────────────────────────────────────────────────────────
    let host = cli.event_host()?;
    let router = Arc::new(HostEventRouter::new(Arc::clone(&link), dispatcher.clone()));
    bring_up_host(
        &host,
        router,
        &config.bluetooth.device_name,
        config.bluetooth.connectable,
    )
    .context("radio host bring-up failed")?;

    pair_at_startup(
        &link,
        &host as &dyn HidHost,
        &config.bluetooth.peer_address,
        config.ready_timeout(),
    )
    .await;

    // ── Run until Ctrl+C ──────────────────────────────────────────────────────
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("received Ctrl+C, shutting down");

    let stats = dispatcher.stats();
    info!(
        queued = stats.queued,
        sent = stats.sent,
        failed = stats.failed,
        unmapped = stats.unmapped,
        dropped = stats.dropped,
        "dispatch statistics"
    );
    monitor_task.abort();
    sender_task.abort();

    info!("keypad-bridge stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_read_events_from_stdin() {
        // Arrange: parse with no arguments (all defaults apply)
        let cli = Cli::parse_from(["keypad-bridge"]);

        // Assert
        assert_eq!(cli.events, "-");
        assert!(!cli.write_default_config);
        assert!(cli.peer.is_none());
    }

    #[test]
    fn test_cli_peer_is_parsed_as_address() {
        let cli = Cli::parse_from(["keypad-bridge", "--peer", "01:23:45:67:89:ab"]);
        assert_eq!(
            cli.peer,
            Some(PeerAddress::new([0x01, 0x23, 0x45, 0x67, 0x89, 0xAB]))
        );
    }

    #[test]
    fn test_cli_rejects_malformed_peer() {
        let result = Cli::try_parse_from(["keypad-bridge", "--peer", "not-an-address"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_explicit_config_path_is_used() {
        let cli = Cli::parse_from(["keypad-bridge", "--config", "/tmp/kb.toml"]);
        assert_eq!(cli.config_path().unwrap(), PathBuf::from("/tmp/kb.toml"));
    }

    #[test]
    fn test_apply_overrides_replaces_only_given_values() {
        // Arrange
        let cli = Cli::parse_from([
            "keypad-bridge",
            "--server",
            "10.0.0.5:8080",
            "--ready-timeout-ms",
            "2500",
        ]);
        let mut config = AppConfig::default();

        // Act
        cli.apply_overrides(&mut config);

        // Assert
        assert_eq!(config.server.address, "10.0.0.5:8080");
        assert_eq!(config.bluetooth.ready_timeout_ms, 2500);
        assert_eq!(
            config.bluetooth.peer_address,
            AppConfig::default().bluetooth.peer_address
        );
    }

    #[test]
    fn test_event_host_for_missing_file_is_an_error() {
        let cli = Cli::parse_from([
            "keypad-bridge",
            "--events",
            "/nonexistent/keypad-bridge/feed.txt",
        ]);
        assert!(cli.event_host().is_err());
    }
}
