//! Receiver monitor
//!
//! Connects to a receiver, runs a session against it and prints every
//! published state change. Optionally powers the receiver on first.
//!
//! ```text
//! cargo run -p onkyo-sdk-state --example monitor -- 192.168.1.80 --power-on
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use onkyo_api::{PowerStatus, DEFAULT_PORT};
use onkyo_state::{
    init_logging, ChangeKind, Command, LoggingMode, SessionConfig, SessionController,
    SessionEvent, TcpTransport,
};

/// Watch an Onkyo/Pioneer receiver
#[derive(Parser, Debug)]
#[command(name = "monitor")]
#[command(about = "Print state changes reported by an Onkyo/Pioneer network receiver")]
struct Args {
    /// Receiver host name or address
    host: String,

    /// eISCP port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Notification window in milliseconds
    #[arg(long, default_value = "500")]
    refresh_ms: u64,

    /// Model name to report until the receiver identifies itself
    #[arg(long)]
    model: Option<String>,

    /// Switch the receiver on after connecting
    #[arg(long)]
    power_on: bool,

    /// Log mode (silent, development, debug)
    #[arg(long, default_value = "development")]
    log_mode: String,

    /// Print the full state as JSON on every change
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mode = LoggingMode::from_name(&args.log_mode)
        .with_context(|| format!("unknown log mode {:?}", args.log_mode))?;
    init_logging(mode)?;

    let mut config =
        SessionConfig::default().with_refresh_delay(Duration::from_millis(args.refresh_ms));
    if let Some(model) = &args.model {
        config = config.with_model(model.clone());
    }

    let (transport, inbound) = TcpTransport::connect((args.host.as_str(), args.port))
        .with_context(|| format!("connecting to {}:{}", args.host, args.port))?;
    let (events_tx, events) = crossbeam::channel::unbounded();

    let mut controller = SessionController::new(config, inbound, transport, events_tx);
    let handle = controller.start()?;
    if args.power_on {
        handle.send_message(Command::Power(PowerStatus::On))?;
    }

    for event in events {
        match event {
            SessionEvent::StateChanged { state, changes } => {
                println!("changed {}", changes);
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&*state)?);
                    continue;
                }
                if changes.contains(ChangeKind::Common) {
                    println!(
                        "  power {:?}, input {:?}, model {}",
                        state.power.status,
                        state.power.input_selector,
                        state.model().unwrap_or("?")
                    );
                }
                if changes.contains(ChangeKind::AudioControl) {
                    println!(
                        "  volume {:?}, muted {}",
                        state.audio.master_volume, state.audio.muted
                    );
                }
                if changes.contains(ChangeKind::TrackInfo) {
                    println!(
                        "  {} - {} ({})",
                        state.track.artist, state.track.title, state.track.album
                    );
                }
                if changes.contains(ChangeKind::PlaybackState) {
                    println!("  {:?}", state.playback.status);
                }
                if changes.contains(ChangeKind::MediaItems) {
                    let nav = &state.navigation;
                    println!(
                        "  {} \"{}\": {} media items, {} services",
                        nav.service_type,
                        nav.title_bar,
                        nav.media_items.len(),
                        nav.service_items.len()
                    );
                }
            }
            SessionEvent::Stopped => {
                println!("session stopped");
                break;
            }
        }
    }

    controller.join();
    Ok(())
}
