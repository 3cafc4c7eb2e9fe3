mod script;

use anyhow::{Context, Result};
use clap::Parser;
use script::Script;
use std::path::PathBuf;
use std::time::Duration;
use touchpoll_hardware::config::TouchscreenConfig;
use touchpoll_hardware::evdev::{EvdevEncoder, describe};
use touchpoll_hardware::frame::TouchFrame;
use touchpoll_hardware::manager::TouchPoller;
use touchpoll_hardware::mock::{MockRegisterBus, MockRegisterBusHandle, RegisterSnapshot};
use touchpoll_hardware::types::BusType;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Polls without a frame, after the script has ended, before exiting.
const IDLE_POLLS_BEFORE_EXIT: u32 = 10;

#[derive(Parser)]
#[command(
    name = "touchpoll",
    version,
    about = "Poll a scripted touch controller and print its multi-touch frames"
)]
struct Cli {
    /// Touchscreen configuration (JSON). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Controller script (JSON). A built-in demo runs when omitted.
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(short = 'n', long)]
    frames: Option<u64>,

    /// Print each frame as Linux input events instead of JSON
    #[arg(long)]
    evdev: bool,

    /// Enables debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Feed the script to the bus one step at a time.
///
/// A step is applied once every snapshot of the previous one has been latched
/// by a poll. When the script ends the controller reports no touches.
async fn feed(script: Script, handle: MockRegisterBusHandle, period: Duration) {
    for (n, step) in script.steps.iter().enumerate() {
        debug!("Script step {}: {:?}", n, step);
        step.apply(&handle);
        while handle.queued_len() > 0 {
            tokio::time::sleep(period).await;
        }
    }
    handle.push_snapshot(RegisterSnapshot::empty());
    while handle.queued_len() > 0 {
        tokio::time::sleep(period).await;
    }
}

fn print_frame(frame: &TouchFrame, encoder: Option<&mut EvdevEncoder>) -> Result<()> {
    match encoder {
        Some(encoder) => {
            for event in encoder.encode(frame) {
                println!("{}", describe(&event));
            }
        }
        None => println!("{}", serde_json::to_string(frame)?),
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => TouchscreenConfig::from_file(path)
            .with_context(|| format!("Unable to load configuration {}", path.display()))?,
        None => TouchscreenConfig::default(),
    };
    let script = match &cli.script {
        Some(path) => Script::from_file(path)?,
        None => Script::demo()?,
    };

    let (bus, handle) = MockRegisterBus::with_name("scripted controller".to_string());
    let period = config.poll_interval();

    let poller = TouchPoller::new(config, bus)
        .context("Unable to register touchscreen")?
        .with_bus_type(BusType::Virtual);
    info!(
        "Registered {}",
        serde_json::to_string(poller.descriptor())?
    );

    let mut encoder = cli.evdev.then(|| EvdevEncoder::new(poller.descriptor()));
    let mut poller = poller.start()?;
    let feeder = tokio::spawn(feed(script, handle, period));

    let mut received = 0u64;
    loop {
        match tokio::time::timeout(period * IDLE_POLLS_BEFORE_EXIT, poller.recv()).await {
            Ok(Some(frame)) => {
                received += 1;
                print_frame(&frame, encoder.as_mut())?;
                if cli.frames.is_some_and(|limit| received >= limit) {
                    break;
                }
            }
            Ok(None) => break,
            Err(_) if feeder.is_finished() => break,
            Err(_) => {}
        }
    }

    feeder.abort();
    let stats = poller.stats();
    info!(
        "{} polls: {} frames, {} read failures, {} not ready, {} idle",
        stats.polls, stats.frames, stats.read_failures, stats.not_ready, stats.idle
    );
    poller.shutdown().await?;
    Ok(())
}
