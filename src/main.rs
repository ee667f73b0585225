pub mod config;
pub mod device;
pub mod frame_log;
pub mod model;
pub mod poller;

use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::device::{replay::ReplayDevice, Device};
use crate::frame_log::FrameLog;
use crate::poller::TrackingPoller;
use crate::util::CancelToken;

mod util;

enum Mode {
    Live,
    Replay(PathBuf),
}

#[tokio::main]
async fn main() -> ExitCode {
    util::init_log();

    let args: Vec<String> = env::args().collect();

    let mode = match args.get(1).map(String::as_str) {
        None | Some("live") => Mode::Live,
        Some("replay") => match args.get(2) {
            Some(path) => Mode::Replay(PathBuf::from(path)),
            None => {
                print_usage();
                return ExitCode::FAILURE;
            }
        },
        _ => {
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancelToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let config = Config::default();
    let session = tokio::task::spawn_blocking(move || run(mode, &config, &cancel)).await;

    match session {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Tracking session panicked: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Cancel the session on Ctrl-C, or on SIGTERM from a supervisor.
async fn cancel_on_signal(cancel: CancelToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Interrupt received, shutting down"),
        _ = terminate => info!("Terminate received, shutting down"),
    }

    cancel.cancel();
}

fn run(mode: Mode, config: &Config, cancel: &CancelToken) -> Result<()> {
    let log = FrameLog::create(&config.log_path)
        .with_context(|| format!("Failed to open log file {}", config.log_path.display()))?;

    match mode {
        Mode::Live => poll_live(log, config, cancel),
        Mode::Replay(path) => {
            let device = ReplayDevice::load(&path)
                .with_context(|| format!("Failed to load replay {}", path.display()))?;
            info!("Replaying {} entries from {}", device.remaining(), path.display());
            poll_device(device, log, config, cancel)
        }
    }
}

#[cfg(feature = "leapc")]
fn poll_live<L: io::Write>(log: FrameLog<L>, config: &Config, cancel: &CancelToken) -> Result<()> {
    let device =
        device::leapc::LeapConnection::create().context("Failed to create connection")?;
    poll_device(device, log, config, cancel)
}

#[cfg(not(feature = "leapc"))]
fn poll_live<L: io::Write>(
    _log: FrameLog<L>,
    _config: &Config,
    _cancel: &CancelToken,
) -> Result<()> {
    anyhow::bail!("Failed to create connection: built without LeapC support (enable the `leapc` feature)")
}

fn poll_device<D: Device, L: io::Write>(
    device: D,
    log: FrameLog<L>,
    config: &Config,
    cancel: &CancelToken,
) -> Result<()> {
    let mut poller = TrackingPoller::connect(device, log, io::stdout(), config)
        .context("Failed to open connection")?;

    let outcome = poller.run(cancel);
    let closed = poller.shutdown().map(|_| ());

    finish_session(outcome, closed)
}

/// Combine the results of running and closing a session. A write failure from
/// the run takes precedence; a close failure on top of it is only logged.
fn finish_session(outcome: io::Result<()>, closed: io::Result<()>) -> Result<()> {
    match (outcome, closed) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(e), Ok(())) => Err(e).context("Failed to write tracking output"),
        (Ok(()), Err(e)) => Err(e).context("Failed to close tracking session"),
        (Err(e), Err(close_err)) => {
            error!("Failed to close tracking session: {}", close_err);
            Err(e).context("Failed to write tracking output")
        }
    }
}

fn print_usage() {
    println!("Hand Tracker");
    println!("Usage:");
    println!("  cargo run                 - Log frames from the LeapC tracking service");
    println!("  cargo run live            - Same as above");
    println!("  cargo run replay <file>   - Log frames from a recorded JSON-lines script");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_err(msg: &str) -> io::Error {
        io::Error::new(io::ErrorKind::Other, msg.to_string())
    }

    #[test]
    fn clean_session_succeeds() {
        assert!(finish_session(Ok(()), Ok(())).is_ok());
    }

    #[test]
    fn close_failure_is_reported() {
        let err = finish_session(Ok(()), Err(io_err("disk full"))).unwrap_err();
        let text = format!("{:#}", err);
        assert!(text.starts_with("Failed to close tracking session"), "{text}");
        assert!(text.contains("disk full"), "{text}");
    }

    #[test]
    fn write_failure_wins_over_close_failure() {
        let err = finish_session(Err(io_err("broken pipe")), Err(io_err("disk full")))
            .unwrap_err();
        let text = format!("{:#}", err);
        assert!(text.starts_with("Failed to write tracking output"), "{text}");
        assert!(text.contains("broken pipe"), "{text}");
    }
}
