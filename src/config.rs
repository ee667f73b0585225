use std::path::PathBuf;
use std::time::Duration;

pub const LOG_PATH: &str = "tracking_data.log";
pub const POLL_TIMEOUT: Duration = Duration::from_millis(1000);
pub const RECONNECT_INITIAL: Duration = Duration::from_millis(250);
pub const RECONNECT_MAX: Duration = Duration::from_secs(10);

/// Runtime settings for a tracking session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frame log, truncated when the session starts
    pub log_path: PathBuf,
    /// Longest a single poll may block
    pub poll_timeout: Duration,
    /// Delay after the first failed reconnect; doubles on every further failure
    pub reconnect_initial: Duration,
    /// Ceiling for the reconnect delay
    pub reconnect_max: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_path: PathBuf::from(LOG_PATH),
            poll_timeout: POLL_TIMEOUT,
            reconnect_initial: RECONNECT_INITIAL,
            reconnect_max: RECONNECT_MAX,
        }
    }
}
