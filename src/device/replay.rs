//! Replay device
//!
//! Plays back a recorded message script, one JSON object per line, so the
//! poller can run without tracking hardware attached.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::device::{Device, SdkError};
use crate::model::{frame::TrackingFrame, message::Message};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read replay script: {0}")]
    Io(#[from] io::Error),

    #[error("malformed replay entry on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// One line of a replay script.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ReplayEntry {
    Connection,
    Tracking(TrackingFrame),
    Other { kind: u32 },
    Timeout,
    NotConnected,
    Failure { code: u32 },
}

impl ReplayEntry {
    fn into_poll_result(self) -> Result<Message, SdkError> {
        match self {
            ReplayEntry::Connection => Ok(Message::Connection),
            ReplayEntry::Tracking(frame) => Ok(Message::Tracking(frame)),
            ReplayEntry::Other { kind } => Ok(Message::Other(kind)),
            ReplayEntry::Timeout => Err(SdkError::Timeout),
            ReplayEntry::NotConnected => Err(SdkError::NotConnected),
            ReplayEntry::Failure { code } => Err(SdkError::from_code(code)),
        }
    }
}

#[derive(Debug)]
pub struct ReplayDevice {
    entries: VecDeque<ReplayEntry>,
    open: bool,
}

impl ReplayDevice {
    /// Load a replay script from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<ReplayDevice, ReplayError> {
        let file = File::open(path)?;
        ReplayDevice::parse(BufReader::new(file))
    }

    /// Parse a replay script. Blank lines are skipped.
    pub fn parse(reader: impl BufRead) -> Result<ReplayDevice, ReplayError> {
        let mut entries = VecDeque::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let entry = serde_json::from_str(&line)
                .map_err(|source| ReplayError::Parse { line: idx + 1, source })?;
            entries.push_back(entry);
        }

        debug!("Loaded {} replay entries", entries.len());

        Ok(ReplayDevice {
            entries,
            open: false,
        })
    }

    /// Entries not yet played back.
    pub fn remaining(&self) -> usize {
        self.entries.len()
    }
}

impl Device for ReplayDevice {
    fn open(&mut self) -> Result<(), SdkError> {
        self.open = true;
        Ok(())
    }

    fn poll(&mut self, _timeout: Duration) -> Result<Message, SdkError> {
        if !self.open {
            return Err(SdkError::NotConnected);
        }

        match self.entries.pop_front() {
            Some(entry) => entry.into_poll_result(),
            None => Err(SdkError::EndOfStream),
        }
    }

    fn close(&mut self) {
        self.open = false;
    }
}
