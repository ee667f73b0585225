//! Scripted device for poller tests.

use std::collections::VecDeque;
use std::time::Duration;

use crate::device::{Device, SdkError};
use crate::model::message::Message;

/// Plays back queued poll and open results. Once the poll script runs dry every
/// poll reports [`SdkError::EndOfStream`]; open calls succeed unless scripted.
#[derive(Debug, Default)]
pub struct ScriptedDevice {
    polls: VecDeque<Result<Message, SdkError>>,
    opens: VecDeque<Result<(), SdkError>>,
    pub open_calls: usize,
    pub poll_calls: usize,
    pub close_calls: usize,
}

impl ScriptedDevice {
    pub fn new() -> ScriptedDevice {
        ScriptedDevice::default()
    }

    pub fn then_poll(mut self, result: Result<Message, SdkError>) -> ScriptedDevice {
        self.polls.push_back(result);
        self
    }

    pub fn then_open(mut self, result: Result<(), SdkError>) -> ScriptedDevice {
        self.opens.push_back(result);
        self
    }
}

impl Device for ScriptedDevice {
    fn open(&mut self) -> Result<(), SdkError> {
        self.open_calls += 1;
        self.opens.pop_front().unwrap_or(Ok(()))
    }

    fn poll(&mut self, _timeout: Duration) -> Result<Message, SdkError> {
        self.poll_calls += 1;
        self.polls.pop_front().unwrap_or(Err(SdkError::EndOfStream))
    }

    fn close(&mut self) {
        self.close_calls += 1;
    }
}
