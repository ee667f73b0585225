//! Data models for hand tracking
//!
//! This module contains the frame and message types handed from a tracking
//! device to the poller.

pub mod frame;
pub mod message;
