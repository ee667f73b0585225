//! LeapC device backend
//!
//! Thin bindings over the Ultraleap LeapC runtime. Only the calls needed to
//! create, open, poll, close and destroy a connection are bound; struct layouts
//! mirror `LeapC.h` for the fields the poller reads.

use std::ptr;
use std::slice;
use std::time::Duration;

use tracing::debug;

use crate::device::{Device, SdkError};
use crate::model::frame::{Hand, Laterality, TrackingFrame, Vector};
use crate::model::message::Message;

#[allow(dead_code)]
mod sys {
    use std::ffi::c_void;

    pub type LeapResult = u32;
    pub type LeapConnectionHandle = *mut c_void;

    pub const RESULT_SUCCESS: LeapResult = 0;
    pub const RESULT_UNKNOWN_ERROR: LeapResult = 0xE201_0000;

    pub const EVENT_CONNECTION: u32 = 0x001;
    pub const EVENT_TRACKING: u32 = 0x100;

    pub const HAND_LEFT: i32 = 0;

    #[repr(C)]
    #[derive(Clone, Copy)]
    pub struct LeapVector {
        pub x: f32,
        pub y: f32,
        pub z: f32,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    pub struct LeapQuaternion {
        pub x: f32,
        pub y: f32,
        pub z: f32,
        pub w: f32,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    pub struct LeapBone {
        pub prev_joint: LeapVector,
        pub next_joint: LeapVector,
        pub width: f32,
        pub rotation: LeapQuaternion,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    pub struct LeapDigit {
        pub finger_id: i32,
        pub bones: [LeapBone; 4],
        pub is_extended: u32,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    pub struct LeapPalm {
        pub position: LeapVector,
        pub stabilized_position: LeapVector,
        pub velocity: LeapVector,
        pub normal: LeapVector,
        pub width: f32,
        pub direction: LeapVector,
        pub orientation: LeapQuaternion,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    pub struct LeapHand {
        pub id: u32,
        pub flags: u32,
        pub hand_type: i32,
        pub confidence: f32,
        pub visible_time: u64,
        pub pinch_distance: f32,
        pub grab_angle: f32,
        pub pinch_strength: f32,
        pub grab_strength: f32,
        pub palm: LeapPalm,
        pub digits: [LeapDigit; 5],
        pub arm: LeapBone,
    }

    #[repr(C)]
    pub struct LeapFrameHeader {
        pub reserved: *mut c_void,
        pub frame_id: i64,
        pub timestamp: i64,
    }

    #[repr(C)]
    pub struct LeapTrackingEvent {
        pub info: LeapFrameHeader,
        pub tracking_frame_id: i64,
        pub n_hands: u32,
        pub p_hands: *const LeapHand,
        pub framerate: f32,
    }

    #[repr(C)]
    pub struct LeapConnectionMessage {
        pub size: u32,
        pub event_type: u32,
        pub payload: *const c_void,
        pub device_id: u32,
    }

    #[link(name = "LeapC")]
    extern "C" {
        pub fn LeapCreateConnection(
            config: *const c_void,
            connection: *mut LeapConnectionHandle,
        ) -> LeapResult;
        pub fn LeapOpenConnection(connection: LeapConnectionHandle) -> LeapResult;
        pub fn LeapPollConnection(
            connection: LeapConnectionHandle,
            timeout: u32,
            message: *mut LeapConnectionMessage,
        ) -> LeapResult;
        pub fn LeapCloseConnection(connection: LeapConnectionHandle);
        pub fn LeapDestroyConnection(connection: LeapConnectionHandle);
    }
}

fn check(result: sys::LeapResult) -> Result<(), SdkError> {
    if result == sys::RESULT_SUCCESS {
        Ok(())
    } else {
        Err(SdkError::from_code(result))
    }
}

/// A LeapC connection handle. Destroyed on drop.
#[derive(Debug)]
pub struct LeapConnection {
    handle: sys::LeapConnectionHandle,
}

impl LeapConnection {
    /// Create a connection with the default configuration. The connection is
    /// not opened yet.
    pub fn create() -> Result<LeapConnection, SdkError> {
        let mut handle: sys::LeapConnectionHandle = ptr::null_mut();
        // A null config selects the SDK defaults.
        check(unsafe { sys::LeapCreateConnection(ptr::null(), &mut handle) })?;

        if handle.is_null() {
            return Err(SdkError::Status(sys::RESULT_UNKNOWN_ERROR));
        }

        debug!("LeapC connection created");
        Ok(LeapConnection { handle })
    }
}

impl Device for LeapConnection {
    fn open(&mut self) -> Result<(), SdkError> {
        check(unsafe { sys::LeapOpenConnection(self.handle) })
    }

    fn poll(&mut self, timeout: Duration) -> Result<Message, SdkError> {
        let timeout_ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        let mut message = sys::LeapConnectionMessage {
            size: 0,
            event_type: 0,
            payload: ptr::null(),
            device_id: 0,
        };

        check(unsafe { sys::LeapPollConnection(self.handle, timeout_ms, &mut message) })?;

        let message = match message.event_type {
            sys::EVENT_TRACKING if !message.payload.is_null() => {
                // The payload is only valid until the next poll, so copy it out now.
                let event = unsafe { &*(message.payload as *const sys::LeapTrackingEvent) };
                Message::Tracking(unsafe { copy_frame(event) })
            }
            sys::EVENT_CONNECTION => Message::Connection,
            other => Message::Other(other),
        };

        Ok(message)
    }

    fn close(&mut self) {
        unsafe { sys::LeapCloseConnection(self.handle) };
    }
}

impl Drop for LeapConnection {
    fn drop(&mut self) {
        unsafe { sys::LeapDestroyConnection(self.handle) };
        debug!("LeapC connection destroyed");
    }
}

/// # Safety
///
/// `event.p_hands` must point to `event.n_hands` valid hands, or be null.
unsafe fn copy_frame(event: &sys::LeapTrackingEvent) -> TrackingFrame {
    let raw_hands: &[sys::LeapHand] = if event.p_hands.is_null() || event.n_hands == 0 {
        &[]
    } else {
        slice::from_raw_parts(event.p_hands, event.n_hands as usize)
    };

    let hands = raw_hands
        .iter()
        .map(|hand| {
            let p = hand.palm.position;
            Hand {
                id: hand.id,
                laterality: if hand.hand_type == sys::HAND_LEFT {
                    Laterality::Left
                } else {
                    Laterality::Right
                },
                palm: Vector::new(p.x, p.y, p.z),
            }
        })
        .collect();

    TrackingFrame {
        frame_id: event.info.frame_id,
        timestamp: event.info.timestamp,
        hands,
    }
}
