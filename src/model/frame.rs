//! Tracking frames and hands
//!
//! A frame is one sampled snapshot of every hand the device currently sees.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a hand as left or right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Laterality {
    Left,
    Right,
}

impl fmt::Display for Laterality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Laterality::Left => f.write_str("Left"),
            Laterality::Right => f.write_str("Right"),
        }
    }
}

/// A 3D coordinate in the device's native reference frame (millimetres for LeapC).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector {
    pub fn new(x: f32, y: f32, z: f32) -> Vector {
        Vector { x, y, z }
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A single detected hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    /// Identifier the device keeps stable while the hand stays in view
    pub id: u32,
    pub laterality: Laterality,
    /// Centre of the palm
    pub palm: Vector,
}

/// One tracking frame as delivered by the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingFrame {
    /// Monotonically increasing frame number
    pub frame_id: i64,
    /// Device clock timestamp, in microseconds
    pub timestamp: i64,
    #[serde(default)]
    pub hands: Vec<Hand>,
}

impl TrackingFrame {
    /// Human readable hand count for the console.
    ///
    /// ## Returns
    ///
    /// * `String`: `"No hands detected."` for an empty frame, otherwise
    ///   `"<n> hands detected!"`.
    pub fn summary(&self) -> String {
        if self.hands.is_empty() {
            "No hands detected.".to_string()
        } else {
            format!("{} hands detected!", self.hands.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_hands() {
        let mut frame = TrackingFrame {
            frame_id: 1,
            timestamp: 0,
            hands: vec![],
        };
        assert_eq!(frame.summary(), "No hands detected.");

        frame.hands.push(Hand {
            id: 3,
            laterality: Laterality::Left,
            palm: Vector::default(),
        });
        assert_eq!(frame.summary(), "1 hands detected!");
    }

    #[test]
    fn vector_display_never_uses_exponents() {
        let v = Vector::new(1.0e30, -2.5e-7, 0.0);
        let text = v.to_string();
        assert!(text.starts_with('(') && text.ends_with(')'));
        assert!(!text.contains('e'), "{text}");
    }
}
