//! Plain-text frame log
//!
//! Every frame is appended as a block of `Label: value` lines:
//!
//! ```text
//! Frame ID: 42
//! Timestamp: 7310021
//! Number of Hands: 1
//! Hand ID: 3
//! Hand Type: Left
//! Palm Position: (12.5, 180, -4.25)
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::model::frame::TrackingFrame;

pub struct FrameLog<W: Write> {
    writer: W,
}

impl FrameLog<BufWriter<File>> {
    /// Create (or truncate) the log file at `path`.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(FrameLog::new(BufWriter::new(file)))
    }
}

impl<W: Write> FrameLog<W> {
    pub fn new(writer: W) -> FrameLog<W> {
        FrameLog { writer }
    }

    pub fn append(&mut self, frame: &TrackingFrame) -> io::Result<()> {
        let w = &mut self.writer;
        writeln!(w, "Frame ID: {}", frame.frame_id)?;
        writeln!(w, "Timestamp: {}", frame.timestamp)?;
        writeln!(w, "Number of Hands: {}", frame.hands.len())?;

        for hand in &frame.hands {
            writeln!(w, "Hand ID: {}", hand.id)?;
            writeln!(w, "Hand Type: {}", hand.laterality)?;
            writeln!(w, "Palm Position: {}", hand.palm)?;
        }

        // Every frame must survive the process being killed.
        w.flush()
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::frame::{Hand, Laterality, Vector};

    fn render(frame: &TrackingFrame) -> String {
        let mut log = FrameLog::new(Vec::new());
        log.append(frame).unwrap();
        String::from_utf8(log.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn appended_frames_reach_disk_before_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracking_data.log");
        let mut log = FrameLog::create(&path).unwrap();

        for frame_id in 0..50 {
            let frame = TrackingFrame {
                frame_id,
                timestamp: frame_id * 1000,
                hands: vec![Hand {
                    id: 1,
                    laterality: Laterality::Left,
                    palm: Vector::new(1.0, 2.0, 3.0),
                }],
            };
            log.append(&frame).unwrap();
        }

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk.matches("Frame ID: ").count(), 50);
        assert!(on_disk.ends_with("Palm Position: (1, 2, 3)\n"));

        // Dropping without `into_inner` must not lose anything already appended.
        std::mem::forget(log);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), on_disk);
    }

    #[test]
    fn writes_frame_block() {
        let frame = TrackingFrame {
            frame_id: 42,
            timestamp: 7310021,
            hands: vec![
                Hand {
                    id: 3,
                    laterality: Laterality::Left,
                    palm: Vector::new(12.5, 180.0, -4.25),
                },
                Hand {
                    id: 4,
                    laterality: Laterality::Right,
                    palm: Vector::new(0.0, 1.0, 2.0),
                },
            ],
        };

        let expected = "\
Frame ID: 42
Timestamp: 7310021
Number of Hands: 2
Hand ID: 3
Hand Type: Left
Palm Position: (12.5, 180, -4.25)
Hand ID: 4
Hand Type: Right
Palm Position: (0, 1, 2)
";
        assert_eq!(render(&frame), expected);
    }

    #[test]
    fn extreme_values_stay_label_value_lines() {
        let frame = TrackingFrame {
            frame_id: i64::MAX,
            timestamp: i64::MIN,
            hands: vec![Hand {
                id: u32::MAX,
                laterality: Laterality::Right,
                palm: Vector::new(f32::MAX, f32::MIN_POSITIVE, -1.0e-30),
            }],
        };

        let text = render(&frame);
        assert_eq!(text.lines().count(), 6);
        for line in text.lines() {
            let (label, value) = line.split_once(": ").expect("label separator");
            assert!(!label.is_empty());
            assert!(!value.is_empty());
            assert!(!value.contains('e'), "{line}");
        }
    }
}
