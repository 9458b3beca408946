//! CSV output for pose samples.
//!
//! One line per new frame: `timestamp, framenum, roll, pitch, yaw, x, y, z`,
//! with the pose in converted units rounded to one decimal place.

use crate::config::TimestampMode;
use crate::types::PoseSample;
use crate::Result;
use std::io::Write;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub fn header(mode: TimestampMode) -> &'static str {
    match mode {
        TimestampMode::UnixSeconds => "timestamp, framenum, roll, pitch, yaw, x, y, z",
        TimestampMode::ElapsedMillis => "timestamp ms, framenum, roll, pitch, yaw, x, y, z",
    }
}

/// Format one row given an already rendered timestamp column.
pub fn format_row(timestamp: &str, sample: &PoseSample) -> String {
    let pose = sample.pose();
    format!(
        "{}, {}, {:.1}, {:.1}, {:.1}, {:.1}, {:.1}, {:.1}",
        timestamp, sample.frame, pose.roll, pose.pitch, pose.yaw, pose.x, pose.y, pose.z
    )
}

/// Render the timestamp column. `elapsed` is the time since the loop started.
pub fn format_timestamp(mode: TimestampMode, elapsed: Duration) -> String {
    match mode {
        TimestampMode::UnixSeconds => {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            format!("{:.6}", now.as_secs_f64())
        }
        TimestampMode::ElapsedMillis => elapsed.as_millis().to_string(),
    }
}

/// Writes the header once and a flushed line per sample.
pub struct CsvWriter<W: Write> {
    out: W,
    mode: TimestampMode,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(out: W, mode: TimestampMode) -> CsvWriter<W> {
        CsvWriter { out, mode }
    }

    pub fn write_header(&mut self) -> Result<()> {
        writeln!(self.out, "{}", header(self.mode))?;
        self.out.flush()?;
        Ok(())
    }

    pub fn write_sample(&mut self, sample: &PoseSample, elapsed: Duration) -> Result<()> {
        let timestamp = format_timestamp(self.mode, elapsed);
        writeln!(self.out, "{}", format_row(&timestamp, sample))?;
        // Flush per line so a redirected file stays current if the process is killed.
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
