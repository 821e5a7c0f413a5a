use std::time::{Duration, SystemTime};

use thiserror::Error;

use crate::record::FileTimestamps;

/// A backward shift, assembled from the duration components the caller
/// supplies. Components omitted by the caller default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shift {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShiftError {
    #[error("shift duration overflows the representable range")]
    DurationOverflow,
    #[error("shifted timestamp underflows the representable range")]
    TimestampUnderflow,
}

impl Shift {
    /// Collapses the components into a single duration.
    pub fn to_duration(self) -> Result<Duration, ShiftError> {
        let seconds = self
            .days
            .checked_mul(24)
            .and_then(|hours| hours.checked_add(self.hours))
            .and_then(|hours| hours.checked_mul(60))
            .and_then(|minutes| minutes.checked_add(self.minutes))
            .and_then(|minutes| minutes.checked_mul(60))
            .and_then(|seconds| seconds.checked_add(self.seconds))
            .ok_or(ShiftError::DurationOverflow)?;

        Ok(Duration::from_secs(seconds))
    }

    /// Produces the record to hand to the mutator: every present field moved
    /// backward by the shift. A target that the platform's time type cannot
    /// represent is an error, never a wraparound.
    pub fn apply(self, times: &FileTimestamps) -> Result<FileTimestamps, ShiftError> {
        let delta = self.to_duration()?;
        let rewind =
            |time: SystemTime| time.checked_sub(delta).ok_or(ShiftError::TimestampUnderflow);

        Ok(FileTimestamps {
            created: times.created.map(rewind).transpose()?,
            modified: rewind(times.modified)?,
            accessed: rewind(times.accessed)?,
            changed: times.changed.map(rewind).transpose()?,
        })
    }
}
