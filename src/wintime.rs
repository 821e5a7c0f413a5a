use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Seconds between the FILETIME epoch (1601-01-01) and the Unix epoch.
const EPOCH_GAP_SECONDS: u64 = 11_644_473_600;

/// The Unix epoch expressed in microseconds since 1601-01-01.
const EPOCH_GAP_MICROS: u64 = EPOCH_GAP_SECONDS * 1_000_000;

/// Decodes a FILETIME tick count (100-nanosecond intervals since
/// 1601-01-01) into a [`SystemTime`].
///
/// The tick count is truncated to whole microseconds (`ticks / 10`) before
/// the epoch offset is applied; sub-microsecond ticks are discarded.
pub fn to_system_time(ticks: u64) -> SystemTime {
    let micros = ticks / 10;

    if micros >= EPOCH_GAP_MICROS {
        UNIX_EPOCH + Duration::from_micros(micros - EPOCH_GAP_MICROS)
    } else {
        UNIX_EPOCH - Duration::from_micros(EPOCH_GAP_MICROS - micros)
    }
}

/// Encodes a [`SystemTime`] as a FILETIME tick count, truncated to whole
/// microseconds. Times before 1601-01-01 saturate to tick zero.
pub fn from_system_time(time: SystemTime) -> u64 {
    let micros = match time.duration_since(UNIX_EPOCH) {
        Ok(after_epoch) => EPOCH_GAP_MICROS.saturating_add(after_epoch.as_micros() as u64),
        Err(err) => EPOCH_GAP_MICROS.saturating_sub(err.duration().as_micros() as u64),
    };

    micros.saturating_mul(10)
}
