use std::fs;
use std::path::Path;
use std::time::SystemTime;

use filetime::FileTime;
use log::warn;

use crate::record::FileTimestamps;

use super::timestamp_store::{AccessError, TimestampStore, WriteError, WriteOutcome};

/// Stat-based timestamp access. Available on every target; creation time is
/// out of reach on this path.
pub struct BasicStore;

impl TimestampStore for BasicStore {
    fn read(&self, path: &Path) -> Result<FileTimestamps, AccessError> {
        let metadata = fs::metadata(path)?;

        Ok(FileTimestamps {
            created: None,
            modified: metadata.modified()?,
            accessed: metadata.accessed()?,
            changed: changed_time(&metadata),
        })
    }

    fn write(&self, path: &Path, times: &FileTimestamps) -> Result<WriteOutcome, WriteError> {
        if times.created.is_some() {
            warn!("cannot set creation time without the handle API; leaving it unchanged");
        }

        filetime::set_file_times(
            path,
            FileTime::from_system_time(times.accessed),
            FileTime::from_system_time(times.modified),
        )?;

        if cfg!(windows) {
            // the platform records a creation time that this path cannot touch
            Ok(WriteOutcome::CreationUnchanged)
        } else {
            Ok(WriteOutcome::Complete)
        }
    }
}

/// The metadata-change time, on platforms that record one. Updating any
/// timestamp bumps it to "now"; that is a property of the platform, not of
/// this store.
#[cfg(unix)]
fn changed_time(metadata: &fs::Metadata) -> Option<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    use std::time::{Duration, UNIX_EPOCH};

    let seconds = metadata.ctime();
    let nanos = Duration::from_nanos(metadata.ctime_nsec() as u64);

    let time = if seconds >= 0 {
        UNIX_EPOCH + Duration::from_secs(seconds as u64) + nanos
    } else {
        UNIX_EPOCH - Duration::from_secs(seconds.unsigned_abs()) + nanos
    };

    Some(time)
}

#[cfg(not(unix))]
fn changed_time(_metadata: &fs::Metadata) -> Option<SystemTime> {
    None
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Duration, UNIX_EPOCH};

    use tempfile::TempDir;

    use crate::shift::Shift;

    use super::*;

    fn scratch_file(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("target.txt");
        fs::write(&path, b"contents").unwrap();
        path
    }

    /// Stat-based fields are only guaranteed to whole-second resolution.
    fn assert_within_a_second(actual: SystemTime, expected: SystemTime) {
        let difference = match actual.duration_since(expected) {
            Ok(ahead) => ahead,
            Err(err) => err.duration(),
        };

        assert!(
            difference < Duration::from_secs(1),
            "{actual:?} differs from {expected:?} by {difference:?}"
        );
    }

    #[test]
    fn test_read_populates_required_fields() {
        let dir = TempDir::new().unwrap();
        let path = scratch_file(&dir);

        let times = BasicStore.read(&path).unwrap();

        assert!(times.created.is_none());
        assert!(times.modified > UNIX_EPOCH);
        assert!(times.accessed > UNIX_EPOCH);
        assert_eq!(times.changed.is_some(), cfg!(unix));
    }

    #[test]
    fn test_shift_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = scratch_file(&dir);

        let shift = Shift {
            days: 1,
            hours: 2,
            ..Shift::default()
        };
        let delta = shift.to_duration().unwrap();

        let original = BasicStore.read(&path).unwrap();
        let target = shift.apply(&original).unwrap();
        BasicStore.write(&path, &target).unwrap();

        let reread = BasicStore.read(&path).unwrap();
        assert_within_a_second(reread.modified, original.modified - delta);
        assert_within_a_second(reread.accessed, original.accessed - delta);
    }

    #[test]
    fn test_zero_shift_preserves_times() {
        let dir = TempDir::new().unwrap();
        let path = scratch_file(&dir);

        let original = BasicStore.read(&path).unwrap();
        let target = Shift::default().apply(&original).unwrap();
        BasicStore.write(&path, &target).unwrap();

        let reread = BasicStore.read(&path).unwrap();
        assert_within_a_second(reread.modified, original.modified);
        assert_within_a_second(reread.accessed, original.accessed);
    }

    #[test]
    fn test_large_shift_lands_exactly() {
        let dir = TempDir::new().unwrap();
        let path = scratch_file(&dir);

        let start = UNIX_EPOCH + Duration::from_secs(1_577_836_800); // 2020-01-01T00:00:00Z
        let pinned = FileTimestamps {
            created: None,
            modified: start,
            accessed: start,
            changed: None,
        };
        BasicStore.write(&path, &pinned).unwrap();

        let shift = Shift {
            days: 10_000,
            ..Shift::default()
        };
        let original = BasicStore.read(&path).unwrap();
        let target = shift.apply(&original).unwrap();
        BasicStore.write(&path, &target).unwrap();

        let reread = BasicStore.read(&path).unwrap();
        let expected = UNIX_EPOCH + Duration::from_secs(1_577_836_800 - 10_000 * 24 * 60 * 60);
        assert_within_a_second(reread.modified, expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_shift_past_the_unix_epoch() {
        let dir = TempDir::new().unwrap();
        let path = scratch_file(&dir);

        let start = UNIX_EPOCH + Duration::from_secs(24 * 60 * 60);
        let pinned = FileTimestamps {
            created: None,
            modified: start,
            accessed: start,
            changed: None,
        };
        BasicStore.write(&path, &pinned).unwrap();

        let shift = Shift {
            days: 10,
            ..Shift::default()
        };
        let target = shift.apply(&BasicStore.read(&path).unwrap()).unwrap();
        BasicStore.write(&path, &target).unwrap();

        let reread = BasicStore.read(&path).unwrap();
        let expected = UNIX_EPOCH - Duration::from_secs(9 * 24 * 60 * 60);
        assert_within_a_second(reread.modified, expected);
    }

    #[test]
    fn test_write_without_creation_time_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let path = scratch_file(&dir);

        let mut times = BasicStore.read(&path).unwrap();
        times.created = None;

        let outcome = BasicStore.write(&path, &times).unwrap();
        if cfg!(windows) {
            assert_eq!(outcome, WriteOutcome::CreationUnchanged);
        } else {
            assert_eq!(outcome, WriteOutcome::Complete);
        }
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-file");

        let err = BasicStore.read(&path).unwrap_err();
        assert!(matches!(err, AccessError::NotFound));
    }

    #[test]
    fn test_write_after_file_is_removed() {
        let dir = TempDir::new().unwrap();
        let path = scratch_file(&dir);

        let times = BasicStore.read(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let err = BasicStore.write(&path, &times).unwrap_err();
        assert!(matches!(err, WriteError::NotFound));
    }
}
