use std::io;
use std::iter;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use std::ptr;

use log::warn;
use windows_sys::Win32::Foundation::{
    CloseHandle, FILETIME, GENERIC_READ, GENERIC_WRITE, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, GetFileTime, SetFileTime, FILE_ATTRIBUTE_NORMAL, OPEN_EXISTING,
};

use crate::record::FileTimestamps;
use crate::wintime;

use super::basic::BasicStore;
use super::timestamp_store::{AccessError, TimestampStore, WriteError, WriteOutcome};

/// Handle-based timestamp access via the native file time API. Sees and
/// sets all three native fields, creation time included.
pub struct FullStore;

impl FullStore {
    /// Confirms that a native handle to `path` can be opened at all. Run
    /// once per process by the capability probe; per-call failures after
    /// that surface as hard errors.
    pub fn probe(path: &Path) -> Result<Self, AccessError> {
        let _handle = FileHandle::open(path, GENERIC_READ)?;

        Ok(FullStore)
    }
}

impl TimestampStore for FullStore {
    fn read(&self, path: &Path) -> Result<FileTimestamps, AccessError> {
        let handle = FileHandle::open(path, GENERIC_READ)?;

        let mut created = filetime_of(0);
        let mut accessed = filetime_of(0);
        let mut modified = filetime_of(0);

        let succeeded =
            unsafe { GetFileTime(handle.raw(), &mut created, &mut accessed, &mut modified) };
        if succeeded == 0 {
            return Err(io::Error::last_os_error().into());
        }

        Ok(FileTimestamps {
            created: Some(wintime::to_system_time(ticks_of(created))),
            modified: wintime::to_system_time(ticks_of(modified)),
            accessed: wintime::to_system_time(ticks_of(accessed)),
            changed: None,
        })
    }

    fn write(&self, path: &Path, times: &FileTimestamps) -> Result<WriteOutcome, WriteError> {
        let Some(created) = times.created else {
            // mirrors what the accessor could read; only the stat-based
            // fields can be carried over
            warn!("record carries no creation time; leaving it unchanged");
            return BasicStore.write(path, times);
        };

        let handle = FileHandle::open(path, GENERIC_WRITE)?;

        let created = filetime_of(wintime::from_system_time(created));
        let accessed = filetime_of(wintime::from_system_time(times.accessed));
        let modified = filetime_of(wintime::from_system_time(times.modified));

        let succeeded = unsafe { SetFileTime(handle.raw(), &created, &accessed, &modified) };
        if succeeded == 0 {
            return Err(io::Error::last_os_error().into());
        }

        Ok(WriteOutcome::Complete)
    }
}

/// An open native handle, closed on every exit path.
struct FileHandle(HANDLE);

impl FileHandle {
    fn open(path: &Path, access: u32) -> io::Result<Self> {
        let wide: Vec<u16> = path.as_os_str().encode_wide().chain(iter::once(0)).collect();

        let handle = unsafe {
            CreateFileW(
                wide.as_ptr(),
                access,
                0,
                ptr::null(),
                OPEN_EXISTING,
                FILE_ATTRIBUTE_NORMAL,
                0,
            )
        };

        if handle == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error());
        }

        Ok(FileHandle(handle))
    }

    fn raw(&self) -> HANDLE {
        self.0
    }
}

impl Drop for FileHandle {
    fn drop(&mut self) {
        unsafe { CloseHandle(self.0) };
    }
}

fn ticks_of(filetime: FILETIME) -> u64 {
    (u64::from(filetime.dwHighDateTime) << 32) | u64::from(filetime.dwLowDateTime)
}

fn filetime_of(ticks: u64) -> FILETIME {
    FILETIME {
        dwLowDateTime: ticks as u32,
        dwHighDateTime: (ticks >> 32) as u32,
    }
}
