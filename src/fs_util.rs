use chrono::{DateTime, Utc};
use filetime::FileTime;
use serde::Serialize;
use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

/// File timestamps at millisecond precision (Unix epoch based)
///
/// Birth time is optional because not every platform or filesystem reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timestamps {
    pub modified_ms: i64,
    pub accessed_ms: i64,
    pub created_ms: Option<i64>,
}

impl Timestamps {
    pub fn from_metadata(meta: &Metadata) -> std::io::Result<Self> {
        let modified_ms = to_millis(meta.modified()?);
        Ok(Self {
            modified_ms,
            accessed_ms: meta.accessed().map(to_millis).unwrap_or(modified_ms),
            created_ms: meta.created().ok().map(to_millis),
        })
    }

    /// Read current timestamps of `path`, following symlinks
    pub fn read(path: &Path) -> std::io::Result<Self> {
        Self::from_metadata(&std::fs::metadata(path)?)
    }
}

/// Truncate a system time to whole milliseconds since the epoch
pub fn to_millis(time: SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp_millis()
}

fn to_filetime(ms: i64) -> FileTime {
    let secs = ms.div_euclid(1000);
    let nanos = (ms.rem_euclid(1000) * 1_000_000) as u32;
    FileTime::from_unix_time(secs, nanos)
}

/// Apply `times` to `path`
///
/// Access and modification times are set everywhere. Birth time is set on
/// macOS and Windows; other platforms have no API for it and skip it.
pub fn apply_timestamps(path: &Path, times: &Timestamps) -> std::io::Result<()> {
    filetime::set_file_times(
        path,
        to_filetime(times.accessed_ms),
        to_filetime(times.modified_ms),
    )?;

    if let Some(created_ms) = times.created_ms {
        set_birth_time(path, created_ms)?;
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn set_birth_time(path: &Path, created_ms: i64) -> std::io::Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let path_c = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let mut attrs: libc::attrlist = unsafe { std::mem::zeroed() };
    attrs.bitmapcount = libc::ATTR_BIT_MAP_COUNT;
    attrs.commonattr = libc::ATTR_CMN_CRTIME;

    let mut spec = libc::timespec {
        tv_sec: created_ms.div_euclid(1000) as libc::time_t,
        tv_nsec: (created_ms.rem_euclid(1000) * 1_000_000) as libc::c_long,
    };

    let rc = unsafe {
        libc::setattrlist(
            path_c.as_ptr(),
            &mut attrs as *mut libc::attrlist as *mut libc::c_void,
            &mut spec as *mut libc::timespec as *mut libc::c_void,
            std::mem::size_of::<libc::timespec>(),
            0,
        )
    };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(windows)]
fn set_birth_time(path: &Path, created_ms: i64) -> std::io::Result<()> {
    use std::os::windows::io::AsRawHandle;
    use windows_sys::Win32::Foundation::{FILETIME, HANDLE};
    use windows_sys::Win32::Storage::FileSystem::SetFileTime;

    // 100ns intervals between 1601-01-01 and 1970-01-01
    const EPOCH_OFFSET: i64 = 116_444_736_000_000_000;

    let ticks = (created_ms * 10_000 + EPOCH_OFFSET) as u64;
    let created = FILETIME {
        dwLowDateTime: ticks as u32,
        dwHighDateTime: (ticks >> 32) as u32,
    };

    let file = std::fs::OpenOptions::new().write(true).open(path)?;
    let ok = unsafe {
        SetFileTime(
            file.as_raw_handle() as HANDLE,
            &created,
            std::ptr::null(),
            std::ptr::null(),
        )
    };
    if ok != 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(any(target_os = "macos", windows)))]
fn set_birth_time(_path: &Path, _created_ms: i64) -> std::io::Result<()> {
    // Linux and other Unix hosts expose birth time read-only (statx), if at all.
    Ok(())
}
