//! Platform helpers: realtime scheduling and system identification.
//!
//! Everything here is best-effort decoration around the measurement
//! core; raw libc types never leave this module.

use std::ffi::CStr;
#[cfg(any(target_os = "linux", target_os = "android"))]
use std::io;
use std::mem;

/// Highest priority accepted for `SCHED_FIFO`.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn max_fifo_priority() -> i32 {
    unsafe { libc::sched_get_priority_max(libc::SCHED_FIFO) }
}

/// Lowest priority accepted for `SCHED_FIFO`.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn min_fifo_priority() -> i32 {
    unsafe { libc::sched_get_priority_min(libc::SCHED_FIFO) }
}

/// Switch the calling process to `SCHED_FIFO` at `priority`.
///
/// Needs `CAP_SYS_NICE` (or root); pacing jitter drops noticeably on a
/// loaded host when this succeeds.
///
/// # Errors
///
/// Returns the OS error when the scheduler change is refused.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn set_realtime_priority(priority: i32) -> io::Result<()> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    if unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// `uname`-style one-line system description for the startup banner.
///
/// `None` if the platform refuses to identify itself.
pub fn system_description() -> Option<String> {
    let mut info: libc::utsname = unsafe { mem::zeroed() };
    if unsafe { libc::uname(&mut info) } != 0 {
        return None;
    }

    fn field(raw: &[libc::c_char]) -> String {
        unsafe { CStr::from_ptr(raw.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }

    Some(format!(
        "{} release {} (version {}) on {}",
        field(&info.sysname),
        field(&info.release),
        field(&info.version),
        field(&info.machine),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_description_is_nonempty() {
        let desc = system_description().expect("uname should succeed");
        assert!(!desc.is_empty());
        assert!(desc.contains("release"));
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    #[test]
    fn test_fifo_priority_range_is_sane() {
        assert!(min_fifo_priority() <= max_fifo_priority());
    }
}
