//! Monotonic high-resolution clock.
//!
//! One interface, one implementation per platform:
//! - unix: `clock_gettime` with `CLOCK_MONOTONIC_RAW` on Linux/macOS
//!   (immune to NTP slewing as well as stepping), `CLOCK_MONOTONIC`
//!   elsewhere
//! - other platforms: `std::time::Instant`
//!
//! Timestamps are opaque; only `elapsed_secs` gives them meaning, and
//! only for a pair taken within the same process run. The raw reading
//! is kept in whatever unit the platform reports; no tick rate is
//! assumed.

/// Opaque monotonic timestamp.
///
/// Comparison is only meaningful against other timestamps from the
/// same process run.
#[cfg(unix)]
#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    sec: i64,
    nsec: i64,
}

/// Opaque monotonic timestamp.
///
/// Comparison is only meaningful against other timestamps from the
/// same process run.
#[cfg(not(unix))]
#[derive(Debug, Clone, Copy)]
pub struct Timestamp(std::time::Instant);

#[cfg(unix)]
fn clock_id() -> libc::clockid_t {
    #[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
    {
        libc::CLOCK_MONOTONIC_RAW
    }
    #[cfg(not(any(target_os = "linux", target_os = "android", target_os = "macos")))]
    {
        libc::CLOCK_MONOTONIC
    }
}

/// Read the monotonic clock.
///
/// Never blocks and never fails: `clock_gettime` cannot fail for the
/// monotonic clock ids used here.
#[cfg(unix)]
pub fn now() -> Timestamp {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    unsafe {
        libc::clock_gettime(clock_id(), &mut ts);
    }
    Timestamp {
        sec: ts.tv_sec as i64,
        nsec: ts.tv_nsec as i64,
    }
}

/// Read the monotonic clock.
///
/// Never blocks and never fails.
#[cfg(not(unix))]
pub fn now() -> Timestamp {
    Timestamp(std::time::Instant::now())
}

/// Elapsed time from `start` to `end` in seconds.
///
/// When the later reading carries a smaller nanosecond field, one
/// second is borrowed instead of letting the difference go negative.
#[cfg(unix)]
pub fn elapsed_secs(end: Timestamp, start: Timestamp) -> f64 {
    let mut sec = end.sec - start.sec;
    let mut nsec = end.nsec - start.nsec;
    if nsec < 0 {
        sec -= 1;
        nsec += 1_000_000_000;
    }
    sec as f64 + 1e-9 * nsec as f64
}

/// Elapsed time from `start` to `end` in seconds.
///
/// Saturates at zero if the pair is passed reversed.
#[cfg(not(unix))]
pub fn elapsed_secs(end: Timestamp, start: Timestamp) -> f64 {
    end.0.saturating_duration_since(start.0).as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_is_nonnegative() {
        let a = now();
        let b = now();
        assert!(elapsed_secs(b, a) >= 0.0);
    }

    #[test]
    fn test_elapsed_tracks_sleep() {
        let start = now();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let end = now();
        let secs = elapsed_secs(end, start);
        // Generous upper bound: schedulers overshoot, never undershoot.
        assert!(secs >= 0.010, "elapsed {} below sleep duration", secs);
        assert!(secs < 1.0, "elapsed {} implausibly large", secs);
    }

    #[test]
    fn test_resolution_is_subsecond() {
        // Two adjacent readings must not be a whole second apart.
        let a = now();
        let b = now();
        assert!(elapsed_secs(b, a) < 1.0);
    }

    #[cfg(unix)]
    #[test]
    fn test_nanosecond_borrow() {
        let start = Timestamp {
            sec: 10,
            nsec: 900_000_000,
        };
        let end = Timestamp {
            sec: 11,
            nsec: 100_000_000,
        };
        let secs = elapsed_secs(end, start);
        assert!((secs - 0.2).abs() < 1e-12, "borrowed elapsed {}", secs);
    }
}
