//! Cooperative cancellation for the sampling loop.
//!
//! The loop owns the channel and checks the token at defined points
//! (before each sample); nothing is interrupted asynchronously. On
//! unix the token can be wired to SIGINT/SIGTERM so Ctrl+C ends the
//! run after the in-flight sample instead of killing the process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag, checked between samples.
///
/// Cloning is cheap; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    ///
    /// A single atomic store, so it is safe to call from a signal
    /// handler.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(unix)]
mod signals {
    use std::sync::OnceLock;

    use super::CancelToken;

    static SIGNAL_TOKEN: OnceLock<CancelToken> = OnceLock::new();

    extern "C" fn handle_signal(_sig: libc::c_int) {
        if let Some(token) = SIGNAL_TOKEN.get() {
            token.cancel();
        }
    }

    /// Route SIGINT and SIGTERM to `token`.
    ///
    /// Only the first installed token is wired; later calls are
    /// ignored. The handler does nothing but an atomic store.
    pub fn install_signal_handlers(token: &CancelToken) {
        let _ = SIGNAL_TOKEN.set(token.clone());
        unsafe {
            libc::signal(libc::SIGINT, handle_signal as libc::sighandler_t);
            libc::signal(libc::SIGTERM, handle_signal as libc::sighandler_t);
        }
    }
}

#[cfg(unix)]
pub use signals::install_signal_handlers;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_clear() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_is_shared_across_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
