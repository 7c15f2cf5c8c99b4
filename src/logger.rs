//! The diagnostics sink the bulk loops report to.
//!
//! A [`Logger`] wraps a `tracing` [`Dispatch`]. Events emitted through it go
//! to that dispatcher only, whatever the process-wide subscriber is, so an
//! embedding application can route bulk-operation warnings and errors
//! separately. The default logger discards everything.

use std::fmt;
use tracing::{Dispatch, Subscriber};

/// A `tracing` dispatcher handed to the client explicitly.
///
/// # Examples
///
/// ```
/// use storyblok_mapi::Logger;
///
/// let silent = Logger::default();
/// assert!(!silent.is_enabled());
///
/// let logger = Logger::from_subscriber(tracing_subscriber::fmt().finish());
/// logger.scope(|| tracing::warn!(page = 2, "rate limited, retrying"));
/// ```
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
    enabled: bool,
}

impl Logger {
    /// A logger that discards every event.
    pub fn none() -> Self {
        Self {
            dispatch: Dispatch::none(),
            enabled: false,
        }
    }

    pub fn new(dispatch: Dispatch) -> Self {
        Self {
            dispatch,
            enabled: true,
        }
    }

    pub fn from_subscriber<S>(subscriber: S) -> Self
    where
        S: Subscriber + Send + Sync + 'static,
    {
        Self::new(Dispatch::new(subscriber))
    }

    /// A logger that forwards to the dispatcher active on the calling thread.
    pub fn current() -> Self {
        tracing::dispatcher::get_default(|dispatch| Self::new(dispatch.clone()))
    }

    /// Returns `false` for the no-op logger.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Runs `f` with this logger as the active dispatcher.
    pub fn scope<R>(&self, f: impl FnOnce() -> R) -> R {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("enabled", &self.enabled)
            .finish()
    }
}
