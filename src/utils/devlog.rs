//! Developer logging routed to the `nexuslite_paginate::dev` target, plus a thread-local capture
//! buffer so tests can assert on pipeline dumps and bench lines without a global logger.

use std::cell::RefCell;

/// Log target used by `devlog!`.
pub const DEV_TARGET: &str = "nexuslite_paginate::dev";

thread_local! {
    static CAPTURE: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Keeps capture enabled on the current thread until dropped.
pub struct CaptureGuard {
    _private: (),
}

impl CaptureGuard {
    /// Lines captured so far, without clearing them.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        CAPTURE.with(|c| c.borrow().as_ref().cloned().unwrap_or_default())
    }

    /// Take the captured lines, leaving the buffer empty but enabled.
    pub fn take(&self) -> Vec<String> {
        CAPTURE.with(|c| c.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        CAPTURE.with(|c| *c.borrow_mut() = None);
    }
}

/// Start capturing `devlog!` output on this thread.
#[must_use]
pub fn capture() -> CaptureGuard {
    CAPTURE.with(|c| *c.borrow_mut() = Some(Vec::new()));
    CaptureGuard { _private: () }
}

#[doc(hidden)]
pub fn record(line: &str) {
    CAPTURE.with(|c| {
        if let Some(buf) = c.borrow_mut().as_mut() {
            buf.push(line.to_owned());
        }
    });
}

/// Emit a developer line: captured when a [`capture`] guard is live, and logged at TRACE.
#[macro_export]
macro_rules! devlog {
    ($($arg:tt)*) => {{
        let __line = format!($($arg)*);
        $crate::utils::devlog::record(&__line);
        log::log!(target: $crate::utils::devlog::DEV_TARGET, log::Level::Trace, "{}", __line);
    }};
}
