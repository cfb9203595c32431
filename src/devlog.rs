//! Rule-level trace output.
//!
//! [`crate::dev_trace!`] lines go to the `oplogcheck::dev` log target and, when a [`TraceCapture`]
//! is alive on the current thread, into that capture. Tests use the capture to see which rules ran
//! without installing a global logger.

use std::cell::RefCell;

pub const DEV_TARGET: &str = "oplogcheck::dev";

thread_local! {
    static CAPTURE: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Collects trace lines emitted on this thread until dropped.
#[must_use = "capture stops as soon as the guard is dropped"]
pub struct TraceCapture {
    _not_send: std::marker::PhantomData<*const ()>,
}

impl TraceCapture {
    pub fn start() -> Self {
        CAPTURE.with(|c| *c.borrow_mut() = Some(Vec::new()));
        Self { _not_send: std::marker::PhantomData }
    }

    /// Lines captured so far, leaving the capture empty.
    pub fn take(&self) -> Vec<String> {
        CAPTURE.with(|c| c.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
    }

    pub fn lines(&self) -> Vec<String> {
        CAPTURE.with(|c| c.borrow().clone().unwrap_or_default())
    }

    /// Rule names recorded by the checker, in evaluation order.
    pub fn rules_run(&self) -> Vec<String> {
        self.lines()
            .iter()
            .filter_map(|l| l.strip_prefix("rule "))
            .filter_map(|l| l.split_once(" -> ").map(|(name, _)| name.to_owned()))
            .collect()
    }
}

impl Drop for TraceCapture {
    fn drop(&mut self) {
        CAPTURE.with(|c| *c.borrow_mut() = None);
    }
}

#[doc(hidden)]
pub fn record(line: String) {
    log::trace!(target: DEV_TARGET, "{line}");
    CAPTURE.with(|c| {
        if let Some(buf) = c.borrow_mut().as_mut() {
            buf.push(line);
        }
    });
}

/// Emit a trace line on the dev target.
#[macro_export]
macro_rules! dev_trace {
    ($($arg:tt)*) => {
        $crate::devlog::record(format!($($arg)*))
    };
}
