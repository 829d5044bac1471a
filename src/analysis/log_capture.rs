//! Per-thread log capture for asserting on debug traces in tests.

use log::{LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::sync::Once;

thread_local! {
    static LINES: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

struct Capture;

impl Log for Capture {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        LINES.with(|lines| lines.borrow_mut().push(record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: Capture = Capture;
static INSTALL: Once = Once::new();

/// Install the capturing logger and clear this thread's lines.
///
/// Only lines logged on the calling thread are seen, so async tests must use
/// the current-thread runtime.
pub fn start() {
    INSTALL.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
    });
    LINES.with(|lines| lines.borrow_mut().clear());
}

pub fn lines() -> Vec<String> {
    LINES.with(|lines| lines.borrow().clone())
}

pub fn contains(line: &str) -> bool {
    LINES.with(|lines| lines.borrow().iter().any(|l| l == line))
}
