//! Verbosity-gated game logging with optional in-memory capture.
//!
//! The logger either prints to stdout, captures into a buffer (so tests
//! can assert on the transcript), or both. Calls below the configured
//! verbosity return immediately.

use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::ops::Deref;

/// Verbose-level logging whose `format!` cost compiles away when the
/// `verbose-logging` feature is off (hot paths in batch runs).
#[macro_export]
macro_rules! log_if_verbose {
    ($logger:expr, $($arg:tt)*) => {{
        #[cfg(feature = "verbose-logging")]
        {
            $logger.verbose(&format!($($arg)*));
        }
    }};
}

/// How much the game narrates. Ordered so `>=` comparisons gate output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// No output at all. Batch mode.
    Silent,
    /// Game results only.
    Minimal,
    /// Turn headers and actions.
    Normal,
    /// Every trigger and event.
    Verbose,
}

impl Default for VerbosityLevel {
    fn default() -> Self {
        VerbosityLevel::Normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Stdout,
    Memory,
    Both,
}

#[derive(Debug, Clone)]
pub struct GameLogger {
    verbosity: VerbosityLevel,
    output: OutputMode,
    buffer: RefCell<Vec<String>>,
}

impl GameLogger {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            output: OutputMode::Stdout,
            buffer: RefCell::new(Vec::new()),
        }
    }

    /// A logger that produces nothing. For batch runs.
    pub fn silent() -> Self {
        GameLogger::new(VerbosityLevel::Silent)
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn minimal(&self, msg: &str) {
        self.log(VerbosityLevel::Minimal, msg);
    }

    pub fn normal(&self, msg: &str) {
        self.log(VerbosityLevel::Normal, msg);
    }

    pub fn verbose(&self, msg: &str) {
        self.log(VerbosityLevel::Verbose, msg);
    }

    fn log(&self, level: VerbosityLevel, msg: &str) {
        if self.verbosity < level {
            return;
        }
        match self.output {
            OutputMode::Stdout => println!("{}", msg),
            OutputMode::Memory => self.buffer.borrow_mut().push(msg.to_string()),
            OutputMode::Both => {
                println!("{}", msg);
                self.buffer.borrow_mut().push(msg.to_string());
            }
        }
    }

    /// Borrow the captured transcript.
    pub fn entries(&self) -> LogGuard<'_> {
        LogGuard(self.buffer.borrow())
    }

    pub fn clear(&self) {
        self.buffer.borrow_mut().clear();
    }
}

impl Default for GameLogger {
    fn default() -> Self {
        GameLogger::new(VerbosityLevel::Normal)
    }
}

/// Read guard over the captured log lines.
pub struct LogGuard<'a>(Ref<'a, Vec<String>>);

impl Deref for LogGuard<'_> {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
