//! Result handler trait and implementations for reporting progress.
//!
//! The `ResultHandler` trait abstracts over how probe results are displayed
//! while a run is in progress, allowing console or silent output.

use crate::probe::Suite;
use smokeprobe_proto::TestResult;
use std::io::{self, Write};

/// ANSI color codes for terminal output.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
    pub const RED: &str = "\x1b[31m";
}

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

/// Receives run progress from the runner.
pub trait ResultHandler: Send {
    /// Called once before the first suite.
    fn on_run_start(&mut self, title: &str);

    /// Called before the probes of a suite run. `index` starts at 1.
    fn on_suite_start(&mut self, index: usize, suite: &Suite);

    /// Called after each probe completes.
    fn on_result(&mut self, result: &TestResult);
}

/// Writes progress lines to stdout (or any writer).
///
/// Output per probe is a `✓ PASS: <name>` / `✗ FAIL: <name>` line followed by
/// the message indented underneath.
pub struct ConsoleResultHandler<W: Write + Send = io::Stdout> {
    out: W,
    use_colors: bool,
    suites_seen: usize,
}

impl ConsoleResultHandler<io::Stdout> {
    /// Creates a handler writing to stdout.
    pub fn new(use_colors: bool) -> Self {
        Self::with_writer(io::stdout(), use_colors)
    }
}

impl<W: Write + Send> ConsoleResultHandler<W> {
    pub fn with_writer(out: W, use_colors: bool) -> Self {
        Self {
            out,
            use_colors,
            suites_seen: 0,
        }
    }

    /// Consumes the handler and returns its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, code: &'static str) -> &'static str {
        if self.use_colors { code } else { "" }
    }
}

impl<W: Write + Send> ResultHandler for ConsoleResultHandler<W> {
    fn on_run_start(&mut self, title: &str) {
        let (bold, reset) = (self.paint(colors::BOLD), self.paint(colors::RESET));
        let _ = writeln!(self.out, "{RULE}");
        let _ = writeln!(self.out, "{bold}{title}{reset}");
        let _ = writeln!(self.out, "{RULE}");
        let _ = writeln!(self.out);
    }

    fn on_suite_start(&mut self, index: usize, suite: &Suite) {
        if self.suites_seen > 0 {
            let _ = writeln!(self.out);
        }
        self.suites_seen += 1;
        let (bold, reset) = (self.paint(colors::BOLD), self.paint(colors::RESET));
        let _ = writeln!(self.out, "{bold}TEST SUITE {index}: {}{reset}", suite.name);
        let _ = writeln!(self.out, "{THIN_RULE}");
    }

    fn on_result(&mut self, result: &TestResult) {
        let color = if result.passed {
            self.paint(colors::GREEN)
        } else {
            self.paint(colors::RED)
        };
        let (dim, reset) = (self.paint(colors::DIM), self.paint(colors::RESET));
        let _ = writeln!(
            self.out,
            "{color}{}{reset}: {}",
            result.status_label(),
            result.name
        );
        if !result.message.is_empty() {
            let _ = writeln!(self.out, "        {dim}{}{reset}", result.message);
        }
    }
}

/// Suppresses all progress output (for JSON mode).
pub struct QuietResultHandler;

impl ResultHandler for QuietResultHandler {
    fn on_run_start(&mut self, _: &str) {}
    fn on_suite_start(&mut self, _: usize, _: &Suite) {}
    fn on_result(&mut self, _: &TestResult) {}
}
