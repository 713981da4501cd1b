//! Result tally for a single run.

use serde::Serialize;
use smokeprobe_proto::TestResult;
use std::io::{self, Write};

const RULE: &str = "============================================================";

/// Running pass/fail counts plus every result in execution order.
///
/// Fields are private so the counts always agree with `tests`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultTally {
    passed: usize,
    failed: usize,
    tests: Vec<TestResult>,
}

impl ResultTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result and bumps the matching counter.
    pub fn record(&mut self, result: TestResult) {
        if result.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.tests.push(result);
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn tests(&self) -> &[TestResult] {
        &self.tests
    }

    /// Failed results in execution order.
    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.tests.iter().filter(|t| !t.passed)
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// 0 when nothing failed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        i32::from(self.failed > 0)
    }

    /// Writes the end-of-run summary and returns the exit code.
    pub fn summarize<W: Write>(&self, mut out: W) -> io::Result<i32> {
        writeln!(out)?;
        writeln!(out, "{RULE}")?;
        writeln!(out, "TEST RESULTS SUMMARY")?;
        writeln!(out, "{RULE}")?;
        writeln!(out, "Total Tests: {}", self.total())?;
        writeln!(out, "Passed: {}", self.passed)?;
        writeln!(out, "Failed: {}", self.failed)?;
        writeln!(out)?;

        if self.all_passed() {
            writeln!(out, "✓ ALL TESTS PASSED")?;
            writeln!(out)?;
            writeln!(out, "System Status: OPERATIONAL")?;
        } else {
            writeln!(out, "FAILED TESTS:")?;
            for test in self.failures() {
                writeln!(out, "  - {}: {}", test.name, test.message)?;
            }
        }

        Ok(self.exit_code())
    }
}
