//! Single-probe execution.

use crate::check::Check;
use smokeprobe_proto::{ProbeRequest, TestResult, Transport};
use std::time::{Duration, Instant};
use tracing::debug;

/// A resolved probe: one request plus its check.
#[derive(Debug, Clone)]
pub struct Probe {
    pub name: String,
    pub request: ProbeRequest,
    pub check: Check,
    pub timeout: Duration,
}

impl Probe {
    /// Creates a probe with the default status check and a 10 second timeout.
    pub fn new(name: impl Into<String>, request: ProbeRequest) -> Self {
        Self {
            name: name.into(),
            request,
            check: Check::default(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_check(mut self, check: Check) -> Self {
        self.check = check;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A named, ordered group of probes.
#[derive(Debug, Clone)]
pub struct Suite {
    pub name: String,
    pub probes: Vec<Probe>,
}

impl Suite {
    pub fn new(name: impl Into<String>, probes: Vec<Probe>) -> Self {
        Self {
            name: name.into(),
            probes,
        }
    }
}

/// Sends one probe and classifies the outcome.
///
/// Transport failures never escape: they become a failed result carrying the
/// error text. An error with empty text is reported by its kind instead, so a
/// failed result always has a message.
pub async fn run_probe<T: Transport + ?Sized>(transport: &T, probe: &Probe) -> TestResult {
    debug!(
        probe = %probe.name,
        method = %probe.request.method,
        url = %probe.request.url,
        timeout_ms = probe.timeout.as_millis() as u64,
        "Sending probe"
    );

    let started = Instant::now();
    let result = match transport.send(&probe.request, probe.timeout).await {
        Ok(response) => {
            let outcome = probe.check.evaluate(&response);
            debug!(
                probe = %probe.name,
                status = response.status,
                passed = outcome.passed,
                "Probe response checked"
            );
            TestResult {
                name: probe.name.clone(),
                passed: outcome.passed,
                message: outcome.message,
            }
        }
        Err(err) => {
            debug!(probe = %probe.name, error = %err, "Probe transport failed");
            let mut message = err.to_string();
            if message.is_empty() {
                message = if err.is_timeout() {
                    "request timed out".to_string()
                } else {
                    "request failed".to_string()
                };
            }
            TestResult::fail(&probe.name, message)
        }
    };

    debug!(
        probe = %probe.name,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Probe finished"
    );
    result
}
