//! Sequential probe runner.
//!
//! Probes run one at a time in declaration order. Nothing a probe does can stop
//! the probes after it; every probe contributes exactly one result to the tally.

use crate::handler::ResultHandler;
use crate::probe::{Probe, Suite, run_probe};
use crate::tally::ResultTally;
use smokeprobe_proto::{TestResult, Transport};
use tracing::info;

/// Runs suites of probes through a transport.
pub struct SmokeRunner<T: Transport> {
    transport: T,
}

impl<T: Transport> SmokeRunner<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends one probe; transport failures become failed results.
    pub async fn run_probe(&self, probe: &Probe) -> TestResult {
        run_probe(&self.transport, probe).await
    }

    /// Runs every suite in order and returns the tally.
    pub async fn run(
        &self,
        title: &str,
        suites: &[Suite],
        handler: &mut dyn ResultHandler,
    ) -> ResultTally {
        let mut tally = ResultTally::new();
        handler.on_run_start(title);

        for (i, suite) in suites.iter().enumerate() {
            handler.on_suite_start(i + 1, suite);
            for probe in &suite.probes {
                let result = self.run_probe(probe).await;
                handler.on_result(&result);
                tally.record(result);
            }
        }

        info!(
            total = tally.total(),
            passed = tally.passed(),
            failed = tally.failed(),
            "Run complete"
        );
        tally
    }
}
