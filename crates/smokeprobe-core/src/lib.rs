//! # smokeprobe-core
//!
//! Core smoke-test functionality for Smokeprobe.
//!
//! This crate provides:
//! - Plan loading from YAML, with `${VAR}` interpolation
//! - Response checks (status, body substrings, JSON shape)
//! - The sequential probe runner and its result tally
//! - Result handlers for console and quiet output
//! - Request builders for the hosted platform's REST, function and management APIs
//! - Testing utilities (`MockTransport`) for deterministic runs without a network

mod check;
mod config;
mod handler;
mod platform;
mod probe;
mod report;
mod runner;
mod secrets;
mod tally;
pub mod testing;
mod variables;

pub use check::{Check, CheckOutcome, CountField, Needle};
pub use config::{
    ConfigError, ConfigWarning, Defaults, ManagementConfig, Plan, PlatformConfig, ProbeConfig,
    RequestSpec, SuiteConfig,
};
pub use handler::{ConsoleResultHandler, QuietResultHandler, ResultHandler};
pub use platform::{Management, Platform};
pub use probe::{Probe, Suite, run_probe};
pub use report::RunReport;
pub use runner::SmokeRunner;
pub use secrets::{SecretError, SecretOutcome, set_project_secret};
pub use tally::ResultTally;
pub use variables::Variables;

pub use smokeprobe_proto::{
    HttpMethod, ProbeRequest, ProbeResponse, TestResult, Transport, TransportError,
};
