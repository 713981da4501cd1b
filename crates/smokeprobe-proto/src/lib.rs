//! # smokeprobe-proto
//!
//! Shared types, error definitions, and traits for the Smokeprobe harness.
//!
//! This crate provides the foundational abstractions used across all Smokeprobe crates,
//! including:
//! - HTTP method, request and response values exchanged with a transport
//! - The `Transport` trait that the runner sends probes through
//! - Test results produced for every probe
//! - Transport error types

mod method;
mod request;
mod response;
mod result;
mod transport;

pub use method::HttpMethod;
pub use request::ProbeRequest;
pub use response::ProbeResponse;
pub use result::TestResult;
pub use transport::{Transport, TransportError};
