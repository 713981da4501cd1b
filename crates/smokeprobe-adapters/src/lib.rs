//! # smokeprobe-adapters
//!
//! Transport implementations for the Smokeprobe harness.
//!
//! `ReqwestTransport` is the production transport: one `reqwest::Client`
//! shared by every probe in a run, a per-request timeout, and errors mapped
//! onto `TransportError` so the runner can record them.

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;
