//! Testing utilities for deterministic runs without a network.

pub mod mock_transport;

pub use mock_transport::MockTransport;
