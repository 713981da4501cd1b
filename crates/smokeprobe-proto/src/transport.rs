//! The seam between probe execution and the network.

use crate::{ProbeRequest, ProbeResponse};
use async_trait::async_trait;
use std::time::Duration;

/// Failures raised before a response could be read.
///
/// The Display text is what ends up in a failed probe's message, so every
/// variant carries the underlying error's own text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request did not complete within its timeout.
    #[error("{0}")]
    Timeout(String),

    /// The connection could not be established.
    #[error("{0}")]
    Connect(String),

    /// Any other failure (invalid URL, TLS, body read).
    #[error("{0}")]
    Request(String),
}

impl TransportError {
    /// Returns true if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }
}

/// Sends probe requests.
///
/// Implementations must not retry; one call is one request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &ProbeRequest,
        timeout: Duration,
    ) -> Result<ProbeResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn send(
        &self,
        request: &ProbeRequest,
        timeout: Duration,
    ) -> Result<ProbeResponse, TransportError> {
        (**self).send(request, timeout).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(
        &self,
        request: &ProbeRequest,
        timeout: Duration,
    ) -> Result<ProbeResponse, TransportError> {
        (**self).send(request, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    #[async_trait]
    impl Transport for Fixed {
        async fn send(
            &self,
            _request: &ProbeRequest,
            _timeout: Duration,
        ) -> Result<ProbeResponse, TransportError> {
            Ok(ProbeResponse::new(204, ""))
        }
    }

    #[test]
    fn test_display_is_underlying_text() {
        let err = TransportError::Timeout("operation timed out".to_string());
        assert_eq!(err.to_string(), "operation timed out");
        assert!(err.is_timeout());
        assert!(!TransportError::Connect("refused".into()).is_timeout());
    }

    #[tokio::test]
    async fn test_boxed_transport_delegates() {
        let boxed: Box<dyn Transport> = Box::new(Fixed);
        let resp = boxed
            .send(&ProbeRequest::get("http://x"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(resp.status, 204);
    }
}
