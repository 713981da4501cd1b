//! Project secret management.

use crate::platform::Management;
use smokeprobe_proto::{Transport, TransportError};
use std::time::Duration;
use tracing::{debug, warn};

/// What the management API answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretOutcome {
    pub status: u16,
    pub body: String,
}

impl SecretOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("Secret name must not be empty")]
    EmptyName,

    #[error("Secret request failed: {0}")]
    Transport(#[from] TransportError),
}

/// Sets one secret on the project behind `management`.
///
/// The request is sent once. A non-2xx answer is returned, not raised, so the
/// caller can show the body the API sent back.
pub async fn set_project_secret<T: Transport + ?Sized>(
    transport: &T,
    management: &Management,
    name: &str,
    value: &str,
    timeout: Duration,
) -> Result<SecretOutcome, SecretError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SecretError::EmptyName);
    }

    let request = management.secret_request(name, value);
    debug!(
        project = %management.project_ref,
        secret = %name,
        url = %request.url,
        "Setting project secret"
    );

    let response = transport.send(&request, timeout).await?;
    let outcome = SecretOutcome {
        status: response.status,
        body: response.body,
    };
    if !outcome.is_success() {
        warn!(status = outcome.status, secret = %name, "Management API rejected secret");
    }
    Ok(outcome)
}
