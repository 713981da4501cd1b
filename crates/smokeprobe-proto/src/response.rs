use serde::{Deserialize, Serialize};

/// What came back from the remote service.
///
/// The body is kept as text; checks decide whether and how to decode it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: String,
}

impl ProbeResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON.
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success_range() {
        assert!(ProbeResponse::new(200, "").is_success());
        assert!(ProbeResponse::new(204, "").is_success());
        assert!(!ProbeResponse::new(301, "").is_success());
        assert!(!ProbeResponse::new(500, "").is_success());
    }

    #[test]
    fn test_json_decode_error_is_reported() {
        let resp = ProbeResponse::new(200, "<html>");
        assert!(resp.json().is_err());
    }
}
