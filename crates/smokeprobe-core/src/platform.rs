//! Request builders for the hosted backend platform.
//!
//! The platform exposes three surfaces that probes touch:
//! - REST table reads under `/rest/v1/<table>`, authorized by the anon key
//!   sent both as `apikey` and as a bearer token
//! - Edge function invocations under `/functions/v1/<name>`
//! - The management API's project secrets endpoint

use serde_json::Value;
use smokeprobe_proto::ProbeRequest;

/// A resolved project endpoint plus its public (anon) key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub url: String,
    pub anon_key: String,
}

impl Platform {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
        }
    }

    fn base(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// `GET /rest/v1/<table>?select=<select>&limit=<limit>`.
    pub fn table_read(&self, table: &str, select: &str, limit: Option<u32>) -> ProbeRequest {
        let mut request = self
            .authorize(ProbeRequest::get(format!("{}/rest/v1/{table}", self.base())))
            .with_query("select", select);
        if let Some(limit) = limit {
            request = request.with_query("limit", limit.to_string());
        }
        request
    }

    /// `POST /functions/v1/<name>` with a JSON body.
    ///
    /// Functions deployed without JWT verification accept unauthenticated calls,
    /// so the anon key is only attached when `authorize` is set.
    pub fn function_invoke(&self, name: &str, body: Value, authorize: bool) -> ProbeRequest {
        let request = ProbeRequest::post(format!("{}/functions/v1/{name}", self.base()))
            .with_header("Content-Type", "application/json")
            .with_json(body);
        if authorize {
            self.authorize(request)
        } else {
            request
        }
    }

    fn authorize(&self, request: ProbeRequest) -> ProbeRequest {
        request
            .with_header("apikey", &self.anon_key)
            .with_header("Authorization", format!("Bearer {}", self.anon_key))
    }
}

/// Management API coordinates for one project.
#[derive(Clone, PartialEq, Eq)]
pub struct Management {
    pub api_url: String,
    pub project_ref: String,
    pub access_token: String,
}

impl Management {
    /// `POST /v1/projects/<ref>/secrets` with `{name, value}`.
    pub fn secret_request(&self, name: &str, value: &str) -> ProbeRequest {
        let url = format!(
            "{}/v1/projects/{}/secrets",
            self.api_url.trim_end_matches('/'),
            self.project_ref
        );
        ProbeRequest::post(url)
            .with_header("Authorization", format!("Bearer {}", self.access_token))
            .with_header("Content-Type", "application/json")
            .with_json(serde_json::json!({ "name": name, "value": value }))
    }
}

impl std::fmt::Debug for Management {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Management")
            .field("api_url", &self.api_url)
            .field("project_ref", &self.project_ref)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
