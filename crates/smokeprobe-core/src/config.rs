//! Plan configuration.
//!
//! A plan is a YAML document declaring the platform under test, optional
//! management API credentials, variables and an ordered list of suites. Strings
//! stay raw after parsing; `${VAR}` placeholders are resolved by
//! [`Plan::resolve`] and [`Plan::management`] so that a run never needs the
//! management token and vice versa.

use crate::check::Check;
use crate::platform::{Management, Platform};
use crate::probe::{Probe, Suite};
use crate::variables::Variables;
use serde::{Deserialize, Serialize};
use smokeprobe_proto::{HttpMethod, ProbeRequest};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Top-level plan document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Banner printed before the first suite.
    #[serde(default = "default_title")]
    pub title: String,

    /// When false, the run exits 0 even if probes fail.
    #[serde(default = "default_true")]
    pub strict: bool,

    /// Plan-local variables, resolved before the environment.
    #[serde(default)]
    pub variables: HashMap<String, String>,

    /// Target project for `table` and `function` requests.
    #[serde(default)]
    pub platform: Option<PlatformConfig>,

    /// Management API settings, used by `secrets set`.
    #[serde(default)]
    pub management: Option<ManagementConfig>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub suites: Vec<SuiteConfig>,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            title: default_title(),
            strict: true,
            variables: HashMap::new(),
            platform: None,
            management: None,
            defaults: Defaults::default(),
            suites: Vec::new(),
        }
    }
}

fn default_title() -> String {
    "Smoke Tests".to_string()
}

fn default_true() -> bool {
    true
}

/// Settings applied to every probe unless overridden.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagementConfig {
    #[serde(default = "default_management_url")]
    pub api_url: String,
    pub project_ref: String,
    pub access_token: String,
}

fn default_management_url() -> String {
    "https://api.supabase.com".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub name: String,
    #[serde(default)]
    pub probes: Vec<ProbeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub name: String,
    pub request: RequestSpec,
    #[serde(default)]
    pub check: Check,
    /// Overrides `defaults.timeout_seconds`.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// How a probe's request is described in the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestSpec {
    /// An arbitrary request.
    Http {
        #[serde(default)]
        method: HttpMethod,
        url: String,
        /// Sent in the order written.
        #[serde(default, with = "ordered_pairs")]
        headers: Vec<(String, String)>,
        #[serde(default, with = "ordered_pairs")]
        query: Vec<(String, String)>,
        #[serde(default)]
        body: Option<serde_json::Value>,
    },

    /// A REST read of one platform table.
    Table {
        table: String,
        #[serde(default = "default_select")]
        select: String,
        #[serde(default)]
        limit: Option<u32>,
    },

    /// An edge function invocation.
    Function {
        name: String,
        #[serde(default)]
        body: Option<serde_json::Value>,
        #[serde(default)]
        authorize: bool,
    },
}

/// A YAML map read into pairs without reordering its keys.
mod ordered_pairs {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(
        pairs: &[(String, String)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(pairs.len()))?;
        for (key, value) in pairs {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, String)>, D::Error> {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = Vec<(String, String)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(pair) = access.next_entry::<String, String>()? {
                    pairs.push(pair);
                }
                Ok(pairs)
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}

fn default_select() -> String {
    "*".to_string()
}

impl RequestSpec {
    fn needs_platform(&self) -> bool {
        !matches!(self, RequestSpec::Http { .. })
    }
}

impl Plan {
    /// Loads a plan from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        debug!(path = %path_ref.display(), "Loading plan from file");
        let content = std::fs::read_to_string(path_ref)?;
        Self::parse(&content)
    }

    /// Parses a plan from YAML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let plan: Self = serde_yaml::from_str(content)?;
        debug!(
            title = %plan.title,
            suites = plan.suites.len(),
            probes = plan.probe_count(),
            has_platform = plan.platform.is_some(),
            "Plan loaded"
        );
        Ok(plan)
    }

    /// Total number of probes across all suites.
    pub fn probe_count(&self) -> usize {
        self.suites.iter().map(|s| s.probes.len()).sum()
    }

    /// Validates the plan and returns warnings.
    ///
    /// Table and function probes without a `platform` section are errors;
    /// empty suites, duplicate probe names and zero timeouts are warnings.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        let mut warnings = Vec::new();

        if self.suites.is_empty() {
            warnings.push(ConfigWarning::InvalidValue {
                field: "suites".to_string(),
                message: "Plan declares no suites; nothing will run".to_string(),
            });
        }

        if self.defaults.timeout_seconds == 0 {
            warnings.push(ConfigWarning::InvalidValue {
                field: "defaults.timeout_seconds".to_string(),
                message: "A zero timeout fails every probe".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for suite in &self.suites {
            if suite.probes.is_empty() {
                warnings.push(ConfigWarning::EmptySuite {
                    suite: suite.name.clone(),
                });
            }
            for probe in &suite.probes {
                if probe.request.needs_platform() && self.platform.is_none() {
                    return Err(ConfigError::MissingPlatform {
                        probe: probe.name.clone(),
                    });
                }
                if !seen.insert(probe.name.as_str()) {
                    warnings.push(ConfigWarning::DuplicateProbe {
                        name: probe.name.clone(),
                    });
                }
                if probe.timeout_seconds == Some(0) {
                    warnings.push(ConfigWarning::InvalidValue {
                        field: format!("{}.timeout_seconds", probe.name),
                        message: "A zero timeout fails this probe".to_string(),
                    });
                }
            }
        }

        Ok(warnings)
    }

    /// Resolves placeholders and builds the concrete suites to run.
    pub fn resolve(&self, vars: &Variables) -> Result<Vec<Suite>, ConfigError> {
        let platform = match &self.platform {
            Some(cfg)
                if self
                    .suites
                    .iter()
                    .flat_map(|s| &s.probes)
                    .any(|p| p.request.needs_platform()) =>
            {
                Some(Platform::new(vars.expand(&cfg.url)?, vars.expand(&cfg.anon_key)?))
            }
            _ => None,
        };

        let mut suites = Vec::with_capacity(self.suites.len());
        for suite in &self.suites {
            let mut probes = Vec::with_capacity(suite.probes.len());
            for probe in &suite.probes {
                let request = resolve_request(&probe.request, platform.as_ref(), vars).map_err(
                    |e| match e {
                        ConfigError::MissingPlatform { .. } => ConfigError::MissingPlatform {
                            probe: probe.name.clone(),
                        },
                        other => other,
                    },
                )?;
                let timeout = probe
                    .timeout_seconds
                    .unwrap_or(self.defaults.timeout_seconds);
                probes.push(Probe {
                    name: probe.name.clone(),
                    request,
                    check: probe.check.clone(),
                    timeout: Duration::from_secs(timeout),
                });
            }
            suites.push(Suite {
                name: suite.name.clone(),
                probes,
            });
        }
        Ok(suites)
    }

    /// Resolves the management section.
    pub fn management(&self, vars: &Variables) -> Result<Management, ConfigError> {
        let cfg = self.management.as_ref().ok_or(ConfigError::MissingManagement)?;
        Ok(Management {
            api_url: vars.expand(&cfg.api_url)?,
            project_ref: vars.expand(&cfg.project_ref)?,
            access_token: vars.expand(&cfg.access_token)?,
        })
    }

    /// Variables for this plan, backed by the process environment.
    pub fn variables(&self) -> Variables {
        Variables::from_env(self.variables.clone())
    }
}

fn resolve_request(
    spec: &RequestSpec,
    platform: Option<&Platform>,
    vars: &Variables,
) -> Result<ProbeRequest, ConfigError> {
    match spec {
        RequestSpec::Http {
            method,
            url,
            headers,
            query,
            body,
        } => {
            let mut request = ProbeRequest::new(*method, vars.expand(url)?);
            for (name, value) in headers {
                request = request.with_header(name, vars.expand(value)?);
            }
            for (name, value) in query {
                request = request.with_query(name, vars.expand(value)?);
            }
            if let Some(body) = body {
                if request.header("Content-Type").is_none() {
                    request = request.with_header("Content-Type", "application/json");
                }
                request = request.with_json(vars.expand_json(body)?);
            }
            Ok(request)
        }
        RequestSpec::Table {
            table,
            select,
            limit,
        } => {
            let platform = platform.ok_or(ConfigError::MissingPlatform {
                probe: String::new(),
            })?;
            Ok(platform.table_read(&vars.expand(table)?, &vars.expand(select)?, *limit))
        }
        RequestSpec::Function {
            name,
            body,
            authorize,
        } => {
            let platform = platform.ok_or(ConfigError::MissingPlatform {
                probe: String::new(),
            })?;
            let body = match body {
                Some(b) => vars.expand_json(b)?,
                None => serde_json::json!({}),
            };
            Ok(platform.function_invoke(&vars.expand(name)?, body, *authorize))
        }
    }
}

/// Plan warnings emitted during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Suite has no probes.
    EmptySuite { suite: String },
    /// Two probes share a name, which makes the failure list ambiguous.
    DuplicateProbe { name: String },
    /// Field has a questionable value.
    InvalidValue { field: String, message: String },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::EmptySuite { suite } => {
                write!(f, "Warning [{}]: Suite has no probes", suite)
            }
            ConfigWarning::DuplicateProbe { name } => {
                write!(f, "Warning [{}]: Probe name is used more than once", name)
            }
            ConfigWarning::InvalidValue { field, message } => {
                write!(f, "Warning [{}]: {}", field, message)
            }
        }
    }
}

/// Plan loading and resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unresolved variable: ${{{0}}}")]
    UnresolvedVariable(String),

    #[error("Probe '{probe}' targets the platform but the plan has no `platform` section")]
    MissingPlatform { probe: String },

    #[error("Plan has no `management` section")]
    MissingManagement,
}
