//! `${VAR}` interpolation for plan strings.
//!
//! A placeholder resolves against the plan's own `variables` map first and the
//! process environment second. `${VAR:-fallback}` supplies a literal used when
//! neither has the name. A plan variable that references itself (directly or
//! through another plan variable) resolves that name from the environment, so
//! `SUPABASE_ANON_KEY: "${SUPABASE_ANON_KEY}"` reads the environment variable.

use crate::config::ConfigError;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("placeholder pattern is a valid regex")
    })
}

/// Resolves placeholders in plan strings.
pub struct Variables {
    vars: HashMap<String, String>,
    lookup: Lookup,
}

impl Variables {
    /// Plan variables backed by the process environment.
    pub fn from_env(vars: HashMap<String, String>) -> Self {
        Self::with_lookup(vars, |name| std::env::var(name).ok())
    }

    /// Plan variables backed by a custom lookup instead of the environment.
    pub fn with_lookup(
        vars: HashMap<String, String>,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            vars,
            lookup: Box::new(lookup),
        }
    }

    /// Expands every placeholder in `input`.
    pub fn expand(&self, input: &str) -> Result<String, ConfigError> {
        let mut stack = Vec::new();
        self.expand_inner(input, &mut stack)
    }

    /// Expands placeholders in every string inside a JSON value.
    pub fn expand_json(&self, value: &serde_json::Value) -> Result<serde_json::Value, ConfigError> {
        use serde_json::Value;

        Ok(match value {
            Value::String(s) => Value::String(self.expand(s)?),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|v| self.expand_json(v))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k.clone(), self.expand_json(v)?);
                }
                Value::Object(out)
            }
            other => other.clone(),
        })
    }

    fn expand_inner(&self, input: &str, stack: &mut Vec<String>) -> Result<String, ConfigError> {
        if !input.contains("${") {
            return Ok(input.to_string());
        }

        let mut out = String::with_capacity(input.len());
        let mut last = 0;
        for caps in placeholder().captures_iter(input) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&input[last..whole.start()]);
            let fallback = caps.get(2).map(|m| m.as_str());
            out.push_str(&self.resolve(&caps[1], fallback, stack)?);
            last = whole.end();
        }
        out.push_str(&input[last..]);
        Ok(out)
    }

    fn resolve(
        &self,
        name: &str,
        fallback: Option<&str>,
        stack: &mut Vec<String>,
    ) -> Result<String, ConfigError> {
        let in_progress = stack.iter().any(|n| n == name);
        if !in_progress && let Some(raw) = self.vars.get(name) {
            stack.push(name.to_string());
            let value = self.expand_inner(raw, stack);
            stack.pop();
            return value;
        }

        if let Some(value) = (self.lookup)(name) {
            return Ok(value);
        }

        match fallback {
            Some(literal) => Ok(literal.to_string()),
            None => Err(ConfigError::UnresolvedVariable(name.to_string())),
        }
    }
}

impl fmt::Debug for Variables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values are usually credentials; only names are shown.
        let mut names: Vec<&String> = self.vars.keys().collect();
        names.sort();
        f.debug_struct("Variables").field("names", &names).finish()
    }
}
