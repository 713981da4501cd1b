//! Response checks.
//!
//! A check turns a response into a pass/fail verdict plus the one-line message
//! shown next to the probe name. Checks never fail the run: a body that is not
//! valid JSON is a failed probe whose message is the decoder error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smokeprobe_proto::ProbeResponse;

/// Message used when a JSON body does not have the expected layout.
pub const UNEXPECTED_FORMAT: &str = "Unexpected response format";

/// Verdict of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub passed: bool,
    pub message: String,
}

impl CheckOutcome {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }
}

/// A labelled substring expected in a response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Needle {
    pub label: String,
    pub text: String,
}

/// A key whose array length is reported by `json_counts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountField {
    pub key: String,
    /// Noun printed after the count. Defaults to the key.
    #[serde(default)]
    pub label: Option<String>,
}

impl CountField {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }
}

/// What a probe expects from its response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Check {
    /// Status equality. The message is always `HTTP <code>`.
    Status {
        #[serde(default = "default_status")]
        expected: u16,
    },

    /// Every needle must occur in the body. The status is not inspected.
    BodyContains { needles: Vec<Needle> },

    /// The value at `pointer` (root when absent) must be a JSON array.
    JsonCount {
        #[serde(default)]
        pointer: Option<String>,
        noun: String,
    },

    /// The value at `pointer` must be an object; reports the array length of each field.
    JsonCounts {
        #[serde(default)]
        pointer: Option<String>,
        fields: Vec<CountField>,
    },

    /// The value at `pointer` must exist; it is echoed in the message.
    JsonField {
        pointer: String,
        label: String,
        #[serde(default = "default_missing_message")]
        missing_message: String,
        /// Show at most this many characters of the value, followed by `...`.
        #[serde(default)]
        truncate: Option<usize>,
    },
}

fn default_status() -> u16 {
    200
}

fn default_missing_message() -> String {
    UNEXPECTED_FORMAT.to_string()
}

impl Default for Check {
    fn default() -> Self {
        Check::Status {
            expected: default_status(),
        }
    }
}

impl Check {
    /// Evaluates the check against a response.
    pub fn evaluate(&self, response: &ProbeResponse) -> CheckOutcome {
        match self {
            Check::Status { expected } => {
                let message = http_status(response);
                if response.status == *expected {
                    CheckOutcome::pass(message)
                } else {
                    CheckOutcome::fail(message)
                }
            }
            Check::BodyContains { needles } => {
                let found: Vec<(&str, bool)> = needles
                    .iter()
                    .map(|n| (n.label.as_str(), response.body.contains(&n.text)))
                    .collect();
                let message = found
                    .iter()
                    .map(|(label, hit)| format!("{label}: {hit}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                if found.iter().all(|(_, hit)| *hit) {
                    CheckOutcome::pass(message)
                } else {
                    CheckOutcome::fail(message)
                }
            }
            Check::JsonCount { pointer, noun } => match decode_ok(response) {
                Err(outcome) => outcome,
                Ok(doc) => match locate(&doc, pointer.as_deref()).and_then(Value::as_array) {
                    Some(items) => CheckOutcome::pass(format!("Retrieved {} {noun}", items.len())),
                    None => CheckOutcome::fail(UNEXPECTED_FORMAT),
                },
            },
            Check::JsonCounts { pointer, fields } => match decode_ok(response) {
                Err(outcome) => outcome,
                Ok(doc) => match locate(&doc, pointer.as_deref()).and_then(Value::as_object) {
                    Some(object) => {
                        let message = fields
                            .iter()
                            .map(|f| {
                                let count = object
                                    .get(&f.key)
                                    .and_then(Value::as_array)
                                    .map_or(0, Vec::len);
                                format!("{count} {}", f.label())
                            })
                            .collect::<Vec<_>>()
                            .join(", ");
                        CheckOutcome::pass(message)
                    }
                    None => CheckOutcome::fail(UNEXPECTED_FORMAT),
                },
            },
            Check::JsonField {
                pointer,
                label,
                missing_message,
                truncate,
            } => match decode_ok(response) {
                Err(outcome) => outcome,
                Ok(doc) => match doc.pointer(pointer) {
                    Some(value) if !value.is_null() => {
                        let shown = display_value(value, *truncate);
                        CheckOutcome::pass(format!("{label}: {shown}"))
                    }
                    _ => CheckOutcome::fail(missing_message.clone()),
                },
            },
        }
    }
}

fn http_status(response: &ProbeResponse) -> String {
    format!("HTTP {}", response.status)
}

/// Requires a 200 status and a JSON body.
fn decode_ok(response: &ProbeResponse) -> Result<Value, CheckOutcome> {
    if response.status != 200 {
        return Err(CheckOutcome::fail(http_status(response)));
    }
    response
        .json()
        .map_err(|e| CheckOutcome::fail(e.to_string()))
}

fn locate<'a>(doc: &'a Value, pointer: Option<&str>) -> Option<&'a Value> {
    match pointer {
        None | Some("") => Some(doc),
        Some(p) => doc.pointer(p),
    }
}

fn display_value(value: &Value, truncate: Option<usize>) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    match truncate {
        Some(max) if text.chars().count() > max => {
            let head: String = text.chars().take(max).collect();
            format!("{head}...")
        }
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(body: &str) -> ProbeResponse {
        ProbeResponse::new(200, body)
    }

    #[test]
    fn test_default_is_status_200() {
        assert_eq!(Check::default(), Check::Status { expected: 200 });
    }

    #[test]
    fn test_status_message_on_pass_and_fail() {
        let check = Check::default();
        assert_eq!(check.evaluate(&ok("")), CheckOutcome::pass("HTTP 200"));
        assert_eq!(
            check.evaluate(&ProbeResponse::new(404, "")),
            CheckOutcome::fail("HTTP 404")
        );
    }

    #[test]
    fn test_json_count_reports_retrieved_rows() {
        let check = Check::JsonCount {
            pointer: None,
            noun: "tasks".into(),
        };
        let outcome = check.evaluate(&ok(r#"[{"id": "abc123", "title": "Fix sink"}]"#));
        assert!(outcome.passed);
        assert!(outcome.message.contains("Retrieved 1 tasks"));
    }

    #[test]
    fn test_json_count_on_server_error() {
        let check = Check::JsonCount {
            pointer: None,
            noun: "tasks".into(),
        };
        assert_eq!(
            check.evaluate(&ProbeResponse::new(500, "oops")),
            CheckOutcome::fail("HTTP 500")
        );
    }

    #[test]
    fn test_json_count_rejects_non_array() {
        let check = Check::JsonCount {
            pointer: None,
            noun: "tasks".into(),
        };
        assert_eq!(
            check.evaluate(&ok(r#"{"message": "nope"}"#)),
            CheckOutcome::fail(UNEXPECTED_FORMAT)
        );
    }

    #[test]
    fn test_invalid_json_fails_with_decoder_text() {
        let check = Check::JsonCount {
            pointer: None,
            noun: "tasks".into(),
        };
        let outcome = check.evaluate(&ok("<!doctype html>"));
        assert!(!outcome.passed);
        assert!(!outcome.message.is_empty());
        assert_ne!(outcome.message, UNEXPECTED_FORMAT);
    }

    #[test]
    fn test_json_counts_summarizes_fields() {
        let check = Check::JsonCounts {
            pointer: Some("/data".into()),
            fields: vec![
                CountField { key: "properties".into(), label: None },
                CountField { key: "units".into(), label: None },
                CountField { key: "tenants".into(), label: None },
            ],
        };
        let body = r#"{"data": {"properties": [1, 2, 3], "units": [1, 2]}}"#;
        assert_eq!(
            check.evaluate(&ok(body)),
            CheckOutcome::pass("3 properties, 2 units, 0 tenants")
        );
    }

    #[test]
    fn test_json_counts_missing_envelope() {
        let check = Check::JsonCounts {
            pointer: Some("/data".into()),
            fields: vec![CountField { key: "units".into(), label: Some("Units".into()) }],
        };
        assert_eq!(
            check.evaluate(&ok(r#"{"error": "boom"}"#)),
            CheckOutcome::fail(UNEXPECTED_FORMAT)
        );
    }

    #[test]
    fn test_json_field_echoes_value() {
        let check = Check::JsonField {
            pointer: "/data/tasks/0/id".into(),
            label: "Task ID".into(),
            missing_message: "Task not created".into(),
            truncate: None,
        };
        let body = r#"{"data": {"tasks": [{"id": "9f1c2a7e-44"}]}}"#;
        assert_eq!(check.evaluate(&ok(body)), CheckOutcome::pass("Task ID: 9f1c2a7e-44"));
        assert_eq!(
            check.evaluate(&ok(r#"{"data": {"tasks": []}}"#)),
            CheckOutcome::fail("Task not created")
        );
    }

    #[test]
    fn test_json_field_truncates() {
        let check = Check::JsonField {
            pointer: "/id".into(),
            label: "Task ID".into(),
            missing_message: default_missing_message(),
            truncate: Some(8),
        };
        assert_eq!(
            check.evaluate(&ok(r#"{"id": "9f1c2a7e-4471"}"#)),
            CheckOutcome::pass("Task ID: 9f1c2a7e...")
        );
    }

    #[test]
    fn test_body_contains_ignores_status() {
        let check = Check::BodyContains {
            needles: vec![
                Needle { label: "Root div".into(), text: r#"id="root""#.into() },
                Needle { label: "JS bundle".into(), text: ".js".into() },
            ],
        };
        let html = r#"<div id="root"></div><script src="/assets/index.js"></script>"#;
        assert_eq!(
            check.evaluate(&ProbeResponse::new(404, html)),
            CheckOutcome::pass("Root div: true, JS bundle: true")
        );
        assert_eq!(
            check.evaluate(&ok("<div></div>")),
            CheckOutcome::fail("Root div: false, JS bundle: false")
        );
    }

    #[test]
    fn test_deserializes_from_yaml() {
        let yaml = r#"
kind: json_field
pointer: /data/tasks/0/id
label: Task ID
"#;
        let check: Check = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            check,
            Check::JsonField {
                pointer: "/data/tasks/0/id".into(),
                label: "Task ID".into(),
                missing_message: UNEXPECTED_FORMAT.into(),
                truncate: None,
            }
        );

        let status: Check = serde_yaml::from_str("kind: status").unwrap();
        assert_eq!(status, Check::default());
    }
}
