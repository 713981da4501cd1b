//! End-to-end plan runs against a scripted transport.
//!
//! Tests cover:
//! - A full verification plan where every probe passes
//! - Mixed failures (server error, timeout, malformed body) without aborting the run
//! - Exit code and summary text

use smokeprobe_core::testing::MockTransport;
use smokeprobe_core::{
    ConsoleResultHandler, HttpMethod, Plan, QuietResultHandler, SmokeRunner, TransportError,
    Variables,
};

const PLAN: &str = r#"
title: "PropMaster Task Management System - Verification Tests"
variables:
  FRONTEND_URL: "https://app.example.test"
platform:
  url: "${SUPABASE_URL}"
  anon_key: "${SUPABASE_ANON_KEY}"
suites:
  - name: Frontend Deployment
    probes:
      - name: Website is accessible
        request: { kind: http, url: "${FRONTEND_URL}" }
      - name: React app structure present
        request: { kind: http, url: "${FRONTEND_URL}/index.html" }
        check:
          kind: body_contains
          needles:
            - { label: Root div, text: 'id="root"' }
            - { label: JS bundle, text: ".js" }
  - name: Backend API Endpoints
    probes:
      - name: get-mention-data endpoint
        request: { kind: function, name: get-mention-data }
        check:
          kind: json_counts
          pointer: /data
          fields:
            - { key: properties }
            - { key: units }
            - { key: tenants }
      - name: Fetch tasks from database
        request: { kind: table, table: tasks, limit: 10 }
        check: { kind: json_count, noun: tasks }
      - name: Create task via API
        request:
          kind: function
          name: create-task
          body: { title: "Automated Test Task", status: pending }
        check:
          kind: json_field
          pointer: /data/tasks/0/id
          label: Task ID
          missing_message: Task not created
"#;

const SITE: &str = "https://app.example.test";
const INDEX: &str = "https://app.example.test/index.html";
const MENTION: &str = "https://proj.example.test/functions/v1/get-mention-data";
const TASKS: &str = "https://proj.example.test/rest/v1/tasks";
const CREATE: &str = "https://proj.example.test/functions/v1/create-task";

fn load() -> (Plan, Variables) {
    let plan = Plan::parse(PLAN).expect("plan parses");
    let vars = Variables::with_lookup(plan.variables.clone(), |name| match name {
        "SUPABASE_URL" => Some("https://proj.example.test".to_string()),
        "SUPABASE_ANON_KEY" => Some("anon".to_string()),
        _ => None,
    });
    (plan, vars)
}

fn healthy() -> MockTransport {
    MockTransport::new()
        .respond(HttpMethod::Get, SITE, 200, "<html></html>")
        .respond(
            HttpMethod::Get,
            INDEX,
            200,
            r#"<div id="root"></div><script src="/assets/index-4f2a.js"></script>"#,
        )
        .respond(
            HttpMethod::Post,
            MENTION,
            200,
            r#"{"data": {"properties": [{}, {}], "units": [{}], "tenants": []}}"#,
        )
        .respond(
            HttpMethod::Get,
            TASKS,
            200,
            r#"[{"id": "abc123", "title": "Fix sink"}]"#,
        )
        .respond(
            HttpMethod::Post,
            CREATE,
            200,
            r#"{"data": {"tasks": [{"id": "9f1c2a7e", "title": "Automated Test Task"}]}}"#,
        )
}

#[tokio::test]
async fn test_healthy_system_passes_every_probe() {
    let (plan, vars) = load();
    assert!(plan.validate().unwrap().is_empty());
    let suites = plan.resolve(&vars).unwrap();

    let runner = SmokeRunner::new(healthy());
    let mut handler = ConsoleResultHandler::with_writer(Vec::new(), false);
    let tally = runner.run(&plan.title, &suites, &mut handler).await;

    assert_eq!(tally.total(), 5);
    assert_eq!(tally.passed(), 5);

    let messages: Vec<&str> = tally.tests().iter().map(|t| t.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "HTTP 200",
            "Root div: true, JS bundle: true",
            "2 properties, 1 units, 0 tenants",
            "Retrieved 1 tasks",
            "Task ID: 9f1c2a7e",
        ]
    );

    let progress = String::from_utf8(handler.into_inner()).unwrap();
    assert!(progress.contains("TEST SUITE 1: Frontend Deployment"));
    assert!(progress.contains("TEST SUITE 2: Backend API Endpoints"));
    assert!(progress.contains("✓ PASS: Fetch tasks from database"));

    let mut summary = Vec::new();
    assert_eq!(tally.summarize(&mut summary).unwrap(), 0);
    assert!(String::from_utf8(summary).unwrap().contains("✓ ALL TESTS PASSED"));
}

#[tokio::test]
async fn test_table_read_sends_platform_credentials() {
    let (plan, vars) = load();
    let suites = plan.resolve(&vars).unwrap();
    let transport = healthy();
    let runner = SmokeRunner::new(transport.clone());

    runner.run(&plan.title, &suites, &mut QuietResultHandler).await;

    let tasks = transport
        .requests()
        .into_iter()
        .find(|r| r.url == TASKS)
        .expect("tasks request sent");
    assert_eq!(tasks.query_param("select"), Some("*"));
    assert_eq!(tasks.query_param("limit"), Some("10"));
    assert_eq!(tasks.header("apikey"), Some("anon"));
    assert_eq!(tasks.header("Authorization"), Some("Bearer anon"));
}

#[tokio::test]
async fn test_failures_are_recorded_and_run_continues() {
    let (plan, vars) = load();
    let suites = plan.resolve(&vars).unwrap();

    let transport = MockTransport::new()
        .fail(
            HttpMethod::Get,
            SITE,
            TransportError::Timeout("operation timed out".into()),
        )
        .respond(HttpMethod::Get, INDEX, 200, "<div></div>")
        .respond(HttpMethod::Post, MENTION, 200, r#"{"error": "missing"}"#)
        .respond(HttpMethod::Get, TASKS, 500, "")
        .respond(HttpMethod::Post, CREATE, 200, r#"{"data": {}}"#);
    let runner = SmokeRunner::new(transport.clone());

    let tally = runner.run(&plan.title, &suites, &mut QuietResultHandler).await;

    assert_eq!(transport.request_count(), 5);
    assert_eq!(tally.total(), 5);
    assert_eq!(tally.failed(), 5);
    assert_eq!(tally.exit_code(), 1);

    let failures: Vec<(&str, &str)> = tally
        .failures()
        .map(|t| (t.name.as_str(), t.message.as_str()))
        .collect();
    assert_eq!(
        failures,
        vec![
            ("Website is accessible", "operation timed out"),
            ("React app structure present", "Root div: false, JS bundle: false"),
            ("get-mention-data endpoint", "Unexpected response format"),
            ("Fetch tasks from database", "HTTP 500"),
            ("Create task via API", "Task not created"),
        ]
    );

    let mut summary = Vec::new();
    assert_eq!(tally.summarize(&mut summary).unwrap(), 1);
    let summary = String::from_utf8(summary).unwrap();
    assert!(summary.contains("Failed: 5"));
    assert!(summary.contains("  - Fetch tasks from database: HTTP 500"));
}

#[tokio::test]
async fn test_every_probe_yields_exactly_one_result() {
    let (plan, vars) = load();
    let suites = plan.resolve(&vars).unwrap();

    // Nothing routed: every probe hits a connect error.
    let runner = SmokeRunner::new(MockTransport::new());
    let tally = runner.run(&plan.title, &suites, &mut QuietResultHandler).await;

    assert_eq!(tally.total(), plan.probe_count());
    assert_eq!(tally.passed() + tally.failed(), tally.tests().len());
    assert!(tally.tests().iter().all(|t| !t.message.is_empty()));
}
