//! # smokeprobe-cli
//!
//! Binary entry point for Smokeprobe.
//!
//! This crate provides:
//! - CLI argument parsing using `clap`
//! - Plan selection (file, embedded plan, or local `smokeprobe.yml`)
//! - The `run` / `quick` smoke-test commands and their exit codes
//! - `secrets set` against the platform's management API

mod plans;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use smokeprobe_adapters::ReqwestTransport;
use smokeprobe_core::{
    ConsoleResultHandler, Plan, QuietResultHandler, RunReport, SmokeRunner, set_project_secret,
};
use std::io::{IsTerminal, stdout};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Plan file picked up from the working directory when no plan is named.
const LOCAL_PLAN: &str = "smokeprobe.yml";

/// Color output mode for terminal display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Automatically detect if stdout is a TTY
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorMode {
    /// Returns true if colors should be used based on mode and terminal detection.
    fn should_use_colors(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => stdout().is_terminal(),
        }
    }
}

/// Output format for run results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Progress lines and a human-readable summary
    #[default]
    Table,
    /// A single JSON report for programmatic access
    Json,
}

/// Smokeprobe - HTTP smoke tests for backend-as-a-service deployments
#[derive(Parser, Debug)]
#[command(name = "smokeprobe", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to a plan file (defaults to ./smokeprobe.yml, then the embedded plan)
    #[arg(short, long, global = true, conflicts_with = "plan")]
    config: Option<PathBuf>,

    /// Name of an embedded plan (see `smokeprobe plans`)
    #[arg(long, global = true)]
    plan: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Color output mode (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every probe of a plan (default if no subcommand given)
    Run(RunArgs),

    /// Run a plan informationally (quick plan by default); failures never fail the process
    Quick(RunArgs),

    /// List embedded plans
    Plans,

    /// Manage project secrets on the hosted platform
    Secrets {
        #[command(subcommand)]
        command: SecretsCommand,
    },
}

/// Arguments for the run and quick subcommands.
#[derive(Parser, Debug, Default)]
struct RunArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum SecretsCommand {
    /// Set one secret on the project named by the plan's `management` section
    Set(SetSecretArgs),
}

#[derive(Parser, Debug)]
struct SetSecretArgs {
    /// Secret name, e.g. OPENAI_API_KEY
    #[arg(long)]
    name: String,

    /// Secret value (mutually exclusive with --value-env)
    #[arg(long, conflicts_with = "value_env", required_unless_present = "value_env")]
    value: Option<String>,

    /// Read the secret value from this environment variable
    #[arg(long)]
    value_env: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. Stdout is reserved for results.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let code = match cli.command {
        Some(Commands::Run(args)) => {
            let plan = load_plan(cli.config.as_deref(), cli.plan.as_deref(), plans::DEFAULT_PLAN)?;
            run_command(plan, args.format, cli.color).await?
        }
        Some(Commands::Quick(args)) => {
            let name = cli.plan.as_deref().or(Some("quick"));
            let mut plan = load_plan(cli.config.as_deref(), name, "quick")?;
            plan.strict = false;
            run_command(plan, args.format, cli.color).await?
        }
        Some(Commands::Plans) => {
            plans_command(cli.color);
            0
        }
        Some(Commands::Secrets {
            command: SecretsCommand::Set(args),
        }) => {
            let plan = load_plan(cli.config.as_deref(), cli.plan.as_deref(), plans::DEFAULT_PLAN)?;
            secrets_set_command(plan, args).await?
        }
        None => {
            let plan = load_plan(cli.config.as_deref(), cli.plan.as_deref(), plans::DEFAULT_PLAN)?;
            run_command(plan, OutputFormat::Table, cli.color).await?
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Picks the plan to run.
///
/// Precedence (highest to lowest):
/// 1. `--config <file>`
/// 2. `--plan <name>` (embedded)
/// 3. `./smokeprobe.yml`
/// 4. The embedded `fallback` plan
fn load_plan(config: Option<&Path>, name: Option<&str>, fallback: &str) -> Result<Plan> {
    if let Some(path) = config {
        return Plan::from_file(path)
            .with_context(|| format!("Failed to load plan from {}", path.display()));
    }

    if let Some(name) = name {
        return load_embedded(name);
    }

    let local = Path::new(LOCAL_PLAN);
    if local.exists() {
        debug!(path = %local.display(), "Using plan from working directory");
        return Plan::from_file(local)
            .with_context(|| format!("Failed to load plan from {}", local.display()));
    }

    debug!(plan = fallback, "No plan file found, using embedded plan");
    load_embedded(fallback)
}

fn load_embedded(name: &str) -> Result<Plan> {
    let Some(embedded) = plans::get_plan(name) else {
        bail!(
            "Unknown plan '{}'. Available plans: {}",
            name,
            plans::plan_names().join(", ")
        );
    };
    Plan::parse(embedded.content).with_context(|| format!("Embedded plan '{}' is invalid", name))
}

async fn run_command(plan: Plan, format: OutputFormat, color_mode: ColorMode) -> Result<i32> {
    for warning in plan.validate().context("Invalid plan")? {
        warn!("{}", warning);
    }

    let vars = plan.variables();
    let suites = plan.resolve(&vars).context("Failed to resolve plan")?;
    let transport = ReqwestTransport::new().context("Failed to build HTTP client")?;
    let runner = SmokeRunner::new(transport);

    let started_at = Utc::now();
    let code = match format {
        OutputFormat::Table => {
            let mut handler = ConsoleResultHandler::new(color_mode.should_use_colors());
            let tally = runner.run(&plan.title, &suites, &mut handler).await;
            let code = tally.summarize(stdout().lock())?;
            if plan.strict { code } else { 0 }
        }
        OutputFormat::Json => {
            let tally = runner.run(&plan.title, &suites, &mut QuietResultHandler).await;
            let report = RunReport::new(plan.title.clone(), started_at, plan.strict, tally);
            println!("{}", serde_json::to_string_pretty(&report)?);
            report.exit_code
        }
    };

    if !plan.strict {
        info!("Plan is informational; exit status ignores failures");
    }
    Ok(code)
}

fn plans_command(color_mode: ColorMode) {
    let use_colors = color_mode.should_use_colors();
    let (bold, reset) = if use_colors {
        ("\x1b[1m", "\x1b[0m")
    } else {
        ("", "")
    };

    println!("{bold}Embedded plans:{reset}");
    for plan in plans::list_plans() {
        println!("  {bold}{:<8}{reset} {}", plan.name, plan.description);
    }
}

async fn secrets_set_command(plan: Plan, args: SetSecretArgs) -> Result<i32> {
    let value = match (args.value, args.value_env) {
        (Some(value), _) => value,
        (None, Some(var)) => std::env::var(&var)
            .with_context(|| format!("Environment variable {} is not set", var))?,
        (None, None) => bail!("Provide the secret value with --value or --value-env"),
    };

    let management = plan
        .management(&plan.variables())
        .context("Failed to resolve management settings")?;
    let transport = ReqwestTransport::new().context("Failed to build HTTP client")?;

    let outcome = set_project_secret(
        &transport,
        &management,
        &args.name,
        &value,
        Duration::from_secs(args.timeout),
    )
    .await?;

    println!("Status Code: {}", outcome.status);
    println!("Response: {}", outcome.body);

    if !outcome.is_success() {
        bail!(
            "Management API rejected secret '{}' (HTTP {})",
            args.name,
            outcome.status
        );
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run_with_format() {
        let cli = Cli::try_parse_from(["smokeprobe", "run", "--format", "json"]).unwrap();
        match cli.command {
            Some(Commands::Run(args)) => assert_eq!(args.format, OutputFormat::Json),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_config_and_plan_conflict() {
        let result = Cli::try_parse_from(["smokeprobe", "-c", "x.yml", "--plan", "quick"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_secret_value_required() {
        let result = Cli::try_parse_from(["smokeprobe", "secrets", "set", "--name", "K"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "smokeprobe", "secrets", "set", "--name", "K", "--value-env", "MY_KEY",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Secrets { .. })));
    }

    #[test]
    fn test_secret_value_sources_conflict() {
        let result = Cli::try_parse_from([
            "smokeprobe", "secrets", "set", "--name", "K", "--value", "v", "--value-env", "E",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_embedded_unknown() {
        let err = load_embedded("nope").unwrap_err();
        assert!(err.to_string().contains("Available plans: quick, system"));
    }

    #[test]
    fn test_load_plan_prefers_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.yml");
        std::fs::write(&path, "title: Custom\nsuites: []\n").unwrap();

        let plan = load_plan(Some(&path), None, plans::DEFAULT_PLAN).unwrap();
        assert_eq!(plan.title, "Custom");
    }

    #[test]
    fn test_load_plan_by_name() {
        let plan = load_plan(None, Some("quick"), plans::DEFAULT_PLAN).unwrap();
        assert!(!plan.strict);
    }

    #[test]
    fn test_color_mode_explicit() {
        assert!(ColorMode::Always.should_use_colors());
        assert!(!ColorMode::Never.should_use_colors());
    }
}
