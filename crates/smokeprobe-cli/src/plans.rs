//! Embedded plans for the `smokeprobe` binary.
//!
//! Plans are compiled in with `include_str!` so the binary runs without a
//! checkout. Endpoints and credentials are `${VAR}` placeholders resolved from
//! the environment at run time.

/// An embedded plan with its name, description, and full YAML content.
#[derive(Debug, Clone)]
pub struct EmbeddedPlan {
    /// The plan name (e.g., "system")
    pub name: &'static str,
    /// Short description shown by `smokeprobe plans`
    pub description: &'static str,
    /// Full YAML content of the plan
    pub content: &'static str,
}

/// Plan used when neither `--plan` nor `--config` is given and no local plan file exists.
pub const DEFAULT_PLAN: &str = "system";

const PLANS: &[EmbeddedPlan] = &[
    EmbeddedPlan {
        name: "quick",
        description: "Quick backend API check; informational, always exits 0",
        content: include_str!("../plans/quick.yml"),
    },
    EmbeddedPlan {
        name: "system",
        description: "Full verification: frontend deployment and backend API endpoints",
        content: include_str!("../plans/system.yml"),
    },
];

/// Returns all embedded plans.
pub fn list_plans() -> &'static [EmbeddedPlan] {
    PLANS
}

/// Looks up a plan by name.
///
/// Returns `None` if the plan doesn't exist.
pub fn get_plan(name: &str) -> Option<&'static EmbeddedPlan> {
    PLANS.iter().find(|p| p.name == name)
}

/// Returns the list of plan names for error messages.
pub fn plan_names() -> Vec<&'static str> {
    PLANS.iter().map(|p| p.name).collect()
}
