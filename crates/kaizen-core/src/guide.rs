use crate::phase::{self, Phase};
use crate::status::{FeatureState, WorkflowStatus};
use serde::Serialize;
use std::path::Path;

// ---------------------------------------------------------------------------
// Progress rendering
// ---------------------------------------------------------------------------

const PROGRESS_PHASES: [Phase; 5] = [Phase::Plan, Phase::Design, Phase::Do, Phase::Check, Phase::Act];

/// Render a feature's position in the cycle as a compact strip, e.g.
/// "Plan[x] -> Design[~] -> Do[ ] -> Check[ ] -> Act[ ]".
pub fn format_progress(current: Phase) -> String {
    let current_idx = PROGRESS_PHASES.iter().position(|p| *p == current);

    let parts: Vec<String> = PROGRESS_PHASES
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            let label = capitalize(p.as_str());
            let marker = match current_idx {
                // Report/completed features are past every strip phase
                None => "[x]",
                Some(c) if idx < c => "[x]",
                Some(c) if idx == c => "[~]",
                _ => "[ ]",
            };
            format!("{label}{marker}")
        })
        .collect();

    parts.join(" -> ")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Next action suggestion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct NextAction {
    pub action: String,
    pub command: String,
    pub reason: String,
}

fn next_action(action: &str, command: String, reason: String) -> NextAction {
    NextAction {
        action: action.to_string(),
        command,
        reason,
    }
}

/// Suggest what to do next for a feature, from its phase, its deliverable
/// documents on disk, and the match-rate threshold.
pub async fn suggest_next_action(
    root: &Path,
    status: &WorkflowStatus,
    feature: &str,
    threshold: f64,
) -> NextAction {
    let Some(state) = status.feature(feature) else {
        return next_action(
            "Create plan document",
            format!("$kaizen plan {feature}"),
            "No PDCA tracking found for this feature. Start with planning.".to_string(),
        );
    };

    let has_plan = phase::plan_exists(root, feature).await;
    let has_design = phase::design_exists(root, feature).await;

    match state.phase {
        Phase::Plan if !has_plan => next_action(
            "Create plan document",
            format!("$kaizen plan {feature}"),
            "Plan phase active but no plan document found.".to_string(),
        ),
        Phase::Plan => next_action(
            "Complete plan phase and start design",
            format!("$kaizen design {feature}"),
            "Plan document exists. Proceed to design phase.".to_string(),
        ),
        Phase::Design if !has_design => next_action(
            "Create design document",
            format!("$kaizen design {feature}"),
            "Design phase active but no design document found.".to_string(),
        ),
        Phase::Design => next_action(
            "Complete design and start implementation",
            format!("$kaizen do {feature}"),
            "Design document exists. Proceed to implementation.".to_string(),
        ),
        Phase::Do => next_action(
            "Run gap analysis",
            format!("$kaizen analyze {feature}"),
            "Implementation phase. Run gap analysis when ready.".to_string(),
        ),
        Phase::Check => match state.match_rate {
            Some(rate) if rate >= threshold => next_action(
                "Generate report",
                format!("$kaizen report {feature}"),
                format!("Match rate {rate}% meets threshold. Generate completion report."),
            ),
            Some(rate) => next_action(
                "Iterate to fix gaps",
                format!("$kaizen iterate {feature}"),
                format!("Match rate {rate}% below {threshold}% threshold. Fix gaps and re-analyze."),
            ),
            None => next_action(
                "Iterate to fix gaps",
                format!("$kaizen iterate {feature}"),
                "Complete gap analysis first.".to_string(),
            ),
        },
        Phase::Act => next_action(
            "Re-run gap analysis",
            format!("$kaizen analyze {feature}"),
            "After fixing gaps, re-run analysis to verify improvements.".to_string(),
        ),
        Phase::Report => next_action(
            "Archive feature",
            format!("$kaizen archive {feature}"),
            "Report complete. Archive this PDCA cycle.".to_string(),
        ),
        Phase::Completed => next_action(
            "PDCA cycle complete",
            "$kaizen status".to_string(),
            "Feature is completed. Pick the next feature.".to_string(),
        ),
    }
}

// ---------------------------------------------------------------------------
// Guidance text
// ---------------------------------------------------------------------------

/// One-paragraph guidance for a feature's current phase, used by session
/// initialization.
pub async fn generate_guidance(root: &Path, status: &WorkflowStatus, feature: &str) -> String {
    let Some(state) = status.feature(feature) else {
        return format!("Feature '{feature}' is not tracked. Start with: $kaizen plan {feature}");
    };

    let mut lines = vec![format!("Feature '{feature}' is in {} phase.", state.phase)];
    lines.push(phase_hint(root, feature, state).await);
    lines.join(" ")
}

async fn phase_hint(root: &Path, feature: &str, state: &FeatureState) -> String {
    match state.phase {
        Phase::Plan => {
            if phase::plan_exists(root, feature).await {
                "Plan document exists. Complete the plan phase and proceed to design.".to_string()
            } else {
                "Create a plan document to define goals, scope, and success criteria.".to_string()
            }
        }
        Phase::Design => {
            if phase::design_exists(root, feature).await {
                "Design document exists. Complete the design phase and start implementation."
                    .to_string()
            } else {
                "Create a design document with architecture, data model, and API specifications."
                    .to_string()
            }
        }
        Phase::Do => {
            "Reference the design document during implementation. Call kaizen_pre_write_check before writing each file."
                .to_string()
        }
        Phase::Check => "Run gap analysis to compare design with implementation.".to_string(),
        Phase::Act => {
            let mut hint = "Fix identified gaps and re-run analysis.".to_string();
            if state.iteration_count > 0 {
                hint.push_str(&format!(" Iteration {} of max 5.", state.iteration_count));
            }
            hint
        }
        Phase::Report => "Generate completion report with metrics and learnings.".to_string(),
        Phase::Completed => "PDCA cycle complete.".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
