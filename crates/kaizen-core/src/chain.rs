use crate::phase::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ChainTask
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStatus {
    Pending,
    Active,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainTask {
    pub phase: Phase,
    pub subject: String,
    pub description: String,
    pub status: ChainStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Chain construction
// ---------------------------------------------------------------------------

/// Phases that get a chain task. `act` is deliberately absent: it is the
/// check -> act -> check remediation loop, not a forward step.
const CHAIN_PHASES: [Phase; 5] = [
    Phase::Plan,
    Phase::Design,
    Phase::Do,
    Phase::Check,
    Phase::Report,
];

fn task_description(phase: Phase) -> &'static str {
    match phase {
        Phase::Plan => "Create plan document with goals, scope, and success criteria",
        Phase::Design => "Create design document with architecture, data model, and API spec",
        Phase::Do => "Implement feature according to design document",
        Phase::Check => "Run gap analysis comparing design vs implementation",
        Phase::Act => "Fix identified gaps and improve implementation",
        Phase::Report => "Generate completion report with metrics and learnings",
        Phase::Completed => "PDCA cycle complete",
    }
}

/// Subject line for a chain task: "[PLAN] my-feature".
pub fn task_subject(feature: &str, phase: Phase) -> String {
    format!("[{}] {feature}", phase.as_str().to_uppercase())
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskChain {
    pub tasks: Vec<ChainTask>,
    pub guidance: String,
}

/// Build the five-task chain for a feature: first task active, the rest
/// pending.
pub fn create_chain(feature: &str) -> TaskChain {
    let now = Utc::now();
    let tasks: Vec<ChainTask> = CHAIN_PHASES
        .iter()
        .enumerate()
        .map(|(i, &phase)| ChainTask {
            phase,
            subject: task_subject(feature, phase),
            description: task_description(phase).to_string(),
            status: if i == 0 {
                ChainStatus::Active
            } else {
                ChainStatus::Pending
            },
            created_at: now,
            completed_at: None,
        })
        .collect();

    let guidance = format!(
        "PDCA task chain created with {} tasks. Complete [PLAN] then proceed to [DESIGN].",
        tasks.len()
    );
    TaskChain { tasks, guidance }
}

// ---------------------------------------------------------------------------
// Chain advancement
// ---------------------------------------------------------------------------

/// Advance the chain after `completed_phase` finishes: the active task for
/// that phase becomes completed, and the next pending task after it becomes
/// active. Single pass, so at most one task flips to active. Returns true
/// if a task was completed.
pub fn advance_chain(tasks: &mut [ChainTask], completed_phase: Phase) -> bool {
    let mut advanced = false;
    let mut found_current = false;
    for task in tasks.iter_mut() {
        if task.phase == completed_phase && task.status == ChainStatus::Active {
            task.status = ChainStatus::Completed;
            task.completed_at = Some(Utc::now());
            found_current = true;
            advanced = true;
        } else if found_current && task.status == ChainStatus::Pending {
            task.status = ChainStatus::Active;
            found_current = false;
        }
    }
    advanced
}

/// The currently active task, if any.
pub fn active_task(tasks: &[ChainTask]) -> Option<&ChainTask> {
    tasks.iter().find(|t| t.status == ChainStatus::Active)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
