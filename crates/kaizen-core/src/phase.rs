use crate::error::{KaizenError, Result};
use crate::io;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// One PDCA phase. `Completed` is a terminal marker set when a feature
/// finishes its report phase; it is not part of the transition cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Plan,
    Design,
    Do,
    Check,
    Act,
    Report,
    Completed,
}

impl Phase {
    /// The six phases of the PDCA cycle, in order.
    pub fn cycle() -> &'static [Phase] {
        &[
            Phase::Plan,
            Phase::Design,
            Phase::Do,
            Phase::Check,
            Phase::Act,
            Phase::Report,
        ]
    }

    /// Position within the cycle. `None` for `Completed`.
    pub fn cycle_index(self) -> Option<usize> {
        Phase::cycle().iter().position(|p| *p == self)
    }

    /// Successor in the cycle. `None` at `Report` and for `Completed`.
    pub fn next(self) -> Option<Phase> {
        let i = self.cycle_index()?;
        Phase::cycle().get(i + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Plan => "plan",
            Phase::Design => "design",
            Phase::Do => "do",
            Phase::Check => "check",
            Phase::Act => "act",
            Phase::Report => "report",
            Phase::Completed => "completed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = KaizenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "plan" => Ok(Phase::Plan),
            "design" => Ok(Phase::Design),
            "do" => Ok(Phase::Do),
            "check" => Ok(Phase::Check),
            "act" => Ok(Phase::Act),
            "report" => Ok(Phase::Report),
            "completed" => Ok(Phase::Completed),
            _ => Err(KaizenError::InvalidPhase(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Transition validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Forward by exactly one phase.
    Sequential,
    /// The act -> check remediation loop.
    Iteration,
    /// Forward by more than one phase. Valid, but advisory.
    Skip,
}

#[derive(Debug, Clone)]
pub struct TransitionCheck {
    pub kind: TransitionKind,
    pub reason: String,
}

/// Validate a phase transition against the cycle.
///
/// Forward-by-one is always legal, plan -> do is never legal (design cannot
/// be skipped), act -> check is the one legal backward edge, and any other
/// forward jump is legal but flagged as a skip.
pub fn validate_transition(from: Phase, to: Phase) -> Result<TransitionCheck> {
    let invalid = |reason: String| KaizenError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
        reason,
    };

    let from_idx = from
        .cycle_index()
        .ok_or_else(|| invalid(format!("unknown source phase: {from}")))?;
    let to_idx = to
        .cycle_index()
        .ok_or_else(|| invalid(format!("unknown target phase: {to}")))?;

    if to_idx == from_idx + 1 {
        return Ok(TransitionCheck {
            kind: TransitionKind::Sequential,
            reason: "sequential phase transition".to_string(),
        });
    }

    if from == Phase::Plan && to == Phase::Do {
        return Err(invalid(
            "cannot skip the design phase: design is required before implementation".to_string(),
        ));
    }

    if from == Phase::Act && to == Phase::Check {
        return Ok(TransitionCheck {
            kind: TransitionKind::Iteration,
            reason: "iteration cycle: act back to check".to_string(),
        });
    }

    if to_idx > from_idx {
        return Ok(TransitionCheck {
            kind: TransitionKind::Skip,
            reason: format!("skipping phases from {from} to {to}"),
        });
    }

    Err(invalid(format!("cannot transition backward from {from} to {to}")))
}

// ---------------------------------------------------------------------------
// DocKind
// ---------------------------------------------------------------------------

/// Deliverable document kinds tracked per feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocKind {
    Plan,
    Design,
    Analysis,
    Report,
}

impl DocKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocKind::Plan => "plan",
            DocKind::Design => "design",
            DocKind::Analysis => "analysis",
            DocKind::Report => "report",
        }
    }

    /// The document produced by a given phase, if any. `do` and `act`
    /// produce code, not documents.
    pub fn for_phase(phase: Phase) -> Option<DocKind> {
        match phase {
            Phase::Plan => Some(DocKind::Plan),
            Phase::Design => Some(DocKind::Design),
            Phase::Check => Some(DocKind::Analysis),
            Phase::Report => Some(DocKind::Report),
            Phase::Do | Phase::Act | Phase::Completed => None,
        }
    }
}

impl fmt::Display for DocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocKind {
    type Err = KaizenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "plan" => Ok(DocKind::Plan),
            "design" => Ok(DocKind::Design),
            "analysis" => Ok(DocKind::Analysis),
            "report" => Ok(DocKind::Report),
            _ => Err(KaizenError::InvalidPhase(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Deliverables
// ---------------------------------------------------------------------------

/// Expected deliverables for a phase. File entries are project-relative
/// path templates with a `{feature}` placeholder.
#[derive(Debug, Clone, Copy)]
pub struct Deliverables {
    pub files: &'static [&'static str],
    pub description: &'static str,
}

pub fn deliverables(phase: Phase) -> Deliverables {
    match phase {
        Phase::Plan => Deliverables {
            files: &["docs/01-plan/features/{feature}.plan.md"],
            description: "Plan document with goals, scope, success criteria",
        },
        Phase::Design => Deliverables {
            files: &["docs/02-design/features/{feature}.design.md"],
            description: "Design document with architecture, data model, API spec",
        },
        Phase::Do => Deliverables {
            files: &[],
            description: "Implementation code matching design specifications",
        },
        Phase::Check => Deliverables {
            files: &["docs/03-analysis/{feature}.analysis.md"],
            description: "Gap analysis with match rate calculation",
        },
        Phase::Act => Deliverables {
            files: &[],
            description: "Gap fixes applied, match rate >= 90%",
        },
        Phase::Report => Deliverables {
            files: &["docs/04-report/{feature}.report.md"],
            description: "Completion report with metrics and learnings",
        },
        Phase::Completed => Deliverables {
            files: &[],
            description: "PDCA cycle complete",
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliverableCheck {
    pub complete: bool,
    pub missing: Vec<String>,
    pub found: Vec<String>,
}

/// Check which of a phase's expected deliverables exist on disk.
pub async fn check_deliverables(root: &Path, feature: &str, phase: Phase) -> DeliverableCheck {
    let mut missing = Vec::new();
    let mut found = Vec::new();

    for template in deliverables(phase).files {
        let rel = template.replace("{feature}", feature);
        if io::file_exists(&root.join(&rel)).await {
            found.push(rel);
        } else {
            missing.push(rel);
        }
    }

    DeliverableCheck {
        complete: missing.is_empty(),
        missing,
        found,
    }
}

/// Whether the plan document for a feature exists.
pub async fn plan_exists(root: &Path, feature: &str) -> bool {
    io::file_exists(&paths::doc_path(root, feature, DocKind::Plan)).await
}

/// Whether the design document for a feature exists.
pub async fn design_exists(root: &Path, feature: &str) -> bool {
    io::file_exists(&paths::doc_path(root, feature, DocKind::Design)).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn cycle_order() {
        assert_eq!(
            Phase::cycle(),
            &[
                Phase::Plan,
                Phase::Design,
                Phase::Do,
                Phase::Check,
                Phase::Act,
                Phase::Report
            ]
        );
    }

    #[test]
    fn next_walks_the_cycle_to_none() {
        let mut phase = Some(Phase::Plan);
        let mut seen = Vec::new();
        while let Some(p) = phase {
            seen.push(p);
            phase = p.next();
        }
        assert_eq!(seen, Phase::cycle());

        // Six applications starting from plan land on None
        let mut p = Some(Phase::Plan);
        for _ in 0..6 {
            p = p.and_then(Phase::next);
        }
        assert!(p.is_none());
    }

    #[test]
    fn completed_is_terminal() {
        assert_eq!(Phase::Completed.next(), None);
        assert_eq!(Phase::Completed.cycle_index(), None);
    }

    #[test]
    fn phase_string_roundtrip() {
        for phase in Phase::cycle() {
            assert_eq!(Phase::from_str(phase.as_str()).unwrap(), *phase);
        }
        assert_eq!(Phase::from_str("completed").unwrap(), Phase::Completed);
        assert!(Phase::from_str("bogus").is_err());
    }

    #[test]
    fn sequential_transitions_valid() {
        let check = validate_transition(Phase::Plan, Phase::Design).unwrap();
        assert_eq!(check.kind, TransitionKind::Sequential);
        let check = validate_transition(Phase::Act, Phase::Report).unwrap();
        assert_eq!(check.kind, TransitionKind::Sequential);
    }

    #[test]
    fn plan_to_do_is_invalid() {
        let err = validate_transition(Phase::Plan, Phase::Do).unwrap_err();
        assert!(err.to_string().contains("design"));
    }

    #[test]
    fn act_back_to_check_is_iteration() {
        let check = validate_transition(Phase::Act, Phase::Check).unwrap();
        assert_eq!(check.kind, TransitionKind::Iteration);
    }

    #[test]
    fn forward_jump_is_a_skip() {
        let check = validate_transition(Phase::Plan, Phase::Check).unwrap();
        assert_eq!(check.kind, TransitionKind::Skip);
        assert!(check.reason.contains("plan"));
        assert!(check.reason.contains("check"));
    }

    #[test]
    fn backward_transitions_invalid() {
        assert!(validate_transition(Phase::Design, Phase::Plan).is_err());
        assert!(validate_transition(Phase::Report, Phase::Do).is_err());
    }

    #[test]
    fn completed_is_not_transitionable() {
        assert!(validate_transition(Phase::Completed, Phase::Plan).is_err());
        assert!(validate_transition(Phase::Report, Phase::Completed).is_err());
    }

    #[test]
    fn doc_kind_for_phase() {
        assert_eq!(DocKind::for_phase(Phase::Check), Some(DocKind::Analysis));
        assert_eq!(DocKind::for_phase(Phase::Do), None);
    }

    #[tokio::test]
    async fn check_deliverables_reports_missing_and_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let plan = dir.path().join("docs/01-plan/features/auth.plan.md");
        std::fs::create_dir_all(plan.parent().unwrap()).unwrap();
        std::fs::write(&plan, "# plan").unwrap();

        let check = check_deliverables(dir.path(), "auth", Phase::Plan).await;
        assert!(check.complete);
        assert_eq!(check.found, vec!["docs/01-plan/features/auth.plan.md"]);

        let check = check_deliverables(dir.path(), "auth", Phase::Design).await;
        assert!(!check.complete);
        assert_eq!(check.missing, vec!["docs/02-design/features/auth.design.md"]);
    }
}
