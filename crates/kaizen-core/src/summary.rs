use crate::status::WorkflowStatus;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Compact summary codec
// ---------------------------------------------------------------------------
//
// Format (stable contract):
//   "{feature}|{phase}|{matchRate}%|iter:{iterationCount}|tasks:{chainLength}"
//
// The encoding is deliberately lossy: it captures just enough of the
// primary feature's state to rebuild context after a session has been
// compacted away. Feature names containing '|' do not survive a round
// trip.

/// Encode the primary feature's state as a compact summary string.
pub fn get_compact_summary(status: &WorkflowStatus) -> String {
    let Some(primary) = status.primary_feature.as_deref() else {
        return "no-feature|none|0%|iter:0|tasks:0".to_string();
    };

    let Some(feature) = status.features.get(primary) else {
        return format!("{primary}|unknown|0%|iter:0|tasks:0");
    };

    let match_rate = feature.match_rate.map(|r| r.round() as i64).unwrap_or(0);
    format!(
        "{primary}|{phase}|{match_rate}%|iter:{iter}|tasks:{tasks}",
        phase = feature.phase,
        iter = feature.iteration_count,
        tasks = feature.task_count(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactSummary {
    pub feature: String,
    pub phase: String,
    pub match_rate: u32,
    pub iteration_count: u32,
    pub task_count: u32,
}

/// Decode a compact summary string. Returns `None` for anything with fewer
/// than five segments; malformed numeric segments decode as 0.
pub fn parse_compact_summary(summary: &str) -> Option<CompactSummary> {
    let parts: Vec<&str> = summary.split('|').collect();
    if parts.len() < 5 {
        return None;
    }

    let number = |s: &str| s.parse::<u32>().unwrap_or(0);
    Some(CompactSummary {
        feature: parts[0].to_string(),
        phase: parts[1].to_string(),
        match_rate: number(parts[2].trim_end_matches('%')),
        iteration_count: number(parts[3].strip_prefix("iter:").unwrap_or(parts[3])),
        task_count: number(parts[4].strip_prefix("tasks:").unwrap_or(parts[4])),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;
    use crate::status::{FeatureState, StatusStore};
    use tempfile::TempDir;

    fn status_with(feature: &str, state: FeatureState) -> WorkflowStatus {
        let mut status = WorkflowStatus::new();
        status.primary_feature = Some(feature.to_string());
        status.active_features.push(feature.to_string());
        status.features.insert(feature.to_string(), state);
        status
    }

    #[test]
    fn summary_for_primary_feature() {
        let mut state = FeatureState::new(Phase::Design);
        state.match_rate = Some(85.0);
        state.iteration_count = 2;
        state.task_chain = Some(crate::chain::create_chain("user-auth").tasks);

        let status = status_with("user-auth", state);
        assert_eq!(get_compact_summary(&status), "user-auth|design|85%|iter:2|tasks:5");
    }

    #[test]
    fn null_match_rate_encodes_as_zero() {
        let status = status_with("test", FeatureState::new(Phase::Plan));
        assert_eq!(get_compact_summary(&status), "test|plan|0%|iter:0|tasks:0");
    }

    #[test]
    fn match_rate_rounds_to_nearest_integer() {
        let mut state = FeatureState::new(Phase::Check);
        state.match_rate = Some(85.7);
        state.iteration_count = 1;
        let status = status_with("feat", state);
        assert!(get_compact_summary(&status).contains("86%"));
    }

    #[test]
    fn no_primary_feature_sentinel() {
        let status = WorkflowStatus::new();
        assert_eq!(get_compact_summary(&status), "no-feature|none|0%|iter:0|tasks:0");
    }

    #[test]
    fn primary_missing_from_features_map() {
        let mut status = WorkflowStatus::new();
        status.primary_feature = Some("missing".to_string());
        assert_eq!(get_compact_summary(&status), "missing|unknown|0%|iter:0|tasks:0");
    }

    #[test]
    fn parse_recovers_fields() {
        let parsed = parse_compact_summary("user-auth|design|85%|iter:2|tasks:5").unwrap();
        assert_eq!(
            parsed,
            CompactSummary {
                feature: "user-auth".to_string(),
                phase: "design".to_string(),
                match_rate: 85,
                iteration_count: 2,
                task_count: 5,
            }
        );
    }

    #[test]
    fn parse_rejects_short_input() {
        assert!(parse_compact_summary("a|b|c").is_none());
        assert!(parse_compact_summary("").is_none());
    }

    #[test]
    fn parse_defaults_malformed_numbers_to_zero() {
        let parsed = parse_compact_summary("feat|plan|x%|iter:y|tasks:z").unwrap();
        assert_eq!(parsed.match_rate, 0);
        assert_eq!(parsed.iteration_count, 0);
        assert_eq!(parsed.task_count, 0);
    }

    #[test]
    fn round_trip_is_exact_for_well_formed_state() {
        let mut state = FeatureState::new(Phase::Check);
        state.match_rate = Some(92.0);
        state.iteration_count = 3;
        state.task_chain = Some(crate::chain::create_chain("billing").tasks);
        let status = status_with("billing", state);

        let parsed = parse_compact_summary(&get_compact_summary(&status)).unwrap();
        assert_eq!(parsed.feature, "billing");
        assert_eq!(parsed.phase, "check");
        assert_eq!(parsed.match_rate, 92);
        assert_eq!(parsed.iteration_count, 3);
        assert_eq!(parsed.task_count, 5);
    }

    #[test]
    fn pipe_in_feature_name_is_lossy() {
        let status = status_with("a|b", FeatureState::new(Phase::Plan));
        let parsed = parse_compact_summary(&get_compact_summary(&status)).unwrap();
        assert_eq!(parsed.feature, "a");
        assert_ne!(parsed.feature, "a|b");
    }

    #[tokio::test]
    async fn fresh_project_scenario() {
        let dir = TempDir::new().unwrap();
        let store = StatusStore::new(dir.path());

        store.add_feature("auth", Phase::Plan).await.unwrap();
        let status = store.set_feature_phase("auth", Phase::Design).await.unwrap();

        assert_eq!(get_compact_summary(&status), "auth|design|0%|iter:0|tasks:0");
    }
}
