use super::{missing_arg, not_initialized, soft_error, KaizenTool};
use crate::session::ServerContext;
use async_trait::async_trait;
use kaizen_core::chain;
use kaizen_core::guide;
use kaizen_core::phase::{validate_transition, Phase};
use kaizen_core::status::{HistoryEvent, StatusStore};
use serde_json::{json, Value};
use std::str::FromStr;

pub struct CompletePhaseTool;

fn recommendation_for(next: Phase, feature: &str) -> String {
    match next {
        Phase::Design => format!("Create design document: $kaizen design {feature}"),
        Phase::Do => format!(
            "Start implementation. Reference design at docs/02-design/features/{feature}.design.md"
        ),
        Phase::Check => format!("Run gap analysis: $kaizen analyze {feature}"),
        Phase::Act => "Fix identified gaps and iterate".to_string(),
        Phase::Report => format!("Generate completion report: $kaizen report {feature}"),
        _ => format!("Proceed to {next} phase"),
    }
}

#[async_trait]
impl KaizenTool for CompletePhaseTool {
    fn name(&self) -> &str {
        "kaizen_complete_phase"
    }

    fn description(&self) -> &str {
        "Mark a PDCA phase as complete. Validates the transition, advances the feature, appends history, and moves the task chain forward."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "feature": {
                    "type": "string",
                    "description": "Feature name"
                },
                "phase": {
                    "type": "string",
                    "enum": ["plan", "design", "do", "check", "act", "report"],
                    "description": "Phase being completed"
                }
            },
            "required": ["feature", "phase"]
        })
    }

    async fn call(&self, args: Value, ctx: &ServerContext) -> Result<Value, String> {
        let Some(root) = ctx.project_dir() else {
            return Ok(not_initialized());
        };
        let Some(feature) = args["feature"].as_str() else {
            return Ok(missing_arg("feature"));
        };
        let Some(phase_str) = args["phase"].as_str() else {
            return Ok(missing_arg("phase"));
        };
        let phase = match Phase::from_str(phase_str) {
            Ok(p) if p.cycle_index().is_some() => p,
            _ => {
                let names: Vec<&str> = Phase::cycle().iter().map(|p| p.as_str()).collect();
                return Ok(soft_error(format!(
                    "Invalid phase '{phase_str}'. Must be one of: {}",
                    names.join(", ")
                )));
            }
        };

        let store = StatusStore::new(&root);
        let mut status = store.read().await;
        if !status.features.contains_key(feature) {
            status = store
                .add_feature(feature, phase)
                .await
                .map_err(|e| e.to_string())?;
        }

        let current = status.features[feature].phase;
        let next = phase.next();

        // Completing a phase the feature is not in must still be a legal
        // move from where it actually is.
        if current != phase {
            if let Err(e) = validate_transition(current, phase) {
                return Ok(json!({
                    "error": format!("Cannot complete phase '{phase}': {e}"),
                    "currentPhase": current,
                    "suggestion": format!("Current phase is '{current}'. Complete it first."),
                }));
            }
        }

        let mut status = match next {
            Some(next_phase) => store
                .set_feature_phase(feature, next_phase)
                .await
                .map_err(|e| e.to_string())?,
            None => {
                // Report is the final phase: the feature is done.
                let mut status = store.read().await;
                if let Some(state) = status.features.get_mut(feature) {
                    state.phase = Phase::Completed;
                    state.completed_at = Some(chrono::Utc::now());
                }
                store.write(&mut status).await.map_err(|e| e.to_string())?;
                status
            }
        };

        status.history.push(HistoryEvent::PhaseComplete {
            feature: feature.to_string(),
            action: "phase_complete".to_string(),
            phase,
            next_phase: next.map(|p| p.to_string()).unwrap_or_else(|| "completed".to_string()),
            timestamp: chrono::Utc::now(),
        });
        store.write(&mut status).await.map_err(|e| e.to_string())?;

        let updated_chain = store
            .update_task_chain(feature, phase)
            .await
            .map_err(|e| e.to_string())?;

        ctx.cache_invalidate(&format!("status:{feature}"));
        ctx.cache_invalidate("status:all");
        ctx.cache_invalidate("init");

        let mut recommendation = match next {
            Some(next_phase) => recommendation_for(next_phase, feature),
            None => format!(
                "PDCA cycle complete for '{feature}'. Consider archiving: $kaizen archive {feature}"
            ),
        };
        if let Some(tasks) = &updated_chain {
            if let Some(active) = chain::active_task(tasks) {
                recommendation.push_str(&format!(
                    " Next task in chain: {}.",
                    active.phase.as_str().to_uppercase()
                ));
            }
        }

        let updated_phase = status.features[feature].phase;
        Ok(json!({
            "completed": phase,
            "nextPhase": next.map(|p| p.to_string()).unwrap_or_else(|| "completed".to_string()),
            "feature": feature,
            "recommendation": recommendation,
            "progress": guide::format_progress(updated_phase),
            "taskChain": updated_chain,
        }))
    }
}
