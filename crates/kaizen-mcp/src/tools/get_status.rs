use super::{not_initialized, KaizenTool};
use crate::session::ServerContext;
use async_trait::async_trait;
use kaizen_core::config::Config;
use kaizen_core::guide;
use kaizen_core::paths;
use kaizen_core::phase::{self, DocKind};
use kaizen_core::status::StatusStore;
use kaizen_core::summary::{get_compact_summary, parse_compact_summary};
use serde_json::{json, Value};

/// History entries included in a recovery view.
const RECOVERY_HISTORY_LEN: usize = 20;

pub struct GetStatusTool;

#[async_trait]
impl KaizenTool for GetStatusTool {
    fn name(&self) -> &str {
        "kaizen_get_status"
    }

    fn description(&self) -> &str {
        "Get current workflow status for the project or a specific feature. Pass mode \"recovery\" to reconstruct session context after compaction."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "feature": {
                    "type": "string",
                    "description": "Feature name. If omitted, returns all active features."
                },
                "mode": {
                    "type": "string",
                    "enum": ["recovery"],
                    "description": "Recovery mode returns the full document view plus the compact summary"
                }
            }
        })
    }

    async fn call(&self, args: Value, ctx: &ServerContext) -> Result<Value, String> {
        let Some(root) = ctx.project_dir() else {
            return Ok(not_initialized());
        };
        let store = StatusStore::new(&root);

        if args["mode"].as_str() == Some("recovery") {
            let status = store.read().await;
            let compact = get_compact_summary(&status);
            let history_tail: Vec<&kaizen_core::status::HistoryEvent> = status
                .history
                .iter()
                .rev()
                .take(RECOVERY_HISTORY_LEN)
                .collect();
            return Ok(json!({
                "mode": "recovery",
                "compactSummary": compact,
                "summary": parse_compact_summary(&compact),
                "activeFeatures": status.active_features,
                "primaryFeature": status.primary_feature,
                "features": serde_json::to_value(&status.features).map_err(|e| e.to_string())?,
                "pipelineLevel": status.pipeline.level,
                "recentHistory": serde_json::to_value(&history_tail).map_err(|e| e.to_string())?,
            }));
        }

        if let Some(feature) = args["feature"].as_str() {
            let cache_key = format!("status:{feature}");
            if let Some(cached) = ctx.cache_get(&cache_key) {
                return Ok(cached);
            }

            let status = store.read().await;
            let Some(state) = status.feature(feature) else {
                return Ok(json!({
                    "feature": feature,
                    "error": format!("Feature '{feature}' not found in workflow status."),
                    "suggestion": format!("Start tracking with: $kaizen plan {feature}"),
                }));
            };

            let has_plan = phase::plan_exists(&root, feature).await;
            let has_design = phase::design_exists(&root, feature).await;
            let config = Config::load(&root).await;
            let next =
                guide::suggest_next_action(&root, &status, feature, config.pdca.match_rate_threshold)
                    .await;

            let result = json!({
                "feature": feature,
                "phase": state.phase,
                "matchRate": state.match_rate,
                "iterationCount": state.iteration_count,
                "documents": {
                    "plan": has_plan.then(|| paths::doc_rel_path(feature, DocKind::Plan)),
                    "design": has_design.then(|| paths::doc_rel_path(feature, DocKind::Design)),
                },
                "progress": guide::format_progress(state.phase),
                "nextAction": next.action,
                "nextCommand": next.command,
            });
            ctx.cache_put(&cache_key, result.clone());
            return Ok(result);
        }

        if let Some(cached) = ctx.cache_get("status:all") {
            return Ok(cached);
        }

        let status = store.read().await;
        let mut features = serde_json::Map::new();
        for name in &status.active_features {
            if let Some(state) = status.feature(name) {
                features.insert(
                    name.clone(),
                    json!({
                        "phase": state.phase,
                        "matchRate": state.match_rate,
                        "progress": guide::format_progress(state.phase),
                    }),
                );
            }
        }

        let result = json!({
            "activeFeatures": status.active_features,
            "primaryFeature": status.primary_feature,
            "features": features,
            "pipelineLevel": status.pipeline.level,
            "pipelinePhase": status.pipeline.current_phase,
        });
        ctx.cache_put("status:all", result.clone());
        Ok(result)
    }
}
