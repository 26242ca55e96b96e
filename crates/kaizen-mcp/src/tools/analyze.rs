use super::plan::today;
use super::{missing_arg, not_initialized, KaizenTool};
use crate::session::ServerContext;
use async_trait::async_trait;
use kaizen_core::level::detect_level;
use kaizen_core::paths;
use kaizen_core::phase::{self, DocKind, Phase};
use kaizen_core::status::StatusStore;
use kaizen_core::template;
use serde_json::{json, Value};

pub struct AnalyzeTool;

#[async_trait]
impl KaizenTool for AnalyzeTool {
    fn name(&self) -> &str {
        "kaizen_analyze"
    }

    fn description(&self) -> &str {
        "Start a gap analysis comparing the design document against the implementation. Moves the feature to the check phase and bumps its iteration counter."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "feature": {
                    "type": "string",
                    "description": "Feature name to analyze"
                }
            },
            "required": ["feature"]
        })
    }

    async fn call(&self, args: Value, ctx: &ServerContext) -> Result<Value, String> {
        let Some(root) = ctx.project_dir() else {
            return Ok(not_initialized());
        };
        let Some(feature) = args["feature"].as_str() else {
            return Ok(missing_arg("feature"));
        };

        if !phase::design_exists(&root, feature).await {
            return Ok(json!({
                "error": format!("Design document not found for '{feature}'."),
                "guidance": format!("Create design first: $kaizen design {feature}"),
                "designPath": paths::doc_rel_path(feature, DocKind::Design),
            }));
        }

        let level = detect_level(&root).await.level;
        let template_name = template::select_template("analysis", level);
        let resolved = template::resolve_variables(
            template::template_content(template_name),
            &[("FEATURE", feature), ("DATE", &today()), ("LEVEL", level.as_str())],
        );

        let store = StatusStore::new(&root);
        let mut status = store.read().await;
        if status.features.contains_key(feature) {
            store
                .set_feature_phase(feature, Phase::Check)
                .await
                .map_err(|e| e.to_string())?;
            status = store
                .increment_iteration(feature)
                .await
                .map_err(|e| e.to_string())?;
            ctx.cache_invalidate(&format!("status:{feature}"));
            ctx.cache_invalidate("status:all");
        }

        let state = status.feature(feature);
        Ok(json!({
            "feature": feature,
            "designPath": paths::doc_rel_path(feature, DocKind::Design),
            "analysisPath": paths::doc_rel_path(feature, DocKind::Analysis),
            "matchRate": state.and_then(|s| s.match_rate),
            "iterationCount": state.map(|s| s.iteration_count).unwrap_or(1),
            "template": resolved,
            "guidance": format!(
                "Read the design document and compare with the implementation. Write analysis results to {}. Match rate = implemented items / total design items * 100.",
                paths::doc_rel_path(feature, DocKind::Analysis)
            ),
            "nextAction": {
                "ifAbove90": format!("$kaizen report {feature}"),
                "ifBelow90": format!("Fix gaps and re-run: $kaizen analyze {feature}"),
            },
        }))
    }
}
