use super::{missing_arg, not_initialized, soft_error, KaizenTool};
use crate::session::ServerContext;
use async_trait::async_trait;
use kaizen_core::level::{detect_level, ProjectLevel};
use kaizen_core::paths;
use kaizen_core::phase::{DocKind, Phase};
use kaizen_core::status::StatusStore;
use kaizen_core::template;
use serde_json::{json, Value};

pub struct PlanTool;

pub(crate) fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

pub(crate) fn level_from_args(args: &Value) -> Option<ProjectLevel> {
    match args["level"].as_str() {
        Some("Starter") => Some(ProjectLevel::Starter),
        Some("Dynamic") => Some(ProjectLevel::Dynamic),
        Some("Enterprise") => Some(ProjectLevel::Enterprise),
        _ => None,
    }
}

#[async_trait]
impl KaizenTool for PlanTool {
    fn name(&self) -> &str {
        "kaizen_plan"
    }

    fn description(&self) -> &str {
        "Start a PDCA cycle for a feature: registers it in the plan phase, creates its task chain, and returns the plan document template."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "feature": {
                    "type": "string",
                    "description": "Feature name in kebab-case"
                },
                "level": {
                    "type": "string",
                    "enum": ["Starter", "Dynamic", "Enterprise"],
                    "description": "Project level for template selection (auto-detected if omitted)"
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
        if let Err(e) = paths::validate_feature_name(feature) {
            return Ok(soft_error(e.to_string()));
        }

        let level = match level_from_args(&args) {
            Some(level) => level,
            None => detect_level(&root).await.level,
        };

        let template_name = template::select_template("plan", level);
        let resolved = template::resolve_variables(
            template::template_content(template_name),
            &[("FEATURE", feature), ("DATE", &today()), ("LEVEL", level.as_str())],
        );

        let store = StatusStore::new(&root);
        store
            .add_feature(feature, Phase::Plan)
            .await
            .map_err(|e| e.to_string())?;
        let status = store
            .ensure_task_chain(feature)
            .await
            .map_err(|e| e.to_string())?;

        ctx.cache_invalidate(&format!("status:{feature}"));
        ctx.cache_invalidate("status:all");

        Ok(json!({
            "template": resolved,
            "outputPath": paths::doc_rel_path(feature, DocKind::Plan),
            "phase": "plan",
            "level": level,
            "taskChain": status.features[feature].task_chain,
            "guidance": format!(
                "Fill in the template sections. When complete, call kaizen_complete_phase('{feature}', 'plan')."
            ),
        }))
    }
}
