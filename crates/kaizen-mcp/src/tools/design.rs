use super::plan::{level_from_args, today};
use super::{missing_arg, not_initialized, KaizenTool};
use crate::session::ServerContext;
use async_trait::async_trait;
use kaizen_core::level::detect_level;
use kaizen_core::paths;
use kaizen_core::phase::{self, DocKind, Phase};
use kaizen_core::status::StatusStore;
use kaizen_core::template;
use serde_json::{json, Value};

pub struct DesignTool;

#[async_trait]
impl KaizenTool for DesignTool {
    fn name(&self) -> &str {
        "kaizen_design"
    }

    fn description(&self) -> &str {
        "Generate a design document template for a feature. Requires the plan document to exist; moves the feature into the design phase."
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
                    "description": "Project level for template selection"
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

        if !phase::plan_exists(&root, feature).await {
            return Ok(json!({
                "error": format!("Plan document not found for '{feature}'."),
                "guidance": format!("Create plan first: $kaizen plan {feature}"),
                "planPath": paths::doc_rel_path(feature, DocKind::Plan),
            }));
        }

        let level = match level_from_args(&args) {
            Some(level) => level,
            None => detect_level(&root).await.level,
        };

        let template_name = template::select_template("design", level);
        let resolved = template::resolve_variables(
            template::template_content(template_name),
            &[("FEATURE", feature), ("DATE", &today()), ("LEVEL", level.as_str())],
        );

        let store = StatusStore::new(&root);
        if store.read().await.features.contains_key(feature) {
            store
                .set_feature_phase(feature, Phase::Design)
                .await
                .map_err(|e| e.to_string())?;
            ctx.cache_invalidate(&format!("status:{feature}"));
            ctx.cache_invalidate("status:all");
        }

        Ok(json!({
            "template": resolved,
            "outputPath": paths::doc_rel_path(feature, DocKind::Design),
            "phase": "design",
            "level": level,
            "templateName": template_name,
            "planReference": paths::doc_rel_path(feature, DocKind::Plan),
            "guidance": format!(
                "Reference the plan document for requirements. Fill in architecture, data model, and API sections. When complete, call kaizen_complete_phase('{feature}', 'design')."
            ),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ctx_for(dir: &TempDir) -> ServerContext {
        ServerContext::with_root(dir.path().to_path_buf())
    }

    fn write_plan(dir: &TempDir, feature: &str) {
        let path = paths::doc_path(dir.path(), feature, DocKind::Plan);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "# plan").unwrap();
    }

    #[tokio::test]
    async fn design_requires_plan_document() {
        let dir = TempDir::new().unwrap();
        let result = DesignTool
            .call(json!({"feature": "auth"}), &ctx_for(&dir))
            .await
            .unwrap();
        assert!(result["error"].as_str().unwrap().contains("Plan document not found"));
        assert_eq!(result["planPath"], "docs/01-plan/features/auth.plan.md");
    }

    #[tokio::test]
    async fn design_moves_tracked_feature_forward() {
        let dir = TempDir::new().unwrap();
        write_plan(&dir, "auth");
        let store = StatusStore::new(dir.path());
        store.add_feature("auth", Phase::Plan).await.unwrap();

        let result = DesignTool
            .call(json!({"feature": "auth"}), &ctx_for(&dir))
            .await
            .unwrap();

        assert_eq!(result["phase"], "design");
        assert_eq!(result["templateName"], "design-starter.template.md");
        assert!(result["template"].as_str().unwrap().contains("auth"));

        let status = store.read().await;
        assert_eq!(status.features["auth"].phase, Phase::Design);
    }

    #[tokio::test]
    async fn design_on_untracked_feature_returns_template_only() {
        let dir = TempDir::new().unwrap();
        write_plan(&dir, "auth");

        let result = DesignTool
            .call(json!({"feature": "auth"}), &ctx_for(&dir))
            .await
            .unwrap();
        assert_eq!(result["phase"], "design");

        let status = StatusStore::new(dir.path()).read().await;
        assert!(status.features.is_empty());
    }
}
