use super::plan::level_from_args;
use super::{missing_arg, soft_error, KaizenTool};
use crate::session::ServerContext;
use async_trait::async_trait;
use kaizen_core::level::{detect_level, ProjectLevel};
use kaizen_core::template;
use serde_json::{json, Value};

pub struct SelectTemplateTool;

const VALID_KINDS: &[&str] = &["plan", "design", "analysis", "report", "do"];

#[async_trait]
impl KaizenTool for SelectTemplateTool {
    fn name(&self) -> &str {
        "kaizen_select_template"
    }

    fn description(&self) -> &str {
        "Select the appropriate document template for a PDCA phase and project level."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "phase": {
                    "type": "string",
                    "enum": VALID_KINDS,
                    "description": "Document kind"
                },
                "level": {
                    "type": "string",
                    "enum": ["Starter", "Dynamic", "Enterprise"],
                    "description": "Project level (auto-detected if omitted)"
                }
            },
            "required": ["phase"]
        })
    }

    async fn call(&self, args: Value, ctx: &ServerContext) -> Result<Value, String> {
        let Some(kind) = args["phase"].as_str() else {
            return Ok(missing_arg("phase"));
        };
        if !VALID_KINDS.contains(&kind) {
            return Ok(soft_error(format!(
                "Invalid phase '{kind}'. Must be one of: {}",
                VALID_KINDS.join(", ")
            )));
        }

        let level = match level_from_args(&args) {
            Some(level) => level,
            None => match ctx.project_dir() {
                Some(root) => detect_level(&root).await.level,
                None => ProjectLevel::Dynamic,
            },
        };

        let template_name = template::select_template(kind, level);
        Ok(json!({
            "phase": kind,
            "level": level,
            "templateName": template_name,
            "template": template::template_content(template_name),
            "availableTemplates": template::TEMPLATE_NAMES,
            "guidance": format!(
                "Use this template for the {kind} phase. Replace ${{FEATURE}}, ${{DATE}}, and ${{LEVEL}} placeholders."
            ),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn phase_is_validated() {
        let ctx = ServerContext::new();
        let result = SelectTemplateTool.call(json!({}), &ctx).await.unwrap();
        assert!(result["error"].as_str().unwrap().contains("phase"));

        let result = SelectTemplateTool
            .call(json!({"phase": "bogus"}), &ctx)
            .await
            .unwrap();
        assert!(result["error"].as_str().unwrap().contains("Invalid phase"));
    }

    #[tokio::test]
    async fn unbound_session_defaults_to_dynamic() {
        let ctx = ServerContext::new();
        let result = SelectTemplateTool
            .call(json!({"phase": "design"}), &ctx)
            .await
            .unwrap();
        assert_eq!(result["level"], "Dynamic");
        assert_eq!(result["templateName"], "design.template.md");
    }

    #[tokio::test]
    async fn explicit_level_picks_the_variant() {
        let ctx = ServerContext::new();
        let result = SelectTemplateTool
            .call(json!({"phase": "design", "level": "Enterprise"}), &ctx)
            .await
            .unwrap();
        assert_eq!(result["templateName"], "design-enterprise.template.md");
        assert!(result["template"].as_str().unwrap().contains("Enterprise"));
    }

    #[tokio::test]
    async fn bound_session_detects_level() {
        let dir = TempDir::new().unwrap();
        let ctx = ServerContext::with_root(dir.path().to_path_buf());
        let result = SelectTemplateTool
            .call(json!({"phase": "design"}), &ctx)
            .await
            .unwrap();
        assert_eq!(result["level"], "Starter");
        assert_eq!(result["templateName"], "design-starter.template.md");
    }
}
