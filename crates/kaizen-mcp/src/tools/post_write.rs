use super::pre_write::extract_feature_name;
use super::{missing_arg, not_initialized, KaizenTool};
use crate::session::ServerContext;
use async_trait::async_trait;
use kaizen_core::classify::{self, Classification};
use kaizen_core::paths;
use kaizen_core::phase::{self, DocKind, Phase};
use kaizen_core::status::StatusStore;
use serde_json::{json, Value};

pub struct PostWriteTool;

#[async_trait]
impl KaizenTool for PostWriteTool {
    fn name(&self) -> &str {
        "kaizen_post_write"
    }

    fn description(&self) -> &str {
        "Provide guidance after code changes. Suggests gap analysis for significant changes and lists next steps."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filePath": {
                    "type": "string",
                    "description": "Path of the file that was modified"
                },
                "linesChanged": {
                    "type": "number",
                    "description": "Number of lines changed"
                },
                "feature": {
                    "type": "string",
                    "description": "Feature name if known"
                }
            },
            "required": ["filePath"]
        })
    }

    async fn call(&self, args: Value, ctx: &ServerContext) -> Result<Value, String> {
        let Some(root) = ctx.project_dir() else {
            return Ok(not_initialized());
        };
        let Some(file_path) = args["filePath"].as_str() else {
            return Ok(missing_arg("filePath"));
        };
        let lines_changed = args["linesChanged"].as_u64().unwrap_or(0) as u32;

        let feature = args["feature"]
            .as_str()
            .map(str::to_string)
            .or_else(|| extract_feature_name(file_path, &root));

        let has_design = match &feature {
            Some(f) => phase::design_exists(&root, f).await,
            None => false,
        };

        let classification = classify::classify_by_lines(lines_changed);
        let suggest_gap_analysis =
            has_design && (classification >= Classification::Feature || lines_changed >= 50);

        let mut next_steps: Vec<String> = Vec::new();
        let mut guidance = match (&feature, has_design, suggest_gap_analysis) {
            (Some(f), _, true) => {
                next_steps.push("Run gap analysis when ready".to_string());
                format!(
                    "Significant changes detected ({lines_changed} lines). Consider running gap analysis: $kaizen analyze {f}"
                )
            }
            (Some(f), true, false) => {
                next_steps.push("Continue implementation".to_string());
                format!(
                    "Changes applied. Design document available at {}",
                    paths::doc_rel_path(f, DocKind::Design)
                )
            }
            (Some(f), false, _) => {
                next_steps.push("Consider creating a design document".to_string());
                format!("Changes applied to {f}. No design document found.")
            }
            (None, ..) => "Changes applied.".to_string(),
        };

        if lines_changed >= 200 {
            guidance.push_str(" Major change detected. Gap analysis is strongly recommended.");
            next_steps.push("Consider splitting large changes into smaller features".to_string());
        }

        if let Some(f) = &feature {
            let status = StatusStore::new(&root).read().await;
            if status.feature(f).map(|s| s.phase) == Some(Phase::Do) {
                next_steps.push("Complete remaining implementation".to_string());
                next_steps.push("Run gap analysis when implementation is complete".to_string());
            }
        }

        Ok(json!({
            "feature": feature,
            "filePath": file_path,
            "linesChanged": lines_changed,
            "taskClassification": classification,
            "hasDesign": has_design,
            "suggestGapAnalysis": suggest_gap_analysis,
            "guidance": guidance,
            "nextSteps": next_steps,
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

    fn write_design(dir: &TempDir, feature: &str) {
        let path = kaizen_core::paths::doc_path(dir.path(), feature, DocKind::Design);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "# design").unwrap();
    }

    #[tokio::test]
    async fn large_change_with_design_suggests_gap_analysis() {
        let dir = TempDir::new().unwrap();
        write_design(&dir, "auth");

        let result = PostWriteTool
            .call(
                json!({"filePath": "src/auth/login.ts", "linesChanged": 80, "feature": "auth"}),
                &ctx_for(&dir),
            )
            .await
            .unwrap();

        assert_eq!(result["suggestGapAnalysis"], true);
        assert!(result["guidance"].as_str().unwrap().contains("$kaizen analyze auth"));
    }

    #[tokio::test]
    async fn small_change_without_design_suggests_creating_one() {
        let dir = TempDir::new().unwrap();
        let result = PostWriteTool
            .call(
                json!({"filePath": "src/auth/login.ts", "linesChanged": 5}),
                &ctx_for(&dir),
            )
            .await
            .unwrap();

        assert_eq!(result["feature"], "auth");
        assert_eq!(result["suggestGapAnalysis"], false);
        assert_eq!(result["taskClassification"], "quick_fix");
        assert!(result["nextSteps"]
            .as_array()
            .unwrap()
            .iter()
            .any(|s| s.as_str().unwrap().contains("design document")));
    }

    #[tokio::test]
    async fn do_phase_adds_implementation_steps() {
        let dir = TempDir::new().unwrap();
        let store = StatusStore::new(dir.path());
        store.add_feature("auth", Phase::Do).await.unwrap();

        let result = PostWriteTool
            .call(
                json!({"filePath": "x.ts", "feature": "auth", "linesChanged": 10}),
                &ctx_for(&dir),
            )
            .await
            .unwrap();

        let steps: Vec<&str> = result["nextSteps"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s.as_str().unwrap())
            .collect();
        assert!(steps.contains(&"Complete remaining implementation"));
    }

    #[tokio::test]
    async fn major_change_appends_split_warning() {
        let dir = TempDir::new().unwrap();
        let result = PostWriteTool
            .call(
                json!({"filePath": "x.ts", "linesChanged": 250}),
                &ctx_for(&dir),
            )
            .await
            .unwrap();
        assert!(result["guidance"].as_str().unwrap().contains("Major change detected"));
    }
}
