use super::{missing_arg, not_initialized, KaizenTool};
use crate::session::ServerContext;
use async_trait::async_trait;
use kaizen_core::classify;
use kaizen_core::config::Config;
use kaizen_core::paths;
use kaizen_core::phase::{self, DocKind};
use serde_json::{json, Value};
use std::path::Path;

pub struct PreWriteCheckTool;

/// Directories that never name a feature.
const SKIP_SEGMENTS: &[&str] = &[
    "src", "lib", "app", "components", "pages", "api", "utils", "hooks", "styles", "public",
    "assets",
];

/// Guess a feature name from a file path: the first path segment that is
/// not a well-known directory, has no extension, and is not hidden.
pub(crate) fn extract_feature_name(file_path: &str, root: &Path) -> Option<String> {
    let relative = Path::new(file_path)
        .strip_prefix(root)
        .unwrap_or(Path::new(file_path));

    for part in relative.iter() {
        let part = part.to_string_lossy();
        if !SKIP_SEGMENTS.contains(&part.as_ref()) && !part.starts_with('.') && !part.contains('.') {
            return Some(part.into_owned());
        }
    }

    let stem = Path::new(file_path).file_stem()?.to_string_lossy();
    if !stem.is_empty() && !SKIP_SEGMENTS.contains(&stem.as_ref()) {
        return Some(stem.into_owned());
    }
    None
}

#[async_trait]
impl KaizenTool for PreWriteCheckTool {
    fn name(&self) -> &str {
        "kaizen_pre_write_check"
    }

    fn description(&self) -> &str {
        "Check PDCA compliance before writing or editing source code. Reports whether plan and design documents exist and provides guidance."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filePath": {
                    "type": "string",
                    "description": "Path of the file being written or edited"
                },
                "feature": {
                    "type": "string",
                    "description": "Feature name if known (auto-detected from path if omitted)"
                },
                "estimatedLines": {
                    "type": "number",
                    "description": "Estimated lines of code to be changed"
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

        let feature = args["feature"]
            .as_str()
            .map(str::to_string)
            .or_else(|| extract_feature_name(file_path, &root));

        let (has_plan, has_design) = match &feature {
            Some(f) => (
                phase::plan_exists(&root, f).await,
                phase::design_exists(&root, f).await,
            ),
            None => (false, false),
        };

        let estimated_lines = args["estimatedLines"].as_u64().unwrap_or(50) as u32;
        let classification = classify::classify_by_lines(estimated_lines);

        let config = Config::load(&root).await;
        let conventions = &config.conventions;
        let convention_hints = vec![
            format!("Components: {}", conventions.components),
            format!("Functions: {}", conventions.functions),
            format!("Files: {}", conventions.files),
            format!("Constants: {}", conventions.constants),
        ];

        let mut guidance = match (&feature, has_plan, has_design) {
            (Some(f), _, true) => format!(
                "Design document exists. Reference: {}",
                paths::doc_rel_path(f, DocKind::Design)
            ),
            (Some(f), true, false) => format!(
                "Plan exists but no design document. Consider creating design first: $kaizen design {f}"
            ),
            (Some(f), false, false) => {
                format!("No plan or design documents found for '{f}'. Consider: $kaizen plan {f}")
            }
            (None, ..) => "No feature detected from file path. Proceed with caution.".to_string(),
        };
        if classification.pdca_required() && !has_design {
            guidance.push_str(" Warning: Task classified as requiring PDCA but no design document exists.");
        }

        Ok(json!({
            "allowed": true,
            "feature": feature,
            "hasDesign": has_design,
            "hasPlan": has_plan,
            "designPath": feature.as_deref().filter(|_| has_design).map(|f| paths::doc_rel_path(f, DocKind::Design)),
            "planPath": feature.as_deref().filter(|_| has_plan).map(|f| paths::doc_rel_path(f, DocKind::Plan)),
            "guidance": guidance,
            "taskClassification": classification,
            "pdcaRequired": classification.pdca_required(),
            "conventionHints": convention_hints,
        }))
    }
}
