use super::{not_initialized, soft_error, KaizenTool};
use crate::session::ServerContext;
use async_trait::async_trait;
use kaizen_core::io;
use kaizen_core::phase::{self, Phase};
use serde_json::{json, Value};

pub struct CheckDeliverablesTool;

struct PipelinePhase {
    name: &'static str,
    files: &'static [&'static str],
    description: &'static str,
}

/// The nine pipeline phases and their expected artifacts.
const PIPELINE: [PipelinePhase; 9] = [
    PipelinePhase {
        name: "Schema & Terminology",
        files: &["docs/schema.md", "docs/terminology.md"],
        description: "Data model definitions and domain terminology",
    },
    PipelinePhase {
        name: "Convention",
        files: &["docs/convention.md", ".eslintrc", ".prettierrc"],
        description: "Coding conventions and style rules",
    },
    PipelinePhase {
        name: "Mockup",
        files: &["docs/mockup/"],
        description: "UI/UX mockups and wireframes",
    },
    PipelinePhase {
        name: "API",
        files: &["docs/api.md"],
        description: "API specification and endpoint definitions",
    },
    PipelinePhase {
        name: "Design System",
        files: &["src/components/", "docs/design-system.md"],
        description: "Component library and design tokens",
    },
    PipelinePhase {
        name: "UI Integration",
        files: &["src/pages/", "src/app/"],
        description: "Frontend-backend integration",
    },
    PipelinePhase {
        name: "SEO & Security",
        files: &["docs/security.md"],
        description: "SEO optimization and security hardening",
    },
    PipelinePhase {
        name: "Review",
        files: &["docs/review.md"],
        description: "Code review and architecture review results",
    },
    PipelinePhase {
        name: "Deployment",
        files: &["docs/deployment.md", ".github/workflows/"],
        description: "CI/CD pipeline and deployment configuration",
    },
];

/// Which PDCA phase a pipeline phase corresponds to, for the optional
/// per-feature deliverable check.
fn pdca_phase_for(pipeline_phase: u64) -> Option<Phase> {
    match pipeline_phase {
        1 | 2 => Some(Phase::Plan),
        3 | 4 => Some(Phase::Design),
        5 | 6 => Some(Phase::Do),
        7 | 8 => Some(Phase::Check),
        9 => Some(Phase::Report),
        _ => None,
    }
}

#[async_trait]
impl KaizenTool for CheckDeliverablesTool {
    fn name(&self) -> &str {
        "kaizen_check_deliverables"
    }

    fn description(&self) -> &str {
        "Check whether the required deliverables for a pipeline phase (1-9) exist, optionally including a feature's PDCA deliverables."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "phase": {
                    "type": "number",
                    "minimum": 1,
                    "maximum": 9,
                    "description": "Pipeline phase number (1-9)"
                },
                "feature": {
                    "type": "string",
                    "description": "Feature name"
                }
            },
            "required": ["phase"]
        })
    }

    async fn call(&self, args: Value, ctx: &ServerContext) -> Result<Value, String> {
        let Some(root) = ctx.project_dir() else {
            return Ok(not_initialized());
        };
        let phase_no = match args["phase"].as_u64() {
            Some(n) if (1..=9).contains(&n) => n,
            _ => return Ok(soft_error("phase must be a number between 1 and 9")),
        };
        let pipeline = &PIPELINE[(phase_no - 1) as usize];

        let mut found = Vec::new();
        let mut missing = Vec::new();
        for file in pipeline.files {
            if io::file_exists(&root.join(file)).await {
                found.push(*file);
            } else {
                missing.push(*file);
            }
        }

        let pdca_deliverables = match (args["feature"].as_str(), pdca_phase_for(phase_no)) {
            (Some(feature), Some(pdca_phase)) => {
                Some(phase::check_deliverables(&root, feature, pdca_phase).await)
            }
            _ => None,
        };

        let complete = missing.is_empty();
        let completion_rate = if pipeline.files.is_empty() {
            100
        } else {
            (found.len() as f64 / pipeline.files.len() as f64 * 100.0).round() as u32
        };

        Ok(json!({
            "phase": phase_no,
            "phaseName": pipeline.name,
            "description": pipeline.description,
            "complete": complete,
            "completionRate": completion_rate,
            "found": found,
            "missing": missing,
            "pdcaDeliverables": pdca_deliverables,
            "guidance": if complete {
                format!("Phase {phase_no} deliverables are complete. Proceed to next phase.")
            } else {
                format!("Missing deliverables: {}. Create these before proceeding.", missing.join(", "))
            },
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

    #[tokio::test]
    async fn phase_must_be_in_range() {
        let dir = TempDir::new().unwrap();
        for bad in [json!({}), json!({"phase": 0}), json!({"phase": 10}), json!({"phase": "4"})] {
            let result = CheckDeliverablesTool.call(bad, &ctx_for(&dir)).await.unwrap();
            assert!(result["error"].as_str().unwrap().contains("between 1 and 9"));
        }
    }

    #[tokio::test]
    async fn reports_found_and_missing_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/schema.md"), "# schema").unwrap();

        let result = CheckDeliverablesTool
            .call(json!({"phase": 1}), &ctx_for(&dir))
            .await
            .unwrap();

        assert_eq!(result["phaseName"], "Schema & Terminology");
        assert_eq!(result["complete"], false);
        assert_eq!(result["completionRate"], 50);
        assert_eq!(result["found"], json!(["docs/schema.md"]));
        assert_eq!(result["missing"], json!(["docs/terminology.md"]));
        assert!(result["guidance"].as_str().unwrap().contains("docs/terminology.md"));
    }

    #[tokio::test]
    async fn complete_phase_says_proceed() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/api.md"), "# api").unwrap();

        let result = CheckDeliverablesTool
            .call(json!({"phase": 4}), &ctx_for(&dir))
            .await
            .unwrap();
        assert_eq!(result["complete"], true);
        assert_eq!(result["completionRate"], 100);
    }

    #[tokio::test]
    async fn feature_adds_pdca_deliverable_check() {
        let dir = TempDir::new().unwrap();
        let plan = kaizen_core::paths::doc_path(dir.path(), "auth", kaizen_core::phase::DocKind::Plan);
        std::fs::create_dir_all(plan.parent().unwrap()).unwrap();
        std::fs::write(plan, "# plan").unwrap();

        let result = CheckDeliverablesTool
            .call(json!({"phase": 1, "feature": "auth"}), &ctx_for(&dir))
            .await
            .unwrap();

        assert_eq!(result["pdcaDeliverables"]["complete"], true);
        assert_eq!(
            result["pdcaDeliverables"]["found"][0],
            "docs/01-plan/features/auth.plan.md"
        );
    }
}
