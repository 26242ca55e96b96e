use super::{missing_arg, KaizenTool};
use crate::session::ServerContext;
use async_trait::async_trait;
use kaizen_core::config::Config;
use kaizen_core::guide;
use kaizen_core::level::{detect_level, level_profile};
use kaizen_core::status::StatusStore;
use kaizen_core::summary::get_compact_summary;
use serde_json::{json, Value};
use std::path::PathBuf;

pub struct InitTool;

#[async_trait]
impl KaizenTool for InitTool {
    fn name(&self) -> &str {
        "kaizen_init"
    }

    fn description(&self) -> &str {
        "Initialize a kaizen session. Call at the start of each session. Detects project level, reads workflow status, and returns session context."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "projectDir": {
                    "type": "string",
                    "description": "Absolute path to the project root directory"
                }
            },
            "required": ["projectDir"]
        })
    }

    async fn call(&self, args: Value, ctx: &ServerContext) -> Result<Value, String> {
        let Some(project_dir) = args["projectDir"].as_str() else {
            return Ok(missing_arg("projectDir"));
        };
        let root = PathBuf::from(project_dir);
        ctx.set_project_dir(root.clone());

        let config = Config::load(&root).await;
        let detection = detect_level(&root).await;
        let profile = level_profile(detection.level);

        // Refresh the session block and persist the detected level so the
        // document stays the single source of truth.
        let store = StatusStore::new(&root);
        let mut status = store.read().await;
        status.pipeline.level = detection.level;
        status.session.started_at = chrono::Utc::now();
        status.session.platform = Some("mcp".to_string());
        store.write(&mut status).await.map_err(|e| e.to_string())?;

        let guidance = match status.primary_feature.clone() {
            Some(primary) => guide::generate_guidance(&root, &status, &primary).await,
            None if status.active_features.is_empty() => format!(
                "Project detected as {} level. No active PDCA features. Start with: $kaizen plan <feature-name>",
                detection.level
            ),
            None => format!("Project detected as {} level.", detection.level),
        };

        let session_id = format!("kaizen-{}", uuid::Uuid::new_v4());
        let compact_summary = get_compact_summary(&status);

        let result = json!({
            "level": detection.level,
            "levelEvidence": detection.evidence,
            "recommendedSkill": profile.skill,
            "pipelinePhases": profile.pipeline_phases,
            "matchRateThreshold": config.pdca.match_rate_threshold,
            "pdcaStatus": {
                "activeFeatures": status.active_features,
                "primaryFeature": status.primary_feature,
                "features": serde_json::to_value(&status.features).map_err(|e| e.to_string())?,
            },
            "compactSummary": compact_summary,
            "contextRecoveryHint": "If context seems incomplete, call kaizen_get_status with mode: \"recovery\".",
            "sessionId": session_id,
            "guidance": guidance,
        });

        ctx.cache_put("init", result.clone());
        Ok(result)
    }
}
