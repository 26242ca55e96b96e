use super::{soft_error, KaizenTool};
use crate::session::ServerContext;
use async_trait::async_trait;
use kaizen_core::level::{detect_level, level_profile};
use serde_json::{json, Value};
use std::path::PathBuf;

pub struct DetectLevelTool;

#[async_trait]
impl KaizenTool for DetectLevelTool {
    fn name(&self) -> &str {
        "kaizen_detect_level"
    }

    fn description(&self) -> &str {
        "Detect the project level (Starter/Dynamic/Enterprise) from directory structure and config files."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "projectDir": {
                    "type": "string",
                    "description": "Project root directory path (defaults to the session's bound root)"
                }
            }
        })
    }

    async fn call(&self, args: Value, ctx: &ServerContext) -> Result<Value, String> {
        let root = match args["projectDir"].as_str() {
            Some(dir) => PathBuf::from(dir),
            None => match ctx.project_dir() {
                Some(root) => root,
                None => {
                    return Ok(soft_error(
                        "projectDir is required. Provide it as an argument or call kaizen_init first.",
                    ))
                }
            },
        };

        let detection = detect_level(&root).await;
        let profile = level_profile(detection.level);

        Ok(json!({
            "level": detection.level,
            "evidence": detection.evidence,
            "confidence": detection.confidence,
            "recommendedSkill": profile.skill,
            "pipelinePhases": profile.pipeline_phases,
            "skipPhases": profile.skip_phases,
            "description": profile.description,
        }))
    }
}
