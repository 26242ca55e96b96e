use super::{soft_error, KaizenTool};
use crate::session::ServerContext;
use async_trait::async_trait;
use kaizen_core::classify::{self, Classification};
use serde_json::{json, Value};

pub struct ClassifyTaskTool;

fn recommendation(classification: Classification) -> &'static str {
    match classification {
        Classification::QuickFix => "Quick fix. PDCA is optional. Proceed directly.",
        Classification::MinorChange => "Minor change. PDCA recommended but not required.",
        Classification::Feature => {
            "Feature-level change. Create plan and design documents before implementation."
        }
        Classification::MajorFeature => {
            "Major feature. Create plan and design documents. Consider splitting into smaller features."
        }
    }
}

#[async_trait]
impl KaizenTool for ClassifyTaskTool {
    fn name(&self) -> &str {
        "kaizen_classify_task"
    }

    fn description(&self) -> &str {
        "Classify task size from estimated lines of code and an optional description."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "estimatedLines": {
                    "type": "number",
                    "description": "Estimated lines of code to be changed"
                },
                "description": {
                    "type": "string",
                    "description": "Brief task description"
                }
            },
            "required": ["estimatedLines"]
        })
    }

    async fn call(&self, args: Value, _ctx: &ServerContext) -> Result<Value, String> {
        let Some(estimated_lines) = args["estimatedLines"].as_u64() else {
            return Ok(soft_error("estimatedLines is required and must be a number"));
        };
        let estimated_lines = estimated_lines as u32;

        let classification = classify::classify(estimated_lines, args["description"].as_str());

        Ok(json!({
            "classification": classification,
            "label": classification.label(),
            "estimatedLines": estimated_lines,
            "pdcaRequired": classification.pdca_required(),
            "pdcaRecommended": classification.pdca_recommended(),
            "recommendation": recommendation(classification),
        }))
    }
}
