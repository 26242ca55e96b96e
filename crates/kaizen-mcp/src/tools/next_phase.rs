use super::{missing_arg, not_initialized, KaizenTool};
use crate::session::ServerContext;
use async_trait::async_trait;
use kaizen_core::config::Config;
use kaizen_core::guide;
use kaizen_core::status::StatusStore;
use serde_json::{json, Value};

pub struct NextPhaseTool;

/// Map the suggested command verb back to the phase it drives toward.
fn phase_for_command(command: &str, current: &str) -> String {
    let verb = command
        .strip_prefix("$kaizen ")
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or("");
    match verb {
        "plan" => "plan",
        "design" => "design",
        "do" => "do",
        "analyze" => "check",
        "iterate" => "act",
        "report" => "report",
        _ => current,
    }
    .to_string()
}

#[async_trait]
impl KaizenTool for NextPhaseTool {
    fn name(&self) -> &str {
        "kaizen_next_phase"
    }

    fn description(&self) -> &str {
        "Get a recommendation for the next PDCA phase of a feature based on its current status and deliverables."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "feature": {
                    "type": "string",
                    "description": "Feature name"
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

        let store = StatusStore::new(&root);
        let status = store.read().await;

        let Some(state) = status.feature(feature) else {
            return Ok(json!({
                "feature": feature,
                "currentPhase": Value::Null,
                "nextPhase": "plan",
                "recommendation": format!("Feature '{feature}' is not tracked. Start with planning."),
                "command": format!("$kaizen plan {feature}"),
                "progress": "[No PDCA tracking]",
            }));
        };

        let config = Config::load(&root).await;
        let next =
            guide::suggest_next_action(&root, &status, feature, config.pdca.match_rate_threshold)
                .await;

        Ok(json!({
            "feature": feature,
            "currentPhase": state.phase,
            "nextPhase": phase_for_command(&next.command, state.phase.as_str()),
            "recommendation": next.reason,
            "command": next.command,
            "progress": guide::format_progress(state.phase),
            "matchRate": state.match_rate,
            "iterationCount": state.iteration_count,
        }))
    }
}
