use super::{missing_arg, KaizenTool};
use crate::session::ServerContext;
use async_trait::async_trait;
use kaizen_core::intent;
use kaizen_core::phase;
use kaizen_core::status::StatusStore;
use serde_json::{json, Value};

pub struct AnalyzePromptTool;

#[async_trait]
impl KaizenTool for AnalyzePromptTool {
    fn name(&self) -> &str {
        "kaizen_analyze_prompt"
    }

    fn description(&self) -> &str {
        "Analyze a user prompt: detect language, match skill and agent triggers, score ambiguity, and extract feature intent. Supports 8 languages (en, ko, ja, zh, es, fr, de, it)."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "User's input text to analyze"
                }
            },
            "required": ["prompt"]
        })
    }

    async fn call(&self, args: Value, ctx: &ServerContext) -> Result<Value, String> {
        let Some(prompt) = args["prompt"].as_str() else {
            return Ok(missing_arg("prompt"));
        };

        let language = intent::detect_language(prompt);
        let magic = intent::magic_word(prompt);

        let skill_matches = intent::match_skill_triggers(prompt);
        let agent_matches = intent::match_agent_triggers(prompt);
        let implicit = intent::implicit_triggers(prompt);

        let score = intent::ambiguity_score(prompt);
        let clarification_needed = intent::needs_clarification(score);

        let feature_intent = intent::detect_feature_intent(prompt);

        // PDCA recommendation needs a bound project; without one the
        // analysis still runs, just without workflow context.
        let mut pdca_recommendation = Value::Null;
        if let (Some(root), Some(feature)) = (ctx.project_dir(), feature_intent.feature.as_deref()) {
            let has_plan = phase::plan_exists(&root, feature).await;
            let has_design = phase::design_exists(&root, feature).await;
            let status = StatusStore::new(&root).read().await;

            pdca_recommendation = if status.feature(feature).is_none() && !has_plan {
                json!(format!("No plan document found. Suggest: $kaizen plan {feature}"))
            } else if has_plan && !has_design {
                json!(format!("Plan exists but no design. Suggest: $kaizen design {feature}"))
            } else if has_design {
                json!("Design exists. Reference during implementation.")
            } else {
                Value::Null
            };
        }

        let suggested_action = if clarification_needed {
            "Ask clarifying questions before proceeding".to_string()
        } else if let Some(first) = skill_matches.first() {
            format!("Use {} skill", first.name)
        } else if let Some(feature) = feature_intent.feature.as_deref() {
            format!("Check PDCA status for {feature} feature")
        } else {
            "Proceed with the request".to_string()
        };

        let clarifying_questions = if clarification_needed {
            intent::clarifying_questions(prompt, &skill_matches)
        } else {
            Vec::new()
        };

        let skills: Vec<&str> = skill_matches.iter().map(|m| m.name.as_str()).collect();
        Ok(json!({
            "language": language,
            "intent": feature_intent,
            "triggers": {
                "skills": skills,
                "agents": agent_matches.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
                "implicit": implicit,
                "keywords": skills.iter().copied().chain(implicit.iter().copied()).collect::<Vec<_>>(),
            },
            "ambiguity": {
                "score": score,
                "needsClarification": clarification_needed,
                "magicWord": magic,
            },
            "clarifyingQuestions": clarifying_questions,
            "suggestedAction": suggested_action,
            "pdcaRecommendation": pdca_recommendation,
        }))
    }
}
