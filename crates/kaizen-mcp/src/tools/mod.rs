use crate::session::ServerContext;
use async_trait::async_trait;
use serde_json::Value;

pub mod analyze;
pub mod analyze_prompt;
pub mod check_deliverables;
pub mod classify_task;
pub mod complete_phase;
pub mod design;
pub mod detect_level;
pub mod get_status;
pub mod init;
pub mod memory_read;
pub mod memory_write;
pub mod next_phase;
pub mod plan;
pub mod post_write;
pub mod pre_write;
pub mod select_template;

// ---------------------------------------------------------------------------
// KaizenTool
// ---------------------------------------------------------------------------

/// One remote-callable tool. `call` errors are caught at the registry
/// boundary and rendered as tool-level failure envelopes; domain
/// precondition failures are returned as ordinary `Ok` payloads carrying
/// an `error` field (see `soft_error`).
#[async_trait]
pub trait KaizenTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> Value;
    async fn call(&self, args: Value, ctx: &ServerContext) -> Result<Value, String>;
}

/// The static tool catalog. Registration happens here and nowhere else,
/// so the catalog is enumerable without filesystem discovery.
pub fn all_tools() -> Vec<Box<dyn KaizenTool>> {
    vec![
        Box::new(init::InitTool),
        Box::new(get_status::GetStatusTool),
        Box::new(pre_write::PreWriteCheckTool),
        Box::new(post_write::PostWriteTool),
        Box::new(complete_phase::CompletePhaseTool),
        Box::new(plan::PlanTool),
        Box::new(design::DesignTool),
        Box::new(analyze::AnalyzeTool),
        Box::new(next_phase::NextPhaseTool),
        Box::new(analyze_prompt::AnalyzePromptTool),
        Box::new(classify_task::ClassifyTaskTool),
        Box::new(detect_level::DetectLevelTool),
        Box::new(select_template::SelectTemplateTool),
        Box::new(check_deliverables::CheckDeliverablesTool),
        Box::new(memory_read::MemoryReadTool),
        Box::new(memory_write::MemoryWriteTool),
    ]
}

/// Look up and run a tool. An unregistered name is a thrown tool error,
/// not a protocol error.
pub async fn invoke(
    tools: &[Box<dyn KaizenTool>],
    name: &str,
    args: Value,
    ctx: &ServerContext,
) -> Result<Value, String> {
    let tool = tools
        .iter()
        .find(|t| t.name() == name)
        .ok_or_else(|| format!("Unknown tool: {name}"))?;
    tool.call(args, ctx).await
}

// ---------------------------------------------------------------------------
// Soft error helpers
// ---------------------------------------------------------------------------

/// A precondition failure delivered as a successful result.
pub(crate) fn soft_error(message: impl Into<String>) -> Value {
    serde_json::json!({ "error": message.into() })
}

pub(crate) fn not_initialized() -> Value {
    soft_error("Session not initialized. Call kaizen_init first.")
}

pub(crate) fn missing_arg(name: &str) -> Value {
    soft_error(format!("{name} is required"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
