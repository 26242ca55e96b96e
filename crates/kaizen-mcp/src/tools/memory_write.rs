use super::{missing_arg, not_initialized, KaizenTool};
use crate::session::ServerContext;
use async_trait::async_trait;
use kaizen_core::memory::MemoryStore;
use serde_json::{json, Value};

pub struct MemoryWriteTool;

#[async_trait]
impl KaizenTool for MemoryWriteTool {
    fn name(&self) -> &str {
        "kaizen_memory_write"
    }

    fn description(&self) -> &str {
        "Write to kaizen session memory (.kaizen/memory.json). Persists across sessions."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "key": {
                    "type": "string",
                    "description": "Memory key"
                },
                "value": {
                    "description": "Value to store (any JSON-serializable type)"
                }
            },
            "required": ["key", "value"]
        })
    }

    async fn call(&self, args: Value, ctx: &ServerContext) -> Result<Value, String> {
        let Some(root) = ctx.project_dir() else {
            return Ok(not_initialized());
        };
        let Some(key) = args["key"].as_str() else {
            return Ok(missing_arg("key"));
        };
        let Some(value) = args.get("value") else {
            return Ok(missing_arg("value"));
        };

        let doc = MemoryStore::new(&root)
            .write_key(key, value.clone())
            .await
            .map_err(|e| e.to_string())?;

        ctx.cache_invalidate("memory");

        Ok(json!({
            "key": key,
            "value": value,
            "written": true,
            "lastUpdated": doc.last_updated,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::memory_read::MemoryReadTool;
    use tempfile::TempDir;

    fn ctx_for(dir: &TempDir) -> ServerContext {
        ServerContext::with_root(dir.path().to_path_buf())
    }

    #[tokio::test]
    async fn requires_key_and_value() {
        let dir = TempDir::new().unwrap();
        let ctx = ctx_for(&dir);

        let result = MemoryWriteTool.call(json!({"value": 1}), &ctx).await.unwrap();
        assert!(result["error"].as_str().unwrap().contains("key"));

        let result = MemoryWriteTool.call(json!({"key": "k"}), &ctx).await.unwrap();
        assert!(result["error"].as_str().unwrap().contains("value"));
    }

    #[tokio::test]
    async fn write_persists_and_invalidates_the_read_cache() {
        let dir = TempDir::new().unwrap();
        let ctx = ctx_for(&dir);

        // Prime the read cache with the empty document
        MemoryReadTool.call(json!({}), &ctx).await.unwrap();

        let result = MemoryWriteTool
            .call(json!({"key": "lastFeature", "value": "auth"}), &ctx)
            .await
            .unwrap();
        assert_eq!(result["written"], true);

        // The stale cache entry must not mask the write
        let read = MemoryReadTool.call(json!({"key": "lastFeature"}), &ctx).await.unwrap();
        assert_eq!(read["value"], "auth");
        assert_eq!(read["exists"], true);
    }

    #[tokio::test]
    async fn accepts_structured_values() {
        let dir = TempDir::new().unwrap();
        let result = MemoryWriteTool
            .call(
                json!({"key": "progress", "value": {"phase": "design", "iteration": 2}}),
                &ctx_for(&dir),
            )
            .await
            .unwrap();
        assert_eq!(result["value"]["iteration"], 2);

        let doc = MemoryStore::new(dir.path()).read().await;
        assert_eq!(doc.data["progress"]["phase"], "design");
    }
}
