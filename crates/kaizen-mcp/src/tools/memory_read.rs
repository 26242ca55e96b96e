use super::{not_initialized, KaizenTool};
use crate::session::ServerContext;
use async_trait::async_trait;
use kaizen_core::memory::MemoryStore;
use serde_json::{json, Value};

pub struct MemoryReadTool;

#[async_trait]
impl KaizenTool for MemoryReadTool {
    fn name(&self) -> &str {
        "kaizen_memory_read"
    }

    fn description(&self) -> &str {
        "Read from kaizen session memory (.kaizen/memory.json). Read a specific key or get all memory."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "key": {
                    "type": "string",
                    "description": "Memory key to read. Omit to get all memory."
                }
            }
        })
    }

    async fn call(&self, args: Value, ctx: &ServerContext) -> Result<Value, String> {
        let Some(root) = ctx.project_dir() else {
            return Ok(not_initialized());
        };

        let doc = match ctx.cache_get("memory") {
            Some(cached) => serde_json::from_value(cached).map_err(|e| e.to_string())?,
            None => {
                let doc = MemoryStore::new(&root).read().await;
                ctx.cache_put("memory", serde_json::to_value(&doc).map_err(|e| e.to_string())?);
                doc
            }
        };

        if let Some(key) = args["key"].as_str() {
            let value = doc.data.get(key);
            return Ok(json!({
                "key": key,
                "value": value.cloned().unwrap_or(Value::Null),
                "exists": value.is_some(),
            }));
        }

        Ok(json!({
            "version": doc.version,
            "lastUpdated": doc.last_updated,
            "data": doc.data,
            "keys": doc.data.keys().collect::<Vec<_>>(),
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
    async fn requires_initialized_session() {
        let ctx = ServerContext::new();
        let result = MemoryReadTool.call(json!({}), &ctx).await.unwrap();
        assert!(result["error"].as_str().unwrap().contains("kaizen_init"));
    }

    #[tokio::test]
    async fn missing_key_reports_absent() {
        let dir = TempDir::new().unwrap();
        let result = MemoryReadTool
            .call(json!({"key": "ghost"}), &ctx_for(&dir))
            .await
            .unwrap();
        assert_eq!(result["exists"], false);
        assert_eq!(result["value"], Value::Null);
    }

    #[tokio::test]
    async fn reads_single_key_and_full_dump() {
        let dir = TempDir::new().unwrap();
        MemoryStore::new(dir.path())
            .write_key("lastFeature", json!("auth"))
            .await
            .unwrap();

        let ctx = ctx_for(&dir);
        let result = MemoryReadTool.call(json!({"key": "lastFeature"}), &ctx).await.unwrap();
        assert_eq!(result["value"], "auth");
        assert_eq!(result["exists"], true);

        let result = MemoryReadTool.call(json!({}), &ctx).await.unwrap();
        assert_eq!(result["data"]["lastFeature"], "auth");
        assert_eq!(result["keys"], json!(["lastFeature"]));
    }
}
