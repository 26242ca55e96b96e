use kaizen_core::cache::TtlCache;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

// ---------------------------------------------------------------------------
// SessionContext
// ---------------------------------------------------------------------------

/// Per-process session state. `initialized` is only flipped by the
/// `notifications/initialized` handshake; `project_dir` is only set by the
/// `kaizen_init` tool (or a `--root` startup override).
#[derive(Debug, Default)]
pub struct SessionContext {
    pub initialized: bool,
    pub project_dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// ServerContext
// ---------------------------------------------------------------------------

/// Shared state handed to every tool invocation: the mutable session
/// record and the TTL cache for derived results. Locks are scoped to
/// single accessor calls and never held across awaits.
#[derive(Debug, Default)]
pub struct ServerContext {
    session: Mutex<SessionContext>,
    cache: Mutex<TtlCache>,
}

impl ServerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: PathBuf) -> Self {
        let ctx = Self::new();
        ctx.set_project_dir(root);
        ctx
    }

    pub fn project_dir(&self) -> Option<PathBuf> {
        self.session.lock().expect("session lock").project_dir.clone()
    }

    pub fn set_project_dir(&self, dir: PathBuf) {
        self.session.lock().expect("session lock").project_dir = Some(dir);
    }

    pub fn is_initialized(&self) -> bool {
        self.session.lock().expect("session lock").initialized
    }

    pub fn mark_initialized(&self) {
        self.session.lock().expect("session lock").initialized = true;
    }

    pub fn cache_get(&self, key: &str) -> Option<Value> {
        self.cache.lock().expect("cache lock").get(key)
    }

    pub fn cache_put(&self, key: &str, value: Value) {
        self.cache.lock().expect("cache lock").put(key, value);
    }

    pub fn cache_put_with_ttl(&self, key: &str, value: Value, ttl: Duration) {
        self.cache.lock().expect("cache lock").put_with_ttl(key, value, ttl);
    }

    pub fn cache_invalidate(&self, key: &str) {
        self.cache.lock().expect("cache lock").invalidate(key);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_is_unbound() {
        let ctx = ServerContext::new();
        assert!(!ctx.is_initialized());
        assert!(ctx.project_dir().is_none());
    }

    #[test]
    fn project_dir_and_handshake_are_independent() {
        let ctx = ServerContext::new();
        ctx.set_project_dir(PathBuf::from("/tmp/proj"));
        assert_eq!(ctx.project_dir(), Some(PathBuf::from("/tmp/proj")));
        assert!(!ctx.is_initialized());

        ctx.mark_initialized();
        assert!(ctx.is_initialized());
    }

    #[test]
    fn cache_round_trip_and_invalidation() {
        let ctx = ServerContext::new();
        ctx.cache_put("status:all", serde_json::json!({"n": 1}));
        assert_eq!(ctx.cache_get("status:all").unwrap()["n"], 1);
        ctx.cache_invalidate("status:all");
        assert!(ctx.cache_get("status:all").is_none());
    }
}
