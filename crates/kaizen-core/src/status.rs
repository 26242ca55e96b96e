use crate::chain::{self, ChainTask};
use crate::error::{KaizenError, Result};
use crate::io;
use crate::level::ProjectLevel;
use crate::paths;
use crate::phase::{DocKind, Phase};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const STATUS_VERSION: &str = "2.0";

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureState {
    pub phase: Phase,
    #[serde(default)]
    pub match_rate: Option<f64>,
    #[serde(default)]
    pub iteration_count: u32,
    #[serde(default)]
    pub documents: BTreeMap<DocKind, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_chain: Option<Vec<ChainTask>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl FeatureState {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            match_rate: None,
            iteration_count: 0,
            documents: BTreeMap::new(),
            task_chain: None,
            archived: false,
            archived_at: None,
            completed_at: None,
        }
    }

    pub fn task_count(&self) -> usize {
        self.task_chain.as_ref().map(Vec::len).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub current_phase: u32,
    pub level: ProjectLevel,
    #[serde(default)]
    pub phase_history: Vec<serde_json::Value>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            current_phase: 1,
            level: ProjectLevel::Starter,
            phase_history: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    #[serde(default = "Utc::now")]
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default = "Utc::now")]
    pub last_activity: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

impl Default for SessionInfo {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            onboarding_completed: false,
            last_activity: now,
            platform: None,
        }
    }
}

/// Append-only history log. Two record shapes occur: plain phase
/// transitions and phase-completion actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryEvent {
    PhaseComplete {
        feature: String,
        action: String,
        phase: Phase,
        #[serde(rename = "nextPhase")]
        next_phase: String,
        timestamp: DateTime<Utc>,
    },
    Transition {
        feature: String,
        from: Phase,
        to: Phase,
        timestamp: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub active_features: Vec<String>,
    #[serde(default)]
    pub primary_feature: Option<String>,
    #[serde(default)]
    pub features: BTreeMap<String, FeatureState>,
    #[serde(default)]
    pub pipeline: Pipeline,
    #[serde(default)]
    pub session: SessionInfo,
    #[serde(default)]
    pub history: Vec<HistoryEvent>,
}

fn default_version() -> String {
    STATUS_VERSION.to_string()
}

impl Default for WorkflowStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowStatus {
    pub fn new() -> Self {
        Self {
            version: STATUS_VERSION.to_string(),
            last_updated: Utc::now(),
            active_features: Vec::new(),
            primary_feature: None,
            features: BTreeMap::new(),
            pipeline: Pipeline::default(),
            session: SessionInfo::default(),
            history: Vec::new(),
        }
    }

    pub fn feature(&self, name: &str) -> Option<&FeatureState> {
        self.features.get(name)
    }

    /// Features marked archived. They stay in `features` forever; only
    /// `active_features` forgets them.
    pub fn archived_features(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter(|(_, state)| state.archived)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// StatusStore
// ---------------------------------------------------------------------------

/// Owner of the per-project workflow document. All mutations are
/// whole-document read-modify-write; concurrent writers race with
/// last-writer-wins, which single-writer usage makes moot.
#[derive(Debug, Clone)]
pub struct StatusStore {
    root: PathBuf,
}

impl StatusStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the document. A missing file yields a fresh default document
    /// without writing it; an unreadable file is logged and absorbed the
    /// same way rather than blocking the workflow.
    pub async fn read(&self) -> WorkflowStatus {
        let path = paths::status_path(&self.root);
        if io::file_exists(&path).await {
            match io::read_json::<WorkflowStatus>(&path).await {
                Ok(status) => return status,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable workflow status, using defaults");
                }
            }
        }
        WorkflowStatus::new()
    }

    /// Persist the whole document, refreshing its activity timestamps.
    pub async fn write(&self, status: &mut WorkflowStatus) -> Result<()> {
        let now = Utc::now();
        status.last_updated = now;
        status.session.last_activity = now;
        io::write_json(&paths::status_path(&self.root), status).await
    }

    /// Register a feature. Idempotent: an existing feature keeps its phase.
    pub async fn add_feature(&self, feature: &str, initial_phase: Phase) -> Result<WorkflowStatus> {
        let mut status = self.read().await;

        if status.features.contains_key(feature) {
            return Ok(status);
        }

        status
            .features
            .insert(feature.to_string(), FeatureState::new(initial_phase));
        if !status.active_features.iter().any(|f| f == feature) {
            status.active_features.push(feature.to_string());
        }
        if status.primary_feature.is_none() {
            status.primary_feature = Some(feature.to_string());
        }

        self.write(&mut status).await?;
        Ok(status)
    }

    /// Set a feature's phase, creating the feature if needed. A real phase
    /// change appends a transition record and registers the phase's
    /// deliverable document path.
    pub async fn set_feature_phase(&self, feature: &str, phase: Phase) -> Result<WorkflowStatus> {
        let mut status = self.read().await;

        match status.features.get_mut(feature) {
            Some(state) => {
                let prev = state.phase;
                if prev != phase {
                    state.phase = phase;
                    status.history.push(HistoryEvent::Transition {
                        feature: feature.to_string(),
                        from: prev,
                        to: phase,
                        timestamp: Utc::now(),
                    });
                }
            }
            None => {
                status
                    .features
                    .insert(feature.to_string(), FeatureState::new(phase));
                if !status.active_features.iter().any(|f| f == feature) {
                    status.active_features.push(feature.to_string());
                }
            }
        }

        if status.primary_feature.is_none() {
            status.primary_feature = Some(feature.to_string());
        }

        if let Some(kind) = DocKind::for_phase(phase) {
            if let Some(state) = status.features.get_mut(feature) {
                state
                    .documents
                    .insert(kind, paths::doc_rel_path(feature, kind));
            }
        }

        self.write(&mut status).await?;
        Ok(status)
    }

    /// Archive a feature. It leaves `active_features` (and the primary
    /// slot, which moves to the next remaining active feature) but is
    /// never deleted from `features`.
    pub async fn remove_feature(&self, feature: &str) -> Result<WorkflowStatus> {
        let mut status = self.read().await;

        status.active_features.retain(|f| f != feature);
        if status.primary_feature.as_deref() == Some(feature) {
            status.primary_feature = status.active_features.first().cloned();
        }
        if let Some(state) = status.features.get_mut(feature) {
            state.archived = true;
            state.archived_at = Some(Utc::now());
        }

        self.write(&mut status).await?;
        Ok(status)
    }

    pub async fn set_primary_feature(&self, feature: &str) -> Result<WorkflowStatus> {
        let mut status = self.read().await;

        if !status.active_features.iter().any(|f| f == feature) {
            return Err(KaizenError::FeatureNotActive(feature.to_string()));
        }
        status.primary_feature = Some(feature.to_string());

        self.write(&mut status).await?;
        Ok(status)
    }

    /// Bump a feature's iteration counter. Only the gap-analysis operation
    /// calls this.
    pub async fn increment_iteration(&self, feature: &str) -> Result<WorkflowStatus> {
        let mut status = self.read().await;

        let Some(state) = status.features.get_mut(feature) else {
            return Err(KaizenError::FeatureNotFound(feature.to_string()));
        };
        state.iteration_count += 1;

        self.write(&mut status).await?;
        Ok(status)
    }

    /// Create the task chain for a feature if it does not already have one.
    pub async fn ensure_task_chain(&self, feature: &str) -> Result<WorkflowStatus> {
        let mut status = self.read().await;

        let Some(state) = status.features.get_mut(feature) else {
            return Err(KaizenError::FeatureNotFound(feature.to_string()));
        };
        if state.task_chain.is_none() {
            state.task_chain = Some(chain::create_chain(feature).tasks);
        }

        self.write(&mut status).await?;
        Ok(status)
    }

    /// Advance a feature's task chain after a phase completes. Returns the
    /// updated chain, or `None` when the feature has no chain.
    pub async fn update_task_chain(
        &self,
        feature: &str,
        completed_phase: Phase,
    ) -> Result<Option<Vec<ChainTask>>> {
        let mut status = self.read().await;

        let Some(state) = status.features.get_mut(feature) else {
            return Ok(None);
        };
        let Some(tasks) = state.task_chain.as_mut() else {
            return Ok(None);
        };
        chain::advance_chain(tasks, completed_phase);
        let updated = tasks.clone();

        self.write(&mut status).await?;
        Ok(Some(updated))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainStatus;
    use tempfile::TempDir;

    #[tokio::test]
    async fn read_missing_file_yields_defaults_without_writing() {
        let dir = TempDir::new().unwrap();
        let store = StatusStore::new(dir.path());

        let status = store.read().await;
        assert_eq!(status.version, STATUS_VERSION);
        assert!(status.primary_feature.is_none());
        assert!(!paths::status_path(dir.path()).exists());
    }

    #[tokio::test]
    async fn read_corrupted_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = paths::status_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let store = StatusStore::new(dir.path());
        let status = store.read().await;
        assert_eq!(status.version, STATUS_VERSION);
        assert!(status.features.is_empty());
    }

    #[tokio::test]
    async fn add_feature_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = StatusStore::new(dir.path());

        store.add_feature("auth", Phase::Plan).await.unwrap();
        let status = store.add_feature("auth", Phase::Design).await.unwrap();

        assert_eq!(status.features["auth"].phase, Phase::Plan);
        assert_eq!(status.active_features, vec!["auth"]);
        assert_eq!(status.primary_feature.as_deref(), Some("auth"));
    }

    #[tokio::test]
    async fn first_feature_becomes_primary() {
        let dir = TempDir::new().unwrap();
        let store = StatusStore::new(dir.path());

        store.add_feature("a", Phase::Plan).await.unwrap();
        let status = store.add_feature("b", Phase::Plan).await.unwrap();
        assert_eq!(status.primary_feature.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn set_feature_phase_records_history_on_change() {
        let dir = TempDir::new().unwrap();
        let store = StatusStore::new(dir.path());

        store.add_feature("auth", Phase::Plan).await.unwrap();
        let status = store.set_feature_phase("auth", Phase::Design).await.unwrap();

        assert_eq!(status.features["auth"].phase, Phase::Design);
        assert_eq!(status.history.len(), 1);
        match &status.history[0] {
            HistoryEvent::Transition { feature, from, to, .. } => {
                assert_eq!(feature, "auth");
                assert_eq!(*from, Phase::Plan);
                assert_eq!(*to, Phase::Design);
            }
            other => panic!("expected transition record, got {other:?}"),
        }

        // Same phase again: no new record
        let status = store.set_feature_phase("auth", Phase::Design).await.unwrap();
        assert_eq!(status.history.len(), 1);
    }

    #[tokio::test]
    async fn set_feature_phase_creates_missing_feature_silently() {
        let dir = TempDir::new().unwrap();
        let store = StatusStore::new(dir.path());

        let status = store.set_feature_phase("fresh", Phase::Design).await.unwrap();
        assert_eq!(status.features["fresh"].phase, Phase::Design);
        assert!(status.history.is_empty());
        assert_eq!(status.primary_feature.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn set_feature_phase_registers_document_path() {
        let dir = TempDir::new().unwrap();
        let store = StatusStore::new(dir.path());

        store.add_feature("auth", Phase::Plan).await.unwrap();
        let status = store.set_feature_phase("auth", Phase::Check).await.unwrap();
        assert_eq!(
            status.features["auth"].documents[&DocKind::Analysis],
            "docs/03-analysis/auth.analysis.md"
        );
    }

    #[tokio::test]
    async fn remove_feature_archives_and_reassigns_primary() {
        let dir = TempDir::new().unwrap();
        let store = StatusStore::new(dir.path());

        store.add_feature("a", Phase::Plan).await.unwrap();
        store.add_feature("b", Phase::Plan).await.unwrap();
        let status = store.remove_feature("a").await.unwrap();

        assert_eq!(status.active_features, vec!["b"]);
        assert_eq!(status.primary_feature.as_deref(), Some("b"));
        assert!(status.features["a"].archived);
        assert!(status.features["a"].archived_at.is_some());
        assert_eq!(status.archived_features(), vec!["a"]);
    }

    #[tokio::test]
    async fn remove_last_feature_clears_primary() {
        let dir = TempDir::new().unwrap();
        let store = StatusStore::new(dir.path());

        store.add_feature("only", Phase::Plan).await.unwrap();
        let status = store.remove_feature("only").await.unwrap();
        assert!(status.active_features.is_empty());
        assert!(status.primary_feature.is_none());
    }

    #[tokio::test]
    async fn set_primary_requires_active_feature() {
        let dir = TempDir::new().unwrap();
        let store = StatusStore::new(dir.path());

        store.add_feature("a", Phase::Plan).await.unwrap();
        assert!(store.set_primary_feature("ghost").await.is_err());
        let status = store.set_primary_feature("a").await.unwrap();
        assert_eq!(status.primary_feature.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn task_chain_lifecycle_through_store() {
        let dir = TempDir::new().unwrap();
        let store = StatusStore::new(dir.path());

        store.add_feature("auth", Phase::Plan).await.unwrap();
        assert!(store
            .update_task_chain("auth", Phase::Plan)
            .await
            .unwrap()
            .is_none());

        let status = store.ensure_task_chain("auth").await.unwrap();
        assert_eq!(status.features["auth"].task_count(), 5);

        let chain = store
            .update_task_chain("auth", Phase::Plan)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(chain[0].status, ChainStatus::Completed);
        assert_eq!(chain[1].status, ChainStatus::Active);
    }

    #[tokio::test]
    async fn increment_iteration_counts_up() {
        let dir = TempDir::new().unwrap();
        let store = StatusStore::new(dir.path());

        store.add_feature("auth", Phase::Plan).await.unwrap();
        store.increment_iteration("auth").await.unwrap();
        let status = store.increment_iteration("auth").await.unwrap();
        assert_eq!(status.features["auth"].iteration_count, 2);

        assert!(store.increment_iteration("ghost").await.is_err());
    }

    #[tokio::test]
    async fn write_refreshes_timestamps_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = StatusStore::new(dir.path());

        let mut status = WorkflowStatus::new();
        let before = status.last_updated;
        store.write(&mut status).await.unwrap();
        assert!(status.last_updated >= before);

        let raw = std::fs::read_to_string(paths::status_path(dir.path())).unwrap();
        assert!(raw.contains("\"activeFeatures\""));
        assert!(raw.contains("\"lastUpdated\""));

        let reread = store.read().await;
        assert_eq!(reread.version, STATUS_VERSION);
    }

    #[tokio::test]
    async fn history_event_shapes_roundtrip() {
        let events = vec![
            HistoryEvent::Transition {
                feature: "auth".into(),
                from: Phase::Plan,
                to: Phase::Design,
                timestamp: Utc::now(),
            },
            HistoryEvent::PhaseComplete {
                feature: "auth".into(),
                action: "phase_complete".into(),
                phase: Phase::Design,
                next_phase: "do".into(),
                timestamp: Utc::now(),
            },
        ];
        let json = serde_json::to_string(&events).unwrap();
        assert!(json.contains("\"nextPhase\""));
        let parsed: Vec<HistoryEvent> = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed[0], HistoryEvent::Transition { .. }));
        assert!(matches!(parsed[1], HistoryEvent::PhaseComplete { .. }));
    }
}
