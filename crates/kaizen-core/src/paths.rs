use crate::error::{KaizenError, Result};
use crate::phase::DocKind;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const KAIZEN_DIR: &str = ".kaizen";
pub const STATUS_FILE: &str = ".kaizen/status.json";
pub const MEMORY_FILE: &str = ".kaizen/memory.json";
pub const CONFIG_FILE: &str = ".kaizen/config.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn status_path(root: &Path) -> PathBuf {
    root.join(STATUS_FILE)
}

pub fn memory_path(root: &Path) -> PathBuf {
    root.join(MEMORY_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Project-relative path of a feature's deliverable document.
///
/// Plan and design documents live under a `features/` subdirectory;
/// analysis and report documents sit directly in their phase directory.
pub fn doc_rel_path(feature: &str, kind: DocKind) -> String {
    match kind {
        DocKind::Plan => format!("docs/01-plan/features/{feature}.plan.md"),
        DocKind::Design => format!("docs/02-design/features/{feature}.design.md"),
        DocKind::Analysis => format!("docs/03-analysis/{feature}.analysis.md"),
        DocKind::Report => format!("docs/04-report/{feature}.report.md"),
    }
}

pub fn doc_path(root: &Path, feature: &str, kind: DocKind) -> PathBuf {
    root.join(doc_rel_path(feature, kind))
}

// ---------------------------------------------------------------------------
// Feature name validation
// ---------------------------------------------------------------------------

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_feature_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 64 || !name_re().is_match(name) {
        return Err(KaizenError::InvalidFeatureName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_feature_names() {
        for name in ["user-auth", "a", "feature-123", "x1"] {
            validate_feature_name(name).unwrap_or_else(|_| panic!("expected valid: {name}"));
        }
    }

    #[test]
    fn invalid_feature_names() {
        for name in [
            "",
            "-leading-dash",
            "trailing-dash-",
            "has spaces",
            "UPPER",
            "a_b",
        ] {
            assert!(validate_feature_name(name).is_err(), "expected invalid: {name}");
        }
    }

    #[test]
    fn doc_paths() {
        let root = Path::new("/tmp/proj");
        assert_eq!(status_path(root), PathBuf::from("/tmp/proj/.kaizen/status.json"));
        assert_eq!(
            doc_path(root, "auth", DocKind::Plan),
            PathBuf::from("/tmp/proj/docs/01-plan/features/auth.plan.md")
        );
        assert_eq!(
            doc_path(root, "auth", DocKind::Analysis),
            PathBuf::from("/tmp/proj/docs/03-analysis/auth.analysis.md")
        );
    }
}
