use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Task size classes, ordered smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    QuickFix,
    MinorChange,
    Feature,
    MajorFeature,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::QuickFix => "quick_fix",
            Classification::MinorChange => "minor_change",
            Classification::Feature => "feature",
            Classification::MajorFeature => "major_feature",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Classification::QuickFix => "Quick Fix",
            Classification::MinorChange => "Minor Change",
            Classification::Feature => "Feature",
            Classification::MajorFeature => "Major Feature",
        }
    }

    /// Whether the PDCA loop is mandatory for this size of change.
    pub fn pdca_required(self) -> bool {
        matches!(self, Classification::Feature | Classification::MajorFeature)
    }

    /// Whether the PDCA loop is at least recommended.
    pub fn pdca_recommended(self) -> bool {
        self >= Classification::MinorChange
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Classifiers
// ---------------------------------------------------------------------------

const QUICK_FIX_MAX: u32 = 10;
const MINOR_CHANGE_MAX: u32 = 50;
const FEATURE_MAX: u32 = 200;

/// Classify by estimated lines of code changed.
pub fn classify_by_lines(lines: u32) -> Classification {
    if lines < QUICK_FIX_MAX {
        Classification::QuickFix
    } else if lines < MINOR_CHANGE_MAX {
        Classification::MinorChange
    } else if lines < FEATURE_MAX {
        Classification::Feature
    } else {
        Classification::MajorFeature
    }
}

/// Classify by description keywords. Scans largest class first so that
/// "refactor the fix" reads as a major feature, not a minor change.
pub fn classify_by_description(desc: &str) -> Classification {
    let lower = desc.to_lowercase();

    const MAJOR: &[&str] = &[
        "refactor",
        "rewrite",
        "migration",
        "overhaul",
        "redesign",
        "architecture",
    ];
    const FEATURE: &[&str] = &["implement", "feature", "add new", "create", "build", "develop"];
    const QUICK: &[&str] = &["typo", "fix typo", "rename", "comment", "formatting", "lint"];
    const MINOR: &[&str] = &["fix", "bug", "update", "change", "modify", "adjust", "tweak"];

    if MAJOR.iter().any(|k| lower.contains(k)) {
        Classification::MajorFeature
    } else if FEATURE.iter().any(|k| lower.contains(k)) {
        Classification::Feature
    } else if QUICK.iter().any(|k| lower.contains(k)) {
        Classification::QuickFix
    } else if MINOR.iter().any(|k| lower.contains(k)) {
        Classification::MinorChange
    } else {
        Classification::MinorChange
    }
}

/// Combine line-count and description signals, keeping the larger class.
pub fn classify(lines: u32, description: Option<&str>) -> Classification {
    let by_lines = classify_by_lines(lines);
    match description {
        Some(desc) => by_lines.max(classify_by_description(desc)),
        None => by_lines,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
