use crate::io;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// ProjectLevel
// ---------------------------------------------------------------------------

/// Project sophistication tier, detected from the managed project's
/// directory layout and build files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectLevel {
    Starter,
    Dynamic,
    Enterprise,
}

impl ProjectLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectLevel::Starter => "Starter",
            ProjectLevel::Dynamic => "Dynamic",
            ProjectLevel::Enterprise => "Enterprise",
        }
    }
}

impl fmt::Display for ProjectLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

const ENTERPRISE_DIRS: &[&str] = &["kubernetes", "terraform", "k8s", "infra"];
const DYNAMIC_DIRS: &[&str] = &["lib/bkend", "supabase", "api", "backend"];
const DYNAMIC_FILES: &[&str] = &[".mcp.json", "docker-compose.yml"];
const DYNAMIC_PACKAGE_PATTERNS: &[&str] = &["bkend", "@supabase", "firebase"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelDetection {
    pub level: ProjectLevel,
    pub evidence: Vec<String>,
    pub confidence: Confidence,
}

/// Detect the project level. Enterprise markers win over Dynamic markers;
/// a project with neither is a Starter.
pub async fn detect_level(root: &Path) -> LevelDetection {
    let mut evidence = Vec::new();

    for dir in ENTERPRISE_DIRS {
        if io::file_exists(&root.join(dir)).await {
            evidence.push(format!("Found {dir}/ directory"));
        }
    }
    if !evidence.is_empty() {
        let confidence = graded(evidence.len());
        return LevelDetection {
            level: ProjectLevel::Enterprise,
            evidence,
            confidence,
        };
    }

    for dir in DYNAMIC_DIRS {
        if io::file_exists(&root.join(dir)).await {
            evidence.push(format!("Found {dir}/ directory"));
        }
    }
    for file in DYNAMIC_FILES {
        if io::file_exists(&root.join(file)).await {
            evidence.push(format!("Found {file}"));
        }
    }
    if let Ok(content) = tokio::fs::read_to_string(root.join("package.json")).await {
        for pattern in DYNAMIC_PACKAGE_PATTERNS {
            if content.contains(pattern) {
                evidence.push(format!("Found '{pattern}' in package.json"));
            }
        }
    }
    if !evidence.is_empty() {
        let confidence = graded(evidence.len());
        return LevelDetection {
            level: ProjectLevel::Dynamic,
            evidence,
            confidence,
        };
    }

    LevelDetection {
        level: ProjectLevel::Starter,
        evidence: vec!["No enterprise or dynamic indicators found".to_string()],
        confidence: Confidence::High,
    }
}

fn graded(hits: usize) -> Confidence {
    if hits >= 2 {
        Confidence::High
    } else {
        Confidence::Medium
    }
}

// ---------------------------------------------------------------------------
// Level profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LevelProfile {
    pub skill: &'static str,
    pub pipeline_phases: &'static [u32],
    pub skip_phases: &'static [u32],
    pub description: &'static str,
}

pub fn level_profile(level: ProjectLevel) -> LevelProfile {
    match level {
        ProjectLevel::Starter => LevelProfile {
            skill: "$starter",
            pipeline_phases: &[1, 2, 3, 6, 9],
            skip_phases: &[4, 5, 7, 8],
            description: "Static web development for beginners",
        },
        ProjectLevel::Dynamic => LevelProfile {
            skill: "$dynamic",
            pipeline_phases: &[1, 2, 3, 4, 5, 6, 7, 9],
            skip_phases: &[8],
            description: "Fullstack development with BaaS",
        },
        ProjectLevel::Enterprise => LevelProfile {
            skill: "$enterprise",
            pipeline_phases: &[1, 2, 3, 4, 5, 6, 7, 8, 9],
            skip_phases: &[],
            description: "Enterprise-grade microservices",
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
