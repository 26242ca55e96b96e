use crate::level::ProjectLevel;

// ---------------------------------------------------------------------------
// Template bodies
// ---------------------------------------------------------------------------
//
// Templates are embedded so the server has no runtime asset directory.
// Placeholders use `${NAME}` and are resolved by `resolve_variables`.

const PLAN_TEMPLATE: &str = r#"# ${FEATURE} - Plan Document

> Version: 1.0.0 | Date: ${DATE} | Status: Draft
> Level: ${LEVEL}

---

## 1. Overview

### 1.1 Purpose
[Describe the purpose of this feature]

### 1.2 Background
[Context and motivation]

## 2. Goals

### 2.1 Primary Goals
- [ ] Goal 1
- [ ] Goal 2

### 2.2 Non-Goals
- What this feature will NOT do

## 3. Scope

### 3.1 In Scope
- Item 1

### 3.2 Out of Scope
- Item 1

## 4. Success Criteria

- [ ] Criterion 1
- [ ] Criterion 2

## 5. Risks & Mitigations

| Risk | Impact | Probability | Mitigation |
|------|--------|-------------|------------|
| Risk 1 | High | Medium | Mitigation 1 |
"#;

const DESIGN_TEMPLATE: &str = r#"# ${FEATURE} - Design Document

> Version: 1.0.0 | Date: ${DATE} | Status: Draft
> Level: ${LEVEL} | Plan: docs/01-plan/features/${FEATURE}.plan.md

---

## 1. Overview

### 1.1 Purpose
[Brief description of this feature's design]

### 1.2 Design Goals
- Goal 1

## 2. Architecture

### 2.1 System Architecture
[High-level architecture description]

### 2.2 Component Design
[Component breakdown]

### 2.3 Data Flow
[Data flow description]

## 3. Data Model

### 3.1 Entities
[Entity definitions]

### 3.2 Relationships
[Entity relationships]

## 4. API Specification

### 4.1 Endpoints
[API endpoint definitions]

### 4.2 Request/Response
[Request and response schemas]

## 5. Implementation Plan

### 5.1 File Structure
[Planned file organization]

### 5.2 Implementation Order
1. Step 1

## 6. Test Plan

### 6.1 Unit Tests
- Test case 1

### 6.2 Integration Tests
- Test scenario 1
"#;

const DESIGN_STARTER_TEMPLATE: &str = r#"# ${FEATURE} - Design Document (Starter)

> Version: 1.0.0 | Date: ${DATE} | Status: Draft
> Level: Starter | Plan: docs/01-plan/features/${FEATURE}.plan.md

---

## 1. Overview
[What does this feature do?]

## 2. Page Structure
[What pages/sections will this have?]

## 3. Design

### 3.1 Layout
[Header, main, footer, sidebar]

### 3.2 Styling
[Colors, fonts, responsive breakpoints]

## 4. Components
[List the UI components needed]

## 5. Implementation Order
1. HTML structure
2. CSS styling
3. JavaScript interactivity
"#;

const DESIGN_ENTERPRISE_TEMPLATE: &str = r#"# ${FEATURE} - Design Document (Enterprise)

> Version: 1.0.0 | Date: ${DATE} | Status: Draft
> Level: Enterprise | Plan: docs/01-plan/features/${FEATURE}.plan.md

---

## 1. Overview

### 1.1 Purpose
### 1.2 Design Goals
### 1.3 Constraints & Trade-offs

## 2. Architecture

### 2.1 System Context
### 2.2 Service Architecture
### 2.3 Data Flow & Event Architecture

## 3. Data Model

### 3.1 Entity Design
### 3.2 Database Selection & Justification
### 3.3 Migration Strategy

## 4. API Specification

### 4.1 Service Contracts
### 4.2 Event Schemas
### 4.3 API Versioning Strategy

## 5. Security Architecture

### 5.1 Authentication & Authorization
### 5.2 Data Encryption

## 6. Performance & Scalability

### 6.1 Performance Requirements
### 6.2 Scaling Strategy
### 6.3 Caching Strategy

## 7. Observability

### 7.1 Logging Strategy
### 7.2 Metrics & Monitoring

## 8. Deployment

### 8.1 CI/CD Pipeline
### 8.2 Rollback Strategy

## 9. Test Plan

### 9.1 Unit Tests
### 9.2 Integration Tests
### 9.3 Performance Tests
"#;

const ANALYSIS_TEMPLATE: &str = r#"# Gap Analysis: ${FEATURE}

> Date: ${DATE} | Design: docs/02-design/features/${FEATURE}.design.md

---

## Match Rate: __%

## Summary
[Brief summary of the analysis]

## Implemented Items
- [ ] Item 1

## Missing Items
- [ ] Missing 1

## Changed Items (Deviations from Design)
- [ ] Changed 1

## Recommendations
1. Recommendation 1

## Next Steps
- [ ] Fix gaps or proceed to report if match rate >= 90%
"#;

const REPORT_TEMPLATE: &str = r#"# Completion Report: ${FEATURE}

> Date: ${DATE} | Level: ${LEVEL}

---

## 1. Summary

### 1.1 Feature Overview
[Brief description of what was built]

### 1.2 Final Match Rate
__% (Target: 90%)

## 2. Completed Items
- [x] Item 1

## 3. Deviations from Design
[Intentional deviations and their justifications]

## 4. Metrics

| Metric | Value |
|--------|-------|
| Lines of Code | __ |
| Files Changed | __ |
| PDCA Iterations | __ |

## 5. Learnings
1. Learning 1

## 6. Follow-up Items
- [ ] Future improvement 1
"#;

const DO_TEMPLATE: &str = r#"# Implementation Guide: ${FEATURE}

> Date: ${DATE} | Design: docs/02-design/features/${FEATURE}.design.md

---

## Pre-Implementation Checklist
- [ ] Plan document reviewed
- [ ] Design document reviewed
- [ ] Dependencies identified

## Implementation Order
1. Step 1: [Description]

## Key References
- Design: docs/02-design/features/${FEATURE}.design.md
- Plan: docs/01-plan/features/${FEATURE}.plan.md

## Post-Implementation
- [ ] Run gap analysis when implementation is complete
"#;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

pub const TEMPLATE_NAMES: &[&str] = &[
    "plan.template.md",
    "design.template.md",
    "design-starter.template.md",
    "design-enterprise.template.md",
    "analysis.template.md",
    "report.template.md",
    "do.template.md",
];

/// Pick the template name for a document kind and project level. Only the
/// design document varies by level.
pub fn select_template(kind: &str, level: ProjectLevel) -> &'static str {
    match (kind, level) {
        ("design", ProjectLevel::Starter) => "design-starter.template.md",
        ("design", ProjectLevel::Dynamic) => "design.template.md",
        ("design", ProjectLevel::Enterprise) => "design-enterprise.template.md",
        ("analysis", _) => "analysis.template.md",
        ("report", _) => "report.template.md",
        ("do", _) => "do.template.md",
        _ => "plan.template.md",
    }
}

pub fn template_content(name: &str) -> &'static str {
    match name {
        "plan.template.md" => PLAN_TEMPLATE,
        "design.template.md" => DESIGN_TEMPLATE,
        "design-starter.template.md" => DESIGN_STARTER_TEMPLATE,
        "design-enterprise.template.md" => DESIGN_ENTERPRISE_TEMPLATE,
        "analysis.template.md" => ANALYSIS_TEMPLATE,
        "report.template.md" => REPORT_TEMPLATE,
        "do.template.md" => DO_TEMPLATE,
        _ => PLAN_TEMPLATE,
    }
}

/// Replace `${NAME}` placeholders with their values. Unknown placeholders
/// are left in place.
pub fn resolve_variables(content: &str, vars: &[(&str, &str)]) -> String {
    let mut result = content.to_string();
    for (name, value) in vars {
        result = result.replace(&format!("${{{name}}}"), value);
    }
    result
}

/// Sanity checks on template content.
pub fn validate_template(content: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if content.is_empty() {
        errors.push("Template content must be a non-empty string".to_string());
        return errors;
    }
    if !content.starts_with('#') {
        errors.push("Template should start with a markdown heading".to_string());
    }
    if content.len() < 50 {
        errors.push("Template content is too short".to_string());
    }
    errors
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_template_varies_by_level() {
        assert_eq!(
            select_template("design", ProjectLevel::Starter),
            "design-starter.template.md"
        );
        assert_eq!(select_template("design", ProjectLevel::Dynamic), "design.template.md");
        assert_eq!(
            select_template("design", ProjectLevel::Enterprise),
            "design-enterprise.template.md"
        );
    }

    #[test]
    fn unknown_kind_falls_back_to_plan() {
        assert_eq!(select_template("nonsense", ProjectLevel::Dynamic), "plan.template.md");
    }

    #[test]
    fn all_named_templates_resolve_and_validate() {
        for name in TEMPLATE_NAMES {
            let content = template_content(name);
            assert!(validate_template(content).is_empty(), "template {name} invalid");
        }
    }

    #[test]
    fn variables_are_resolved() {
        let resolved = resolve_variables(
            PLAN_TEMPLATE,
            &[("FEATURE", "user-auth"), ("DATE", "2026-08-06"), ("LEVEL", "Dynamic")],
        );
        assert!(resolved.contains("# user-auth - Plan Document"));
        assert!(resolved.contains("Date: 2026-08-06"));
        assert!(!resolved.contains("${FEATURE}"));
    }

    #[test]
    fn unknown_variables_stay_in_place() {
        let resolved = resolve_variables("${FEATURE} and ${OTHER}", &[("FEATURE", "x")]);
        assert_eq!(resolved, "x and ${OTHER}");
    }

    #[test]
    fn validate_flags_bad_content() {
        assert!(!validate_template("").is_empty());
        assert!(!validate_template("no heading but otherwise long enough content here").is_empty());
        assert!(!validate_template("# short").is_empty());
    }
}
