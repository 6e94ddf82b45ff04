//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy: any error blocks a save, warnings and info are only reported.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::fields::NamerConfig;
use crate::render::placeholders;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub field_id: Option<u32>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    /// `rule: message` for every error, joined for a one-line report.
    pub fn error_summary(&self) -> String {
        self.violations.iter()
            .filter(|v| v.severity == ViolationSeverity::Error)
            .map(|v| format!("{}: {}", v.rule, v.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, config: &NamerConfig) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

pub struct UniqueIdRule;

impl ValidationRule for UniqueIdRule {
    fn name(&self) -> &'static str { "unique_id" }

    fn validate(&self, config: &NamerConfig) -> Vec<ValidationViolation> {
        let mut seen = HashSet::new();
        config.fields.iter()
            .filter(|f| !seen.insert(f.id))
            .map(|f| ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: format!("Field id {} is used more than once", f.id),
                field_id: Some(f.id),
                remediation: vec!["Remove the duplicate field and add it again".to_string()],
            })
            .collect()
    }
}

pub struct FieldNameRule;

impl ValidationRule for FieldNameRule {
    fn name(&self) -> &'static str { "field_name" }

    fn validate(&self, config: &NamerConfig) -> Vec<ValidationViolation> {
        config.fields.iter()
            .filter(|f| f.name.trim().is_empty())
            .map(|f| ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: format!("Field {} has no name", f.id),
                field_id: Some(f.id),
                remediation: vec!["Give the field a name or remove it".to_string()],
            })
            .collect()
    }
}

pub struct UniqueNameRule;

impl ValidationRule for UniqueNameRule {
    fn name(&self) -> &'static str { "unique_name" }

    fn validate(&self, config: &NamerConfig) -> Vec<ValidationViolation> {
        let mut first_seen: HashMap<&str, u32> = HashMap::new();
        let mut violations = vec![];

        for field in &config.fields {
            if field.name.is_empty() {
                continue;
            }
            match first_seen.get(field.name.as_str()) {
                Some(first) => violations.push(ValidationViolation {
                    rule: self.name().to_string(),
                    severity: ViolationSeverity::Warning,
                    message: format!(
                        "Field {} shares the name '{}' with field {}; the first field with an input wins",
                        field.id, field.name, first
                    ),
                    field_id: Some(field.id),
                    remediation: vec!["Rename one of the fields".to_string()],
                }),
                None => {
                    first_seen.insert(field.name.as_str(), field.id);
                }
            }
        }
        violations
    }
}

pub struct PlaceholderRule;

impl ValidationRule for PlaceholderRule {
    fn name(&self) -> &'static str { "placeholder" }

    fn validate(&self, config: &NamerConfig) -> Vec<ValidationViolation> {
        placeholders(&config.template)
            .into_iter()
            .filter(|name| config.field_by_name(name).is_none())
            .map(|name| ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Warning,
                message: format!("Template placeholder {{{}}} matches no field", name),
                field_id: None,
                remediation: vec![
                    format!("Add a field named '{}'", name),
                    "Or remove the placeholder from the template".to_string(),
                ],
            })
            .collect()
    }
}

pub struct UnusedFieldRule;

impl ValidationRule for UnusedFieldRule {
    fn name(&self) -> &'static str { "unused_field" }

    fn validate(&self, config: &NamerConfig) -> Vec<ValidationViolation> {
        config.fields.iter()
            .filter(|f| !f.name.is_empty() && !config.template.contains(&f.placeholder()))
            .map(|f| ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Info,
                message: format!("Field '{}' is not referenced by the template", f.name),
                field_id: Some(f.id),
                remediation: vec![format!("Insert {} into the template", f.placeholder())],
            })
            .collect()
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(UniqueIdRule),
                Box::new(FieldNameRule),
                Box::new(UniqueNameRule),
                Box::new(PlaceholderRule),
                Box::new(UnusedFieldRule),
            ],
        }
    }

    pub fn validate(&self, config: &NamerConfig) -> ValidationResult {
        let mut violations = vec![];

        for rule in &self.rules {
            violations.extend(rule.validate(config));
        }

        let valid = !violations.iter().any(|v| v.severity == ViolationSeverity::Error);
        ValidationResult { valid, violations }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
