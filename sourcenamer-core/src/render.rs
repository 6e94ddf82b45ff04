//! Template Renderer - Placeholder Substitution
//!
//! Fields are substituted one at a time, in configuration order. A field
//! without an input is skipped and its placeholder stays in the output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

use crate::fields::{FieldId, NamerConfig};
use crate::processor::process;

/// Raw values keyed by field id. Never persisted.
pub type RenderInputs = HashMap<FieldId, String>;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]*)\}").expect("placeholder pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedField {
    pub id: FieldId,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutput {
    pub output: String,
    pub values: Vec<RenderedField>,
    /// Fields that had no input and were left unsubstituted.
    pub skipped: Vec<FieldId>,
    /// Placeholder names still present in `output`.
    pub unresolved: Vec<String>,
}

impl RenderOutput {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Renders against a borrowed configuration snapshot.
pub struct TemplateRenderer<'a> {
    config: &'a NamerConfig,
}

impl<'a> TemplateRenderer<'a> {
    pub fn new(config: &'a NamerConfig) -> Self {
        Self { config }
    }

    /// True when there is nothing to fill in yet.
    pub fn is_empty_form(&self) -> bool {
        self.config.fields.is_empty()
    }

    pub fn render(&self, inputs: &RenderInputs) -> RenderOutput {
        let mut result = self.config.template.clone();
        let mut values = vec![];
        let mut skipped = vec![];

        for field in &self.config.fields {
            let Some(raw) = inputs.get(&field.id) else {
                skipped.push(field.id);
                continue;
            };

            let value = process(raw, field);
            result = result.replace(&field.placeholder(), &value);
            tracing::debug!(id = field.id, name = %field.name, value = %value, "field substituted");

            values.push(RenderedField {
                id: field.id,
                name: field.name.clone(),
                value,
            });
        }

        let unresolved = placeholders(&result);
        RenderOutput {
            output: result,
            values,
            skipped,
            unresolved,
        }
    }
}

pub fn render(config: &NamerConfig, inputs: &RenderInputs) -> RenderOutput {
    TemplateRenderer::new(config).render(inputs)
}

/// Names of every `{name}` placeholder in `template`, in order of first appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = vec![];
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Casing, FieldConfig, Joining};

    fn inputs(pairs: &[(FieldId, &str)]) -> RenderInputs {
        pairs.iter().map(|(id, v)| (*id, v.to_string())).collect()
    }

    #[test]
    fn test_default_config_renders() {
        let config = NamerConfig::default();
        let out = render(&config, &inputs(&[(1, "  WEB server 01  "), (2, "10.0.0.1")]));
        assert_eq!(out.output, "Web-server-01_10.0.0.1");
        assert!(out.skipped.is_empty());
        assert!(out.is_complete());
    }

    #[test]
    fn test_missing_input_leaves_placeholder() {
        let config = NamerConfig::default();
        let out = render(&config, &inputs(&[(1, "db")]));
        assert_eq!(out.output, "Db_{IPAddress}");
        assert_eq!(out.skipped, vec![2]);
        assert_eq!(out.unresolved, vec!["IPAddress".to_string()]);
    }

    #[test]
    fn test_every_occurrence_replaced() {
        let mut config = NamerConfig::empty();
        config.template = "{A}/{A}-{a}".to_string();
        config.fields.push(FieldConfig::new(1, "A"));
        let out = render(&config, &inputs(&[(1, "x")]));
        assert_eq!(out.output, "x/x-{a}");
    }

    #[test]
    fn test_values_follow_configuration_order() {
        let mut config = NamerConfig::empty();
        config.template = "{Inner}{Outer}".to_string();
        config.fields.push(FieldConfig::new(2, "Outer").with_trim(false));
        config.fields.push(FieldConfig::new(1, "Inner").with_casing(Casing::Uppercase));
        let out = render(&config, &inputs(&[(1, "val"), (2, "pre")]));
        assert_eq!(out.output, "VALpre");
        let ids: Vec<_> = out.values.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_duplicate_name_first_field_with_input_wins() {
        let mut config = NamerConfig::empty();
        config.template = "{Env}".to_string();
        config.fields.push(FieldConfig::new(1, "Env").with_casing(Casing::Uppercase));
        config.fields.push(FieldConfig::new(2, "Env"));
        assert_eq!(render(&config, &inputs(&[(1, "prod"), (2, "dev")])).output, "PROD");
        assert_eq!(render(&config, &inputs(&[(2, "dev")])).output, "dev");
    }

    #[test]
    fn test_regex_metacharacters_in_name_are_literal() {
        let mut config = NamerConfig::empty();
        config.template = "[{a.b}]".to_string();
        config.fields.push(FieldConfig::new(1, "a.b").with_joining(Joining::Snake));
        let out = render(&config, &inputs(&[(1, "x y")]));
        assert_eq!(out.output, "[x_y]");
    }

    #[test]
    fn test_empty_form() {
        let config = NamerConfig::empty();
        let renderer = TemplateRenderer::new(&config);
        assert!(renderer.is_empty_form());
        assert_eq!(renderer.render(&RenderInputs::new()).output, "");
    }

    #[test]
    fn test_placeholders_unique_in_order() {
        assert_eq!(placeholders("{B}_{A}_{B}"), vec!["B".to_string(), "A".to_string()]);
        assert!(placeholders("no braces").is_empty());
    }
}
