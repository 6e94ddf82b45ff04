//! Field Model - Named Inputs and Their Processing Rules

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type FieldId = u32;

pub const DEFAULT_TEMPLATE: &str = "{Hostname}_{IPAddress}";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("Field not found: {0}")]
    FieldNotFound(FieldId),

    #[error("Field name must not be empty")]
    EmptyName,

    #[error("No field id left after {0}")]
    IdSpaceExhausted(FieldId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub id: FieldId,
    pub name: String,
    #[serde(default = "default_true")]
    pub trim: bool,
    #[serde(default)]
    pub casing: Casing,
    #[serde(default)]
    pub joining: Joining,
}

fn default_true() -> bool { true }

impl FieldConfig {
    /// A field with the settings the "add field" action starts from.
    pub fn new(id: FieldId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            trim: true,
            casing: Casing::None,
            joining: Joining::Space,
        }
    }

    pub fn with_casing(mut self, casing: Casing) -> Self {
        self.casing = casing;
        self
    }

    pub fn with_joining(mut self, joining: Joining) -> Self {
        self.joining = joining;
        self
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// The literal `{name}` this field substitutes in a template.
    pub fn placeholder(&self) -> String {
        placeholder_for(&self.name)
    }
}

pub fn placeholder_for(name: &str) -> String {
    format!("{{{}}}", name)
}

/// Letter-case policy applied before sanitizing.
///
/// Unrecognized names deserialize as [`Casing::None`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Casing {
    #[default]
    None,
    Lowercase,
    Uppercase,
    Capitalize,
    Sentence,
    Title,
}

impl Casing {
    pub const ALL: [Casing; 6] = [
        Casing::None,
        Casing::Lowercase,
        Casing::Uppercase,
        Casing::Capitalize,
        Casing::Sentence,
        Casing::Title,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Casing::None => "none",
            Casing::Lowercase => "lowercase",
            Casing::Uppercase => "uppercase",
            Casing::Capitalize => "capitalize",
            Casing::Sentence => "sentence",
            Casing::Title => "title",
        }
    }

    /// Parses a known name, or degrades to `None` for anything else.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(value, "unrecognized casing, falling back to none");
            Casing::None
        })
    }
}

impl FromStr for Casing {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Casing::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant { kind: "casing", value: s.to_string() })
    }
}

impl From<String> for Casing {
    fn from(value: String) -> Self {
        Casing::parse_lenient(&value)
    }
}

impl fmt::Display for Casing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the words of a sanitized value are glued together.
///
/// Unrecognized names deserialize as [`Joining::Space`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Joining {
    #[default]
    Space,
    Snake,
    Kebab,
    Dot,
    Camel,
}

impl Joining {
    pub const ALL: [Joining; 5] = [
        Joining::Space,
        Joining::Snake,
        Joining::Kebab,
        Joining::Dot,
        Joining::Camel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Joining::Space => "space",
            Joining::Snake => "snake",
            Joining::Kebab => "kebab",
            Joining::Dot => "dot",
            Joining::Camel => "camel",
        }
    }

    /// Separator substituted for whitespace runs, if this mode uses one.
    pub fn separator(&self) -> Option<char> {
        match self {
            Joining::Snake => Some('_'),
            Joining::Kebab => Some('-'),
            Joining::Dot => Some('.'),
            Joining::Space | Joining::Camel => None,
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(value, "unrecognized joining, falling back to space");
            Joining::Space
        })
    }
}

impl FromStr for Joining {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Joining::ALL
            .into_iter()
            .find(|j| j.as_str() == s)
            .ok_or_else(|| UnknownVariant { kind: "joining", value: s.to_string() })
    }
}

impl From<String> for Joining {
    fn from(value: String) -> Self {
        Joining::parse_lenient(&value)
    }
}

impl fmt::Display for Joining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub auto_copy: bool,
}

/// Partial edit applied by [`NamerConfig::update_field`].
#[derive(Debug, Clone, Default)]
pub struct FieldUpdate {
    pub name: Option<String>,
    pub trim: Option<bool>,
    pub casing: Option<Casing>,
    pub joining: Option<Joining>,
}

/// The whole persisted configuration: ordered fields, the template and preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamerConfig {
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub preferences: Preferences,
}

impl Default for NamerConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            fields: vec![
                FieldConfig::new(1, "Hostname")
                    .with_casing(Casing::Sentence)
                    .with_joining(Joining::Kebab),
                FieldConfig::new(2, "IPAddress"),
            ],
            preferences: Preferences::default(),
        }
    }
}

impl NamerConfig {
    pub fn empty() -> Self {
        Self {
            template: String::new(),
            fields: vec![],
            preferences: Preferences::default(),
        }
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Next free id: one past the largest in use, or 1 when there are no fields.
    pub fn next_id(&self) -> Result<FieldId, FieldError> {
        match self.fields.iter().map(|f| f.id).max() {
            Some(max) => max.checked_add(1).ok_or(FieldError::IdSpaceExhausted(max)),
            None => Ok(1),
        }
    }

    /// Appends a field with default processing and returns its id.
    pub fn add_field(&mut self, name: impl Into<String>) -> Result<FieldId, FieldError> {
        let id = self.next_id()?;
        self.fields.push(FieldConfig::new(id, name));
        tracing::debug!(id, "field added");
        Ok(id)
    }

    pub fn remove_field(&mut self, id: FieldId) -> Result<FieldConfig, FieldError> {
        let index = self.fields.iter()
            .position(|f| f.id == id)
            .ok_or(FieldError::FieldNotFound(id))?;
        Ok(self.fields.remove(index))
    }

    pub fn update_field(&mut self, id: FieldId, update: FieldUpdate) -> Result<&FieldConfig, FieldError> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(FieldError::EmptyName);
            }
        }

        let field = self.fields.iter_mut()
            .find(|f| f.id == id)
            .ok_or(FieldError::FieldNotFound(id))?;

        if let Some(name) = update.name {
            field.name = name.trim().to_string();
        }
        if let Some(trim) = update.trim {
            field.trim = trim;
        }
        if let Some(casing) = update.casing {
            field.casing = casing;
        }
        if let Some(joining) = update.joining {
            field.joining = joining;
        }
        Ok(&*field)
    }

    /// Trims field names and drops fields left without one, as a save does.
    pub fn normalize(&mut self) {
        for field in &mut self.fields {
            let trimmed = field.name.trim();
            if trimmed.len() != field.name.len() {
                field.name = trimmed.to_string();
            }
        }
        let before = self.fields.len();
        self.fields.retain(|f| !f.name.is_empty());
        let dropped = before - self.fields.len();
        if dropped > 0 {
            tracing::warn!(dropped, "dropped fields without a name");
        }
    }

    /// Placeholders offered for insertion, one per named field, in field order.
    pub fn pills(&self) -> Vec<String> {
        self.fields.iter()
            .map(|f| f.name.trim())
            .filter(|name| !name.is_empty())
            .map(placeholder_for)
            .collect()
    }
}

/// Result of splicing a placeholder into a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insertion {
    pub template: String,
    /// Character offset just past the inserted placeholder.
    pub caret: usize,
}

/// Replaces the character range `start..end` of `template` with `{name}`.
///
/// Offsets count characters, not bytes, and are clamped to the template length.
pub fn insert_placeholder(template: &str, start: usize, end: usize, name: &str) -> Insertion {
    let placeholder = placeholder_for(name);
    let len = template.chars().count();
    let start = start.min(len);
    let end = end.clamp(start, len);

    let mut out = String::with_capacity(template.len() + placeholder.len());
    out.extend(template.chars().take(start));
    out.push_str(&placeholder);
    out.extend(template.chars().skip(end));

    Insertion {
        template: out,
        caret: start + placeholder.chars().count(),
    }
}
