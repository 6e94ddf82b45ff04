//! SourceNamer Core - Field Processing and Template Rendering
//!
//! # Pipeline
//! 1. Trim (optional)
//! 2. Casing
//! 3. Sanitize (always): accents flattened, symbols become spaces
//! 4. Joining
//!
//! Processed values are substituted into the template one field at a time.

pub mod fields;
pub mod processor;
pub mod render;
pub mod validation;
pub mod store;

pub use fields::{Casing, FieldConfig, FieldError, FieldId, FieldUpdate, Joining, NamerConfig, Preferences};
pub use processor::{process, sanitize, ProcessTrace};
pub use render::{render, RenderInputs, RenderOutput, TemplateRenderer};
pub use validation::{ValidationResult, ValidationRule, ValidationViolation, Validator, ViolationSeverity};
pub use store::{ConfigStore, StoreError};

/// Version tag written into saved configuration files.
pub const STORAGE_VERSION: u32 = 11;
