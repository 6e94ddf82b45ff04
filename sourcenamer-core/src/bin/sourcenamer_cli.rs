//! SourceNamer CLI - Configure fields, then render names from values
//!
//! Commands: show, fields, add-field, remove-field, update-field, template,
//! pills, prefs, process, render, validate, reset
//! Outputs JSON to stdout, logs to stderr (RUST_LOG)
//! Returns 2 on validation failure

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use sourcenamer_core::{
    fields::{insert_placeholder, FieldUpdate},
    processor::{process, trace},
    render::RenderInputs,
    store::{ConfigStore, StoreError, CONFIG_ENV},
    Casing, FieldConfig, FieldError, Joining, NamerConfig, TemplateRenderer, Validator,
};

#[derive(Parser)]
#[command(name = "sourcenamer-cli", version)]
#[command(about = "SourceNamer CLI - build names from processed field values")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(short, long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the whole configuration
    Show,

    /// List configured fields
    Fields,

    /// Add a field (trim on, no casing, space joining unless overridden)
    AddField {
        #[arg(short, long)]
        name: String,

        #[arg(long)]
        casing: Option<Casing>,

        #[arg(long)]
        joining: Option<Joining>,

        /// Keep leading/trailing whitespace
        #[arg(long)]
        no_trim: bool,
    },

    /// Remove a field by id
    RemoveField {
        #[arg(long)]
        id: u32,
    },

    /// Change a field's name or processing
    UpdateField {
        #[arg(long)]
        id: u32,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(long)]
        casing: Option<Casing>,

        #[arg(long)]
        joining: Option<Joining>,

        #[arg(long)]
        trim: Option<bool>,
    },

    /// Show, replace or edit the template
    Template {
        /// Replace the template
        #[arg(long, conflicts_with = "insert")]
        set: Option<String>,

        /// Insert the placeholder for this field name
        #[arg(long)]
        insert: Option<String>,

        /// Character range to replace, START or START..END (default: end of template)
        #[arg(long, requires = "insert")]
        at: Option<String>,
    },

    /// List insertable placeholders
    Pills,

    /// Show or change preferences
    Prefs {
        #[arg(long)]
        auto_copy: Option<bool>,
    },

    /// Process one value without touching the configuration
    Process {
        text: String,

        #[arg(long, default_value = "none")]
        casing: Casing,

        #[arg(long, default_value = "space")]
        joining: Joining,

        #[arg(long)]
        no_trim: bool,

        /// Show the value after every phase
        #[arg(long)]
        explain: bool,
    },

    /// Render the template from field values
    Render {
        /// NAME=VALUE, repeatable
        #[arg(short = 'v', long = "value", value_parser = parse_key_val)]
        values: Vec<(String, String)>,

        /// JSON object mapping field names to values
        #[arg(short, long)]
        payload: Option<String>,
    },

    /// Check the configuration
    Validate,

    /// Forget the saved configuration
    Reset,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("Invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid range '{0}', expected START or START..END")]
    InvalidRange(String),
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))
}

fn parse_range(s: &str) -> Result<(usize, usize), CliError> {
    let invalid = || CliError::InvalidRange(s.to_string());
    match s.split_once("..") {
        Some((start, end)) => {
            let start = start.trim().parse().map_err(|_| invalid())?;
            let end = end.trim().parse().map_err(|_| invalid())?;
            Ok((start, end))
        }
        None => {
            let at = s.trim().parse().map_err(|_| invalid())?;
            Ok((at, at))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            let output = serde_json::json!({
                "success": false,
                "error": e.to_string(),
            });
            println!("{}", output);
            ExitCode::from(exit_status(&e))
        }
    }
}

/// 2 for a save blocked by validation, 1 for everything else.
fn exit_status(error: &CliError) -> u8 {
    match error {
        CliError::Store(StoreError::ValidationFailed(_)) => 2,
        _ => 1,
    }
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let store = ConfigStore::open(cli.config)?;
    // Reset must work even when the saved file no longer parses.
    let mut config = match cli.command {
        Commands::Reset => NamerConfig::default(),
        _ => store.load()?,
    };

    match cli.command {
        Commands::Show => {
            print_json(&config)?;
        }

        Commands::Fields => {
            print_json(&config.fields)?;
        }

        Commands::AddField { name, casing, joining, no_trim } => {
            if name.trim().is_empty() {
                return Err(FieldError::EmptyName.into());
            }
            let id = config.add_field(name.trim())?;
            config.update_field(id, FieldUpdate {
                trim: Some(!no_trim),
                casing,
                joining,
                ..Default::default()
            })?;
            let saved = store.save(&config)?;
            print_json(&saved.field(id))?;
        }

        Commands::RemoveField { id } => {
            let removed = config.remove_field(id)?;
            store.save(&config)?;
            print_json(&serde_json::json!({ "success": true, "removed": removed }))?;
        }

        Commands::UpdateField { id, name, casing, joining, trim } => {
            config.update_field(id, FieldUpdate { name, trim, casing, joining })?;
            let saved = store.save(&config)?;
            print_json(&saved.field(id))?;
        }

        Commands::Template { set, insert, at } => {
            let mut caret = None;
            let changed = set.is_some() || insert.is_some();
            if let Some(template) = set {
                config.template = template;
            } else if let Some(name) = insert {
                let end = config.template.chars().count();
                let (start, stop) = match at {
                    Some(range) => parse_range(&range)?,
                    None => (end, end),
                };
                let insertion = insert_placeholder(&config.template, start, stop, &name);
                caret = Some(insertion.caret);
                config.template = insertion.template;
            }
            if changed {
                config = store.save(&config)?;
            }
            print_json(&serde_json::json!({ "template": config.template, "caret": caret }))?;
        }

        Commands::Pills => {
            print_json(&config.pills())?;
        }

        Commands::Prefs { auto_copy } => {
            if let Some(auto_copy) = auto_copy {
                config.preferences.auto_copy = auto_copy;
                config = store.save(&config)?;
            }
            print_json(&config.preferences)?;
        }

        Commands::Process { text, casing, joining, no_trim, explain } => {
            let field = FieldConfig::new(0, "value")
                .with_casing(casing)
                .with_joining(joining)
                .with_trim(!no_trim);
            if explain {
                print_json(&trace(&text, &field))?;
            } else {
                print_json(&serde_json::json!({ "value": process(&text, &field) }))?;
            }
        }

        Commands::Render { values, payload } => {
            let mut by_name: HashMap<String, String> = match payload {
                Some(json) => serde_json::from_str(&json)?,
                None => HashMap::new(),
            };
            by_name.extend(values);
            let inputs = resolve_inputs(&config, by_name)?;

            let renderer = TemplateRenderer::new(&config);
            if renderer.is_empty_form() {
                tracing::warn!("no fields configured; add one with add-field");
            }
            let output = renderer.render(&inputs);
            print_json(&output)?;
        }

        Commands::Validate => {
            let result = Validator::new().validate(&config);
            print_json(&result)?;
            if !result.valid {
                return Ok(ExitCode::from(2));
            }
        }

        Commands::Reset => {
            store.reset()?;
            print_json(&config)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn resolve_inputs(config: &NamerConfig, by_name: HashMap<String, String>) -> Result<RenderInputs, CliError> {
    by_name
        .into_iter()
        .map(|(name, value)| {
            config.field_by_name(&name)
                .map(|field| (field.id, value))
                .ok_or(CliError::UnknownField(name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("3").unwrap(), (3, 3));
        assert_eq!(parse_range("2..4").unwrap(), (2, 4));
        assert_eq!(parse_range(" 1 .. 5 ").unwrap(), (1, 5));
        assert!(matches!(parse_range("x..1"), Err(CliError::InvalidRange(r)) if r == "x..1"));
        assert!(matches!(parse_range(""), Err(CliError::InvalidRange(_))));
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("Hostname=web=01").unwrap(),
            ("Hostname".to_string(), "web=01".to_string())
        );
        assert!(parse_key_val("Hostname").is_err());
    }

    #[test]
    fn test_resolve_inputs_by_name() {
        let config = NamerConfig::default();
        let by_name = HashMap::from([
            ("Hostname".to_string(), "web".to_string()),
            ("IPAddress".to_string(), "10.0.0.1".to_string()),
        ]);
        let inputs = resolve_inputs(&config, by_name).unwrap();
        assert_eq!(inputs.get(&1).map(String::as_str), Some("web"));
        assert_eq!(inputs.get(&2).map(String::as_str), Some("10.0.0.1"));
    }

    #[test]
    fn test_resolve_inputs_rejects_unknown_name() {
        let config = NamerConfig::default();
        let by_name = HashMap::from([("Zone".to_string(), "eu".to_string())]);
        let err = resolve_inputs(&config, by_name).unwrap_err();
        assert!(matches!(&err, CliError::UnknownField(name) if name == "Zone"));
        assert_eq!(exit_status(&err), 1);
    }

    #[test]
    fn test_exit_status() {
        let blocked = CliError::Store(StoreError::ValidationFailed("unique_id: dup".into()));
        assert_eq!(exit_status(&blocked), 2);
        assert_eq!(exit_status(&CliError::Field(FieldError::EmptyName)), 1);
        assert_eq!(exit_status(&CliError::Store(StoreError::NoConfigDir)), 1);
        assert_eq!(exit_status(&CliError::InvalidRange("a".into())), 1);
    }
}
