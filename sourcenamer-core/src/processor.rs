//! Text Field Processor - Trim, Case, Sanitize, Join
//!
//! `process` is total: every input yields a string, never an error.
//! Phases run in a fixed order and each one is exposed for reuse.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::fields::{Casing, FieldConfig, Joining};

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static PROCESS_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_process_call_count() -> u32 {
    PROCESS_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_process_call_count() {
    PROCESS_CALL_COUNT.store(0, Ordering::SeqCst);
}

// `\w` and `\b` are Unicode-aware in the regex crate.
static SENTENCE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w|\.\s*\w").expect("sentence pattern is valid"));
static WORD_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w").expect("word pattern is valid"));

/// Runs a raw value through every phase configured on `config`.
pub fn process(raw: &str, config: &FieldConfig) -> String {
    #[cfg(feature = "test-hooks")]
    PROCESS_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

    let trimmed = if config.trim { raw.trim() } else { raw };
    let cased = apply_casing(trimmed, config.casing);
    join(&sanitize(&cased), config.joining)
}

/// Intermediate value after each phase, for explaining a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessTrace {
    pub raw: String,
    pub trimmed: String,
    pub cased: String,
    pub sanitized: String,
    pub joined: String,
}

pub fn trace(raw: &str, config: &FieldConfig) -> ProcessTrace {
    let trimmed = if config.trim { raw.trim() } else { raw };
    let cased = apply_casing(trimmed, config.casing);
    let sanitized = sanitize(&cased);
    let joined = join(&sanitized, config.joining);
    ProcessTrace {
        raw: raw.to_string(),
        trimmed: trimmed.to_string(),
        cased,
        sanitized,
        joined,
    }
}

pub fn apply_casing(value: &str, casing: Casing) -> String {
    match casing {
        Casing::None => value.to_string(),
        Casing::Lowercase => value.to_lowercase(),
        Casing::Uppercase => value.to_uppercase(),
        Casing::Capitalize => {
            let lower = value.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => lower,
            }
        }
        Casing::Sentence => uppercase_matches(&SENTENCE_START, &value.to_lowercase()),
        Casing::Title => uppercase_matches(&WORD_START, &value.to_lowercase()),
    }
}

fn uppercase_matches(pattern: &Regex, value: &str) -> String {
    pattern
        .replace_all(value, |caps: &Captures| caps[0].to_uppercase())
        .into_owned()
}

/// Flattens accents to ASCII, turns every other disallowed character into a
/// space and collapses whitespace runs to a single space.
///
/// Output contains only ASCII letters, digits, `.` and single spaces.
pub fn sanitize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_space = false;

    let flattened = value
        .chars()
        .map(fold_turkish)
        .nfd()
        .filter(|c| !is_combining_diacritic(*c));

    for ch in flattened {
        if ch.is_ascii_alphanumeric() || ch == '.' {
            out.push(ch);
            in_space = false;
        } else if !in_space {
            out.push(' ');
            in_space = true;
        }
    }
    out
}

fn fold_turkish(ch: char) -> char {
    match ch {
        'ç' => 'c',
        'ğ' => 'g',
        'ı' => 'i',
        'ö' => 'o',
        'ş' => 's',
        'ü' => 'u',
        'Ç' => 'C',
        'Ğ' => 'G',
        'İ' => 'I',
        'Ö' => 'O',
        'Ş' => 'S',
        'Ü' => 'U',
        other => other,
    }
}

fn is_combining_diacritic(ch: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&ch)
}

/// Glues the words of a sanitized value according to `joining`.
///
/// A value with no words left joins to the empty string under every mode
/// except [`Joining::Space`].
pub fn join(sanitized: &str, joining: Joining) -> String {
    if joining != Joining::Space && sanitized.trim().is_empty() {
        return String::new();
    }

    match joining {
        Joining::Space => sanitized.to_string(),
        Joining::Camel => camel_join(sanitized),
        Joining::Snake | Joining::Kebab | Joining::Dot => {
            let separator = joining.separator().unwrap_or(' ');
            replace_whitespace_runs(sanitized, separator)
        }
    }
}

fn replace_whitespace_runs(value: &str, separator: char) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_space = false;
    for ch in value.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(separator);
                in_space = true;
            }
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// Lowercases the first word, capitalizes the first letter of each later word
/// and drops whitespace. A word starts at any alphanumeric character that
/// does not follow another one, so `.` also opens a new word.
fn camel_join(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut seen_word = false;
    let mut in_first_word = false;
    let mut prev_alnum = false;

    for ch in value.chars() {
        if ch.is_whitespace() {
            prev_alnum = false;
            continue;
        }

        let alnum = ch.is_alphanumeric();
        if alnum && !prev_alnum {
            if seen_word {
                in_first_word = false;
                out.extend(ch.to_uppercase());
            } else {
                seen_word = true;
                in_first_word = true;
                out.extend(ch.to_lowercase());
            }
        } else if alnum && in_first_word {
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
        prev_alnum = alnum;
    }
    out
}
