// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostics for rejected configuration.
//!
//! Figment failures are turned into [`ConfigError`]s that point at the key as
//! written in `nutriguard.toml`, with a "did you mean" suggestion for
//! misspelled keys. Semantic checks from [`crate::validation`] use the same
//! type, so callers render every failure through one miette report.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, NamedSource, SourceSpan};
use thiserror::Error;

/// Name under which an in-memory TOML document is reported.
pub const INLINE_SOURCE: &str = "<inline>";

/// A TOML document that took part in loading: display name and contents.
pub type TomlSource = (String, String);

/// Minimum Jaro-Winkler similarity for a key to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A rejected configuration value.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no configuration table accepts, such as `wal_mdoe`.
    #[error("unknown key `{key}` in {}", table_name(.section))]
    #[diagnostic(
        code(nutriguard::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), expected))
    )]
    UnknownKey {
        key: String,
        /// Dotted path of the table holding the key, empty for the root.
        section: String,
        suggestion: Option<String>,
        /// Comma-separated keys the table accepts.
        expected: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong type, such as a string for `busy_timeout_ms`.
    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(nutriguard::config::invalid_value), help("expected {expected}"))]
    InvalidValue {
        /// Dotted path of the key, e.g. `storage.busy_timeout_ms`.
        key: String,
        found: String,
        expected: String,
        #[label("wrong type")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A well-typed value the storage backend cannot use.
    #[error("`{key}` {reason}")]
    #[diagnostic(code(nutriguard::config::invalid_setting), help("{hint}"))]
    InvalidSetting {
        key: &'static str,
        reason: &'static str,
        hint: &'static str,
    },

    #[error("configuration error: {0}")]
    #[diagnostic(code(nutriguard::config::other))]
    Other(String),
}

fn table_name(section: &str) -> String {
    if section.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{section}]")
    }
}

fn unknown_key_help(suggestion: Option<&str>, expected: &str) -> String {
    match suggestion {
        Some(key) => format!("did you mean `{key}`? Accepted keys: {expected}"),
        None => format!("accepted keys: {expected}"),
    }
}

/// Turn a Figment extraction failure into one diagnostic per underlying error.
///
/// `sources` holds the TOML documents that were merged; a diagnostic whose
/// origin is among them carries a span on the offending key.
pub fn diagnose(err: figment::Error, sources: &[TomlSource]) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| diagnose_one(&error, sources))
        .collect()
}

fn diagnose_one(error: &figment::Error, sources: &[TomlSource]) -> ConfigError {
    match &error.kind {
        Kind::UnknownField(key, expected) => {
            let section = error.path.join(".");
            let (span, src) = locate(error, sources, &section, key);
            ConfigError::UnknownKey {
                key: key.clone(),
                suggestion: closest_key(key, expected),
                expected: expected.join(", "),
                section,
                span,
                src,
            }
        }
        Kind::InvalidType(found, expected) | Kind::InvalidValue(found, expected) => {
            let (span, src) = match error.path.split_last() {
                Some((key, table)) => locate(error, sources, &table.join("."), key),
                None => (None, None),
            };
            ConfigError::InvalidValue {
                key: error.path.join("."),
                found: found.to_string(),
                expected: expected.clone(),
                span,
                src,
            }
        }
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Span of `key` inside the document the error came from. Errors without a
/// file origin are matched against [`INLINE_SOURCE`].
fn locate(
    error: &figment::Error,
    sources: &[TomlSource],
    table: &str,
    key: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.source.as_ref())
        .and_then(|source| match source {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
    let name = origin.as_deref().unwrap_or(INLINE_SOURCE);

    sources
        .iter()
        .find(|(source_name, _)| source_name == name)
        .and_then(|(source_name, content)| {
            let offset = locate_key(content, table, key)?;
            Some((
                Some(SourceSpan::new(offset.into(), key.len())),
                Some(NamedSource::new(source_name, content.clone())),
            ))
        })
        .unwrap_or((None, None))
}

/// Byte offset of `key` as written in the `[table]` of a TOML document.
///
/// An empty `table` means the root; there a key may also be a table header,
/// as in `[inventory]`, and the offset points inside the brackets.
pub fn locate_key(content: &str, table: &str, key: &str) -> Option<usize> {
    let mut current = String::new();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        if let Some(header) = trimmed.strip_prefix('[') {
            current = header.split(']').next().unwrap_or_default().trim().to_string();
            if table.is_empty() && current == key {
                return Some(offset + indent + 1);
            }
        } else if current == table
            && trimmed
                .strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with('='))
        {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

/// The accepted key closest to `unknown`, if any is similar enough.
pub fn closest_key(unknown: &str, accepted: &[&str]) -> Option<String> {
    accepted
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics as plain text, one miette report per error.
pub fn report(errors: &[ConfigError]) -> String {
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    let mut out = String::new();
    for error in errors {
        if handler.render_report(&mut out, error).is_err() {
            out.push_str(&error.to_string());
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORAGE_KEYS: &[&str] = &["database_path", "wal_mode", "busy_timeout_ms"];

    #[test]
    fn closest_key_fixes_transposed_letters() {
        assert_eq!(closest_key("wal_mdoe", STORAGE_KEYS).as_deref(), Some("wal_mode"));
        assert_eq!(
            closest_key("databse_path", STORAGE_KEYS).as_deref(),
            Some("database_path")
        );
    }

    #[test]
    fn closest_key_ignores_distant_names() {
        assert_eq!(closest_key("zzzzzz", STORAGE_KEYS), None);
    }

    #[test]
    fn locate_key_stays_inside_its_table() {
        let content = "[other]\nwal_mode = 1\n\n[storage]\n  wal_mode=true\n";
        let offset = locate_key(content, "storage", "wal_mode").unwrap();
        assert_eq!(&content[offset..offset + 8], "wal_mode");
        assert!(offset > content.find("[storage]").unwrap());
        assert_eq!(locate_key(content, "storage", "database_path"), None);
    }

    #[test]
    fn locate_key_skips_longer_names() {
        let content = "[storage]\nwal_mode_extra = 1\nwal_mode = true\n";
        let offset = locate_key(content, "storage", "wal_mode").unwrap();
        assert_eq!(offset, content.rfind("wal_mode =").unwrap());
    }

    #[test]
    fn locate_key_finds_root_table_header() {
        let content = "[inventory]\nbackend = \"memory\"\n";
        assert_eq!(locate_key(content, "", "inventory"), Some(1));
    }

    #[test]
    fn invalid_setting_reports_key_and_hint() {
        let error = ConfigError::InvalidSetting {
            key: "storage.busy_timeout_ms",
            reason: "must be greater than 0",
            hint: "try 5000",
        };
        assert_eq!(
            error.to_string(),
            "`storage.busy_timeout_ms` must be greater than 0"
        );
        let text = report(&[error]);
        assert!(text.contains("invalid_setting"), "got: {text}");
        assert!(text.contains("try 5000"), "got: {text}");
    }
}
