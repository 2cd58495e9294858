//! Readers and writers for the on-disk formats.
//!
//! - contacts: `.json` (one array) or `.jsonl` (one object per line)
//! - rules: `.json` array of `{field, operator, value}`
//! - segments: `.json` array of `{name, rules}`

use crate::error::{LoadError, Result};
use crate::rule::{FilterRule, MaterializedSegment, SegmentDefinition};
use crate::types::Contact;
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Read a whole file, mapping a missing file to `FileNotFound`.
fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(fs::read_to_string(path)?)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn parse_document<T: DeserializeOwned>(file: &str, content: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|source| LoadError::Json {
        file: file.to_string(),
        source,
    })
}

/// Parse a JSON array of contacts.
pub fn parse_contacts_json(file: &str, content: &str) -> Result<Vec<Contact>> {
    parse_document(file, content)
}

/// Parse a JSON Lines contact export.
///
/// Blank lines are skipped. Lines are decoded in parallel; output order
/// follows the file.
pub fn parse_contacts_jsonl(file: &str, content: &str) -> Result<Vec<Contact>> {
    let lines: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    lines
        .into_par_iter()
        .map(|(line_no, line)| {
            serde_json::from_str::<Contact>(line).map_err(|e| LoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Load contacts from a `.json` or `.jsonl` file.
pub fn load_contacts(path: &Path) -> Result<Vec<Contact>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("json") => parse_contacts_json(&file_name(path), &read_file(path)?),
        Some("jsonl") | Some("ndjson") => parse_contacts_jsonl(&file_name(path), &read_file(path)?),
        _ => Err(LoadError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

/// Load a rule-set (a JSON array of rules).
pub fn load_rules(path: &Path) -> Result<Vec<FilterRule>> {
    parse_document(&file_name(path), &read_file(path)?)
}

/// Load segment definitions (a JSON array of `{name, rules}`).
///
/// Segment names must be unique and non-empty.
pub fn load_segments(path: &Path) -> Result<Vec<SegmentDefinition>> {
    let segments: Vec<SegmentDefinition> = parse_document(&file_name(path), &read_file(path)?)?;

    let mut seen = std::collections::HashSet::new();
    for segment in &segments {
        if segment.name.trim().is_empty() {
            return Err(LoadError::ValidationError(
                "segment with empty name".to_string(),
            ));
        }
        if !seen.insert(segment.name.as_str()) {
            return Err(LoadError::ValidationError(format!(
                "duplicate segment name: {}",
                segment.name
            )));
        }
    }

    Ok(segments)
}

/// Write materialized segments as pretty-printed JSON.
pub fn write_segments(path: &Path, segments: &[MaterializedSegment]) -> Result<()> {
    let json = serde_json::to_string_pretty(segments).map_err(|source| LoadError::Json {
        file: file_name(path),
        source,
    })?;
    fs::write(path, json)?;
    Ok(())
}
