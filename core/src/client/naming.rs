#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Helper functions for deriving identifier-safe names from OpenAPI paths and Operation IDs.

use regex::Regex;
use std::sync::OnceLock;

fn non_identifier_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("Invalid regex"))
}

fn identifier_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("Invalid regex"))
}

fn words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Converts `repo_id`, `repo-id` or `repoId` to `RepoId`.
pub fn to_pascal_case(s: &str) -> String {
    words(s).map(capitalize).collect()
}

/// Converts `repo_id`, `repo-id` or `RepoId` to `repoId`.
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Replaces every character outside `[A-Za-z0-9_]` with `_`.
/// A leading digit is prefixed with `_`; an empty input becomes `_`.
pub fn sanitize_identifier(s: &str) -> String {
    let clean = non_identifier_chars().replace_all(s, "_").into_owned();
    match clean.chars().next() {
        None => "_".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{}", clean),
        Some(_) => clean,
    }
}

/// Whether `s` can be used unquoted as an object key in the generated module.
pub fn is_identifier(s: &str) -> bool {
    identifier_pattern().is_match(s)
}

/// The tree key for one path segment.
///
/// e.g. `{id}` -> `byId`, `{repo_id}` -> `byRepoId`, `info` -> `info`
pub fn segment_key(segment: &str) -> String {
    match segment
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
    {
        Some(param) => format!("by{}", to_pascal_case(param)),
        None => segment.to_string(),
    }
}

/// Derives the name of a synthesized per-operation schema.
///
/// With an `operationId` the name is `<operationId><suffix>`; otherwise it is built
/// from the method and the transformed path.
///
/// e.g. `createWidget` + `Input` -> `createWidgetInput`,
/// `GET /widgets/{id}` + `Query` -> `getWidgetsByIdQuery`
pub fn derive_input_name(
    operation_id: Option<&str>,
    method: &str,
    path: &str,
    suffix: &str,
) -> String {
    let stem = match operation_id {
        Some(id) if !id.trim().is_empty() => id.to_string(),
        _ => {
            let path_part: String = path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(|s| to_pascal_case(&segment_key(s)))
                .collect();
            format!("{}{}", method.to_lowercase(), path_part)
        }
    };
    sanitize_identifier(&format!("{}{}", stem, suffix))
}
