//! Stub file parsing (YAML/JSON/JSONC) and glob loading.

use crate::config::error::ConfigError;
use crate::types::stub::StubDefinition;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Stub file format, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubFormat {
    Yaml,
    Json,
    /// JSON with `//` and `/* */` comments
    Jsonc,
}

impl StubFormat {
    /// Format for `path`, `None` when the extension is not recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        [
            ("yaml", StubFormat::Yaml),
            ("yml", StubFormat::Yaml),
            ("json", StubFormat::Json),
            ("jsonc", StubFormat::Jsonc),
        ]
        .into_iter()
        .find_map(|(known, format)| ext.eq_ignore_ascii_case(known).then_some(format))
    }
}

/// Strip `//` and `/* */` comments from JSONC content, leaving string literals intact.
pub fn strip_json_comments(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                result.push(c);
            }
            ('/', Some('/')) => {
                // Line comment: drop everything up to (not including) the newline
                while chars.peek().is_some_and(|&next| next != '\n' && next != '\r') {
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
            }
            _ => result.push(c),
        }
    }

    result
}

fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

fn parse_yaml<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Deserialize `content` in the format implied by `path`.
pub fn parse_config<T: DeserializeOwned>(content: &str, path: &Path) -> Result<T, ConfigError> {
    match StubFormat::from_path(path) {
        Some(StubFormat::Yaml) => parse_yaml(content),
        Some(StubFormat::Json) => parse_json(content),
        Some(StubFormat::Jsonc) => parse_json(&strip_json_comments(content)),
        None => Err(ConfigError::UnknownFileType(path.display().to_string())),
    }
}

/// Parse a stub file's content. The file holds a list of stub definitions.
pub fn parse_stubs(content: &str, path: &Path) -> Result<Vec<StubDefinition>, ConfigError> {
    parse_config(content, path)
}

/// Load stub definitions from every file matching a glob pattern.
///
/// Files are read in path order and their definitions concatenated, so the
/// registration order of the resulting handlers is deterministic.
pub async fn load_stubs(pattern: &str) -> Result<Vec<StubDefinition>, ConfigError> {
    let mut paths: Vec<PathBuf> = glob::glob(pattern)
        .map_err(|source| ConfigError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut stubs = Vec::new();
    for path in paths {
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
        let parsed = parse_stubs(&content, &path).map_err(|source| {
            ConfigError::File {
                path: path.clone(),
                source: Box::new(source),
            }
        })?;
        tracing::debug!(path = %path.display(), stubs = parsed.len(), "loaded stub file");
        stubs.extend(parsed);
    }

    Ok(stubs)
}
