//! Front-matter parsing

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

use crate::error::{BuildError, Result};
use crate::helpers::parse_date;

/// Front-matter data from a post
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
}

impl FrontMatter {
    /// Split raw file content into front-matter and body
    ///
    /// The front-matter is a YAML block between two `---` lines at the very
    /// start of the file. Anything else is a malformed record; `path` is only
    /// used for the error.
    pub fn parse<'a>(path: &Path, content: &'a str) -> Result<(Self, &'a str)> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let rest = content
            .strip_prefix("---")
            .ok_or_else(|| BuildError::malformed(path, "missing front-matter"))?;

        // The opening delimiter must be alone on its line
        let rest = match rest.split_once('\n') {
            Some((first, after)) if first.trim().is_empty() => after,
            _ => return Err(BuildError::malformed(path, "invalid front-matter delimiter")),
        };

        let (yaml_content, body) = split_closing_delimiter(rest)
            .ok_or_else(|| BuildError::malformed(path, "unterminated front-matter"))?;

        let fm = if yaml_content.trim().is_empty() {
            FrontMatter::default()
        } else {
            serde_yaml::from_str::<FrontMatter>(yaml_content).map_err(|e| {
                BuildError::malformed(path, format!("invalid YAML front-matter: {}", e))
            })?
        };

        Ok((fm, body))
    }

    /// Required title
    pub fn require_title(&self, path: &Path) -> Result<String> {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => Ok(title.to_string()),
            _ => Err(BuildError::malformed(path, "missing required field 'title'")),
        }
    }

    /// Required date, parsed to a calendar date
    pub fn require_date(&self, path: &Path) -> Result<NaiveDate> {
        let raw = self
            .date
            .as_deref()
            .ok_or_else(|| BuildError::malformed(path, "missing required field 'date'"))?;
        parse_date(raw)
            .ok_or_else(|| BuildError::malformed(path, format!("unparsable date '{}'", raw)))
    }
}

/// Find the closing `---` line, returning (yaml, body)
fn split_closing_delimiter(rest: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let body = &rest[offset + line.len()..];
            return Some((&rest[..offset], body));
        }
        offset += line.len();
    }
    None
}
