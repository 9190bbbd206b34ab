//! Page templates with `{{NAME}}` placeholders
//!
//! Substitution is a single pass over the template: every occurrence of a
//! known placeholder is replaced, unknown placeholders are left as they are,
//! and text coming from a substituted value is never scanned again. Values are
//! inserted verbatim; post authors are trusted, so nothing is HTML-escaped.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::ContentRecord;
use crate::error::{BuildError, Result};

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{\{([A-Z][A-Z0-9_]*)\}\}").unwrap();
}

/// Template for a single post page
pub const POST_TEMPLATE: &str = "post.html";

/// Template for the home page
pub const HOME_TEMPLATE: &str = "home.html";

/// The two page templates every build needs
#[derive(Debug, Clone)]
pub struct TemplateSet {
    post: String,
    home: String,
}

impl TemplateSet {
    /// Load `post.html` and `home.html` from the templates directory
    pub fn load(templates_dir: &Path) -> Result<Self> {
        Ok(Self {
            post: read_template(&templates_dir.join(POST_TEMPLATE))?,
            home: read_template(&templates_dir.join(HOME_TEMPLATE))?,
        })
    }

    /// Build from in-memory template text
    pub fn from_strings(post: impl Into<String>, home: impl Into<String>) -> Self {
        Self {
            post: post.into(),
            home: home.into(),
        }
    }

    /// Render a post page
    pub fn render_post(&self, record: &ContentRecord) -> String {
        let read_time = record.read_time_minutes.to_string();
        let date_long = record.date_long();
        let date_iso = record.date_iso();

        substitute(&self.post, |name| match name {
            "TITLE" => Some(record.title.as_str()),
            "DESCRIPTION" => Some(record.description.as_str()),
            "SLUG" => Some(record.slug.as_str()),
            "DATE_LONG" => Some(date_long.as_str()),
            "DATE_ISO" => Some(date_iso.as_str()),
            "READ_TIME" => Some(read_time.as_str()),
            "CONTENT" => Some(record.body_markup.as_str()),
            _ => None,
        })
    }

    /// Render the home page around the post listing
    pub fn render_home(&self, posts_html: &str) -> String {
        substitute(&self.home, |name| match name {
            "POSTS" => Some(posts_html),
            _ => None,
        })
    }
}

/// Replace every `{{NAME}}` that `lookup` knows about
pub fn substitute<'a, F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match lookup(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn read_template(path: &PathBuf) -> Result<String> {
    fs::read_to_string(path).map_err(|source| BuildError::Template {
        path: path.clone(),
        source,
    })
}
