//! Content record model and derived fields

use chrono::{Datelike, NaiveDate};
use std::path::Path;

use crate::helpers::{date_iso, date_long, date_short};

/// A compiled post
///
/// Built once per content file and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    /// Output path segment, from the file name
    pub slug: String,

    /// Post title
    pub title: String,

    /// Publication date
    pub date: NaiveDate,

    /// Description, empty when the front-matter has none
    pub description: String,

    /// Estimated reading time, at least 1
    pub read_time_minutes: u32,

    /// Compiled HTML body
    pub body_markup: String,
}

impl ContentRecord {
    /// Calendar year, used for index grouping
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Long-form date (like "January 5, 2024")
    pub fn date_long(&self) -> String {
        date_long(self.date)
    }

    /// Short list-item date (like "Jan 05")
    pub fn date_short(&self) -> String {
        date_short(self.date)
    }

    /// ISO date (like "2024-01-05")
    pub fn date_iso(&self) -> String {
        date_iso(self.date)
    }
}

/// Derive a slug from a file name by dropping its extension
///
/// The file name is trusted to be URL-safe; nothing is sanitized.
pub fn slug_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Estimated reading time in whole minutes
///
/// Counts whitespace-separated words and rounds up, never going below 1.
pub fn read_time(body: &str, words_per_minute: usize) -> u32 {
    let words = body.split_whitespace().count();
    let minutes = words.div_ceil(words_per_minute.max(1));
    minutes.max(1) as u32
}
