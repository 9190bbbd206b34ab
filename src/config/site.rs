//! Site configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{BuildError, Result};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub role: String,

    // URL
    pub url: String,

    // Directory
    pub posts_dir: String,
    pub templates_dir: String,
    pub static_dir: String,
    pub public_dir: String,

    // Writing
    pub words_per_minute: usize,
    pub highlight_theme: String,

    // Preview images
    #[serde(default)]
    pub preview: PreviewConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Inkpress".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            role: "Writer".to_string(),

            url: "http://example.com".to_string(),

            posts_dir: "posts".to_string(),
            templates_dir: "templates".to_string(),
            static_dir: "static".to_string(),
            public_dir: "dist".to_string(),

            words_per_minute: 250,
            highlight_theme: "base16-ocean.dark".to_string(),

            preview: PreviewConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        serde_yaml::from_str(&content).map_err(|e| BuildError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Text shown inside the square badge of preview images
    pub fn badge(&self) -> String {
        if let Some(badge) = &self.preview.badge {
            return badge.clone();
        }
        self.author
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }

    /// Short site label, e.g. "example.com"
    pub fn label(&self) -> String {
        if let Some(label) = &self.preview.label {
            return label.clone();
        }
        let url = self.url.trim_end_matches('/');
        url.split_once("://")
            .map(|(_, host)| host)
            .unwrap_or(url)
            .to_string()
    }
}

/// Preview image configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    /// Regular weight font, relative to the static directory
    pub font_regular: String,
    /// Bold weight font, relative to the static directory
    pub font_bold: String,
    pub badge: Option<String>,
    pub label: Option<String>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
            font_family: "Space Mono".to_string(),
            font_regular: "SpaceMono-Regular.ttf".to_string(),
            font_bold: "SpaceMono-Bold.ttf".to_string(),
            badge: None,
            label: None,
        }
    }
}
