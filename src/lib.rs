//! inkpress: a static blog builder
//!
//! Turns a directory of MDX posts into HTML pages, a home page grouped by
//! year, an RSS feed and Open Graph preview images.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod preview;
pub mod templates;

use std::path::{Component, Path, PathBuf};

use error::Result;
use generator::BuildSummary;
use preview::Branding;

/// A site rooted at a base directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Post sources
    pub posts_dir: PathBuf,
    /// Page templates (post.html, home.html)
    pub templates_dir: PathBuf,
    /// Assets copied verbatim to the output root
    pub static_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Site {
    /// Create a site from a directory, reading `_config.yml` if present
    ///
    /// The public directory is replaced wholesale on every build, so it must
    /// not be the base directory or contain any of the source directories.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let base_dir = if base_dir.is_relative() {
            let cwd = std::env::current_dir().map_err(|e| error::BuildError::io(base_dir, e))?;
            normalize(&cwd.join(base_dir))
        } else {
            normalize(base_dir)
        };
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let site = Self {
            posts_dir: normalize(&base_dir.join(&config.posts_dir)),
            templates_dir: normalize(&base_dir.join(&config.templates_dir)),
            static_dir: normalize(&base_dir.join(&config.static_dir)),
            public_dir: normalize(&base_dir.join(&config.public_dir)),
            config,
            base_dir,
        };

        let sources = [
            &site.base_dir,
            &site.posts_dir,
            &site.templates_dir,
            &site.static_dir,
        ];
        if sources.iter().any(|dir| dir.starts_with(&site.public_dir)) {
            return Err(error::BuildError::Config {
                path: config_path,
                message: format!(
                    "public_dir {:?} would overwrite the site sources",
                    site.config.public_dir
                ),
            });
        }

        Ok(site)
    }

    /// Directory the build writes into before it is published
    pub fn staging_dir(&self) -> PathBuf {
        let name = self
            .public_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "public".to_string());
        self.public_dir.with_file_name(format!(".{}.staging", name))
    }

    /// Identity drawn on preview images
    pub fn branding(&self) -> Branding {
        Branding {
            badge: self.config.badge(),
            label: self.config.label(),
            name: self.config.author.clone(),
            role: self.config.role.clone(),
            tagline: self.config.description.clone(),
            font_family: self.config.preview.font_family.clone(),
        }
    }

    /// Build and publish the site
    pub async fn build(&self) -> Result<BuildSummary> {
        commands::build::run(self).await
    }
}

/// Resolve `.` and `..` components without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
