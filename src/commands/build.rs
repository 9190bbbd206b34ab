//! Build the site

use std::sync::Arc;

use crate::content::MarkdownRenderer;
use crate::error::Result;
use crate::generator::{BuildSummary, Generator};
use crate::preview::{PreviewContext, PreviewGenerator, ResvgRasterizer};
use crate::templates::TemplateSet;
use crate::Site;

/// Build the site with the default markdown compiler and resvg rasterizer
///
/// Templates and fonts are loaded up front, so a missing one fails the build
/// before any post is touched.
pub async fn run(site: &Site) -> Result<BuildSummary> {
    let start = std::time::Instant::now();

    let templates = TemplateSet::load(&site.templates_dir)?;
    tracing::info!("Loaded templates from {:?}", site.templates_dir);

    let context = Arc::new(PreviewContext::load(&site.config.preview, &site.static_dir)?);
    let rasterizer = Arc::new(ResvgRasterizer::new(&context));
    let previews = PreviewGenerator::new(context, rasterizer);

    let compiler = Arc::new(MarkdownRenderer::with_theme(&site.config.highlight_theme));

    let generator = Generator::new(site, templates, compiler, previews);
    let summary = generator.generate().await?;

    if !summary.skipped_previews.is_empty() {
        tracing::warn!(
            "Skipped {} preview images: {}",
            summary.skipped_previews.len(),
            summary.skipped_previews.join(", ")
        );
    }

    let duration = start.elapsed();
    tracing::info!(
        "Built {} posts and {} preview images in {:.2}s",
        summary.posts,
        summary.previews,
        duration.as_secs_f64()
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_template_fails_before_output() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("templates")).unwrap();
        fs::write(tmp.path().join("templates/post.html"), "{{CONTENT}}").unwrap();
        fs::create_dir_all(tmp.path().join("posts")).unwrap();
        fs::write(
            tmp.path().join("posts/a.mdx"),
            "---\ntitle: A\ndate: 2024-01-05\n---\nbody\n",
        )
        .unwrap();

        let site = Site::new(tmp.path()).unwrap();
        let err = run(&site).await.unwrap_err();
        assert!(matches!(err, BuildError::Template { .. }));
        assert!(!site.public_dir.exists());
        assert!(!site.staging_dir().exists());
    }

    #[tokio::test]
    async fn test_missing_font_is_an_asset_error() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("templates")).unwrap();
        fs::write(tmp.path().join("templates/post.html"), "{{CONTENT}}").unwrap();
        fs::write(tmp.path().join("templates/home.html"), "{{POSTS}}").unwrap();

        let site = Site::new(tmp.path()).unwrap();
        let err = run(&site).await.unwrap_err();
        match err {
            BuildError::Asset { path, .. } => assert!(path.ends_with("SpaceMono-Regular.ttf")),
            other => panic!("expected asset error, got {other:?}"),
        }
        assert!(!site.public_dir.exists());
    }
}
