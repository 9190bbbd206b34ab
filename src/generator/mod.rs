//! Generator module - drives every post through the build and writes the site
//!
//! Per-post work (extract, compile, render the page, draw the preview) runs
//! on the blocking pool, one task per post. The home page, feed and home
//! preview are only built once every post task has finished.
//!
//! Output goes to a staging directory next to the public directory. It
//! replaces the public directory only when the build succeeds, so a failed
//! build never leaves a half-written site behind.

mod feed;
mod index;

pub use feed::{render_feed, FeedChannel};
pub use index::{group_by_year, render_index, sort_newest_first, YearGroup};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;
use walkdir::WalkDir;

use crate::content::{loader, BodyCompiler, ContentRecord, SourceFile};
use crate::error::{BuildError, Result};
use crate::preview::{home_layout, post_layout, Branding, PreviewGenerator};
use crate::templates::TemplateSet;
use crate::Site;

/// What a successful build produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// Number of post pages written
    pub posts: usize,
    /// Number of preview images written, home image included
    pub previews: usize,
    /// Slugs whose preview image could not be rendered
    pub skipped_previews: Vec<String>,
    /// Published output directory
    pub output_dir: PathBuf,
}

/// Static site generator
pub struct Generator {
    site: Site,
    worker: PostWorker,
}

/// Everything a per-post task needs, shared across tasks
#[derive(Clone)]
struct PostWorker {
    compiler: Arc<dyn BodyCompiler>,
    templates: Arc<TemplateSet>,
    previews: PreviewGenerator,
    branding: Arc<Branding>,
    words_per_minute: usize,
}

/// Result of one post task that completed its fatal-tier steps
struct PostOutcome {
    record: ContentRecord,
    preview_written: bool,
}

impl Generator {
    /// Create a new generator
    pub fn new(
        site: &Site,
        templates: TemplateSet,
        compiler: Arc<dyn BodyCompiler>,
        previews: PreviewGenerator,
    ) -> Self {
        let worker = PostWorker {
            compiler,
            templates: Arc::new(templates),
            previews,
            branding: Arc::new(site.branding()),
            words_per_minute: site.config.words_per_minute,
        };
        Self {
            site: site.clone(),
            worker,
        }
    }

    /// Build the whole site and publish it
    pub async fn generate(&self) -> Result<BuildSummary> {
        let staging = self.site.staging_dir();
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| BuildError::io(&staging, e))?;
        }
        fs::create_dir_all(&staging).map_err(|e| BuildError::io(&staging, e))?;

        match self.build_into(&staging).await {
            Ok(mut summary) => {
                publish(&staging, &self.site.public_dir)?;
                summary.output_dir = self.site.public_dir.clone();
                Ok(summary)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&staging) {
                    tracing::warn!("Failed to remove staging dir {:?}: {}", staging, cleanup);
                }
                Err(e)
            }
        }
    }

    async fn build_into(&self, out: &Path) -> Result<BuildSummary> {
        copy_static_assets(&self.site.static_dir, out)?;

        let sources = loader::discover(&self.site.posts_dir)?;
        tracing::info!("Found {} posts in {:?}", sources.len(), self.site.posts_dir);

        let outcomes = self.process_posts(sources, out).await?;

        let mut skipped_previews = Vec::new();
        let mut records = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            if !outcome.preview_written {
                skipped_previews.push(outcome.record.slug.clone());
            }
            records.push(outcome.record);
        }

        // Within-year order in the index comes from this sort, never from discovery
        sort_newest_first(&mut records);

        let listing = render_index(&group_by_year(&records));
        let home = self.worker.templates.render_home(&listing);
        write_file(&out.join("index.html"), home.as_bytes())?;
        tracing::info!("Generated index.html");

        let channel = FeedChannel {
            title: self.site.config.title.clone(),
            link: self.site.config.url.clone(),
            description: self.site.config.description.clone(),
        };
        write_file(&out.join("rss.xml"), render_feed(&channel, &records).as_bytes())?;
        tracing::info!("Generated rss.xml");

        let home_preview = self.generate_home_preview(out).await;

        Ok(BuildSummary {
            posts: records.len(),
            previews: records.len() - skipped_previews.len() + usize::from(home_preview),
            skipped_previews,
            output_dir: out.to_path_buf(),
        })
    }

    /// Run every post on the blocking pool and wait for all of them
    ///
    /// Returns records in discovery order. If any post fails a fatal step the
    /// remaining tasks are still awaited, so nothing writes into the staging
    /// directory after it is removed.
    async fn process_posts(&self, sources: Vec<SourceFile>, out: &Path) -> Result<Vec<PostOutcome>> {
        let mut tasks = JoinSet::new();
        for (position, source) in sources.into_iter().enumerate() {
            let worker = self.worker.clone();
            let out = out.to_path_buf();
            tasks.spawn_blocking(move || (position, worker.process(&source, &out)));
        }

        let mut outcomes = Vec::new();
        let mut failures: Vec<(usize, BuildError)> = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, Ok(outcome))) => outcomes.push((position, outcome)),
                Ok((position, Err(e))) => {
                    tracing::error!("{}", e);
                    failures.push((position, e));
                }
                Err(e) => {
                    tracing::error!("Post task failed: {}", e);
                    failures.push((usize::MAX, BuildError::Worker(e.to_string())));
                }
            }
        }

        if let Some((_, first)) = failures.into_iter().min_by_key(|(position, _)| *position) {
            return Err(first);
        }

        outcomes.sort_by_key(|(position, _)| *position);
        Ok(outcomes.into_iter().map(|(_, outcome)| outcome).collect())
    }

    async fn generate_home_preview(&self, out: &Path) -> bool {
        let previews = self.worker.previews.clone();
        let branding = Arc::clone(&self.worker.branding);
        let path = out.join("og-home.png");

        let rendered = tokio::task::spawn_blocking(move || {
            let bitmap = previews
                .render(&home_layout(&branding))
                .map_err(|e| e.to_string())?;
            fs::write(&path, &bitmap.png).map_err(|e| e.to_string())
        })
        .await;

        match rendered {
            Ok(Ok(())) => {
                tracing::info!("Generated og-home.png");
                true
            }
            Ok(Err(message)) => {
                report_preview_failure("og-home", message);
                false
            }
            Err(e) => {
                report_preview_failure("og-home", e.to_string());
                false
            }
        }
    }
}

impl PostWorker {
    /// Compile one post and write its page and preview image
    fn process(&self, source: &SourceFile, out: &Path) -> Result<PostOutcome> {
        let record = source.load(self.compiler.as_ref(), self.words_per_minute)?;

        let page = self.templates.render_post(&record);
        let page_path = out.join("posts").join(&record.slug).join("index.html");
        write_file(&page_path, page.as_bytes())?;
        tracing::debug!("Generated post: {:?}", page_path);

        let preview_written = match self.write_preview(&record, out) {
            Ok(()) => {
                tracing::debug!("Generated preview image for {}", record.slug);
                true
            }
            Err(e) => {
                report_preview_failure(&record.slug, e.to_string());
                false
            }
        };

        Ok(PostOutcome {
            record,
            preview_written,
        })
    }

    fn write_preview(&self, record: &ContentRecord, out: &Path) -> Result<()> {
        let layout = post_layout(
            &record.title,
            record.date,
            record.read_time_minutes,
            &self.branding,
        );
        let bitmap = self
            .previews
            .render(&layout)
            .map_err(|e| BuildError::Rasterization {
                name: record.slug.clone(),
                message: e.to_string(),
            })?;
        write_file(
            &out.join("og").join(format!("{}.png", record.slug)),
            &bitmap.png,
        )
    }
}

fn report_preview_failure(name: &str, message: String) {
    let err = BuildError::Rasterization {
        name: name.to_string(),
        message,
    };
    tracing::warn!("{}; continuing without it", err);
}

/// Write a file, creating parent directories as needed
fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| BuildError::io(path, e))
}

/// Copy the static directory verbatim into the output root
fn copy_static_assets(static_dir: &Path, out: &Path) -> Result<()> {
    if !static_dir.exists() {
        return Ok(());
    }

    let mut copied = 0;
    for entry in WalkDir::new(static_dir).follow_links(true) {
        let entry = entry.map_err(|e| {
            BuildError::io(static_dir, std::io::Error::other(e.to_string()))
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let relative = path.strip_prefix(static_dir).unwrap_or(path);
        let dest = out.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        fs::copy(path, &dest).map_err(|e| BuildError::io(path, e))?;
        copied += 1;
    }

    tracing::debug!("Copied {} static files", copied);
    Ok(())
}

/// Replace the public directory with the finished staging directory
fn publish(staging: &Path, public_dir: &Path) -> Result<()> {
    if public_dir.exists() {
        fs::remove_dir_all(public_dir).map_err(|e| BuildError::io(public_dir, e))?;
    }
    if let Some(parent) = public_dir.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    fs::rename(staging, public_dir).map_err(|e| BuildError::io(public_dir, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::CompileError;
    use crate::preview::{Bitmap, PreviewContext, RasterizationError, Rasterizer};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Wraps the body in a paragraph, failing on a marker
    struct StubCompiler;

    impl BodyCompiler for StubCompiler {
        fn compile(&self, body: &str) -> std::result::Result<String, CompileError> {
            if body.contains("<Broken") {
                return Err(CompileError("unclosed component <Broken>".to_string()));
            }
            Ok(format!("<p>{}</p>", body.trim()))
        }
    }

    /// Returns a fixed bitmap, failing for SVGs that mention a marker
    #[derive(Default)]
    struct StubRasterizer {
        calls: AtomicUsize,
    }

    impl Rasterizer for StubRasterizer {
        fn rasterize(
            &self,
            svg: &str,
            target_width: u32,
        ) -> std::result::Result<Bitmap, RasterizationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if svg.contains("Unrenderable") {
                return Err(RasterizationError("glyph missing".to_string()));
            }
            Ok(Bitmap {
                width: target_width,
                height: 630,
                png: b"\x89PNG stub".to_vec(),
            })
        }
    }

    const POST_TEMPLATE: &str =
        "<h1>{{TITLE}}</h1><time datetime=\"{{DATE_ISO}}\">{{DATE_LONG}}</time> {{READ_TIME}} min<article>{{CONTENT}}</article>";
    const HOME_TEMPLATE: &str = "<main>\n{{POSTS}}</main>";

    fn post(title: &str, date: &str, body: &str) -> String {
        format!("---\ntitle: {}\ndate: {}\n---\n{}\n", title, date, body)
    }

    fn fixture(posts: &[(&str, String)]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("posts")).unwrap();
        for (name, content) in posts {
            fs::write(root.join("posts").join(name), content).unwrap();
        }
        fs::create_dir_all(root.join("static/css")).unwrap();
        fs::write(root.join("static/css/site.css"), "body{}").unwrap();
        fs::write(
            root.join("_config.yml"),
            "title: Test Site\nurl: https://example.com\ndescription: Notes\n",
        )
        .unwrap();
        tmp
    }

    fn generator(site: &Site, rasterizer: Arc<StubRasterizer>) -> Generator {
        let context = Arc::new(PreviewContext {
            width: 1200,
            height: 630,
            font_family: "Space Mono".to_string(),
            fonts: Vec::new(),
        });
        Generator::new(
            site,
            TemplateSet::from_strings(POST_TEMPLATE, HOME_TEMPLATE),
            Arc::new(StubCompiler),
            PreviewGenerator::new(context, rasterizer),
        )
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("{path:?}: {e}"))
    }

    #[tokio::test]
    async fn test_end_to_end_build() {
        let tmp = fixture(&[
            ("beta.mdx", post("Beta", "2023-12-20", "Second words here")),
            ("alpha.mdx", post("Alpha", "2024-01-05", "First")),
        ]);
        let site = Site::new(tmp.path()).unwrap();
        let rasterizer = Arc::new(StubRasterizer::default());

        let summary = generator(&site, rasterizer.clone()).generate().await.unwrap();
        assert_eq!(summary.posts, 2);
        assert_eq!(summary.previews, 3);
        assert!(summary.skipped_previews.is_empty());
        assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 3);

        let dist = tmp.path().join("dist");
        assert_eq!(summary.output_dir, dist);
        assert!(!site.staging_dir().exists());

        let alpha = read(dist.join("posts/alpha/index.html"));
        assert_eq!(
            alpha,
            "<h1>Alpha</h1><time datetime=\"2024-01-05\">January 5, 2024</time> 1 min<article><p>First</p></article>"
        );
        assert!(dist.join("posts/beta/index.html").exists());
        assert!(dist.join("og/alpha.png").exists());
        assert!(dist.join("og/beta.png").exists());
        assert!(dist.join("og-home.png").exists());
        assert_eq!(read(dist.join("css/site.css")), "body{}");

        let index = read(dist.join("index.html"));
        let year_2024 = index.find(">2024<").unwrap();
        let year_2023 = index.find(">2023<").unwrap();
        let alpha_pos = index.find(">Alpha<").unwrap();
        let beta_pos = index.find(">Beta<").unwrap();
        assert!(year_2024 < alpha_pos && alpha_pos < year_2023 && year_2023 < beta_pos);
        assert_eq!(index.matches("class=\"year-group\"").count(), 2);

        let feed = read(dist.join("rss.xml"));
        let first_item = feed.find("<item>").unwrap();
        assert!(feed[first_item..].starts_with("<item>\n      <title>Alpha</title>"));
        assert!(feed.contains("<link>https://example.com/posts/beta</link>"));
    }

    #[tokio::test]
    async fn test_within_year_order_is_chronological() {
        // File names sort opposite to dates
        let tmp = fixture(&[
            ("a-early.mdx", post("Early", "2024-01-01", "x")),
            ("b-middle.mdx", post("Middle", "2024-03-01", "x")),
            ("c-late.mdx", post("Late", "2024-06-01", "x")),
        ]);
        let site = Site::new(tmp.path()).unwrap();
        generator(&site, Arc::default()).generate().await.unwrap();

        let index = read(tmp.path().join("dist/index.html"));
        let late = index.find(">Late<").unwrap();
        let middle = index.find(">Middle<").unwrap();
        let early = index.find(">Early<").unwrap();
        assert!(late < middle && middle < early);
    }

    #[tokio::test]
    async fn test_preview_failure_is_not_fatal() {
        let tmp = fixture(&[
            ("fine.mdx", post("Fine", "2024-01-05", "x")),
            ("odd.mdx", post("Unrenderable", "2024-01-06", "x")),
        ]);
        let site = Site::new(tmp.path()).unwrap();

        let summary = generator(&site, Arc::default()).generate().await.unwrap();
        assert_eq!(summary.posts, 2);
        assert_eq!(summary.skipped_previews, vec!["odd".to_string()]);
        assert_eq!(summary.previews, 2);

        let dist = tmp.path().join("dist");
        assert!(dist.join("posts/odd/index.html").exists());
        assert!(!dist.join("og/odd.png").exists());
        assert!(dist.join("og/fine.png").exists());
    }

    #[tokio::test]
    async fn test_home_preview_failure_is_not_fatal() {
        let tmp = fixture(&[
            ("one.mdx", post("One", "2024-01-05", "x")),
            ("two.mdx", post("Two", "2024-02-05", "x")),
        ]);
        // Only the home layout shows the author name
        fs::write(
            tmp.path().join("_config.yml"),
            "title: Test Site\nurl: https://example.com\nauthor: Unrenderable Writer\n",
        )
        .unwrap();
        let site = Site::new(tmp.path()).unwrap();
        let rasterizer = Arc::new(StubRasterizer::default());

        let summary = generator(&site, rasterizer.clone()).generate().await.unwrap();
        assert_eq!(summary.posts, 2);
        assert_eq!(summary.previews, summary.posts);
        assert!(summary.skipped_previews.is_empty());
        assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 3);

        let dist = tmp.path().join("dist");
        assert!(!dist.join("og-home.png").exists());
        assert!(dist.join("og/one.png").exists());
        assert!(dist.join("index.html").exists());
        assert!(dist.join("rss.xml").exists());
    }

    #[tokio::test]
    async fn test_compile_failure_aborts_without_output() {
        let tmp = fixture(&[
            ("good.mdx", post("Good", "2024-01-05", "fine")),
            ("bad.mdx", post("Bad", "2024-01-06", "<Broken")),
        ]);
        let site = Site::new(tmp.path()).unwrap();

        let err = generator(&site, Arc::default()).generate().await.unwrap_err();
        match err {
            BuildError::Compilation { slug, .. } => assert_eq!(slug, "bad"),
            other => panic!("expected compilation error, got {other:?}"),
        }
        assert!(!tmp.path().join("dist").exists());
        assert!(!site.staging_dir().exists());
    }

    #[tokio::test]
    async fn test_failed_build_keeps_previous_output() {
        let tmp = fixture(&[("good.mdx", post("Good", "2024-01-05", "fine"))]);
        let site = Site::new(tmp.path()).unwrap();
        generator(&site, Arc::default()).generate().await.unwrap();

        fs::write(tmp.path().join("posts/broken.mdx"), "no front-matter here").unwrap();
        let err = generator(&site, Arc::default()).generate().await.unwrap_err();
        assert!(matches!(err, BuildError::MalformedRecord { .. }));

        let dist = tmp.path().join("dist");
        assert!(dist.join("posts/good/index.html").exists());
        assert!(!dist.join("posts/broken").exists());
    }

    #[tokio::test]
    async fn test_slug_conflict_aborts() {
        let tmp = fixture(&[
            ("same.md", post("One", "2024-01-05", "x")),
            ("same.mdx", post("Two", "2024-01-06", "x")),
        ]);
        let site = Site::new(tmp.path()).unwrap();
        let rasterizer = Arc::new(StubRasterizer::default());

        let err = generator(&site, rasterizer.clone()).generate().await.unwrap_err();
        assert!(matches!(err, BuildError::SlugConflict { .. }));
        assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 0);
        assert!(!tmp.path().join("dist").exists());
    }

    #[tokio::test]
    async fn test_empty_site() {
        let tmp = fixture(&[]);
        let site = Site::new(tmp.path()).unwrap();
        let summary = generator(&site, Arc::default()).generate().await.unwrap();

        assert_eq!(summary.posts, 0);
        assert_eq!(summary.previews, 1);
        assert_eq!(read(tmp.path().join("dist/index.html")), "<main>\n</main>");
        assert!(read(tmp.path().join("dist/rss.xml")).contains("<title>Test Site</title>"));
    }
}
