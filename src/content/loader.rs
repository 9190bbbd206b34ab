//! Content loader - discovers and compiles posts from the posts directory

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{read_time, slug_from_path, BodyCompiler, ContentRecord, FrontMatter};
use crate::error::{BuildError, Result};

/// A discovered content file and the slug it will publish under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub slug: String,
}

/// Discover every post under `posts_dir`
///
/// Paths are returned sorted so the result does not depend on the platform's
/// directory listing order. Two files whose base names differ only in case
/// are rejected too, since they share an output path on case-insensitive
/// filesystems.
pub fn discover(posts_dir: &Path) -> Result<Vec<SourceFile>> {
    if !posts_dir.exists() {
        tracing::warn!("Posts directory {:?} does not exist", posts_dir);
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(posts_dir).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(posts_dir).to_path_buf();
            BuildError::io(path, std::io::Error::other(e.to_string()))
        })?;
        let path = entry.path();
        if path.is_file() && is_content_file(path) {
            paths.push(path.to_path_buf());
        }
    }
    paths.sort();

    // Keyed by lowercased slug
    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    let mut sources = Vec::with_capacity(paths.len());

    for path in paths {
        let slug = slug_from_path(&path)
            .ok_or_else(|| BuildError::malformed(&path, "file name is not valid UTF-8"))?;

        let key = slug.to_lowercase();
        if let Some(first) = seen.get(&key) {
            return Err(BuildError::SlugConflict {
                slug,
                first: first.clone(),
                second: path,
            });
        }
        seen.insert(key, path.clone());
        sources.push(SourceFile { path, slug });
    }

    Ok(sources)
}

impl SourceFile {
    /// Read, extract and compile this file into a record
    pub fn load(
        &self,
        compiler: &dyn BodyCompiler,
        words_per_minute: usize,
    ) -> Result<ContentRecord> {
        let raw = fs::read_to_string(&self.path).map_err(|e| BuildError::io(&self.path, e))?;
        let (fm, body) = FrontMatter::parse(&self.path, &raw)?;

        let title = fm.require_title(&self.path)?;
        let date = fm.require_date(&self.path)?;

        tracing::debug!("Compiling {:?}", self.path);
        let body_markup = compiler
            .compile(body)
            .map_err(|e| BuildError::Compilation {
                slug: self.slug.clone(),
                message: e.to_string(),
            })?;

        Ok(ContentRecord {
            slug: self.slug.clone(),
            title,
            date,
            description: fm.description.unwrap_or_default(),
            read_time_minutes: read_time(body, words_per_minute),
            body_markup,
        })
    }
}

/// Check if a file holds post content
fn is_content_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("mdx") | Some("md")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{CompileError, MarkdownRenderer};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    struct FailingCompiler;

    impl BodyCompiler for FailingCompiler {
        fn compile(&self, _body: &str) -> std::result::Result<String, CompileError> {
            Err(CompileError("unexpected closing tag".to_string()))
        }
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_discover_sorted_and_filtered() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "zeta.mdx", "");
        write(tmp.path(), "alpha.md", "");
        write(tmp.path(), "notes.txt", "");
        write(tmp.path(), "draft.markdown", "");
        write(tmp.path(), "nested/beta.mdx", "");

        let sources = discover(tmp.path()).unwrap();
        let slugs: Vec<_> = sources.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, vec!["alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(discover(&tmp.path().join("posts")).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_base_names_conflict() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "hello.md", "");
        write(tmp.path(), "hello.mdx", "");

        let err = discover(tmp.path()).unwrap_err();
        match err {
            BuildError::SlugConflict { slug, .. } => assert_eq!(slug, "hello"),
            other => panic!("expected slug conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_slug_conflict_ignores_case() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "Hello.md", "");
        write(tmp.path(), "nested/hello.mdx", "");

        let err = discover(tmp.path()).unwrap_err();
        match err {
            BuildError::SlugConflict { first, second, .. } => {
                assert!(first.ends_with("Hello.md"));
                assert!(second.ends_with("nested/hello.mdx"));
            }
            other => panic!("expected slug conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_load_record() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            tmp.path(),
            "first-post.mdx",
            "---\ntitle: First Post\ndate: 2024-01-05\n---\n\nHello *world*\n",
        );
        let source = SourceFile {
            path,
            slug: "first-post".to_string(),
        };

        let record = source.load(&MarkdownRenderer::new(), 250).unwrap();
        assert_eq!(record.slug, "first-post");
        assert_eq!(record.title, "First Post");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(record.description, "");
        assert_eq!(record.read_time_minutes, 1);
        assert!(record.body_markup.contains("<em>world</em>"));
    }

    #[test]
    fn test_compile_failure_names_the_slug() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            tmp.path(),
            "broken.mdx",
            "---\ntitle: Broken\ndate: 2024-01-05\n---\n<Widget>\n",
        );
        let source = SourceFile {
            path,
            slug: "broken".to_string(),
        };

        let err = source.load(&FailingCompiler, 250).unwrap_err();
        match err {
            BuildError::Compilation { slug, message } => {
                assert_eq!(slug, "broken");
                assert!(message.contains("closing tag"));
            }
            other => panic!("expected compilation error, got {other:?}"),
        }
    }
}
