//! Content module - handles posts, front-matter and body compilation

mod compiler;
mod frontmatter;
pub mod loader;
mod markdown;
mod record;

pub use compiler::{BodyCompiler, CompileError};
pub use frontmatter::FrontMatter;
pub use loader::SourceFile;
pub use markdown::MarkdownRenderer;
pub use record::{read_time, slug_from_path, ContentRecord};
