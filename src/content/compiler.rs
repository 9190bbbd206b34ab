//! Body compiler boundary

use thiserror::Error;

/// Failure reported by a body compiler
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CompileError(pub String);

/// Turns a post body into final HTML markup
///
/// Implementations are shared across the per-record worker threads.
pub trait BodyCompiler: Send + Sync {
    fn compile(&self, body: &str) -> Result<String, CompileError>;
}
