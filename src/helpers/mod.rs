//! Helper functions shared by the page, index and feed builders

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
