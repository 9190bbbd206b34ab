//! Configuration module

mod site;

pub use site::PreviewConfig;
pub use site::SiteConfig;
