//! URL helper functions

/// Site-relative path of a post
///
/// # Examples
/// ```ignore
/// post_path("hello-world") // -> "/posts/hello-world"
/// ```
pub fn post_path(slug: &str) -> String {
    format!("/posts/{}", slug)
}

/// Absolute permalink of a post
///
/// # Examples
/// ```ignore
/// permalink("https://example.com/", "hello-world") // -> "https://example.com/posts/hello-world"
/// ```
pub fn permalink(base_url: &str, slug: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), post_path(slug))
}
