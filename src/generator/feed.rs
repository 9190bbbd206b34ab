//! RSS 2.0 feed

use crate::content::ContentRecord;
use crate::helpers::{date_rfc822, escape_xml, permalink};

/// Channel-level feed metadata
#[derive(Debug, Clone)]
pub struct FeedChannel {
    pub title: String,
    pub link: String,
    pub description: String,
}

/// Render the feed; `records` are expected newest first
pub fn render_feed(channel: &FeedChannel, records: &[ContentRecord]) -> String {
    let items = records
        .iter()
        .map(|post| {
            format!(
                "    <item>\n      <title>{}</title>\n      <link>{}</link>\n      <pubDate>{}</pubDate>\n      <description>{}</description>\n    </item>",
                escape_xml(&post.title),
                escape_xml(&permalink(&channel.link, &post.slug)),
                date_rfc822(post.date),
                escape_xml(&post.description)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut feed = String::new();
    feed.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    feed.push_str("<rss version=\"2.0\">\n");
    feed.push_str("  <channel>\n");
    feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&channel.title)));
    feed.push_str(&format!("    <link>{}</link>\n", escape_xml(&channel.link)));
    feed.push_str(&format!(
        "    <description>{}</description>\n",
        escape_xml(&channel.description)
    ));
    if !items.is_empty() {
        feed.push_str(&items);
        feed.push('\n');
    }
    feed.push_str("  </channel>\n");
    feed.push_str("</rss>\n");
    feed
}
