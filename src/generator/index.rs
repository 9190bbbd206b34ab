//! Home page post listing, grouped by year

use std::collections::BTreeMap;

use crate::content::ContentRecord;
use crate::helpers::post_path;

/// Posts published in one calendar year
#[derive(Debug, Clone, PartialEq)]
pub struct YearGroup<'a> {
    pub year: i32,
    pub members: Vec<&'a ContentRecord>,
}

/// Order records newest first
///
/// The sort is stable: records sharing a date keep their discovery order.
/// [`group_by_year`] does not sort within a year, so this must run first for
/// the listing to be chronological.
pub fn sort_newest_first(records: &mut [ContentRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Partition records by year, most recent year first
///
/// Members keep the order in which they appear in `records`.
pub fn group_by_year(records: &[ContentRecord]) -> Vec<YearGroup<'_>> {
    let mut years: BTreeMap<i32, Vec<&ContentRecord>> = BTreeMap::new();
    for record in records {
        years.entry(record.year()).or_default().push(record);
    }

    years
        .into_iter()
        .rev()
        .map(|(year, members)| YearGroup { year, members })
        .collect()
}

/// Render the listing inserted at `{{POSTS}}` in the home template
pub fn render_index(groups: &[YearGroup<'_>]) -> String {
    let mut html = String::new();

    for group in groups {
        html.push_str("<div class=\"year-group\">\n");
        html.push_str(&format!(
            "  <div class=\"year-label\">{}</div>\n",
            group.year
        ));
        for post in &group.members {
            html.push_str(&format!(
                "  <a href=\"{}\" class=\"post-item\">\n",
                post_path(&post.slug)
            ));
            html.push_str(&format!(
                "    <span class=\"post-date\">{}</span>\n",
                post.date_short()
            ));
            html.push_str(&format!(
                "    <span class=\"post-title\">{}</span>\n",
                post.title
            ));
            html.push_str("  </a>\n");
        }
        html.push_str("</div>\n");
    }

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(slug: &str, y: i32, m: u32, d: u32) -> ContentRecord {
        ContentRecord {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            description: String::new(),
            read_time_minutes: 1,
            body_markup: String::new(),
        }
    }

    fn slugs<'a>(group: &YearGroup<'a>) -> Vec<&'a str> {
        group.members.iter().map(|r| r.slug.as_str()).collect()
    }

    #[test]
    fn test_years_descending_and_each_record_once() {
        let mut records = vec![
            record("b", 2023, 12, 20),
            record("a", 2024, 1, 5),
            record("c", 2023, 3, 1),
        ];
        sort_newest_first(&mut records);
        let groups = group_by_year(&records);

        assert_eq!(groups.iter().map(|g| g.year).collect::<Vec<_>>(), vec![2024, 2023]);
        assert_eq!(slugs(&groups[0]), vec!["a"]);
        assert_eq!(slugs(&groups[1]), vec!["b", "c"]);

        let total: usize = groups.iter().map(|g| g.members.len()).sum();
        assert_eq!(total, records.len());
        for group in &groups {
            assert!(group.members.iter().all(|r| r.year() == group.year));
        }
    }

    #[test]
    fn test_grouping_keeps_input_order_within_year() {
        // Without the sort, the listing follows whatever order it was given
        let records = vec![record("early", 2024, 1, 1), record("late", 2024, 6, 1)];
        let groups = group_by_year(&records);
        assert_eq!(slugs(&groups[0]), vec!["early", "late"]);

        let mut sorted = records.clone();
        sort_newest_first(&mut sorted);
        let groups = group_by_year(&sorted);
        assert_eq!(slugs(&groups[0]), vec!["late", "early"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let mut records = vec![
            record("first", 2024, 2, 2),
            record("older", 2024, 1, 1),
            record("second", 2024, 2, 2),
        ];
        sort_newest_first(&mut records);
        let order: Vec<_> = records.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "older"]);
    }

    #[test]
    fn test_render_index_markup() {
        let records = vec![record("alpha", 2024, 1, 5)];
        let html = render_index(&group_by_year(&records));
        assert_eq!(
            html,
            "<div class=\"year-group\">\n  <div class=\"year-label\">2024</div>\n  \
             <a href=\"/posts/alpha\" class=\"post-item\">\n    \
             <span class=\"post-date\">Jan 05</span>\n    \
             <span class=\"post-title\">ALPHA</span>\n  </a>\n</div>\n"
        );
    }

    #[test]
    fn test_render_empty_index() {
        assert_eq!(render_index(&group_by_year(&[])), "");
    }
}
