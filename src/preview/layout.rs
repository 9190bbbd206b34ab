//! Declarative layout trees for preview images

use chrono::NaiveDate;

use crate::helpers::date_long;

const BACKGROUND: &str = "#1A1A1A";
const ACCENT: &str = "#C4553A";
const BADGE_TEXT: &str = "#FFFFFF";
const HEADLINE: &str = "#F0EDED";
const MUTED: &str = "#A0A0A0";
const FAINT: &str = "#666666";

/// A node of a preview layout: a styled box or a run of text
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    Box {
        style: Style,
        children: Vec<LayoutNode>,
    },
    Text(String),
}

impl LayoutNode {
    pub fn boxed(style: Style, children: Vec<LayoutNode>) -> Self {
        Self::Box { style, children }
    }

    /// A box holding a single run of text
    pub fn label(style: Style, text: impl Into<String>) -> Self {
        Self::Box {
            style,
            children: vec![Self::Text(text.into())],
        }
    }

    /// All text runs in document order
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Text(text) => out.push(text),
            Self::Box { children, .. } => {
                for child in children {
                    child.collect_texts(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
}

/// Cross-axis alignment
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Align {
    #[default]
    Stretch,
    Center,
}

/// Main-axis distribution
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Justify {
    #[default]
    Start,
    Center,
}

/// Box size: pixels, or a percentage (0 to 100) of the parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f32),
    Percent(f32),
}

/// Box and text style. Text properties are inherited by descendants.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    pub direction: FlexDirection,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub padding: f32,
    pub gap: f32,
    pub flex_grow: f32,
    pub align_items: Align,
    pub justify_content: Justify,
    pub background: Option<String>,
    pub border_radius: f32,

    pub color: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub font_weight: Option<u16>,
    pub letter_spacing: Option<f32>,
    pub line_height: Option<f32>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self) -> Self {
        self.direction = FlexDirection::Column;
        self
    }

    pub fn size(mut self, width: Length, height: Length) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    pub fn gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    pub fn grow(mut self, grow: f32) -> Self {
        self.flex_grow = grow;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align_items = align;
        self
    }

    pub fn justify(mut self, justify: Justify) -> Self {
        self.justify_content = justify;
        self
    }

    pub fn background(mut self, color: &str) -> Self {
        self.background = Some(color.to_string());
        self
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.border_radius = radius;
        self
    }

    pub fn color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn font_family(mut self, family: &str) -> Self {
        self.font_family = Some(family.to_string());
        self
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn bold(mut self) -> Self {
        self.font_weight = Some(700);
        self
    }

    pub fn letter_spacing(mut self, spacing: f32) -> Self {
        self.letter_spacing = Some(spacing);
        self
    }

    pub fn line_height(mut self, factor: f32) -> Self {
        self.line_height = Some(factor);
        self
    }
}

/// Identity shown on every preview image
#[derive(Debug, Clone, PartialEq)]
pub struct Branding {
    /// Badge initials, e.g. "JD"
    pub badge: String,
    /// Site label, e.g. "example.com"
    pub label: String,
    pub name: String,
    pub role: String,
    pub tagline: String,
    pub font_family: String,
}

fn canvas(branding: &Branding) -> Style {
    Style::new()
        .column()
        .size(Length::Percent(100.0), Length::Percent(100.0))
        .background(BACKGROUND)
        .padding(80.0)
        .font_family(&branding.font_family)
}

fn badge(text: &str, side: f32, radius: f32, font_size: f32, spacing: f32) -> LayoutNode {
    LayoutNode::label(
        Style::new()
            .size(Length::Px(side), Length::Px(side))
            .background(ACCENT)
            .radius(radius)
            .align(Align::Center)
            .justify(Justify::Center)
            .color(BADGE_TEXT)
            .font_size(font_size)
            .bold()
            .letter_spacing(spacing),
        text,
    )
}

/// Subtitle line of a post preview
pub fn post_subtitle(date: NaiveDate, read_time_minutes: u32) -> String {
    format!("{}  ·  {} min read", date_long(date), read_time_minutes)
}

/// Preview layout for a single post
pub fn post_layout(
    title: &str,
    date: NaiveDate,
    read_time_minutes: u32,
    branding: &Branding,
) -> LayoutNode {
    LayoutNode::boxed(
        canvas(branding),
        vec![
            LayoutNode::boxed(
                Style::new().align(Align::Center).gap(16.0),
                vec![
                    badge(&branding.badge, 48.0, 6.0, 18.0, 1.0),
                    LayoutNode::label(
                        Style::new().color(HEADLINE).font_size(20.0).bold(),
                        &branding.label,
                    ),
                ],
            ),
            LayoutNode::boxed(
                Style::new()
                    .column()
                    .justify(Justify::Center)
                    .grow(1.0)
                    .gap(24.0),
                vec![
                    LayoutNode::label(
                        Style::new()
                            .color(HEADLINE)
                            .font_size(44.0)
                            .bold()
                            .line_height(1.2),
                        title,
                    ),
                    LayoutNode::label(
                        Style::new().color(MUTED).font_size(18.0),
                        post_subtitle(date, read_time_minutes),
                    ),
                ],
            ),
        ],
    )
}

/// Preview layout for the home page
pub fn home_layout(branding: &Branding) -> LayoutNode {
    LayoutNode::boxed(
        canvas(branding),
        vec![
            badge(&branding.badge, 64.0, 8.0, 24.0, 2.0),
            LayoutNode::boxed(
                Style::new()
                    .column()
                    .justify(Justify::Center)
                    .grow(1.0)
                    .gap(20.0),
                vec![
                    LayoutNode::label(
                        Style::new().color(HEADLINE).font_size(48.0).bold(),
                        &branding.name,
                    ),
                    LayoutNode::label(
                        Style::new().color(ACCENT).font_size(24.0).bold(),
                        branding.role.to_uppercase(),
                    ),
                    LayoutNode::label(
                        Style::new().color(MUTED).font_size(20.0).line_height(1.6),
                        &branding.tagline,
                    ),
                ],
            ),
            LayoutNode::label(Style::new().color(FAINT).font_size(18.0), &branding.label),
        ],
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn branding() -> Branding {
        Branding {
            badge: "JD".to_string(),
            label: "example.com".to_string(),
            name: "John Doe".to_string(),
            role: "Software Engineer".to_string(),
            tagline: "Writing about systems.".to_string(),
            font_family: "Space Mono".to_string(),
        }
    }

    #[test]
    fn test_post_layout_subtitle() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let layout = post_layout("Hello", date, 3, &branding());
        let texts = layout.texts();

        assert_eq!(texts, vec!["JD", "example.com", "Hello", "January 5, 2024  ·  3 min read"]);
        let subtitle = texts[3];
        assert!(subtitle.contains("January 5, 2024"));
        assert!(subtitle.contains("3 min read"));
    }

    #[test]
    fn test_post_layout_is_deterministic() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 20).unwrap();
        assert_eq!(
            post_layout("Beta", date, 7, &branding()),
            post_layout("Beta", date, 7, &branding())
        );
    }

    #[test]
    fn test_home_layout_block() {
        let layout = home_layout(&branding());
        assert_eq!(
            layout.texts(),
            vec![
                "JD",
                "John Doe",
                "SOFTWARE ENGINEER",
                "Writing about systems.",
                "example.com"
            ]
        );

        match layout {
            LayoutNode::Box { style, children } => {
                assert_eq!(style.background.as_deref(), Some(BACKGROUND));
                assert_eq!(style.direction, FlexDirection::Column);
                assert_eq!(children.len(), 3);
            }
            LayoutNode::Text(_) => panic!("root must be a box"),
        }
    }
}
