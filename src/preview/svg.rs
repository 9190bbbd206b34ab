//! Lays out a [`LayoutNode`] tree with taffy and writes it as SVG
//!
//! Boxes become flexbox nodes. Text leaves are measured with the glyph
//! advances of the loaded preview fonts and wrapped greedily at spaces, both
//! while taffy sizes them and again when they are drawn.

use std::fmt::Write;
use std::mem;

use taffy::geometry::{Rect, Size};
use taffy::prelude::{NodeId, TaffyTree};
use taffy::style::{AlignItems, AvailableSpace, Dimension, JustifyContent, LengthPercentage};
use ttf_parser::{Face, GlyphId};

use super::layout::{Align, FlexDirection, Justify, LayoutNode, Length, Style};
use super::{FontAsset, PreviewContext, RasterizationError};
use crate::helpers::{escape_attr, escape_xml};

/// Advance of one glyph, in em, when no font could be parsed
const FALLBACK_ADVANCE: f32 = 0.6;
/// Ascent, in em, when no font could be parsed
const FALLBACK_ASCENT: f32 = 0.8;
const DEFAULT_FONT_SIZE: f32 = 16.0;
const DEFAULT_LINE_HEIGHT: f32 = 1.2;
/// Slack for float error between measuring and drawing
const WRAP_EPSILON: f32 = 0.01;

/// Inherited text properties
#[derive(Debug, Clone)]
struct TextStyle {
    family: String,
    size: f32,
    weight: u16,
    color: String,
    letter_spacing: f32,
    line_height: f32,
}

impl TextStyle {
    fn root(family: &str) -> Self {
        Self {
            family: family.to_string(),
            size: DEFAULT_FONT_SIZE,
            weight: 400,
            color: "#000000".to_string(),
            letter_spacing: 0.0,
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }

    fn inherit(&self, style: &Style) -> Self {
        Self {
            family: style
                .font_family
                .clone()
                .unwrap_or_else(|| self.family.clone()),
            size: style.font_size.unwrap_or(self.size),
            weight: style.font_weight.unwrap_or(self.weight),
            color: style.color.clone().unwrap_or_else(|| self.color.clone()),
            letter_spacing: style.letter_spacing.unwrap_or(self.letter_spacing),
            line_height: style.line_height.unwrap_or(self.line_height),
        }
    }

    fn line_box(&self) -> f32 {
        self.size * self.line_height
    }
}

/// Text metrics read from the preview fonts
struct TextMetrics<'a> {
    faces: Vec<(u16, Face<'a>)>,
}

impl<'a> TextMetrics<'a> {
    fn new(fonts: &'a [FontAsset]) -> Self {
        let faces = fonts
            .iter()
            .filter_map(|font| match Face::parse(&font.data, 0) {
                Ok(face) => Some((font.weight, face)),
                Err(e) => {
                    tracing::debug!("Ignoring unparsable font of weight {}: {}", font.weight, e);
                    None
                }
            })
            .collect();
        Self { faces }
    }

    /// Face whose weight is closest to `weight`
    fn face(&self, weight: u16) -> Option<&Face<'a>> {
        self.faces
            .iter()
            .min_by_key(|(w, _)| w.abs_diff(weight))
            .map(|(_, face)| face)
    }

    fn run_width(&self, text: &str, style: &TextStyle) -> f32 {
        let count = text.chars().count();
        if count == 0 {
            return 0.0;
        }

        let glyphs: f32 = match self.face(style.weight) {
            Some(face) => {
                let scale = style.size / f32::from(face.units_per_em());
                text.chars().map(|c| advance(face, c) * scale).sum()
            }
            None => count as f32 * style.size * FALLBACK_ADVANCE,
        };
        glyphs + style.letter_spacing * (count - 1) as f32
    }

    /// Offset of the baseline from the top of a line box
    fn baseline(&self, style: &TextStyle) -> f32 {
        let (ascent, descent) = match self.face(style.weight) {
            Some(face) => {
                let upem = f32::from(face.units_per_em());
                (
                    f32::from(face.ascender()) / upem,
                    f32::from(face.descender()) / upem,
                )
            }
            None => (FALLBACK_ASCENT, FALLBACK_ASCENT - 1.0),
        };
        let content = (ascent - descent) * style.size;
        (style.line_box() - content) / 2.0 + ascent * style.size
    }

    /// Split text into lines no wider than `max_width`
    ///
    /// Breaks at spaces; runs of spaces inside a line are kept. Words wider
    /// than a whole line are split between characters, except at zero width,
    /// which yields one word per line (the min-content size).
    fn wrap(&self, text: &str, style: &TextStyle, max_width: f32) -> Vec<String> {
        let limit = max_width + WRAP_EPSILON;
        let hard_split = max_width > 0.0;

        let mut lines = Vec::new();
        let mut line = String::new();
        let mut started = false;

        for word in text.split(' ') {
            let mut word = word.to_string();

            if hard_split {
                while word.chars().count() > 1 && self.run_width(&word, style) > limit {
                    if started {
                        lines.push(mem::take(&mut line));
                        started = false;
                    }
                    let cut = self.fitting_prefix(&word, style, limit);
                    let rest = word.split_off(cut);
                    lines.push(mem::replace(&mut word, rest));
                }
            }

            if started {
                let candidate = format!("{} {}", line, word);
                if self.run_width(&candidate, style) <= limit {
                    line = candidate;
                    continue;
                }
                lines.push(mem::take(&mut line));
                started = false;
            }

            if !word.is_empty() {
                line = word;
                started = true;
            }
        }

        if started || lines.is_empty() {
            lines.push(line);
        }
        lines
    }

    /// Byte length of the longest prefix that fits, at least one character
    fn fitting_prefix(&self, word: &str, style: &TextStyle, limit: f32) -> usize {
        let mut end = word.chars().next().map_or(0, char::len_utf8);
        for (i, c) in word.char_indices().skip(1) {
            let next = i + c.len_utf8();
            if self.run_width(&word[..next], style) > limit {
                break;
            }
            end = next;
        }
        end
    }
}

fn advance(face: &Face<'_>, c: char) -> f32 {
    face.glyph_index(c)
        .and_then(|id| face.glyph_hor_advance(id))
        .or_else(|| face.glyph_hor_advance(GlyphId(0)))
        .map_or(0.0, f32::from)
}

/// Taffy node context of a text leaf
#[derive(Debug, Clone)]
struct TextLeaf {
    text: String,
    style: TextStyle,
}

/// Mirror of the layout tree, holding what to draw for each taffy node
enum Drawn {
    Box {
        node: NodeId,
        background: Option<String>,
        radius: f32,
        children: Vec<Drawn>,
    },
    Text {
        node: NodeId,
        leaf: TextLeaf,
    },
}

impl Drawn {
    fn node(&self) -> NodeId {
        match self {
            Self::Box { node, .. } | Self::Text { node, .. } => *node,
        }
    }
}

/// Render a layout tree onto a canvas of the context's size
pub fn render_svg(
    root: &LayoutNode,
    context: &PreviewContext,
) -> Result<String, RasterizationError> {
    let metrics = TextMetrics::new(&context.fonts);

    let mut tree: TaffyTree<TextLeaf> = TaffyTree::new();
    tree.disable_rounding();
    let drawn = build(&mut tree, root, &TextStyle::root(&context.font_family))?;

    let canvas = Size {
        width: AvailableSpace::Definite(context.width as f32),
        height: AvailableSpace::Definite(context.height as f32),
    };
    tree.compute_layout_with_measure(
        drawn.node(),
        canvas,
        |known, available, _node, leaf, _style| match leaf {
            Some(leaf) => measure_text(leaf, &metrics, known, available),
            None => Size::ZERO,
        },
    )
    .map_err(layout_error)?;

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = context.width,
        h = context.height
    );
    draw(&tree, &drawn, (0.0, 0.0), &metrics, &mut out)?;
    out.push_str("</svg>\n");
    Ok(out)
}

fn layout_error(e: impl std::fmt::Display) -> RasterizationError {
    RasterizationError(format!("layout failed: {}", e))
}

fn build(
    tree: &mut TaffyTree<TextLeaf>,
    node: &LayoutNode,
    inherited: &TextStyle,
) -> Result<Drawn, RasterizationError> {
    match node {
        LayoutNode::Text(text) => {
            let leaf = TextLeaf {
                text: text.clone(),
                style: inherited.clone(),
            };
            let node = tree
                .new_leaf_with_context(taffy::style::Style::default(), leaf.clone())
                .map_err(layout_error)?;
            Ok(Drawn::Text { node, leaf })
        }
        LayoutNode::Box { style, children } => {
            let text = inherited.inherit(style);
            let children = children
                .iter()
                .map(|child| build(tree, child, &text))
                .collect::<Result<Vec<_>, _>>()?;
            let ids: Vec<NodeId> = children.iter().map(Drawn::node).collect();
            let node = tree
                .new_with_children(flex_style(style), &ids)
                .map_err(layout_error)?;
            Ok(Drawn::Box {
                node,
                background: style.background.clone(),
                radius: style.border_radius,
                children,
            })
        }
    }
}

fn flex_style(style: &Style) -> taffy::style::Style {
    let padding = LengthPercentage::Length(style.padding);
    let gap = LengthPercentage::Length(style.gap);

    taffy::style::Style {
        flex_direction: match style.direction {
            FlexDirection::Row => taffy::style::FlexDirection::Row,
            FlexDirection::Column => taffy::style::FlexDirection::Column,
        },
        size: Size {
            width: dimension(style.width),
            height: dimension(style.height),
        },
        padding: Rect {
            left: padding,
            right: padding,
            top: padding,
            bottom: padding,
        },
        gap: Size {
            width: gap,
            height: gap,
        },
        flex_grow: style.flex_grow,
        align_items: match style.align_items {
            Align::Stretch => None,
            Align::Center => Some(AlignItems::Center),
        },
        justify_content: match style.justify_content {
            Justify::Start => None,
            Justify::Center => Some(JustifyContent::Center),
        },
        ..taffy::style::Style::default()
    }
}

fn dimension(length: Option<Length>) -> Dimension {
    match length {
        Some(Length::Px(px)) => Dimension::Length(px),
        Some(Length::Percent(pct)) => Dimension::Percent(pct / 100.0),
        None => Dimension::Auto,
    }
}

fn measure_text(
    leaf: &TextLeaf,
    metrics: &TextMetrics<'_>,
    known: Size<Option<f32>>,
    available: Size<AvailableSpace>,
) -> Size<f32> {
    if let Size {
        width: Some(width),
        height: Some(height),
    } = known
    {
        return Size { width, height };
    }

    let max_width = known.width.unwrap_or(match available.width {
        AvailableSpace::Definite(width) => width,
        AvailableSpace::MinContent => 0.0,
        AvailableSpace::MaxContent => f32::INFINITY,
    });
    let lines = metrics.wrap(&leaf.text, &leaf.style, max_width);
    let widest = lines
        .iter()
        .map(|line| metrics.run_width(line, &leaf.style))
        .fold(0.0, f32::max);

    Size {
        width: known.width.unwrap_or(widest),
        height: known
            .height
            .unwrap_or(lines.len() as f32 * leaf.style.line_box()),
    }
}

fn draw(
    tree: &TaffyTree<TextLeaf>,
    drawn: &Drawn,
    origin: (f32, f32),
    metrics: &TextMetrics<'_>,
    out: &mut String,
) -> Result<(), RasterizationError> {
    let layout = tree.layout(drawn.node()).map_err(layout_error)?;
    let x = origin.0 + layout.location.x;
    let y = origin.1 + layout.location.y;

    match drawn {
        Drawn::Box {
            background,
            radius,
            children,
            ..
        } => {
            if let Some(fill) = background {
                let _ = writeln!(
                    out,
                    r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="{:.1}" fill="{}"/>"#,
                    x,
                    y,
                    layout.size.width,
                    layout.size.height,
                    radius,
                    escape_attr(fill)
                );
            }
            for child in children {
                draw(tree, child, (x, y), metrics, out)?;
            }
        }
        Drawn::Text { leaf, .. } => {
            draw_text(leaf, (x, y), layout.size.width, metrics, out);
        }
    }
    Ok(())
}

fn draw_text(
    leaf: &TextLeaf,
    (x, y): (f32, f32),
    width: f32,
    metrics: &TextMetrics<'_>,
    out: &mut String,
) {
    let style = &leaf.style;
    let baseline = metrics.baseline(style);
    let spacing = if style.letter_spacing != 0.0 {
        format!(r#" letter-spacing="{:.1}""#, style.letter_spacing)
    } else {
        String::new()
    };

    for (i, line) in metrics.wrap(&leaf.text, style, width).iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" font-family="{}" font-size="{:.1}" font-weight="{}" fill="{}"{} xml:space="preserve">{}</text>"#,
            x,
            y + i as f32 * style.line_box() + baseline,
            escape_attr(&style.family),
            style.size,
            style.weight,
            escape_attr(&style.color),
            spacing,
            escape_xml(line)
        );
    }
}
