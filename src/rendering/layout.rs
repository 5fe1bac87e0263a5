/// Block and flex-row layout for preview element trees
///
/// Supports the small CSS subset the preview markup uses: `width`/`height`
/// in px, uniform `padding` with a `padding-top` override, `margin-bottom`,
/// `gap`, `display: flex` rows, `border`/`border-<side>`, `background-color`,
/// and inherited `color`, `font-size` and `font-weight`.

use crate::dom::{parse_px, Element, Node};
use crate::rendering::paint::{parse_color, Rgba, BLACK};
use crate::{Error, Result};

/// Glyph cell size in unscaled pixels.
pub const GLYPH_SIZE: u32 = 8;
/// Line box height in unscaled pixels.
pub const LINE_HEIGHT: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxModel {
    pub margin: u32,
    pub border: Edges,
    pub padding: Edges,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Edges {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Edges {
    pub fn uniform(v: u32) -> Self {
        Self { top: v, right: v, bottom: v, left: v }
    }

    fn horizontal(&self) -> u32 {
        self.left + self.right
    }

    fn vertical(&self) -> u32 {
        self.top + self.bottom
    }

    pub fn is_zero(&self) -> bool {
        self.horizontal() + self.vertical() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub rect: Rect,
    pub box_model: BoxModel,
}

impl LayoutBox {
    pub fn content_width(&self) -> u32 {
        let bm = &self.box_model;
        self.rect
            .width
            .saturating_sub(bm.border.horizontal() + bm.padding.horizontal())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementType {
    /// A box that may paint a background and borders.
    Block {
        background: Option<Rgba>,
        border_color: Rgba,
    },
    /// One wrapped line of text.
    Text { color: Rgba, bold: bool },
    Image { src: String },
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub lb: LayoutBox,
    pub text: String,
    pub elem_type: ElementType,
    pub scale: usize,
}

/// Laid out nodes in paint order plus the overall size.
#[derive(Debug, Clone)]
pub struct LayoutTree {
    pub nodes: Vec<LayoutNode>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    color: Rgba,
    scale: usize,
    bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self { color: BLACK, scale: 1, bold: false }
    }
}

/// Lay out `root` at a fixed `width`; the height follows the content.
pub fn layout_root(root: &Element, width: u32) -> Result<LayoutTree> {
    if width == 0 {
        return Err(Error::RenderError("layout width must be positive".into()));
    }
    let mut nodes = Vec::new();
    let height = layout_element(root, 0, 0, width, TextStyle::default(), &mut nodes);
    Ok(LayoutTree {
        nodes,
        width,
        height: height.max(1),
    })
}

/// Scale factor for a CSS font size: 8px glyphs, rounded to whole multiples.
pub fn scale_for_font_size(px: u32) -> usize {
    ((px + 5) / 10).max(1) as usize
}

fn edges(el: &Element, prop: &str) -> Edges {
    let all = el.style.px(prop).unwrap_or(0);
    let side = |s: &str| el.style.px(&format!("{}-{}", prop, s)).unwrap_or(all);
    Edges {
        top: side("top"),
        right: side("right"),
        bottom: side("bottom"),
        left: side("left"),
    }
}

/// Border widths and color from `border` and `border-<side>` shorthands.
fn border(el: &Element) -> (Edges, Rgba) {
    let mut color = BLACK;
    let mut parse = |v: Option<&str>, fallback: u32| -> u32 {
        let Some(v) = v else { return fallback };
        let mut width = 0;
        for part in v.split_whitespace() {
            if part == "none" {
                return 0;
            }
            if let Some(px) = parse_px(part) {
                width = px;
            } else if let Some(c) = parse_color(part) {
                color = c;
            }
        }
        width
    };
    let all = parse(el.style.get("border"), 0);
    let edges = Edges {
        top: parse(el.style.get("border-top"), all),
        right: parse(el.style.get("border-right"), all),
        bottom: parse(el.style.get("border-bottom"), all),
        left: parse(el.style.get("border-left"), all),
    };
    (edges, color)
}

fn inherit(el: &Element, parent: TextStyle) -> TextStyle {
    TextStyle {
        color: el.style.get("color").and_then(parse_color).unwrap_or(parent.color),
        scale: el
            .style
            .px("font-size")
            .map(scale_for_font_size)
            .unwrap_or(parent.scale),
        bold: match el.style.get("font-weight") {
            Some(w) => w == "bold" || w.parse::<u32>().map(|n| n >= 600).unwrap_or(false),
            None => parent.bold,
        },
    }
}

/// Lay out one element at `(x, y)` within `avail` px. Returns the height it
/// consumes including its bottom margin.
fn layout_element(
    el: &Element,
    x: i32,
    y: u32,
    avail: u32,
    parent_text: TextStyle,
    out: &mut Vec<LayoutNode>,
) -> u32 {
    let text_style = inherit(el, parent_text);
    let width = el.style.px("width").map(|w| w.min(avail)).unwrap_or(avail);
    let explicit_height = el.style.px("height");
    let margin = el.style.px("margin-bottom").unwrap_or(0);

    if el.tag == "img" {
        let height = explicit_height.unwrap_or(width);
        out.push(LayoutNode {
            lb: LayoutBox {
                rect: Rect { x, y: y as i32, width, height },
                box_model: BoxModel { margin, ..Default::default() },
            },
            text: el.attr("alt").unwrap_or_default().to_string(),
            elem_type: ElementType::Image {
                src: el.attr("src").unwrap_or_default().to_string(),
            },
            scale: text_style.scale,
        });
        return height + margin;
    }

    let (border, border_color) = border(el);
    let padding = edges(el, "padding");
    let background = el.style.get("background-color").and_then(parse_color);

    // Reserve the block's slot so it paints beneath its children.
    let idx = out.len();
    out.push(LayoutNode {
        lb: LayoutBox {
            rect: Rect { x, y: y as i32, width, height: 0 },
            box_model: BoxModel { margin, border, padding },
        },
        text: String::new(),
        elem_type: ElementType::Block { background, border_color },
        scale: text_style.scale,
    });

    let inner_x = x + (border.left + padding.left) as i32;
    let inner_y = y + border.top + padding.top;
    let inner_w = width.saturating_sub(border.horizontal() + padding.horizontal());

    let content_h = if el.style.get("display") == Some("flex") {
        layout_row(el, inner_x, inner_y, inner_w, text_style, out)
    } else {
        layout_column(el, inner_x, inner_y, inner_w, text_style, out)
    };

    let height = explicit_height
        .unwrap_or(content_h + border.vertical() + padding.vertical());
    out[idx].lb.rect.height = height;
    height + margin
}

fn layout_column(
    el: &Element,
    x: i32,
    y: u32,
    width: u32,
    text_style: TextStyle,
    out: &mut Vec<LayoutNode>,
) -> u32 {
    let mut cur = y;
    for child in &el.children {
        cur += match child {
            Node::Element(e) => layout_element(e, x, cur, width, text_style, out),
            Node::Text(t) => layout_text(t, x, cur, width, text_style, out),
        };
    }
    cur - y
}

/// Children side by side. Fixed-width children keep their width; the rest
/// split what is left evenly. Text children are treated as flexible.
fn layout_row(
    el: &Element,
    x: i32,
    y: u32,
    width: u32,
    text_style: TextStyle,
    out: &mut Vec<LayoutNode>,
) -> u32 {
    let gap = el.style.px("gap").unwrap_or(0);
    let count = el.children.len() as u32;
    if count == 0 {
        return 0;
    }
    let fixed: u32 = el
        .children
        .iter()
        .filter_map(|c| match c {
            Node::Element(e) => e.style.px("width"),
            Node::Text(_) => None,
        })
        .sum();
    let flexible = el
        .children
        .iter()
        .filter(|c| !matches!(c, Node::Element(e) if e.style.px("width").is_some()))
        .count() as u32;
    let leftover = width.saturating_sub(fixed + gap * (count - 1));
    let share = if flexible > 0 { leftover / flexible } else { 0 };

    let mut cur_x = x;
    let mut row_h = 0;
    for child in &el.children {
        let (w, h) = match child {
            Node::Element(e) => {
                let w = e.style.px("width").unwrap_or(share);
                (w, layout_element(e, cur_x, y, w, text_style, out))
            }
            Node::Text(t) => (share, layout_text(t, cur_x, y, share, text_style, out)),
        };
        row_h = row_h.max(h);
        cur_x += (w + gap) as i32;
    }
    row_h
}

/// Greedy word wrap; words longer than a line are hard-split.
pub fn wrap_text(text: &str, chars_per_line: usize) -> Vec<String> {
    let chars_per_line = chars_per_line.max(1);
    let mut lines = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0;
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > chars_per_line {
            if !cur.is_empty() {
                lines.push(std::mem::take(&mut cur));
                cur_len = 0;
            }
            lines.push(word.drain(..chars_per_line).collect());
        }
        if word.is_empty() {
            continue;
        }
        if cur_len > 0 && cur_len + 1 + word.len() > chars_per_line {
            lines.push(std::mem::take(&mut cur));
            cur_len = 0;
        }
        if cur_len > 0 {
            cur.push(' ');
            cur_len += 1;
        }
        cur_len += word.len();
        cur.extend(word);
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

fn layout_text(
    text: &str,
    x: i32,
    y: u32,
    width: u32,
    style: TextStyle,
    out: &mut Vec<LayoutNode>,
) -> u32 {
    let scale = style.scale as u32;
    let chars_per_line = (width / (GLYPH_SIZE * scale)) as usize;
    let line_h = LINE_HEIGHT * scale;
    let lines = wrap_text(text, chars_per_line);
    for (i, line) in lines.iter().enumerate() {
        let line_w = (line.chars().count() as u32 * GLYPH_SIZE * scale).min(width);
        out.push(LayoutNode {
            lb: LayoutBox {
                rect: Rect {
                    x,
                    y: (y + i as u32 * line_h) as i32,
                    width: line_w,
                    height: line_h,
                },
                box_model: BoxModel::default(),
            },
            text: line.clone(),
            elem_type: ElementType::Text { color: style.color, bold: style.bold },
            scale: style.scale,
        });
    }
    lines.len() as u32 * line_h
}
