/// Paint commands produced from a layout tree

use crate::rendering::layout::{ElementType, LayoutTree};

pub type Rgba = [u8; 4];

pub const BLACK: Rgba = [0, 0, 0, 255];
pub const WHITE: Rgba = [255, 255, 255, 255];

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: Rgba,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        scale: usize,
        rgba: Rgba,
        bold: bool,
    },
    Image {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        src: String,
    },
}

/// `#rgb`, `#rrggbb`, `white`, `black` or `transparent`.
pub fn parse_color(s: &str) -> Option<Rgba> {
    let s = s.trim();
    match s.to_ascii_lowercase().as_str() {
        "white" => return Some(WHITE),
        "black" => return Some(BLACK),
        "transparent" => return Some([0, 0, 0, 0]),
        _ => {}
    }
    let hex = s.strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |h: &str| u8::from_str_radix(h, 16).ok();
    match hex.len() {
        3 => {
            let mut out = [0, 0, 0, 255];
            for (i, c) in hex.chars().enumerate() {
                let v = channel(&c.to_string())?;
                out[i] = v * 17;
            }
            Some(out)
        }
        6 => Some([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            255,
        ]),
        _ => None,
    }
}

/// Flatten a layout tree into paint order: each block's background, then its
/// borders, then whatever follows it in the tree.
pub fn build_display_list(tree: &LayoutTree) -> Vec<PaintCommand> {
    let mut cmds = Vec::new();
    for node in &tree.nodes {
        let r = &node.lb.rect;
        match &node.elem_type {
            ElementType::Block { background, border_color } => {
                if let Some(bg) = background {
                    cmds.push(PaintCommand::SolidRect {
                        x: r.x,
                        y: r.y,
                        width: r.width,
                        height: r.height,
                        rgba: *bg,
                    });
                }
                let b = node.lb.box_model.border;
                if b.is_zero() {
                    continue;
                }
                let sides = [
                    (r.x, r.y, r.width, b.top),
                    (r.x, r.y + r.height as i32 - b.bottom as i32, r.width, b.bottom),
                    (r.x, r.y, b.left, r.height),
                    (r.x + r.width as i32 - b.right as i32, r.y, b.right, r.height),
                ];
                for (x, y, width, height) in sides {
                    if width > 0 && height > 0 {
                        cmds.push(PaintCommand::SolidRect { x, y, width, height, rgba: *border_color });
                    }
                }
            }
            ElementType::Text { color, bold } => cmds.push(PaintCommand::Text {
                x: r.x,
                y: r.y,
                text: node.text.clone(),
                scale: node.scale,
                rgba: *color,
                bold: *bold,
            }),
            ElementType::Image { src } => cmds.push(PaintCommand::Image {
                x: r.x,
                y: r.y,
                width: r.width,
                height: r.height,
                src: src.clone(),
            }),
        }
    }
    cmds
}
