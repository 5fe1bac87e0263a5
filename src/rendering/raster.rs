/// Software rasterizer: paint commands onto an RGBA canvas, then PNG

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::{encode_png, DecodedImage};
use crate::rendering::layout::{GLYPH_SIZE, LINE_HEIGHT};
use crate::rendering::paint::{PaintCommand, Rgba};
use crate::rendering::Screenshot;
use crate::{Error, Result};

/// Decoded images keyed by `src`; missing entries are broken images.
pub type ImageTable = HashMap<String, Arc<DecodedImage>>;

pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    /// A canvas filled with `background`; fails when the buffer size does
    /// not fit in memory addressing.
    pub fn new(width: u32, height: u32, background: Rgba) -> Result<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                Error::RenderError(format!("canvas {}x{} is too large", width, height))
            })?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|e| Error::RenderError(format!("canvas {}x{}: {}", width, height, e)))?;
        for _ in 0..len / 4 {
            pixels.extend_from_slice(&background);
        }
        Ok(Self { width, height, pixels })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = self.index(x, y);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    /// Source-over blend of one pixel; out-of-bounds writes are clipped.
    fn blend(&mut self, x: i32, y: i32, src: Rgba) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height || src[3] == 0 {
            return;
        }
        let i = self.index(x as u32, y as u32);
        let a = src[3] as u32;
        for c in 0..3 {
            let dst = self.pixels[i + c] as u32;
            self.pixels[i + c] = ((src[c] as u32 * a + dst * (255 - a)) / 255) as u8;
        }
        let dst_a = self.pixels[i + 3] as u32;
        self.pixels[i + 3] = (a + dst_a * (255 - a) / 255) as u8;
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, rgba: Rgba) {
        for dy in 0..height as i32 {
            for dx in 0..width as i32 {
                self.blend(x + dx, y + dy, rgba);
            }
        }
    }

    fn draw_glyph(&mut self, x: i32, y: i32, c: char, scale: i32, rgba: Rgba) {
        let glyph = BASIC_FONTS
            .get(c)
            .or_else(|| LATIN_FONTS.get(c))
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE as i32 {
                if bits & (1u8 << col) != 0 {
                    self.fill_rect(
                        x + col * scale,
                        y + row as i32 * scale,
                        scale as u32,
                        scale as u32,
                        rgba,
                    );
                }
            }
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: usize, rgba: Rgba, bold: bool) {
        let scale = scale.max(1) as i32;
        let advance = GLYPH_SIZE as i32 * scale;
        // Glyphs sit vertically centered in the line box.
        let top = y + ((LINE_HEIGHT - GLYPH_SIZE) as i32 * scale) / 2;
        for (i, c) in text.chars().enumerate() {
            let gx = x + i as i32 * advance;
            self.draw_glyph(gx, top, c, scale, rgba);
            if bold {
                self.draw_glyph(gx + 1, top, c, scale, rgba);
            }
        }
    }

    /// Nearest-neighbour scale of `img` into the destination box.
    fn draw_image(&mut self, x: i32, y: i32, width: u32, height: u32, img: &DecodedImage) {
        if img.width == 0 || img.height == 0 {
            return;
        }
        for dy in 0..height {
            let sy = (dy as u64 * img.height as u64 / height as u64) as u32;
            for dx in 0..width {
                let sx = (dx as u64 * img.width as u64 / width as u64) as u32;
                self.blend(x + dx as i32, y + dy as i32, img.pixel(sx, sy));
            }
        }
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.pixels
    }
}

/// Execute `commands` on a `width` x `height` canvas filled with
/// `background` and encode the result as PNG.
pub fn rasterize(
    commands: &[PaintCommand],
    width: u32,
    height: u32,
    background: Rgba,
    images: &ImageTable,
) -> Result<Screenshot> {
    let canvas = paint_canvas(commands, width, height, background, images)?;
    let png_data = encode_png(width, height, &canvas.into_rgba())?;
    Ok(Screenshot { width, height, png_data })
}

pub fn paint_canvas(
    commands: &[PaintCommand],
    width: u32,
    height: u32,
    background: Rgba,
    images: &ImageTable,
) -> Result<Canvas> {
    if width == 0 || height == 0 {
        return Err(Error::RenderError(format!(
            "cannot rasterize an empty {}x{} canvas",
            width, height
        )));
    }
    let mut canvas = Canvas::new(width, height, background)?;
    for cmd in commands {
        match cmd {
            PaintCommand::SolidRect { x, y, width, height, rgba } => {
                canvas.fill_rect(*x, *y, *width, *height, *rgba)
            }
            PaintCommand::Text { x, y, text, scale, rgba, bold } => {
                canvas.draw_text(*x, *y, text, *scale, *rgba, *bold)
            }
            PaintCommand::Image { x, y, width, height, src } => match images.get(src) {
                Some(img) => canvas.draw_image(*x, *y, *width, *height, img),
                None => log::debug!("skipping unloaded image {}", truncate_src(src)),
            },
        }
    }
    Ok(canvas)
}

fn truncate_src(src: &str) -> String {
    if src.len() <= 48 {
        return src.to_string();
    }
    let cut = (0..=48).rev().find(|i| src.is_char_boundary(*i)).unwrap_or(0);
    format!("{}...", &src[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::paint::{BLACK, WHITE};

    #[test]
    fn background_and_rect_are_painted() {
        let cmds = vec![PaintCommand::SolidRect { x: 2, y: 2, width: 2, height: 2, rgba: BLACK }];
        let c = paint_canvas(&cmds, 8, 8, WHITE, &ImageTable::new()).unwrap();
        assert_eq!(c.pixel(0, 0), WHITE);
        assert_eq!(c.pixel(3, 3), BLACK);
        assert_eq!(c.pixel(4, 4), WHITE);
    }

    #[test]
    fn text_leaves_dark_pixels_inside_its_line_box() {
        let cmds = vec![PaintCommand::Text {
            x: 0,
            y: 0,
            text: "Ação".into(),
            scale: 1,
            rgba: BLACK,
            bold: false,
        }];
        let c = paint_canvas(&cmds, 32, 10, WHITE, &ImageTable::new()).unwrap();
        let dark = (0..10)
            .flat_map(|y| (0..32).map(move |x| (x, y)))
            .filter(|&(x, y)| c.pixel(x, y) == BLACK)
            .count();
        assert!(dark > 10);
    }

    #[test]
    fn images_scale_and_missing_ones_are_skipped() {
        let img = DecodedImage { width: 1, height: 1, rgba: vec![255, 0, 0, 255] };
        let mut table = ImageTable::new();
        table.insert("red.png".into(), Arc::new(img));
        let cmds = vec![
            PaintCommand::Image { x: 0, y: 0, width: 4, height: 4, src: "red.png".into() },
            PaintCommand::Image { x: 4, y: 4, width: 4, height: 4, src: "gone.png".into() },
        ];
        let c = paint_canvas(&cmds, 8, 8, WHITE, &table).unwrap();
        assert_eq!(c.pixel(3, 3), [255, 0, 0, 255]);
        assert_eq!(c.pixel(5, 5), WHITE);
    }

    #[test]
    fn rasterize_emits_png() {
        let s = rasterize(&[], 16, 4, WHITE, &ImageTable::new()).unwrap();
        assert_eq!((s.width, s.height), (16, 4));
        assert_eq!(&s.png_data[0..8], b"\x89PNG\r\n\x1a\n");
        assert!(rasterize(&[], 0, 4, WHITE, &ImageTable::new()).is_err());
    }

    #[test]
    fn oversized_canvas_is_an_error_not_a_panic() {
        let err = paint_canvas(&[], u32::MAX, u32::MAX, WHITE, &ImageTable::new());
        assert!(matches!(err, Err(Error::RenderError(_))));
    }

    #[test]
    fn long_sources_are_truncated_for_logs() {
        let src = format!("data:image/png;base64,{}", "A".repeat(100));
        assert!(truncate_src(&src).ends_with("..."));
        assert_eq!(truncate_src("logo.png"), "logo.png");
    }
}
