//! Display list produced by the layout stage.
//!
//! Coordinates are millimetres with the origin at the top-left corner of the
//! page and text anchored on its baseline. The PDF backend flips them.

use std::sync::Arc;

use crate::font_metrics::{self, FontFace};

pub const PT_TO_MM: f32 = 0.352_777_78;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

    pub const fn gray(level: u8) -> Self {
        Rgb { r: level, g: level, b: level }
    }
}

/// Decoded image flattened to 8-bit RGB.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        text: String,
        face: FontFace,
        size: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Option<Rgb>,
        stroke: Option<f32>,
    },
    Image {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        raster: Arc<Raster>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub width: f32,
    pub height: f32,
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Text runs in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn has_image(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, DrawOp::Image { .. }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A stateful drawing surface in the manner of a PDF writer: current font and
/// line width apply to everything drawn until they change.
#[derive(Debug, Clone)]
pub struct Canvas {
    pages: Vec<Page>,
    page_width: f32,
    page_height: f32,
    face: FontFace,
    font_size: f32,
    line_width: f32,
}

impl Canvas {
    pub fn new(page_width: f32, page_height: f32) -> Self {
        Canvas {
            pages: vec![Page {
                width: page_width,
                height: page_height,
                ops: Vec::new(),
            }],
            page_width,
            page_height,
            face: FontFace::Regular,
            font_size: 9.0,
            line_width: 0.2,
        }
    }

    pub fn add_page(&mut self) {
        self.pages.push(Page {
            width: self.page_width,
            height: self.page_height,
            ops: Vec::new(),
        });
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    pub fn page_height(&self) -> f32 {
        self.page_height
    }

    pub fn set_font(&mut self, face: FontFace, size: f32) {
        self.face = face;
        self.font_size = size;
    }

    pub fn set_face(&mut self, face: FontFace) {
        self.face = face;
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    fn push(&mut self, op: DrawOp) {
        // There is always at least one page
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// Draw `text` with its baseline at `y`. Empty strings are skipped.
    pub fn text(&mut self, text: &str, x: f32, y: f32) {
        if text.is_empty() {
            return;
        }
        self.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            face: self.face,
            size: self.font_size,
        });
    }

    /// Draw `text` aligned inside the horizontal span `[x, x + width]`.
    pub fn text_in(&mut self, text: &str, x: f32, width: f32, y: f32, align: Align) {
        let left = match align {
            Align::Left => x,
            Align::Center => x + (width - self.text_width(text)) / 2.0,
            Align::Right => x + width - self.text_width(text),
        };
        self.text(text, left, y);
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            width: self.line_width,
        });
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: Option<Rgb>, stroke: bool) {
        let stroke = stroke.then_some(self.line_width);
        self.push(DrawOp::Rect { x, y, w, h, fill, stroke });
    }

    pub fn image(&mut self, raster: Arc<Raster>, x: f32, y: f32, w: f32, h: f32) {
        self.push(DrawOp::Image { x, y, w, h, raster });
    }

    /// Width of `text` in millimetres with the current font.
    pub fn text_width(&self, text: &str) -> f32 {
        font_metrics::metrics(self.face).string_width(text, self.font_size) * PT_TO_MM
    }

    /// Line height in millimetres for the current font size.
    pub fn line_height(&self, factor: f32) -> f32 {
        self.font_size * factor * PT_TO_MM
    }

    /// Cap-height style ascent in millimetres for the current font.
    pub fn ascent(&self) -> f32 {
        font_metrics::metrics(self.face).ascent(self.font_size) * PT_TO_MM
    }

    /// Break `text` into lines no wider than `max_width` with the current font.
    ///
    /// Explicit newlines start a new line, words wider than the limit are
    /// split by character, and empty input yields one empty line.
    pub fn split_text_to_size(&self, text: &str, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let mut current = String::new();

            for word in paragraph.split_whitespace() {
                let tentative = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{} {}", current, word)
                };

                if self.text_width(&tentative) <= max_width {
                    current = tentative;
                    continue;
                }

                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }

                if self.text_width(word) <= max_width {
                    current = word.to_string();
                } else {
                    for c in word.chars() {
                        current.push(c);
                        if self.text_width(&current) > max_width && current.chars().count() > 1 {
                            current.pop();
                            lines.push(std::mem::take(&mut current));
                            current.push(c);
                        }
                    }
                }
            }

            lines.push(current);
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn canvas() -> Canvas {
        let mut c = Canvas::new(297.0, 210.0);
        c.set_font(FontFace::Regular, 9.0);
        c
    }

    #[test]
    fn test_split_keeps_short_text_on_one_line() {
        assert_eq!(canvas().split_text_to_size("12 Harbour Rd", 100.0), vec!["12 Harbour Rd"]);
    }

    #[test]
    fn test_split_wraps_at_words() {
        let lines = canvas().split_text_to_size("alpha beta gamma delta epsilon", 20.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(canvas().text_width(line) <= 20.0, "{line} overflows");
        }
        assert_eq!(lines.join(" "), "alpha beta gamma delta epsilon");
    }

    #[test]
    fn test_split_breaks_long_words() {
        let lines = canvas().split_text_to_size("SUPERCALIFRAGILISTIC", 10.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "SUPERCALIFRAGILISTIC");
    }

    #[test]
    fn test_split_honours_newlines_and_empty_input() {
        assert_eq!(canvas().split_text_to_size("a\nb", 100.0), vec!["a", "b"]);
        assert_eq!(canvas().split_text_to_size("", 100.0), vec![""]);
    }

    #[test]
    fn test_text_alignment() {
        let mut c = canvas();
        let w = c.text_width("EA");
        c.text_in("EA", 10.0, 20.0, 50.0, Align::Right);
        c.text_in("EA", 10.0, 20.0, 60.0, Align::Center);
        let xs: Vec<f32> = c.pages()[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert!((xs[0] - (30.0 - w)).abs() < 1e-4);
        assert!((xs[1] - (10.0 + (20.0 - w) / 2.0)).abs() < 1e-4);
    }

    #[test]
    fn test_empty_text_is_not_drawn() {
        let mut c = canvas();
        c.text("", 10.0, 10.0);
        assert!(c.pages()[0].ops.is_empty());
    }
}
