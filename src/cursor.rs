use crate::canvas::Canvas;
use crate::font_metrics::FontFace;

/// Baseline advance between body lines.
pub const LINE_HEIGHT: f32 = 4.0;
/// Indent of data lines under their label.
pub const DATA_INDENT: f32 = 2.0;

/// Top-down writer for one column of a section.
///
/// The cursor only ever moves down; every section reads `current_y` when it
/// is done and hands it to the next one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    x: f32,
    y: f32,
    width: f32,
}

impl LayoutCursor {
    pub fn new(x: f32, y: f32, width: f32) -> Self {
        LayoutCursor { x, y, width }
    }

    pub fn current_y(&self) -> f32 {
        self.y
    }

    pub fn advance(&mut self, dy: f32) -> f32 {
        self.y += dy.max(0.0);
        self.y
    }

    /// Bold label at the column edge, followed by a gap of `gap`.
    pub fn draw_label(&mut self, canvas: &mut Canvas, label: &str, gap: f32) {
        canvas.set_face(FontFace::Bold);
        canvas.text(label, self.x, self.y);
        canvas.set_face(FontFace::Regular);
        self.advance(gap);
    }

    /// One indented data line. Blank values still take up their line.
    pub fn draw_text(&mut self, canvas: &mut Canvas, text: &str) {
        canvas.text(text, self.x + DATA_INDENT, self.y);
        self.advance(LINE_HEIGHT);
    }

    /// Indented text wrapped to the column width, one line per `LINE_HEIGHT`.
    pub fn draw_wrapped_text(&mut self, canvas: &mut Canvas, text: &str) {
        for line in canvas.split_text_to_size(text, self.width - DATA_INDENT) {
            self.draw_text(canvas, &line);
        }
    }

    /// Like `draw_wrapped_text`, but blank input takes no space.
    pub fn draw_optional_text(&mut self, canvas: &mut Canvas, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        for line in canvas.split_text_to_size(text, self.width - DATA_INDENT) {
            if !line.is_empty() {
                self.draw_text(canvas, &line);
            }
        }
    }
}
