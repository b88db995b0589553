//! Page layout: positions wrapped lines of text on fixed-size pages.
//!
//! Coordinates are millimetres measured from the top-left corner of the
//! page. Every block is wrapped to the effective content width (page width
//! minus both side margins) and a new page starts automatically once the
//! next line would cross the bottom margin.

use super::metrics::{Font, MM_PER_PT, char_advance, text_width};

/// Page size and margins, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    /// Distance from the bottom edge at which a page break is triggered.
    pub margin_bottom: f32,
}

impl PageGeometry {
    /// A4 portrait, 10 mm side and top margins, 15 mm bottom margin.
    pub const A4: Self = Self {
        width: 210.0,
        height: 297.0,
        margin_left: 10.0,
        margin_right: 10.0,
        margin_top: 10.0,
        margin_bottom: 15.0,
    };

    /// Page width minus both side margins.
    pub fn effective_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// Lowest y a line may reach before a page break.
    pub fn break_threshold(&self) -> f32 {
        self.height - self.margin_bottom
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Font, size (points) and line height (millimetres) of a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub line_height: f32,
}

/// Horizontal placement of each line within the content width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// A single positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Left edge, from the left side of the page.
    pub x: f32,
    /// Baseline, from the top of the page.
    pub baseline: f32,
    pub text: String,
    pub font: Font,
    pub size: f32,
}

/// The runs placed on one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub runs: Vec<TextRun>,
}

/// Cursor-based layout over a growing list of pages.
#[derive(Debug)]
pub struct LayoutEngine {
    geometry: PageGeometry,
    finished: Vec<Page>,
    current: Page,
    y: f32,
}

impl LayoutEngine {
    /// Start with one empty page and the cursor at the top margin.
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            finished: Vec::new(),
            current: Page::default(),
            y: geometry.margin_top,
        }
    }

    /// Current vertical position on the current page.
    pub fn cursor(&self) -> f32 {
        self.y
    }

    /// Pages started so far, including the current one.
    pub fn page_count(&self) -> usize {
        self.finished.len() + 1
    }

    /// Break to a new page unless `height` more millimetres fit above the
    /// bottom margin. A fresh page never breaks again.
    pub fn ensure_room(&mut self, height: f32) {
        if self.y + height > self.geometry.break_threshold() && self.y > self.geometry.margin_top
        {
            self.finished.push(std::mem::take(&mut self.current));
            self.y = self.geometry.margin_top;
        }
    }

    /// Advance the cursor without placing anything.
    pub fn vertical_space(&mut self, height: f32) {
        self.y += height;
    }

    /// Wrap `text` to the content width and place it line by line.
    ///
    /// Blank lines advance the cursor but place no run.
    pub fn write_block(&mut self, text: &str, style: TextStyle, align: Align) {
        let width = self.geometry.effective_width();
        for line in wrap_text(text, style.font, style.size, width) {
            self.ensure_room(style.line_height);
            if !line.trim().is_empty() {
                let x = match align {
                    Align::Left => self.geometry.margin_left,
                    Align::Center => {
                        let w = text_width(&line, style.font, style.size);
                        self.geometry.margin_left + ((width - w) / 2.0).max(0.0)
                    }
                };
                let baseline = self.y + 0.5 * style.line_height + 0.3 * style.size * MM_PER_PT;
                self.current.runs.push(TextRun {
                    x,
                    baseline,
                    text: line,
                    font: style.font,
                    size: style.size,
                });
            }
            self.y += style.line_height;
        }
    }

    /// Close the current page and return all pages in order.
    pub fn finish(mut self) -> Vec<Page> {
        self.finished.push(self.current);
        self.finished
    }
}

// ---------------------------------------------------------------------------
// Wrapping
// ---------------------------------------------------------------------------

/// Split `text` into lines no wider than `max_width` millimetres.
///
/// Explicit newlines are kept. Lines break at the last space that fits; a
/// word longer than the whole width is broken between characters. Leading
/// indentation is kept, trailing spaces are dropped.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, font, size, max_width, &mut lines);
    }
    lines
}

fn wrap_paragraph(paragraph: &str, font: Font, size: f32, max_width: f32, out: &mut Vec<String>) {
    let start = out.len();
    let mut line = String::new();
    let mut width = 0.0f32;
    // Byte offset in `line` of the last space seen.
    let mut last_space: Option<usize> = None;
    // Set after a break on a space; the rest of that space run is dropped.
    let mut skip_spaces = false;

    for c in paragraph.chars() {
        if skip_spaces {
            if c == ' ' {
                continue;
            }
            skip_spaces = false;
        }
        let advance = char_advance(c, font, size);

        if width + advance > max_width && !line.is_empty() {
            if c == ' ' {
                out.push(line.trim_end().to_string());
                line.clear();
                width = 0.0;
                last_space = None;
                skip_spaces = true;
                continue;
            }

            match last_space.take().filter(|&i| !line[..i].trim().is_empty()) {
                Some(i) => {
                    let tail = line[i + 1..].to_string();
                    line.truncate(i);
                    out.push(line.trim_end().to_string());
                    width = text_width(&tail, font, size);
                    line = tail;
                }
                None => {
                    out.push(std::mem::take(&mut line));
                    width = 0.0;
                }
            }

            if width + advance > max_width && !line.is_empty() {
                out.push(std::mem::take(&mut line));
                width = 0.0;
            }
        }

        if c == ' ' {
            last_space = Some(line.len());
        }
        line.push(c);
        width += advance;
    }

    if !line.is_empty() || out.len() == start {
        out.push(line.trim_end().to_string());
    }
}
