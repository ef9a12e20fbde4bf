//! # Layout Renderer
//!
//! Turns a resume snapshot plus a template into positioned draw commands on
//! a single US Letter page, 816×1056 CSS px (8.5×11 in at 96 DPI).
//!
//! The page never paginates. Sections are stacked top to bottom in one
//! column, or split between a narrow side column and a wide main column,
//! and whatever runs past the bottom edge is clipped by the rasterizer.
//! [`LayoutPage::overflows`] reports when that happens.
//!
//! Every element carries an [`ElementRole`] so callers (tests, the CLI's
//! `--dump-layout`) can inspect what landed where without rasterizing.

mod sections;

use serde::Serialize;

use crate::content::SectionKind;
use crate::customize::RenderStyle;
use crate::font::FontBook;
use crate::model::ResumeDocument;
use crate::style::{Color, TextAlign, TextStyle};
use crate::template::{ColumnLayout, TemplateDescriptor, TemplateId, TypeSize};
use crate::text::TextLayout;

/// Page width in CSS px.
pub const PAGE_WIDTH_PX: f64 = 816.0;
/// Page height in CSS px.
pub const PAGE_HEIGHT_PX: f64 = 1056.0;

/// Gap between the side and main columns.
const COLUMN_GUTTER: f64 = 28.0;
/// Edge length of the square profile photo.
const PHOTO_SIZE: f64 = 88.0;
/// Indent of bullet text from the bullet glyph.
const BULLET_INDENT: f64 = 12.0;

/// Whether empty content is shown as example text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderMode {
    /// Live preview: empty sections and blank header fields show italic
    /// placeholder content.
    #[default]
    Preview,
    /// Export: empty sections are omitted.
    Final,
}

/// What an element is, for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementRole {
    Background,
    Name,
    Title,
    Contact,
    SectionTitle,
    Divider,
    EntryHeading,
    DateRange,
    Bullet,
    Body,
    Placeholder,
    Photo,
}

/// What to paint for an element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DrawCommand {
    /// A filled rectangle covering the element box.
    Rect { fill: Color },
    /// A horizontal rule across the element box.
    Rule { color: Color, thickness: f64 },
    /// A single line of text. `baseline` is absolute, in px from the page top.
    Text {
        text: String,
        style: TextStyle,
        baseline: f64,
    },
    /// An image scaled to fill the element box.
    Image { src: String },
}

/// A positioned element on the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutElement {
    /// Top-left corner in px from the page's top-left.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
    pub role: ElementRole,
}

impl LayoutElement {
    /// The text of a text element.
    pub fn text(&self) -> Option<&str> {
        match &self.draw {
            DrawCommand::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// The laid-out page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPage {
    pub template: TemplateId,
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
    /// Lowest y reached by content, in px.
    pub content_bottom: f64,
}

impl LayoutPage {
    /// Whether content runs past the bottom edge and will be clipped.
    pub fn overflows(&self) -> bool {
        self.content_bottom > self.height
    }

    pub fn with_role(&self, role: ElementRole) -> impl Iterator<Item = &LayoutElement> {
        self.elements.iter().filter(move |e| e.role == role)
    }

    /// All text on the page in paint order, one entry per line.
    pub fn texts(&self) -> Vec<&str> {
        self.elements.iter().filter_map(LayoutElement::text).collect()
    }
}

/// A vertical flow region: a column of fixed width whose `y` advances as
/// content is placed.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    x: f64,
    width: f64,
    y: f64,
}

impl Cursor {
    fn new(x: f64, width: f64, y: f64) -> Self {
        Self { x, width, y }
    }

    fn indented(&self, by: f64) -> Self {
        Self {
            x: self.x + by,
            width: (self.width - by).max(0.0),
            y: self.y,
        }
    }
}

/// Lays out resume documents against the registered templates.
pub struct LayoutRenderer<'a> {
    fonts: &'a FontBook,
}

impl<'a> LayoutRenderer<'a> {
    pub fn new(fonts: &'a FontBook) -> Self {
        Self { fonts }
    }

    /// Lay out `doc` with `template` and the resolved style.
    ///
    /// Pure: the same inputs always produce the same page, and the document
    /// is never modified.
    pub fn render(
        &self,
        doc: &ResumeDocument,
        template: TemplateId,
        style: &RenderStyle,
        mode: RenderMode,
    ) -> LayoutPage {
        let descriptor = template.descriptor();
        let mut builder = PageBuilder {
            text: TextLayout::new(self.fonts),
            fonts: self.fonts,
            descriptor,
            style,
            mode,
            elements: Vec::new(),
            content_bottom: 0.0,
        };

        let pad = descriptor.padding;
        let content_width = PAGE_WIDTH_PX - pad.horizontal();
        let header = Cursor::new(pad.left, content_width, pad.top);
        let body_top = builder.header(doc, header);

        match descriptor.columns {
            ColumnLayout::Single => {
                let mut col = Cursor::new(pad.left, content_width, body_top);
                for kind in SectionKind::ALL {
                    builder.section(doc, kind, &mut col);
                }
            }
            ColumnLayout::TwoColumn {
                side_percent,
                side_first,
            } => {
                let side_width = (content_width - COLUMN_GUTTER) * side_percent / 100.0;
                let main_width = content_width - COLUMN_GUTTER - side_width;
                let (side_x, main_x) = if side_first {
                    (pad.left, pad.left + side_width + COLUMN_GUTTER)
                } else {
                    (pad.left + main_width + COLUMN_GUTTER, pad.left)
                };

                if let Some(tint) = descriptor.side_background.and_then(Color::parse_hex) {
                    let bleed = COLUMN_GUTTER / 2.0;
                    builder.push(LayoutElement {
                        x: side_x - bleed,
                        y: body_top - bleed,
                        width: side_width + 2.0 * bleed,
                        height: PAGE_HEIGHT_PX - body_top + bleed,
                        draw: DrawCommand::Rect { fill: tint },
                        role: ElementRole::Background,
                    });
                }

                let mut side = Cursor::new(side_x, side_width, body_top);
                let mut main = Cursor::new(main_x, main_width, body_top);
                for kind in SectionKind::ALL {
                    let col = if kind.is_side_section() {
                        &mut side
                    } else {
                        &mut main
                    };
                    builder.section(doc, kind, col);
                }
            }
        }

        LayoutPage {
            template,
            width: PAGE_WIDTH_PX,
            height: PAGE_HEIGHT_PX,
            elements: builder.elements,
            content_bottom: builder.content_bottom,
        }
    }
}

/// Mutable state while building one page.
struct PageBuilder<'a> {
    text: TextLayout<'a>,
    fonts: &'a FontBook,
    descriptor: &'static TemplateDescriptor,
    style: &'a RenderStyle,
    mode: RenderMode,
    elements: Vec<LayoutElement>,
    content_bottom: f64,
}

impl PageBuilder<'_> {
    fn push(&mut self, element: LayoutElement) {
        if element.role != ElementRole::Background {
            self.content_bottom = self.content_bottom.max(element.y + element.height);
        }
        self.elements.push(element);
    }

    fn text_style(&self, size: TypeSize, color: Color) -> TextStyle {
        TextStyle::new(self.style.font, size.size, size.leading, color)
    }

    fn placeholders(&self) -> bool {
        self.mode == RenderMode::Preview
    }

    /// Push one already-broken line at (`x`, `y`).
    fn line(&mut self, x: f64, y: f64, text: String, width: f64, style: TextStyle, role: ElementRole) {
        let height = style.line_height();
        let baseline = y + (height - style.size) / 2.0 + self.fonts.ascent(&style);
        self.push(LayoutElement {
            x,
            y,
            width,
            height,
            draw: DrawCommand::Text {
                text,
                style,
                baseline,
            },
            role,
        });
    }

    /// Wrap `text` to the cursor width and place it, advancing the cursor.
    fn paragraph(&mut self, cursor: &mut Cursor, text: &str, style: TextStyle, align: TextAlign, role: ElementRole) {
        for line in self.text.break_into_lines(text, cursor.width, &style) {
            let x = match align {
                TextAlign::Left => cursor.x,
                TextAlign::Center => cursor.x + (cursor.width - line.width) / 2.0,
                TextAlign::Right => cursor.x + cursor.width - line.width,
            };
            self.line(x, cursor.y, line.text, line.width, style, role);
            cursor.y += style.line_height();
        }
    }

    /// A bullet glyph followed by wrapped, indented text.
    fn bullet(&mut self, cursor: &mut Cursor, text: &str, style: TextStyle, role: ElementRole) {
        let glyph_width = self.text.measure("•", &style);
        self.line(cursor.x, cursor.y, "•".to_string(), glyph_width, style, ElementRole::Bullet);
        let mut inner = cursor.indented(BULLET_INDENT);
        self.paragraph(&mut inner, text, style, TextAlign::Left, role);
        cursor.y = inner.y.max(cursor.y + style.line_height());
    }

    fn rule(&mut self, cursor: &mut Cursor, color: Color, thickness: f64) {
        self.push(LayoutElement {
            x: cursor.x,
            y: cursor.y,
            width: cursor.width,
            height: thickness,
            draw: DrawCommand::Rule { color, thickness },
            role: ElementRole::Divider,
        });
        cursor.y += thickness;
    }
}
