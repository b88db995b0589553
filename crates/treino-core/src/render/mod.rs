//! Plan rendering: [`PlanRecord`] -> paginated PDF.
//!
//! ```text
//! PlanRecord
//!     |  text::prepare (encoding normalization, markup stripping)
//!     v
//! LayoutEngine (A4, margins, wrapping, page breaks)
//!     |
//!     v
//! Vec<Page> --pdf::write_pdf--> bytes
//! ```
//!
//! Rendering is total over plan records: every character that cannot be
//! encoded is replaced, never rejected, and an empty record still yields a
//! one-page document with the title block.

pub mod layout;
pub mod metrics;
pub mod pdf;
pub mod text;

use thiserror::Error;
use tracing::debug;

use crate::record::PlanRecord;
use layout::{Align, LayoutEngine, Page, PageGeometry, TextStyle};
use metrics::Font;

/// Title printed at the top of every plan and stored in the PDF metadata.
pub const DOCUMENT_TITLE: &str = "Plano de Treino Personalizado";

/// Suggested download name.
pub const FILENAME: &str = "plano_de_treino.pdf";

/// MIME type of the rendered document.
pub const CONTENT_TYPE: &str = "application/pdf";

const TITLE_STYLE: TextStyle = TextStyle {
    font: Font::Bold,
    size: 16.0,
    line_height: 10.0,
};

const LABEL_STYLE: TextStyle = TextStyle {
    font: Font::Bold,
    size: 12.0,
    line_height: 8.0,
};

const BODY_STYLE: TextStyle = TextStyle {
    font: Font::Regular,
    size: 11.0,
    line_height: 6.0,
};

const WARNING_STYLE: TextStyle = TextStyle {
    font: Font::Bold,
    ..BODY_STYLE
};

/// Vertical gap after the title block and after each section, in mm.
const SECTION_SPACING: f32 = 5.0;

/// The optional sections of a plan document, in print order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Warnings,
    Plan,
    Suggestions,
}

impl Section {
    pub fn label(self) -> &'static str {
        match self {
            Self::Warnings => "Avisos Importantes",
            Self::Plan => "Plano de Treino",
            Self::Suggestions => "Sugestões Adicionais",
        }
    }

    fn body_style(self) -> TextStyle {
        match self {
            Self::Warnings => WARNING_STYLE,
            Self::Plan | Self::Suggestions => BODY_STYLE,
        }
    }
}

/// A finished document, ready to hand back to the caller once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Sections that were printed, in order.
    pub sections: Vec<Section>,
}

impl RenderedDocument {
    pub fn filename(&self) -> &'static str {
        FILENAME
    }

    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }
}

/// Errors from document construction.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF serialization failed: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Laid-out plan, before serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanLayout {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
    pub sections: Vec<Section>,
}

/// Lay out a plan record on A4 pages.
///
/// Sections print in fixed order (warnings, plan, suggestions). A section
/// whose text is blank once prepared is skipped along with its label.
pub fn layout_plan(record: &PlanRecord) -> PlanLayout {
    let geometry = PageGeometry::A4;
    let mut engine = LayoutEngine::new(geometry);

    engine.write_block(&text::to_latin1(DOCUMENT_TITLE), TITLE_STYLE, Align::Center);
    engine.vertical_space(SECTION_SPACING);

    let bodies = [
        (Section::Warnings, record.avisos_importantes.join("\n")),
        (Section::Plan, record.plano_markdown.clone()),
        (Section::Suggestions, record.sugestoes_adicionais.clone()),
    ];

    let mut sections = Vec::with_capacity(bodies.len());
    for (section, body) in bodies {
        let body = text::prepare(&body);
        if body.trim().is_empty() {
            continue;
        }
        let style = section.body_style();

        // Keep the label on the same page as the first body line.
        engine.ensure_room(LABEL_STYLE.line_height + style.line_height);
        engine.write_block(&text::to_latin1(section.label()), LABEL_STYLE, Align::Left);
        engine.write_block(&body, style, Align::Left);
        engine.vertical_space(SECTION_SPACING);
        sections.push(section);
    }

    PlanLayout {
        geometry,
        pages: engine.finish(),
        sections,
    }
}

/// Render a plan record into a PDF document.
pub fn render_plan(record: &PlanRecord) -> Result<RenderedDocument, RenderError> {
    let layout = layout_plan(record);
    let bytes = pdf::write_pdf(&layout.pages, &layout.geometry, DOCUMENT_TITLE)?;

    debug!(
        pages = layout.pages.len(),
        bytes = bytes.len(),
        sections = ?layout.sections,
        "rendered plan document"
    );

    Ok(RenderedDocument {
        bytes,
        page_count: layout.pages.len(),
        sections: layout.sections,
    })
}
