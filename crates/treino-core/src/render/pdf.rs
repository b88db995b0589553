//! PDF serialization of laid-out pages.
//!
//! Text is drawn with the standard Helvetica fonts in WinAnsiEncoding, one
//! byte per character; callers must pass Latin-1 text (see
//! [`super::text::to_latin1`]). Output is deterministic: no timestamps or
//! random identifiers are written.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use super::layout::{Page, PageGeometry};
use super::metrics::{Font, MM_PER_PT};
use super::text::PLACEHOLDER;

/// PDF header version.
const PDF_VERSION: &str = "1.4";

/// Serialize `pages` into a complete PDF file.
pub fn write_pdf(
    pages: &[Page],
    geometry: &PageGeometry,
    title: &str,
) -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in [Font::Regular, Font::Bold] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = add_page(&mut doc, page, geometry, pages_id)?;
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let media_box: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(0),
        to_pt(geometry.width).into(),
        to_pt(geometry.height).into(),
    ];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_latin1(title), StringFormat::Literal),
        "Producer" => Object::string_literal("treino"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    doc.compress();
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn add_page(
    doc: &mut Document,
    page: &Page,
    geometry: &PageGeometry,
    parent: ObjectId,
) -> Result<ObjectId, lopdf::Error> {
    let mut operations = Vec::with_capacity(page.runs.len() * 5);
    for run in &page.runs {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![run.font.resource_name().into(), run.size.into()],
        ));
        operations.push(Operation::new(
            "Td",
            vec![
                to_pt(run.x).into(),
                to_pt(geometry.height - run.baseline).into(),
            ],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(encode_latin1(&run.text), StringFormat::Literal)],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
    }))
}

fn to_pt(mm: f32) -> f32 {
    mm / MM_PER_PT
}

/// One byte per character; anything above U+00FF becomes the placeholder.
fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(PLACEHOLDER as u8))
        .collect()
}
