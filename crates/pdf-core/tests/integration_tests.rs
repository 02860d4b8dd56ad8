//! Integration tests for pdf-core
//!
//! These tests verify end-to-end functionality with real PDF operations.

use lopdf::content::Content;
use lopdf::{dictionary, Document, Object, Stream};
use pdf_core::{Align, Color, ImageFormat, PdfDocument, PdfError, StandardFont};
use pretty_assertions::assert_eq;

/// Create a minimal valid PDF for testing
///
/// This creates a simple one-page A4 PDF whose page already uses /F1 and /Im1.
fn create_test_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");

    let pages_id = doc.new_object_id();

    let contents_id = doc.add_object(Stream::new(
        dictionary! {},
        b"0 0 1 rg 10 10 20 20 re f".to_vec(),
    ));

    let template_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => template_font_id },
        "XObject" => dictionary! { "Im1" => Object::Null },
    });

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), Object::Real(595.28), Object::Real(841.89)],
        "Resources" => resources_id,
        "Contents" => contents_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => 1,
            "Kids" => vec![page_id.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Create a minimal JPEG image for testing
fn create_test_jpeg() -> Vec<u8> {
    vec![
        0xFF, 0xD8, // SOI marker
        0xFF, 0xC0, // SOF0 marker (baseline DCT)
        0x00, 0x11, // Length (17 bytes)
        0x08, // Precision (8 bits)
        0x00, 0x10, // Height (16 pixels)
        0x00, 0x10, // Width (16 pixels)
        0x03, // Number of components (RGB)
        0x01, 0x22, 0x00, // Component 1
        0x02, 0x11, 0x01, // Component 2
        0x03, 0x11, 0x01, // Component 3
        0xFF, 0xD9, // EOI marker
    ]
}

/// Create a simple 16x16 grayscale PNG using the image crate
fn create_test_png() -> Vec<u8> {
    use image::{ImageBuffer, Luma};

    let img: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::new(16, 16);
    let mut buffer = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut buffer),
        image::ImageFormat::Png,
    )
    .expect("Failed to create PNG");
    buffer
}

/// Decode the operators of page 1 of a saved PDF
fn page_operations(pdf: &[u8]) -> Vec<lopdf::content::Operation> {
    let doc = Document::load_mem(pdf).expect("Failed to load output");
    let page_id = doc.get_pages()[&1];
    let content = doc.get_page_content(page_id).expect("Failed to read content");
    Content::decode(&content)
        .expect("Failed to decode content")
        .operations
}

fn number(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r as f32,
        other => panic!("not a number: {other:?}"),
    }
}

fn count_operator(ops: &[lopdf::content::Operation], operator: &str) -> usize {
    ops.iter().filter(|op| op.operator == operator).count()
}

/// Resources dictionary of page 1 with indirect sub-dictionaries resolved
fn page_resource_names(pdf: &[u8], category: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(pdf).unwrap();
    let page_id = doc.get_pages()[&1];
    let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
    let resources = match page.get(b"Resources").unwrap() {
        Object::Reference(id) => doc.get_object(*id).unwrap().as_dict().unwrap(),
        obj => obj.as_dict().unwrap(),
    };
    let dict = resources.get(category).unwrap().as_dict().unwrap();
    let mut names: Vec<String> = dict
        .iter()
        .map(|(k, _)| String::from_utf8_lossy(k).into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_open_save_roundtrip() {
    let pdf_data = create_test_pdf();

    let mut doc = PdfDocument::open_from_bytes(&pdf_data).expect("Failed to open PDF");
    assert_eq!(doc.page_count(), 1);

    let saved_data = doc.to_bytes().expect("Failed to save PDF");

    let doc2 = PdfDocument::open_from_bytes(&saved_data).expect("Failed to re-open PDF");
    assert_eq!(doc2.page_count(), 1);
    assert_eq!(doc2.page_size(1).unwrap().0.round(), 595.0);
}

#[test]
fn test_insert_text_standard_font() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.add_standard_font("label", StandardFont::HelveticaBold)
        .unwrap();
    doc.set_font("label", 9.0).unwrap();
    doc.insert_text("Hello (world)", 1, 100.0, 700.0, Align::Left)
        .unwrap();

    let saved = doc.to_bytes().unwrap();
    let ops = page_operations(&saved);

    let tj: Vec<_> = ops.iter().filter(|op| op.operator == "Tj").collect();
    assert_eq!(tj.len(), 1);
    assert_eq!(
        tj[0].operands[0].as_str().unwrap(),
        b"Hello (world)".as_slice()
    );

    let tf = ops.iter().find(|op| op.operator == "Tf").unwrap();
    assert_eq!(tf.operands[0].as_name().unwrap(), b"F2");
}

#[test]
fn test_template_resources_preserved() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.add_standard_font("label", StandardFont::HelveticaBold)
        .unwrap();
    doc.set_font("label", 9.0).unwrap();
    doc.insert_text("x", 1, 10.0, 10.0, Align::Left).unwrap();
    let png = doc.embed_image(&create_test_png(), ImageFormat::Png).unwrap();
    doc.insert_image(&png, 1, 10.0, 10.0, 5.0, 5.0).unwrap();

    let saved = doc.to_bytes().unwrap();

    // The template's F1 and Im1 keep their names, ours take the next free ones
    assert_eq!(page_resource_names(&saved, b"Font"), vec!["F1", "F2"]);
    assert_eq!(page_resource_names(&saved, b"XObject"), vec!["Im1", "Im2"]);
}

#[test]
fn test_existing_content_is_isolated() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.insert_rect(1, 0.0, 0.0, 10.0, 10.0, Color::white())
        .unwrap();

    let ops = page_operations(&doc.to_bytes().unwrap());
    let operators: Vec<&str> = ops.iter().map(|op| op.operator.as_str()).collect();

    assert_eq!(
        operators,
        vec!["q", "rg", "re", "f", "Q", "q", "rg", "re", "f", "Q"]
    );
}

#[test]
fn test_insert_text_alignment() {
    for (align, expected_x) in [(Align::Left, 100.0), (Align::Center, 95.0), (Align::Right, 90.0)] {
        let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
        doc.add_standard_font("label", StandardFont::HelveticaBold)
            .unwrap();
        doc.set_font("label", 10.0).unwrap();
        // "Hi" is exactly one em wide in Helvetica-Bold
        doc.insert_text("Hi", 1, 100.0, 700.0, align).unwrap();

        let ops = page_operations(&doc.to_bytes().unwrap());
        let td = ops.iter().find(|op| op.operator == "Td").unwrap();
        let x = number(&td.operands[0]);
        assert!((x - expected_x as f32).abs() < 1e-3, "{align:?}: {x}");
    }
}

#[test]
fn test_insert_image_jpeg() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    let image = doc
        .embed_image(&create_test_jpeg(), ImageFormat::Jpeg)
        .expect("Failed to embed JPEG image");
    assert_eq!((image.width, image.height), (16, 16));
    doc.insert_image(&image, 1, 100.0, 700.0, 50.0, 50.0)
        .expect("Failed to insert JPEG image");

    let saved = doc.to_bytes().unwrap();
    assert_eq!(count_operator(&page_operations(&saved), "Do"), 1);
}

#[test]
fn test_insert_image_png() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    let image = doc
        .embed_image(&create_test_png(), ImageFormat::Png)
        .expect("Failed to embed PNG image");
    doc.insert_image(&image, 1, 100.0, 700.0, 50.0, 50.0)
        .expect("Failed to insert PNG image");

    let saved = doc.to_bytes().unwrap();
    let ops = page_operations(&saved);
    let cm = ops.iter().find(|op| op.operator == "cm").unwrap();
    let values: Vec<f32> = cm
        .operands
        .iter()
        .map(number)
        .collect();
    assert_eq!(values, vec![50.0, 0.0, 0.0, 50.0, 100.0, 700.0]);
}

#[test]
fn test_image_declared_png_but_jpeg() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    let result = doc.embed_image(&create_test_jpeg(), ImageFormat::Png);
    assert!(matches!(result, Err(PdfError::ImageError(_))));
}

#[test]
fn test_image_deduplication() {
    let png = create_test_png();
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();

    let first = doc.embed_image(&png, ImageFormat::Png).unwrap();
    let second = doc.embed_image(&png, ImageFormat::Png).unwrap();
    assert_eq!(first, second);

    for i in 0..12 {
        doc.insert_image(&first, 1, i as f64 * 10.0, 0.0, 10.0, 10.0)
            .unwrap();
    }

    let saved = doc.to_bytes().unwrap();
    let ops = page_operations(&saved);
    let names: Vec<&[u8]> = ops
        .iter()
        .filter(|op| op.operator == "Do")
        .map(|op| op.operands[0].as_name().unwrap())
        .collect();
    assert_eq!(names.len(), 12);
    assert!(names.iter().all(|name| *name == b"Im2"));

    let loaded = Document::load_mem(&saved).unwrap();
    let image_count = loaded
        .objects
        .values()
        .filter(|obj| {
            obj.as_stream()
                .ok()
                .and_then(|s| s.dict.get(b"Subtype").ok())
                .and_then(|s| s.as_name().ok())
                == Some(b"Image".as_slice())
        })
        .count();
    assert_eq!(image_count, 1);
}

#[test]
fn test_empty_text() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.add_standard_font("label", StandardFont::Helvetica)
        .unwrap();
    doc.set_font("label", 12.0).unwrap();
    doc.insert_text("", 1, 100.0, 700.0, Align::Center)
        .unwrap();

    let saved = doc.to_bytes().unwrap();
    assert_eq!(count_operator(&page_operations(&saved), "Tj"), 0);
}

#[test]
fn test_invalid_page_number() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.add_standard_font("label", StandardFont::Helvetica)
        .unwrap();
    doc.set_font("label", 12.0).unwrap();

    let result = doc.insert_text("Test", 0, 100.0, 700.0, Align::Left);
    assert!(matches!(result, Err(PdfError::InvalidPage(0, 1))));

    let result = doc.insert_text("Test", 2, 100.0, 700.0, Align::Left);
    assert!(matches!(result, Err(PdfError::InvalidPage(2, 1))));

    let image = doc.embed_image(&create_test_png(), ImageFormat::Png).unwrap();
    let result = doc.insert_image(&image, 5, 0.0, 0.0, 1.0, 1.0);
    assert!(matches!(result, Err(PdfError::InvalidPage(5, 1))));
}

#[test]
fn test_output_is_deterministic() {
    let render = || {
        let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
        doc.add_standard_font("label", StandardFont::HelveticaBold)
            .unwrap();
        doc.set_font("label", 9.0).unwrap();
        let image = doc.embed_image(&create_test_png(), ImageFormat::Png).unwrap();
        for i in 0..3 {
            doc.insert_rect(1, i as f64, 0.0, 5.0, 5.0, Color::white())
                .unwrap();
            doc.insert_image(&image, 1, i as f64, 0.0, 5.0, 5.0).unwrap();
            doc.insert_text("label", 1, i as f64, 10.0, Align::Center)
                .unwrap();
        }
        doc.to_bytes().unwrap()
    };

    assert_eq!(render(), render());
}
