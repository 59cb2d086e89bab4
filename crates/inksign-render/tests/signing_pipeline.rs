//! End-to-end signing: load a document, draw, export.

use image::{ImageFormat, Rgba, RgbaImage};
use inksign_core::{InkBackground, InkConfig, PointerEvent};
use inksign_render::{
    AdapterConfig, CompositorConfig, LoadOutcome, RasterAdapter, SignError, SigningConfig,
    SigningSession,
};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::io::Cursor;

const PAPER: Rgba<u8> = Rgba([250, 245, 230, 255]);

fn png_document(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbaImage::from_pixel(width, height, PAPER)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn pdf_document(media_boxes: &[[i64; 4]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for media_box in media_boxes {
        let content = Content {
            operations: vec![
                Operation::new("rg", vec![Object::Real(0.0), Object::Real(0.0), Object::Real(1.0)]),
                Operation::new(
                    "re",
                    vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(10),
                        Object::Integer(10),
                    ],
                ),
                Operation::new("f", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => media_box.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn draw(session: &mut SigningSession, points: &[(f64, f64)]) {
    let ink = session.ink_mut();
    let (first, rest) = points.split_first().unwrap();
    ink.handle_pointer(PointerEvent::Down {
        position: (*first).into(),
    });
    for p in rest {
        ink.handle_pointer(PointerEvent::Move { position: (*p).into() });
    }
    let last = *points.last().unwrap();
    ink.handle_pointer(PointerEvent::Up { position: last.into() });
}

#[test]
fn png_document_with_one_stroke() {
    let mut session = SigningSession::new(600, SigningConfig::default()).unwrap();
    assert_eq!(session.ink().size().width, 600.0);
    assert_eq!(session.ink().size().height, 300.0);

    let outcome = session.load(&png_document(800, 400), "image/png").unwrap();
    assert_eq!(outcome, LoadOutcome::Committed { width: 800, height: 400 });

    session.ink_mut().set_brush_width(6);
    draw(&mut session, &[(100.0, 150.0), (300.0, 140.0), (500.0, 150.0)]);
    assert_eq!(session.ink().history().len(), 1);

    let result = session.export().unwrap();
    assert_eq!((result.width(), result.height()), (800, 400));
    let placement = result.placement().unwrap();
    assert_eq!((placement.width, placement.height), (300, 150));
    assert_eq!((placement.x, placement.y), (800 - 300 - 50, 400 - 150 - 50));

    let output = image::load_from_memory(result.as_bytes()).unwrap().to_rgba8();
    assert_eq!(output.dimensions(), (800, 400));
    assert_eq!(*output.get_pixel(10, 10), PAPER);
    assert_eq!(*output.get_pixel(449, 199), PAPER);
    // Opaque ink background covers the signature rectangle
    assert_eq!(*output.get_pixel(460, 210), Rgba([255, 255, 255, 255]));
    // The stroke itself, scaled by half: (300, 140) -> (150, 70)
    let ink = output.get_pixel(450 + 150, 200 + 70);
    assert!(ink.0[0] < 100, "expected dark ink, got {:?}", ink);
}

#[test]
fn transparent_ink_keeps_document_visible() {
    let config = SigningConfig {
        ink: InkConfig::default().with_background(InkBackground::Transparent),
        ..SigningConfig::default()
    };
    let mut session = SigningSession::new(600, config).unwrap();
    session.load(&png_document(800, 400), "image/png").unwrap();
    draw(&mut session, &[(100.0, 150.0), (500.0, 150.0)]);

    let output = image::load_from_memory(session.export().unwrap().as_bytes())
        .unwrap()
        .to_rgba8();
    assert_eq!(*output.get_pixel(460, 210), PAPER);
}

#[test]
fn undo_everything_exports_blank_signature_rectangle() {
    let mut session = SigningSession::new(400, SigningConfig::default()).unwrap();
    session.load(&png_document(600, 600), "image/png").unwrap();

    for i in 0..4 {
        let y = 20.0 + f64::from(i) * 40.0;
        draw(&mut session, &[(20.0, y), (380.0, y)]);
    }
    for _ in 0..6 {
        session.ink_mut().undo();
    }
    assert!(session.ink().history().is_empty());

    let output = image::load_from_memory(session.export().unwrap().as_bytes())
        .unwrap()
        .to_rgba8();
    let placement_x = 600 - 200 - 50;
    let placement_y = 600 - 100 - 50;
    for x in placement_x..placement_x + 200 {
        for y in placement_y..placement_y + 100 {
            assert_eq!(*output.get_pixel(x, y), Rgba([255, 255, 255, 255]));
        }
    }
}

#[test]
fn brush_width_is_clamped_for_new_strokes() {
    let mut session = SigningSession::new(200, SigningConfig::default()).unwrap();
    assert_eq!(session.ink_mut().set_brush_width(15), 10);
    draw(&mut session, &[(10.0, 10.0), (50.0, 50.0)]);
    assert_eq!(session.ink().strokes()[0].width(), 10);

    session.ink_mut().set_brush_width(3);
    assert_eq!(session.ink().strokes()[0].width(), 10);
}

#[test]
fn pdf_first_page_at_magnification() {
    let mut session = SigningSession::new(300, SigningConfig::default()).unwrap();
    let bytes = pdf_document(&[[0, 0, 612, 792], [0, 0, 100, 100]]);
    let outcome = session.load(&bytes, "application/pdf").unwrap();
    assert_eq!(outcome, LoadOutcome::Committed { width: 918, height: 1188 });

    let document = session.document().unwrap();
    // Blue square drawn at the page's bottom-left corner, white elsewhere
    assert_eq!(*document.image().get_pixel(5, 1188 - 5), Rgba([0, 0, 255, 255]));
    assert_eq!(*document.image().get_pixel(400, 400), Rgba([255, 255, 255, 255]));

    let result = session.export().unwrap();
    assert_eq!((result.width(), result.height()), (918, 1188));
}

#[test]
fn pdf_without_pages_leaves_document_unchanged() {
    let mut session = SigningSession::new(300, SigningConfig::default()).unwrap();
    let empty = pdf_document(&[]);

    assert!(matches!(
        session.load(&empty, "application/pdf"),
        Err(SignError::PageNotFound)
    ));
    assert!(session.document().is_none());

    session.load(&png_document(40, 30), "image/png").unwrap();
    assert!(matches!(
        session.load(&empty, "application/pdf"),
        Err(SignError::PageNotFound)
    ));
    assert_eq!(session.document().unwrap().dimensions(), (40, 30));
}

#[test]
fn export_without_document_fails() {
    let mut session = SigningSession::new(300, SigningConfig::default()).unwrap();
    draw(&mut session, &[(10.0, 10.0), (100.0, 100.0)]);
    assert!(matches!(session.export(), Err(SignError::NoDocument)));
}

#[test]
fn late_load_does_not_overwrite_newer_document() {
    let mut session = SigningSession::new(300, SigningConfig::default()).unwrap();
    let pdf = pdf_document(&[[0, 0, 200, 200]]);
    let png = png_document(64, 48);

    let first = session.begin_load();
    let second = session.begin_load();

    // Decode both off the session, as a host with async loading would
    let adapter = session.adapter().clone();
    let first_result = adapter.load(&pdf, "application/pdf");
    let second_result = adapter.load(&png, "image/png");

    assert_eq!(
        session.commit_load(second, second_result).unwrap(),
        LoadOutcome::Committed { width: 64, height: 48 }
    );
    assert_eq!(
        session.commit_load(first, first_result).unwrap(),
        LoadOutcome::Superseded
    );
    assert_eq!(session.document().unwrap().dimensions(), (64, 48));
}

#[test]
fn custom_placement_and_adapter_config() {
    let adapter = RasterAdapter::new(AdapterConfig::default().with_pdf_magnification(1.0));
    let mut session = SigningSession::with_adapter(
        100,
        InkConfig::default(),
        adapter,
        CompositorConfig::default().with_signature_scale(1.0).with_margin(0),
    )
    .unwrap();

    session.load(&pdf_document(&[[0, 0, 300, 200]]), "application/pdf").unwrap();
    let result = session.export().unwrap();
    assert_eq!((result.width(), result.height()), (300, 200));
    let placement = result.placement().unwrap();
    assert_eq!((placement.x, placement.y, placement.width, placement.height), (200, 150, 100, 50));
}

#[test]
fn oversized_input_rejected_before_decode() {
    let config = SigningConfig {
        adapter: AdapterConfig::default().with_max_input_bytes(64),
        ..SigningConfig::default()
    };
    let mut session = SigningSession::new(100, config).unwrap();
    assert!(matches!(
        session.load(&png_document(200, 200), "image/png"),
        Err(SignError::InputTooLarge { limit: 64, .. })
    ));
}
