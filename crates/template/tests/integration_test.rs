//! Integration tests for certificate rendering and batch generation

use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dataset::DataRow;
use lopdf::{dictionary, Document, Object, Stream};
use pretty_assertions::assert_eq;
use template::{
    parse_layout, BatchGenerator, ConfigurationError, EditingSession, Field, FieldStyles,
    FontWeight, PdfTemplate, Position, Rgb, TemplateError, TemplateRenderer, TextAlign,
};

/// Minimal one-page PDF with a MediaBox of `width` x `height`
fn blank_pdf(width: i64, height: i64) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let contents_id = doc.add_object(Stream::new(dictionary! {}, b"0 0 m 10 10 l S".to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Contents" => contents_id,
        "Resources" => dictionary! {},
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

fn letter() -> PdfTemplate {
    PdfTemplate::from_bytes(blank_pdf(612, 792)).unwrap()
}

fn field_at(column: &str, x: f64, y: f64, styles: Option<FieldStyles>) -> Field {
    Field {
        position: Position::new(x, y),
        styles,
        ..Field::new(column)
    }
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_bytes())
}

/// `(x, y, text)` for every `Td` followed by a `Tj` in the output
fn drawn_text(bytes: &[u8]) -> Vec<(f64, f64, String)> {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.lines().collect();
    let mut found = Vec::new();

    for pair in lines.windows(2) {
        let (Some(args), Some(shown)) = (pair[0].strip_suffix(" Td"), pair[1].strip_suffix(" Tj"))
        else {
            continue;
        };
        let nums: Vec<f64> = args
            .split_whitespace()
            .filter_map(|n| n.parse().ok())
            .collect();
        if nums.len() == 2 {
            let shown = shown.trim_start_matches('(').trim_end_matches(')');
            found.push((nums[0], nums[1], shown.to_string()));
        }
    }
    found
}

fn alice_and_bob() -> Vec<DataRow> {
    vec![
        DataRow::from_pairs([("Name", "Alice"), ("Course", "Rust")]),
        DataRow::from_pairs([("Name", "Bob"), ("Course", "Go")]),
    ]
}

#[test]
fn test_template_info() {
    let template = letter();
    assert_eq!(template.page_count(), 1);
    assert_eq!(template.page_width(), 612.0);
    assert_eq!(template.page_height(), 792.0);
}

#[test]
fn test_alice_bob_scenario() {
    let fields = vec![field_at("Name", 100.0, 100.0, None)];
    let report = BatchGenerator::new(Some(letter()), fields, alice_and_bob(), 1.0)
        .unwrap()
        .run()
        .collect_report();

    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 0);
    assert!(!report.cancelled);

    let first = &report.outputs[0];
    assert_eq!(first.name, "certificate_1.pdf");
    let drawn = drawn_text(&first.bytes);
    assert_eq!(drawn.len(), 1);
    let (x, y, text) = &drawn[0];
    assert_eq!(text, "Alice");
    assert!((x - 100.0).abs() < 1e-6);
    assert!((y - 692.0).abs() < 1e-6);
    assert!(!contains(&first.bytes, "Bob"));

    let second = &report.outputs[1];
    assert_eq!(second.name, "certificate_2.pdf");
    assert!(contains(&second.bytes, "(Bob) Tj"));
    assert!(!contains(&second.bytes, "Alice"));
}

#[test]
fn test_right_aligned_bob() {
    let styles = FieldStyles {
        font_size: 16.0,
        text_align: TextAlign::Right,
        ..Default::default()
    };
    let fields = vec![field_at("Name", 300.0, 100.0, Some(styles))];
    let renderer = TemplateRenderer::new(&fields, 1.0);

    let row = DataRow::from_pairs([("Name", "Bob")]);
    let bytes = renderer.render(letter().bytes(), &row).unwrap();

    let drawn = drawn_text(&bytes);
    assert_eq!(drawn.len(), 1);
    let (x, _, _) = drawn[0];
    assert!((x - 272.0).abs() < 1.0, "drew at {x}");
    assert!((x - 271.536).abs() < 1e-6);
}

#[test]
fn test_center_alignment_uses_measured_width() {
    let styles = FieldStyles {
        font_family: "Courier New".to_string(),
        font_size: 10.0,
        text_align: TextAlign::Center,
        ..Default::default()
    };
    let fields = vec![field_at("Name", 306.0, 100.0, Some(styles))];
    let renderer = TemplateRenderer::new(&fields, 1.0);

    // Courier: 600 units per glyph, 5 glyphs at 10pt = 30pt
    let row = DataRow::from_pairs([("Name", "Alice")]);
    let bytes = renderer.render(letter().bytes(), &row).unwrap();

    let (x, _, _) = drawn_text(&bytes)[0].clone();
    assert!((x - (306.0 - 15.0)).abs() < 1e-9);
    assert!(contains(&bytes, "/Courier"));
}

#[test]
fn test_scaled_preview() {
    // Preview drawn at half size: display (50, 50) is PDF (100, 692)
    let fields = vec![field_at("Name", 50.0, 50.0, None)];
    let renderer = TemplateRenderer::new(&fields, 0.5);
    let row = DataRow::from_pairs([("Name", "Alice")]);

    let bytes = renderer.render(letter().bytes(), &row).unwrap();
    let (x, y, _) = drawn_text(&bytes)[0].clone();
    assert!((x - 100.0).abs() < 1e-9);
    assert!((y - 692.0).abs() < 1e-9);
}

#[test]
fn test_empty_value_leaves_no_trace() {
    let bold_times = FieldStyles {
        font_family: "Times".to_string(),
        font_weight: FontWeight::Bold,
        underline: true,
        color: Rgb::new(255, 0, 0),
        ..Default::default()
    };
    let fields = vec![
        field_at("Name", 100.0, 100.0, None),
        field_at("Course", 100.0, 200.0, Some(bold_times)),
    ];
    let renderer = TemplateRenderer::new(&fields, 1.0);

    let row = DataRow::from_pairs([("Name", "Alice"), ("Course", "")]);
    let bytes = renderer.render(letter().bytes(), &row).unwrap();

    assert!(contains(&bytes, "(Alice) Tj"));
    assert!(!contains(&bytes, "Times-Bold"));
    assert!(!contains(&bytes, "1 0 0 rg"));
    assert!(!contains(&bytes, " RG"));
    assert_eq!(drawn_text(&bytes).len(), 1);
}

#[test]
fn test_missing_column_is_skipped() {
    let fields = vec![
        field_at("Name", 100.0, 100.0, None),
        field_at("Nickname", 100.0, 150.0, None),
    ];
    let renderer = TemplateRenderer::new(&fields, 1.0);

    let row = DataRow::from_pairs([("Name", "Alice")]);
    let bytes = renderer.render(letter().bytes(), &row).unwrap();
    assert_eq!(drawn_text(&bytes).len(), 1);
}

#[test]
fn test_unsupported_glyph_skips_field_only() {
    let fields = vec![
        field_at("Name", 100.0, 100.0, None),
        field_at("Course", 100.0, 200.0, None),
    ];
    let renderer = TemplateRenderer::new(&fields, 1.0);

    let row = DataRow::from_pairs([("Name", "山田"), ("Course", "Rust")]);
    let bytes = renderer.render(letter().bytes(), &row).unwrap();

    let drawn = drawn_text(&bytes);
    assert_eq!(drawn.len(), 1);
    assert_eq!(drawn[0].2, "Rust");
}

#[test]
fn test_latin1_text_is_encoded() {
    let fields = vec![field_at("Name", 100.0, 100.0, None)];
    let renderer = TemplateRenderer::new(&fields, 1.0);

    let row = DataRow::from_pairs([("Name", "Zoë")]);
    let bytes = renderer.render(letter().bytes(), &row).unwrap();
    assert!(contains(&bytes, "(Zo\\353) Tj"));
}

#[test]
fn test_win_ansi_names_are_drawn() {
    let fields = vec![field_at("Name", 100.0, 100.0, None)];
    let renderer = TemplateRenderer::new(&fields, 1.0);

    let cases = [
        ("Jürgen Groß", "(J\\374rgen Gro\\337) Tj"),
        ("O\u{2019}Brien", "(O\\222Brien) Tj"),
        ("Søren", "(S\\370ren) Tj"),
        ("Æsa \u{2013} 2024", "(\\306sa \\226 2024) Tj"),
    ];
    for (name, shown) in cases {
        let row = DataRow::from_pairs([("Name", name)]);
        let bytes = renderer.render(letter().bytes(), &row).unwrap();
        assert_eq!(drawn_text(&bytes).len(), 1, "{name}");
        assert!(contains(&bytes, shown), "{name}");
    }
}

#[test]
fn test_template_bytes_untouched() {
    let template = letter();
    let before = template.bytes().to_vec();

    let fields = vec![field_at("Name", 100.0, 100.0, None)];
    let report = BatchGenerator::new(Some(template.clone()), fields, alice_and_bob(), 1.0)
        .unwrap()
        .run()
        .collect_report();

    assert_eq!(report.succeeded(), 2);
    assert_eq!(template.bytes(), before.as_slice());
}

#[test]
fn test_batch_rejections() {
    let fields = || vec![field_at("Name", 100.0, 100.0, None)];

    let cases = [
        (
            BatchGenerator::new(None, fields(), alice_and_bob(), 1.0),
            ConfigurationError::MissingTemplate,
        ),
        (
            BatchGenerator::new(Some(letter()), vec![], alice_and_bob(), 1.0),
            ConfigurationError::NoFields,
        ),
        (
            BatchGenerator::new(Some(letter()), fields(), vec![], 1.0),
            ConfigurationError::NoRows,
        ),
        (
            BatchGenerator::new(Some(letter()), fields(), alice_and_bob(), 0.0),
            ConfigurationError::ScaleNotMeasured,
        ),
    ];

    for (result, expected) in cases {
        match result {
            Err(TemplateError::Configuration(err)) => assert_eq!(err, expected),
            other => panic!("expected {expected:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_batch_is_lazy_and_ordered() {
    let fields = vec![field_at("Name", 100.0, 100.0, None)];
    let mut run = BatchGenerator::new(Some(letter()), fields, alice_and_bob(), 1.0)
        .unwrap()
        .run();

    assert_eq!(run.total(), 2);
    assert_eq!(run.completed(), 0);

    let first = run.next().unwrap();
    assert_eq!(first.row_index, 0);
    assert_eq!(run.completed(), 1);

    let second = run.next().unwrap();
    assert_eq!(second.row_index, 1);
    assert_eq!(second.file_name, "certificate_2.pdf");

    assert!(run.next().is_none());
    assert!(run.next().is_none());
}

#[test]
fn test_batch_cancellation() {
    let fields = vec![field_at("Name", 100.0, 100.0, None)];
    let cancel = Arc::new(AtomicBool::new(false));
    let mut run = BatchGenerator::new(Some(letter()), fields, alice_and_bob(), 1.0)
        .unwrap()
        .run()
        .with_cancel(Arc::clone(&cancel));

    assert!(run.next().is_some());
    cancel.store(true, Ordering::Relaxed);

    let report = run.collect_report();
    assert!(report.cancelled);
    assert_eq!(report.succeeded(), 0);
    assert_eq!(report.failed(), 0);
}

#[test]
fn test_progress_callback() {
    let fields = vec![field_at("Name", 100.0, 100.0, None)];
    let mut progress = Vec::new();

    let report = BatchGenerator::new(Some(letter()), fields, alice_and_bob(), 1.0)
        .unwrap()
        .run()
        .collect_report_with(|done, total| progress.push((done, total)));

    assert_eq!(progress, vec![(1, 2), (2, 2)]);
    assert_eq!(report.succeeded(), 2);
}

#[test]
fn test_archive_entries_in_row_order() {
    let fields = vec![field_at("Name", 100.0, 100.0, None)];
    let report = BatchGenerator::new(Some(letter()), fields, alice_and_bob(), 1.0)
        .unwrap()
        .run()
        .collect_report();

    let archive = report.to_archive().unwrap();
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    assert_eq!(zip.len(), 2);

    let names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(names, vec!["certificate_1.pdf", "certificate_2.pdf"]);

    let mut second = Vec::new();
    zip.by_index(1).unwrap().read_to_end(&mut second).unwrap();
    assert!(contains(&second, "(Bob) Tj"));
    Document::load_mem(&second).expect("archived PDF should parse");
}

#[test]
fn test_session_end_to_end() {
    let mut session = EditingSession::new();
    session.upload_template(blank_pdf(612, 792)).unwrap();
    session
        .upload_dataset(b"Name,Course\nAlice,Rust\nBob,Go\n")
        .unwrap();

    assert!(matches!(
        session.run_batch(),
        Err(TemplateError::Configuration(ConfigurationError::NoFields))
    ));

    let id = session.add_field("Name").unwrap().id.clone();
    session.set_position(&id, Position::new(100.0, 100.0)).unwrap();

    assert!(matches!(
        session.run_batch(),
        Err(TemplateError::Configuration(ConfigurationError::ScaleNotMeasured))
    ));

    assert_eq!(session.set_preview_width(612.0), 1.0);
    assert_eq!(
        session.pdf_position(&id),
        Some(Position::new(100.0, 692.0))
    );

    let report = session.run_batch().unwrap().collect_report();
    assert_eq!(report.succeeded(), 2);
    assert!(contains(&report.outputs[0].bytes, "(Alice) Tj"));
}

#[test]
fn test_template_reupload_clears_fields() {
    let mut session = EditingSession::new();
    session.upload_template(blank_pdf(612, 792)).unwrap();
    session.upload_dataset(b"Name\nAlice\n").unwrap();
    session.set_preview_width(306.0);
    session.add_field("Name").unwrap();

    let template = session.upload_template(blank_pdf(306, 396)).unwrap();
    assert_eq!(template.page_width(), 306.0);
    assert!(session.fields().is_empty());
    // preview width is kept, ratio follows the new page
    assert_eq!(session.scale_ratio(), 1.0);
}

#[test]
fn test_layout_save_and_reload() {
    let mut session = EditingSession::new();
    session.upload_template(blank_pdf(612, 792)).unwrap();
    session.upload_dataset(b"Name,Course\nAlice,Rust\n").unwrap();
    session.set_preview_width(612.0);

    let id = session.add_field("Course").unwrap().id.clone();
    session.set_position(&id, Position::new(200.0, 300.0)).unwrap();
    session
        .set_styles(
            &id,
            FieldStyles {
                font_size: 20.0,
                ..Default::default()
            },
        )
        .unwrap();

    let json = session.layout().to_json().unwrap();

    let mut other = EditingSession::new();
    other.upload_dataset(b"Name,Course\nBob,Go\n").unwrap();
    assert_eq!(other.apply_layout(parse_layout(&json).unwrap()), 1);
    assert_eq!(other.fields(), session.fields());
}

#[test]
fn test_layout_reload_at_other_preview_width() {
    let mut session = EditingSession::new();
    session.upload_template(blank_pdf(612, 792)).unwrap();
    session.upload_dataset(b"Name\nAlice\n").unwrap();
    session.set_preview_width(306.0);

    let id = session.add_field("Name").unwrap().id.clone();
    session.set_position(&id, Position::new(50.0, 50.0)).unwrap();
    assert_eq!(
        session.pdf_position(&id),
        Some(Position::new(100.0, 692.0))
    );
    let json = session.layout().to_json().unwrap();

    let mut wider = EditingSession::new();
    wider.upload_template(blank_pdf(612, 792)).unwrap();
    wider.upload_dataset(b"Name\nBob\n").unwrap();
    wider.set_preview_width(612.0);
    assert_eq!(wider.apply_layout(parse_layout(&json).unwrap()), 1);

    assert_eq!(wider.fields()[0].position, Position::new(100.0, 100.0));
    assert_eq!(wider.pdf_position(&id), Some(Position::new(100.0, 692.0)));

    let report = wider.run_batch().unwrap().collect_report();
    let drawn = drawn_text(&report.outputs[0].bytes);
    assert_eq!(drawn.len(), 1);
    assert!((drawn[0].0 - 100.0).abs() < 1e-6);
    assert!((drawn[0].1 - 692.0).abs() < 1e-6);
}
