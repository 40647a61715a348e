//! Batch pipeline tests against synthetic documents.
//!
//! `BatchConverter` only needs a `PageSource`, so these tests drive the whole
//! render → encode → package path without pdfium. They always run.

use pdf2img::{
    save_output, Artifacts, BatchConverter, ContainerMode, ConversionConfig,
    ConversionProgressCallback, ConvertError, OutputFormat, PageRange, PageSource, RawImage,
    Resolution, DECK_DPI, DECK_FILE_NAME, PPTX_MIME, ZIP_MIME,
};
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// A document of solid-colour pages that records every rasterize call.
struct FakeDocument {
    pages: usize,
    calls: Mutex<Vec<(usize, u32)>>,
    fail_render_at: Option<usize>,
    short_buffer_at: Option<usize>,
}

impl FakeDocument {
    fn new(pages: usize) -> Self {
        Self {
            pages,
            calls: Mutex::new(Vec::new()),
            fail_render_at: None,
            short_buffer_at: None,
        }
    }

    fn calls(&self) -> Vec<(usize, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

impl PageSource for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn rasterize(&self, index: usize, dpi: u32) -> Result<RawImage, ConvertError> {
        self.calls.lock().unwrap().push((index, dpi));
        if self.fail_render_at == Some(index) {
            return Err(ConvertError::RenderFailed {
                page: index + 1,
                detail: "synthetic failure".into(),
            });
        }

        // Small, page-dependent images so every entry's bytes differ.
        let (width, height) = (4 + index as u32, 3);
        let shade = (index * 20 % 256) as u8;
        let mut pixels = vec![shade; (width * height * 3) as usize];
        if self.short_buffer_at == Some(index) {
            pixels.truncate(5);
        }
        Ok(RawImage {
            width,
            height,
            pixels,
        })
    }
}

#[derive(Default)]
struct Recorder {
    started: Mutex<Vec<usize>>,
    pages: Mutex<Vec<(usize, usize, usize)>>,
    fractions: Mutex<Vec<f64>>,
    completed: Mutex<Vec<usize>>,
}

impl ConversionProgressCallback for Recorder {
    fn on_conversion_start(&self, total_pages: usize) {
        self.started.lock().unwrap().push(total_pages);
    }
    fn on_page_complete(&self, page_num: usize, completed: usize, total: usize, _len: usize) {
        self.pages.lock().unwrap().push((page_num, completed, total));
    }
    fn on_progress(&self, fraction: f64) {
        self.fractions.lock().unwrap().push(fraction);
    }
    fn on_conversion_complete(&self, total_pages: usize) {
        self.completed.lock().unwrap().push(total_pages);
    }
}

fn read_zip(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).expect("entry");
            let mut data = Vec::new();
            entry.read_to_end(&mut data).expect("read entry");
            (entry.name().to_string(), data)
        })
        .collect()
}

// ── Page-range conversion ────────────────────────────────────────────────────

#[test]
fn jpeg_range_of_ten_page_document() {
    let doc = FakeDocument::new(10);
    let recorder = Arc::new(Recorder::default());
    let config = ConversionConfig::builder()
        .format("JPEG".parse().unwrap())
        .resolution(Resolution::Normal)
        .range(PageRange::new(3, 5))
        .progress_callback(recorder.clone() as Arc<dyn ConversionProgressCallback>)
        .build()
        .unwrap();

    let output = BatchConverter::new(&config).run(&doc, "report.pdf").unwrap();

    let names: Vec<_> = output.pages().iter().map(|p| p.file_name.as_str()).collect();
    assert_eq!(names, ["page_3.jpeg", "page_4.jpeg", "page_5.jpeg"]);
    assert!(output.pages().iter().all(|p| p.mime_type == "image/jpeg"));
    assert!(output.pages().iter().all(|p| p.bytes.starts_with(&[0xFF, 0xD8])));

    let archive = output.archive().expect("zip produced");
    assert_eq!(archive.file_name, "report.pdf_pages_3_to_5.zip");
    assert_eq!(archive.entry_count, 3);
    assert_eq!(archive.mime_type(), ZIP_MIME);

    assert_eq!(doc.calls(), vec![(2, 300), (3, 300), (4, 300)]);

    let fractions = recorder.fractions.lock().unwrap().clone();
    assert_eq!(fractions.len(), 3);
    assert!((fractions[0] - 1.0 / 3.0).abs() < 1e-9);
    assert!((fractions[1] - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(fractions[2], 1.0);

    assert_eq!(*recorder.started.lock().unwrap(), vec![3]);
    assert_eq!(
        *recorder.pages.lock().unwrap(),
        vec![(3, 1, 3), (4, 2, 3), (5, 3, 3)]
    );
    assert_eq!(*recorder.completed.lock().unwrap(), vec![3]);

    assert_eq!(output.stats.document_pages, 10);
    assert_eq!(output.stats.converted_pages, 3);
    assert_eq!(output.stats.output_bytes, archive.bytes.len());
}

#[test]
fn archive_matches_per_page_artifacts() {
    let doc = FakeDocument::new(4);
    let config = ConversionConfig::builder()
        .format("PNG".parse().unwrap())
        .build()
        .unwrap();

    let output = BatchConverter::new(&config).run(&doc, "deck.pdf").unwrap();

    let expected: Vec<_> = output
        .pages()
        .iter()
        .map(|p| (p.file_name.clone(), p.bytes.clone()))
        .collect();
    let archive = output.archive().unwrap();
    assert_eq!(read_zip(&archive.bytes), expected);
    assert_eq!(archive.file_name, "deck.pdf_pages_1_to_4.zip");
    assert!(output.pages()[0].bytes.starts_with(b"\x89PNG"));
    assert!(output
        .pages()
        .iter()
        .all(|p| p.mime_type == "image/png" && p.file_name.ends_with(".png")));
}

#[test]
fn high_resolution_renders_at_600_dpi() {
    let doc = FakeDocument::new(2);
    let config = ConversionConfig::builder()
        .resolution(Resolution::High)
        .build()
        .unwrap();

    BatchConverter::new(&config).run(&doc, "a.pdf").unwrap();
    assert_eq!(doc.calls(), vec![(0, 600), (1, 600)]);
}

#[test]
fn reversed_range_fails_before_rendering() {
    let doc = FakeDocument::new(10);
    let recorder = Arc::new(Recorder::default());
    let mut config = ConversionConfig::builder()
        .progress_callback(recorder.clone() as Arc<dyn ConversionProgressCallback>)
        .build()
        .unwrap();
    // The builder already rejects this, so bypass it to reach the batch check.
    config.range = Some(PageRange::new(5, 3));

    let err = BatchConverter::new(&config).run(&doc, "a.pdf").unwrap_err();
    assert!(matches!(
        err,
        ConvertError::InvalidRange {
            start: 5,
            end: 3,
            page_count: 10
        }
    ));
    assert!(err.is_validation());
    assert!(doc.calls().is_empty());
    assert!(recorder.started.lock().unwrap().is_empty());
}

#[test]
fn range_past_last_page_is_rejected() {
    let doc = FakeDocument::new(4);
    let config = ConversionConfig::builder()
        .range(PageRange::new(2, 9))
        .build()
        .unwrap();

    let err = BatchConverter::new(&config).run(&doc, "a.pdf").unwrap_err();
    assert!(matches!(err, ConvertError::InvalidRange { page_count: 4, .. }));
    assert!(doc.calls().is_empty());
}

#[test]
fn render_failure_aborts_the_batch() {
    let mut doc = FakeDocument::new(6);
    doc.fail_render_at = Some(3);
    let recorder = Arc::new(Recorder::default());
    let config = ConversionConfig::builder()
        .progress_callback(recorder.clone() as Arc<dyn ConversionProgressCallback>)
        .build()
        .unwrap();

    let err = BatchConverter::new(&config).run(&doc, "a.pdf").unwrap_err();
    assert!(matches!(err, ConvertError::RenderFailed { page: 4, .. }));
    // Nothing after the failing page is attempted.
    assert_eq!(doc.calls().len(), 4);
    assert!(recorder.completed.lock().unwrap().is_empty());
}

#[test]
fn encode_failure_reports_the_page() {
    let mut doc = FakeDocument::new(3);
    doc.short_buffer_at = Some(1);
    let config = ConversionConfig::default();

    let err = BatchConverter::new(&config).run(&doc, "a.pdf").unwrap_err();
    assert!(matches!(err, ConvertError::EncodeFailed { page: 2, .. }));
}

// ── Slide deck ───────────────────────────────────────────────────────────────

#[test]
fn deck_covers_every_page_regardless_of_range() {
    let doc = FakeDocument::new(50);
    let recorder = Arc::new(Recorder::default());
    let config = ConversionConfig::builder()
        .container(ContainerMode::Pptx)
        .format(OutputFormat::Jpeg)
        .resolution(Resolution::High)
        .range(PageRange::new(10, 12))
        .progress_callback(recorder.clone() as Arc<dyn ConversionProgressCallback>)
        .build()
        .unwrap();

    let output = BatchConverter::new(&config).run(&doc, "slides.pdf").unwrap();

    let deck = output.deck().expect("deck produced");
    assert_eq!(deck.file_name, DECK_FILE_NAME);
    assert_eq!(deck.slide_count, 50);
    assert_eq!(deck.mime_type(), PPTX_MIME);
    assert!(output.pages().is_empty());
    assert!(output.archive().is_none());

    let calls = doc.calls();
    assert_eq!(calls.len(), 50);
    assert!(calls.iter().all(|&(_, dpi)| dpi == DECK_DPI));
    assert_eq!(calls.first(), Some(&(0, DECK_DPI)));
    assert_eq!(calls.last(), Some(&(49, DECK_DPI)));

    let entries = read_zip(&deck.bytes);
    let slides = entries
        .iter()
        .filter(|(n, _)| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .count();
    assert_eq!(slides, 50);
    assert!(entries.iter().any(|(n, _)| n == "ppt/media/image50.png"));

    // Only start/complete are reported for decks.
    assert_eq!(*recorder.started.lock().unwrap(), vec![50]);
    assert!(recorder.fractions.lock().unwrap().is_empty());
    assert_eq!(*recorder.completed.lock().unwrap(), vec![50]);
}

#[test]
fn deck_accepts_a_reversed_range() {
    let doc = FakeDocument::new(7);
    let config = ConversionConfig::builder()
        .container(ContainerMode::Pptx)
        .range(PageRange::new(5, 3))
        .build()
        .expect("range is not checked for decks");

    let output = BatchConverter::new(&config).run(&doc, "a.pdf").unwrap();
    assert_eq!(output.deck().unwrap().slide_count, 7);
    assert_eq!(doc.calls().len(), 7);
}

#[test]
fn deck_of_empty_document_is_an_error() {
    let doc = FakeDocument::new(0);
    let config = ConversionConfig::builder()
        .container(ContainerMode::Pptx)
        .build()
        .unwrap();

    let err = BatchConverter::new(&config).run(&doc, "empty.pdf").unwrap_err();
    assert!(matches!(err, ConvertError::EmptyDocument { .. }));
}

// ── Saving ───────────────────────────────────────────────────────────────────

#[test]
fn save_output_writes_pages_then_archive() {
    let doc = FakeDocument::new(3);
    let config = ConversionConfig::builder()
        .range(PageRange::new(2, 3))
        .build()
        .unwrap();
    let output = BatchConverter::new(&config).run(&doc, "in.pdf").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let saved = save_output(&output, dir.path()).unwrap();

    let names: Vec<_> = saved
        .files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["page_2.png", "page_3.png", "in.pdf_pages_2_to_3.zip"]);
    for (path, page) in saved.files.iter().zip(output.pages()) {
        assert_eq!(std::fs::read(path).unwrap(), page.bytes);
    }
    assert_eq!(saved.stats.converted_pages, 2);

    // Only the artifacts are left behind, no temp files.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
}

#[test]
fn upload_names_with_directories_stay_inside_out_dir() {
    let config = ConversionConfig::default();
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");

    for name in ["sub/x.pdf", "../x.pdf", "/abs/path/x.pdf"] {
        let doc = FakeDocument::new(1);
        let output = BatchConverter::new(&config).run(&doc, name).unwrap();
        assert_eq!(output.archive().unwrap().file_name, "x.pdf_pages_1_to_1.zip");

        let saved = save_output(&output, &out_dir).unwrap();
        assert!(saved.files.iter().all(|f| f.parent() == Some(out_dir.as_path())));
    }
    // Nothing escaped into the parent directory.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn manifest_serialises_without_bytes() {
    let doc = FakeDocument::new(2);
    let output = BatchConverter::new(&ConversionConfig::default())
        .run(&doc, "m.pdf")
        .unwrap();

    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["artifacts"]["kind"], "images");
    assert_eq!(json["artifacts"]["pages"][1]["file_name"], "page_2.png");
    assert!(json["artifacts"]["pages"][0].get("bytes").is_none());
    assert!(matches!(output.artifacts, Artifacts::Images { .. }));

    let uri = output.pages()[0].data_uri();
    assert!(uri.starts_with("data:image/png;base64,iVBOR"));
}
