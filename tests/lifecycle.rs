//! Document lifecycle tests against fake PDF and OCR engines.
//!
//! Run with:
//!   cargo test --test lifecycle

mod common;

use common::{FakeOcr, FakePdf, Harness, PDF_BYTES};
use docflow::pipeline::encode::OcrDocument;
use docflow::{DocFlowError, DocumentId, DocumentStore, ErrorKind, PageRange, MAX_UPLOAD_BYTES};

// ── Upload ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unsupported_extension_registers_nothing() {
    let h = Harness::new(FakePdf::with_pages(3), FakeOcr::default()).await;

    let err = h
        .controller
        .upload(b"hello", "notes.docx")
        .await
        .unwrap_err();

    assert!(matches!(err, DocFlowError::UnsupportedFileType { .. }), "{err}");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(h.documents.is_empty());
    assert!(h.scratch_files().is_empty());
}

#[tokio::test]
async fn missing_extension_is_unsupported() {
    let h = Harness::new(FakePdf::with_pages(3), FakeOcr::default()).await;
    let err = h.controller.upload(PDF_BYTES, "README").await.unwrap_err();
    assert!(matches!(err, DocFlowError::UnsupportedFileType { .. }));
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let h = Harness::new(FakePdf::with_pages(3), FakeOcr::default()).await;
    let bytes = vec![0u8; MAX_UPLOAD_BYTES + 1];

    let err = h.controller.upload(&bytes, "big.pdf").await.unwrap_err();

    assert!(matches!(err, DocFlowError::FileTooLarge { .. }), "{err}");
    assert!(h.documents.is_empty());
}

#[tokio::test]
async fn upload_at_the_limit_is_accepted() {
    let h = Harness::new(FakePdf::with_pages(2), FakeOcr::default()).await;
    let bytes = vec![0u8; MAX_UPLOAD_BYTES];

    let descriptor = h.controller.upload(&bytes, "edge.pdf").await.unwrap();
    assert_eq!(descriptor.total_pages, 2);
}

#[tokio::test]
async fn pdf_upload_reports_page_count() {
    let h = Harness::new(FakePdf::with_pages(5), FakeOcr::default()).await;

    let descriptor = h.controller.upload(PDF_BYTES, "report.pdf").await.unwrap();

    assert_eq!(descriptor.filename, "report.pdf");
    assert_eq!(descriptor.total_pages, 5);
    assert!(!descriptor.is_image);
    assert_eq!(h.documents.len(), 1);

    let stored = h.controller.document(&descriptor.doc_id).unwrap();
    assert!(stored.path.exists());
    assert_eq!(stored.path.extension().unwrap(), "pdf");
}

#[tokio::test]
async fn image_upload_is_a_single_page() {
    let h = Harness::new(FakePdf::with_pages(9), FakeOcr::default()).await;

    let descriptor = h.controller.upload(b"\x89PNG", "scan.PNG").await.unwrap();

    assert_eq!(descriptor.total_pages, 1);
    assert!(descriptor.is_image);
    assert_eq!(*h.pdf.count_calls.lock(), 0, "images never reach the PDF engine");
}

#[tokio::test]
async fn every_upload_gets_a_fresh_id() {
    let h = Harness::new(FakePdf::with_pages(1), FakeOcr::default()).await;
    let a = h.controller.upload(PDF_BYTES, "same.pdf").await.unwrap();
    let b = h.controller.upload(PDF_BYTES, "same.pdf").await.unwrap();
    assert_ne!(a.doc_id, b.doc_id);
    assert_eq!(h.documents.len(), 2);
}

// ── Thumbnails ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn thumbnail_bounds_are_checked() {
    let h = Harness::new(FakePdf::with_pages(5), FakeOcr::default()).await;
    let id = h.controller.upload(PDF_BYTES, "a.pdf").await.unwrap().doc_id;

    for page in [0, -1, 6] {
        let err = h.controller.thumbnail(&id, page).await.unwrap_err();
        assert!(
            matches!(err, DocFlowError::PageOutOfRange { total: 5, .. }),
            "page {page}: {err}"
        );
        assert!(err.to_string().contains("1-5"), "{err}");
    }

    let first = h.controller.thumbnail(&id, 1).await.unwrap();
    assert_eq!(first.mime, "image/png");
    assert_eq!(first.bytes, b"png:0");

    let last = h.controller.thumbnail(&id, 5).await.unwrap();
    assert_eq!(last.bytes, b"png:4");
}

#[tokio::test]
async fn image_thumbnail_is_the_original_bytes() {
    let h = Harness::new(FakePdf::with_pages(5), FakeOcr::default()).await;
    let id = h
        .controller
        .upload(b"\xff\xd8jpeg-bytes", "photo.jpg")
        .await
        .unwrap()
        .doc_id;

    // Any page number, the image is its own preview.
    let thumb = h.controller.thumbnail(&id, 42).await.unwrap();
    assert_eq!(thumb.bytes, b"\xff\xd8jpeg-bytes");
    assert_eq!(thumb.mime, "image/jpeg");
}

#[tokio::test]
async fn unknown_document_is_not_found() {
    let h = Harness::new(FakePdf::with_pages(5), FakeOcr::default()).await;
    let id = DocumentId::new();

    let err = h.controller.thumbnail(&id, 1).await.unwrap_err();
    assert!(matches!(err, DocFlowError::DocumentNotFound { .. }));

    let err = h
        .controller
        .run_ocr(&id, &[PageRange(1, 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, DocFlowError::DocumentNotFound { .. }));

    let err = h.controller.download(&id, "md").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ── OCR ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pdf_ocr_needs_page_ranges() {
    let h = Harness::new(FakePdf::with_pages(5), FakeOcr::returning(&["x"])).await;
    let id = h.controller.upload(PDF_BYTES, "a.pdf").await.unwrap().doc_id;

    let err = h.controller.run_ocr(&id, &[]).await.unwrap_err();

    assert!(matches!(err, DocFlowError::NoPageRanges));
    assert!(h.pdf.splits.lock().is_empty());
    assert!(h.ocr.requests.lock().is_empty());
}

#[tokio::test]
async fn selected_ranges_reach_the_splitter_in_order() {
    let h = Harness::new(FakePdf::with_pages(5), FakeOcr::returning(&["p"])).await;
    let id = h.controller.upload(PDF_BYTES, "a.pdf").await.unwrap().doc_id;

    h.controller.run_ocr(&id, &[PageRange(2, 3)]).await.unwrap();
    h.controller
        .run_ocr(&id, &[PageRange(3, 3), PageRange(1, 1)])
        .await
        .unwrap();

    let splits = h.pdf.splits.lock().clone();
    assert_eq!(
        splits,
        vec![
            vec![PageRange(2, 3)],
            vec![PageRange(3, 3), PageRange(1, 1)]
        ]
    );
    assert!(matches!(
        h.ocr.last_document(),
        Some(OcrDocument::DocumentUrl { .. })
    ));
}

#[tokio::test]
async fn image_ocr_ignores_ranges() {
    let h = Harness::new(FakePdf::with_pages(5), FakeOcr::returning(&["# Receipt\nTotal 12"])).await;
    let id = h.controller.upload(b"\x89PNG", "receipt.png").await.unwrap().doc_id;

    let result = h.controller.run_ocr(&id, &[]).await.unwrap();

    assert_eq!(result.pages_processed, 1);
    assert!(h.pdf.splits.lock().is_empty());
    match h.ocr.last_document() {
        Some(OcrDocument::ImageUrl { image_url }) => {
            assert!(image_url.starts_with("data:image/png;base64,"), "{image_url}")
        }
        other => panic!("expected an image payload, got {other:?}"),
    }
}

#[tokio::test]
async fn ocr_result_has_page_sections_and_plain_text() {
    let h = Harness::new(
        FakePdf::with_pages(5),
        FakeOcr::returning(&["# Title\nBody", "## Sub\n### Deeper\ntext"]),
    )
    .await;
    let id = h.controller.upload(PDF_BYTES, "a.pdf").await.unwrap().doc_id;

    let result = h.controller.run_ocr(&id, &[PageRange(1, 2)]).await.unwrap();

    assert_eq!(result.pages_processed, 2);
    assert!(result.markdown.starts_with("---\n## Page 1\n---\n\n# Title"));
    assert!(result.markdown.contains("---\n## Page 2\n---\n\n## Sub"));
    for line in result.txt.lines() {
        assert!(
            !line.trim_start().starts_with('#'),
            "heading marker left in plain text: {line:?}"
        );
    }
    assert!(result.txt.contains("Title\nBody"));
}

#[tokio::test]
async fn rerun_replaces_the_stored_result() {
    let h = Harness::new(FakePdf::with_pages(5), FakeOcr::returning(&["first"])).await;
    let id = h.controller.upload(PDF_BYTES, "a.pdf").await.unwrap().doc_id;

    h.controller.run_ocr(&id, &[PageRange(1, 1)]).await.unwrap();
    h.ocr.set_pages(&["second", "third"]);
    let second = h.controller.run_ocr(&id, &[PageRange(1, 2)]).await.unwrap();

    let stored = h.controller.result(&id).unwrap();
    assert_eq!(stored, second);
    assert!(stored.txt.contains("second"));
    assert!(!stored.txt.contains("first"));
}

#[tokio::test]
async fn failed_rerun_keeps_the_previous_result() {
    let h = Harness::new(FakePdf::with_pages(5), FakeOcr::returning(&["kept"])).await;
    let id = h.controller.upload(PDF_BYTES, "a.pdf").await.unwrap().doc_id;
    h.controller.run_ocr(&id, &[PageRange(1, 1)]).await.unwrap();

    h.ocr.set_failing(true);
    let err = h.controller.run_ocr(&id, &[PageRange(2, 2)]).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(h.controller.result(&id).unwrap().txt.contains("kept"));
}

// ── Temporary split files ────────────────────────────────────────────────────

#[tokio::test]
async fn split_file_is_removed_after_success() {
    let h = Harness::new(FakePdf::with_pages(5), FakeOcr::returning(&["ok"])).await;
    let id = h.controller.upload(PDF_BYTES, "a.pdf").await.unwrap().doc_id;

    h.controller.run_ocr(&id, &[PageRange(1, 3)]).await.unwrap();

    let outputs = h.pdf.split_outputs.lock().clone();
    assert_eq!(outputs.len(), 1);
    assert!(!outputs[0].exists());
    assert!(h.scratch_files().iter().all(|f| !f.contains("_split_")));
}

#[tokio::test]
async fn split_file_is_removed_after_ocr_failure() {
    let ocr = FakeOcr::default();
    ocr.set_failing(true);
    let h = Harness::new(FakePdf::with_pages(5), ocr).await;
    let id = h.controller.upload(PDF_BYTES, "a.pdf").await.unwrap().doc_id;

    let err = h.controller.run_ocr(&id, &[PageRange(1, 3)]).await.unwrap_err();

    assert!(matches!(err, DocFlowError::OcrApiError { .. }));
    assert!(!h.pdf.split_outputs.lock()[0].exists());
    assert!(h.controller.result(&id).is_none());
}

#[tokio::test]
async fn split_file_is_removed_after_split_failure() {
    let h = Harness::new(FakePdf::failing_split(5), FakeOcr::returning(&["never"])).await;
    let id = h.controller.upload(PDF_BYTES, "a.pdf").await.unwrap().doc_id;

    let err = h.controller.run_ocr(&id, &[PageRange(1, 3)]).await.unwrap_err();

    assert!(matches!(err, DocFlowError::SplitFailed { .. }));
    assert!(!h.pdf.split_outputs.lock()[0].exists());
    assert!(h.ocr.requests.lock().is_empty());
}

// ── Download ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn download_before_ocr_is_not_found() {
    let h = Harness::new(FakePdf::with_pages(5), FakeOcr::returning(&["x"])).await;
    let id = h.controller.upload(PDF_BYTES, "a.pdf").await.unwrap().doc_id;

    let err = h.controller.download(&id, "md").await.unwrap_err();

    assert!(matches!(err, DocFlowError::ResultNotFound { .. }), "{err}");
}

#[tokio::test]
async fn download_after_ocr_names_the_file_after_the_upload() {
    let h = Harness::new(FakePdf::with_pages(5), FakeOcr::returning(&["# Hi\nthere"])).await;
    let id = h.controller.upload(PDF_BYTES, "quarterly.report.pdf").await.unwrap().doc_id;
    let result = h.controller.run_ocr(&id, &[PageRange(1, 1)]).await.unwrap();

    let md = h.controller.download(&id, "md").await.unwrap();
    assert_eq!(md.filename, "quarterly.report.md");
    assert_eq!(md.content, result.markdown.as_bytes());
    assert_eq!(md.content_type, "text/plain; charset=utf-8");
    assert_eq!(std::fs::read(&md.path).unwrap(), md.content);

    let txt = h.controller.download(&id, "txt").await.unwrap();
    assert_eq!(txt.filename, "quarterly.report.txt");
    assert_eq!(txt.content, result.txt.as_bytes());
}

#[tokio::test]
async fn pdf_export_format_is_always_rejected() {
    let h = Harness::new(FakePdf::with_pages(5), FakeOcr::returning(&["x"])).await;
    let unknown = DocumentId::new();

    let err = h.controller.download(&unknown, "pdf").await.unwrap_err();
    assert!(matches!(err, DocFlowError::InvalidExportFormat { .. }));

    let id = h.controller.upload(PDF_BYTES, "a.pdf").await.unwrap().doc_id;
    let err = h.controller.download(&id, "pdf").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    h.controller.run_ocr(&id, &[PageRange(1, 1)]).await.unwrap();
    let err = h.controller.download(&id, "pdf").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
