use invoice_core::document::PdfDocument;
use invoice_core::fonts::{Font, FontMetrics};
use invoice_core::geometry::{PageCursor, DEFAULT_LETTERHEAD_IN, PAGE_HEIGHT_PT, PAGE_WIDTH_PT};
use invoice_core::tables::{render_service_table, render_table, Align, ServiceRow, TableSpec};
use invoice_core::wrap::wrap;
use invoice_core::writer::escape_pdf_string;

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .filter(|w| *w == needle)
        .count()
}

fn make_doc() -> (PdfDocument<Vec<u8>>, PageCursor) {
    let mut doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    doc.begin_page(PAGE_WIDTH_PT, PAGE_HEIGHT_PT).unwrap();
    (doc, PageCursor::new(DEFAULT_LETTERHEAD_IN))
}

fn service_spec() -> TableSpec {
    TableSpec::new(
        vec![25.0, 80.0, 25.0, 30.0, 30.0],
        &["Date", "Service", "Hrs", "Rate", "Amt"],
        vec![
            Align::Left,
            Align::Left,
            Align::Right,
            Align::Right,
            Align::Right,
        ],
    )
}

fn desc_measure(s: &str) -> f64 {
    FontMetrics::text_width_mm(s, Font::Helvetica, 12.0)
}

fn tj(line: &str) -> Vec<u8> {
    format!("({}) Tj", escape_pdf_string(line)).into_bytes()
}

// -------------------------------------------------------
// Multi-page services table
// -------------------------------------------------------

#[test]
fn forty_wrapped_rows_repeat_header_on_every_page() {
    let (mut doc, mut cursor) = make_doc();
    let spec = service_spec();

    let rows: Vec<ServiceRow> = (0..40)
        .map(|i| ServiceRow {
            date: format!("{}/{}/25", i % 12 + 1, i % 28 + 1),
            description: format!(
                "job {i:02} remove the existing damaged trim sections, fabricate \
                 matching replacements on site, and install with finish nailing \
                 and caulk at all seams"
            ),
            hours: "3.00".to_string(),
            rate: "250.00".to_string(),
            amount: "750.00".to_string(),
        })
        .collect();

    // Sanity: each description wraps to several lines at the column width.
    let sample = wrap(&rows[0].description, 78.0, desc_measure);
    assert!(sample.len() >= 3);

    render_service_table(&mut doc, &mut cursor, &spec, &rows, 12.0).unwrap();
    let pages = doc.page_count();
    assert!(pages > 1);

    doc.end_page().unwrap();
    let bytes = doc.end_document().unwrap();
    assert_eq!(count(&bytes, b"(Service) Tj"), pages);
    assert_eq!(count(&bytes, b"(Hrs) Tj"), pages);
}

#[test]
fn every_wrapped_line_of_every_row_appears_exactly_once() {
    let (mut doc, mut cursor) = make_doc();
    let spec = service_spec();

    // Every word carries the row number, so no two rows share a wrapped line.
    let rows: Vec<ServiceRow> = (0..40)
        .map(|i| ServiceRow {
            date: "1/1/25".to_string(),
            description: (0..20)
                .map(|w| format!("r{i:02}seg{w:02}"))
                .collect::<Vec<_>>()
                .join(" "),
            hours: "2.00".to_string(),
            rate: "100.00".to_string(),
            amount: "200.00".to_string(),
        })
        .collect();

    render_service_table(&mut doc, &mut cursor, &spec, &rows, 12.0).unwrap();
    doc.end_page().unwrap();
    let bytes = doc.end_document().unwrap();

    for row in &rows {
        let lines = wrap(&row.description, 78.0, desc_measure);
        for line in &lines {
            assert_eq!(count(&bytes, &tj(line)), 1, "line {line:?}");
        }
    }

    // The final wrapped line of the final row lands exactly once.
    let last = wrap(&rows[39].description, 78.0, desc_measure);
    assert_eq!(count(&bytes, &tj(last.last().unwrap())), 1);
}

#[test]
fn row_taller_than_a_page_is_chunked_not_dropped() {
    let (mut doc, mut cursor) = make_doc();
    let spec = service_spec();

    let words: String = (0..600)
        .map(|i| format!("item{i}"))
        .collect::<Vec<_>>()
        .join(" ");
    let expected = wrap(&words, 78.0, desc_measure);

    let rows = vec![ServiceRow {
        date: "6/1/25".to_string(),
        description: words.clone(),
        hours: "8.00".to_string(),
        rate: "95.00".to_string(),
        amount: "760.00".to_string(),
    }];
    render_service_table(&mut doc, &mut cursor, &spec, &rows, 12.0).unwrap();
    assert!(doc.page_count() >= 3);

    doc.end_page().unwrap();
    let bytes = doc.end_document().unwrap();
    for line in &expected {
        assert_eq!(count(&bytes, &tj(line)), 1, "line {line:?}");
    }
    // The single-line columns appear only on the first chunk.
    assert_eq!(count(&bytes, b"(6/1/25) Tj"), 1);
    assert_eq!(count(&bytes, b"(760.00) Tj"), 1);
}

// -------------------------------------------------------
// Simple table pagination
// -------------------------------------------------------

#[test]
fn cost_table_pagination_keeps_all_rows() {
    let (mut doc, mut cursor) = make_doc();
    let spec = TableSpec::new(
        vec![80.0, 30.0, 30.0, 30.0],
        &["Description", "Qty", "Unit", "Total"],
        vec![Align::Left, Align::Right, Align::Right, Align::Right],
    );
    let rows: Vec<Vec<String>> = (0..120)
        .map(|i| {
            vec![
                format!("cost item {i}"),
                "1.00".to_string(),
                "10.00".to_string(),
                "10.00".to_string(),
            ]
        })
        .collect();

    render_table(&mut doc, &mut cursor, &spec, &rows, 12.0).unwrap();
    let pages = doc.page_count();
    assert!(pages > 1);

    doc.end_page().unwrap();
    let bytes = doc.end_document().unwrap();
    assert_eq!(count(&bytes, b"(Description) Tj"), pages);
    for i in 0..120 {
        let needle = format!("(cost item {i}) Tj");
        assert_eq!(count(&bytes, needle.as_bytes()), 1);
    }
}
