use chrono::NaiveDate;

use invoice_core::render::{default_output_path, export_invoice, render_invoice, RenderOptions};
use invoice_core::{Invoice, Settings};

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .filter(|w| *w == needle)
        .count()
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn uncompressed() -> RenderOptions {
    RenderOptions {
        compress: false,
        ..RenderOptions::default()
    }
}

// -------------------------------------------------------
// Canonical small invoice
// -------------------------------------------------------

#[test]
fn acme_invoice_end_to_end() {
    let mut inv = Invoice::new("Acme Co", "01/05/2025", 100.0);
    inv.add_service(d(2025, 1, 5), "site visit", 2.5);
    inv.add_cost("materials", 3.0, 20.0);

    assert!((inv.total_services() - 250.0).abs() < 1e-9);
    assert!((inv.total_costs() - 60.0).abs() < 1e-9);
    assert!((inv.grand_total() - 310.0).abs() < 1e-9);

    let bytes = render_invoice(&inv, Vec::<u8>::new(), &uncompressed()).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.7"));
    assert!(contains(&bytes, b"(Invoice for: Acme Co) Tj"));
    assert!(contains(&bytes, b"(Date:        01/05/2025) Tj"));
    assert!(contains(&bytes, b"(Site visit) Tj"));
    assert!(contains(&bytes, b"(Materials) Tj"));
    assert!(contains(&bytes, b"(GRAND TOTAL: 310.00) Tj"));
    assert!(contains(&bytes, b"%%EOF"));
    // Everything fits on one page.
    assert!(contains(&bytes, b"/Count 1"));
}

// -------------------------------------------------------
// Multi-page invoice
// -------------------------------------------------------

#[test]
fn crowded_invoice_paginates_and_repeats_headers() {
    let mut inv = Invoice::new("Big Client", "06/01/2025", 150.0);
    for i in 0..70 {
        inv.add_service(
            d(2025, 5, i % 28 + 1),
            &format!(
                "visit {i:02} inspect the roofline, clear all gutters and \
                 downspouts, and document any flashing damage found"
            ),
            2.0,
        );
    }
    for i in 0..15 {
        inv.add_cost(&format!("supply run {i}"), 1.0, 40.0);
    }

    let bytes = render_invoice(&inv, Vec::<u8>::new(), &uncompressed()).unwrap();
    let svc_headers = count(&bytes, b"(Service) Tj");
    let cost_headers = count(&bytes, b"(Description) Tj");
    assert!(svc_headers > 1, "services table should span pages");
    assert!(cost_headers >= 1);
    assert!(contains(&bytes, b"(TOTAL SERVICE FEES) Tj"));
    assert!(contains(&bytes, b"(TOTAL COSTS) Tj"));
    // 70 x 2h x 150 + 15 x 40 = 21,600.00
    assert!(contains(&bytes, b"(GRAND TOTAL: 21,600.00) Tj"));
}

#[test]
fn thousands_grouping_can_be_disabled() {
    let mut inv = Invoice::new("Plain", "01/01/2025", 5000.0);
    inv.add_service(d(2025, 1, 1), "retainer", 1.0);

    let opts = RenderOptions {
        compress: false,
        thousand_separators: false,
        ..RenderOptions::default()
    };
    let bytes = render_invoice(&inv, Vec::<u8>::new(), &opts).unwrap();
    assert!(contains(&bytes, b"(5000.00) Tj"));
    assert!(!contains(&bytes, b"(5,000.00) Tj"));
}

// -------------------------------------------------------
// Export path handling
// -------------------------------------------------------

#[test]
fn export_honors_template_and_collision_counter() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::in_memory(dir.path().join("settings.json"));
    let mut inv = Invoice::new("O'Brien & Sons, Ltd.", "03/07/2025", 250.0);
    inv.add_service(d(2025, 3, 7), "consultation", 1.0);

    let first = default_output_path(&inv, &settings, dir.path());
    assert_eq!(
        first.file_name().unwrap().to_str().unwrap(),
        "OBrien_Sons_Ltd_invoice[03-07-2025].pdf"
    );
    export_invoice(&inv, &first, &RenderOptions::default()).unwrap();
    assert!(std::fs::read(&first).unwrap().starts_with(b"%PDF-1.7"));

    let second = default_output_path(&inv, &settings, dir.path());
    assert_eq!(
        second.file_name().unwrap().to_str().unwrap(),
        "OBrien_Sons_Ltd_invoice[03-07-2025] (1).pdf"
    );
    export_invoice(&inv, &second, &RenderOptions::default()).unwrap();
    assert!(second.exists());
}

#[test]
fn export_to_missing_directory_creates_it() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("exports").join("2025");
    let path = nested.join("inv.pdf");

    let mut inv = Invoice::new("Nested", "01/01/2025", 100.0);
    inv.add_service(d(2025, 1, 1), "work", 1.0);
    export_invoice(&inv, &path, &RenderOptions::default()).unwrap();
    assert!(path.exists());
}

// -------------------------------------------------------
// Options from settings
// -------------------------------------------------------

#[test]
fn render_options_read_settings_values() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::load(dir.path().join("settings.json")).unwrap();
    settings
        .set("letterhead.top_margin_in", serde_json::json!(1.25))
        .unwrap();
    settings
        .set("pdf.thousand_separators", serde_json::json!(false))
        .unwrap();

    let opts = RenderOptions::from_settings(&settings);
    assert!((opts.letterhead_in - 1.25).abs() < 1e-9);
    assert!(!opts.thousand_separators);
}
