/// Pagination demo — an invoice that cannot fit on one page.
///
/// Sixty services with long descriptions force wrapped rows, page breaks
/// with repeated headers, and at least one row split across a page
/// boundary; one description is a single unbroken token to show the
/// emergency character split.
///
/// Run with:
///   cargo run --example generate_overflow -p invoice-demos
///
/// Writes output to: demos/output/overflow-invoice.pdf
use std::path::Path;

use chrono::NaiveDate;
use invoice_core::render::{export_invoice, RenderOptions};
use invoice_core::Invoice;

fn main() -> invoice_core::Result<()> {
    let mut invoice = Invoice::new("Maple Street Property Group", "06/30/2025", 185.0);

    for i in 0..60 {
        let day = i % 28 + 1;
        let date = NaiveDate::from_ymd_opt(2025, 6, day).expect("valid demo date");
        invoice.add_service(
            date,
            &format!(
                "unit {i:02}: seasonal maintenance visit covering HVAC filter \
                 replacement, smoke detector test, window seal inspection, and \
                 documentation of any tenant-reported issues for follow-up"
            ),
            2.25,
        );
    }
    // An unbroken token wider than the description column.
    invoice.add_service(
        NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid demo date"),
        &format!("archive upload {}", "x".repeat(300)),
        0.5,
    );
    for i in 0..12 {
        invoice.add_cost(&format!("supply restock, building {}", i + 1), 1.0, 142.75);
    }

    let path = Path::new("demos/output/overflow-invoice.pdf");
    export_invoice(&invoice, path, &RenderOptions::default())?;
    println!("wrote {}", path.display());
    Ok(())
}
