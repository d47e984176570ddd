/// Invoice demo — a realistic small invoice.
///
/// Builds an invoice with a handful of services and costs, lets the
/// heuristic pick the font size, and exports through the template-driven
/// naming path.
///
/// Run with:
///   cargo run --example generate_invoice -p invoice-demos
///
/// Writes output to: demos/output/
use std::path::Path;

use chrono::NaiveDate;
use invoice_core::render::{default_output_path, export_invoice, RenderOptions};
use invoice_core::{Invoice, Settings};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid demo date")
}

fn main() -> invoice_core::Result<()> {
    let out_dir = Path::new("demos/output");

    let mut invoice = Invoice::new("O'Brien & Sons, Ltd.", "03/07/2025", 250.0);
    invoice.add_service(date(2025, 3, 3), "initial site walkthrough and scope review", 1.5);
    invoice.add_service(date(2025, 3, 4), "demo of existing trim, haul away debris", 4.0);
    invoice.add_service(
        date(2025, 3, 5),
        "fabricate and install replacement trim; caulk and finish all seams",
        6.5,
    );
    invoice.add_service(date(2025, 3, 7), "final inspection and punch list", 1.0);
    invoice.add_cost("paint and caulk", 1.0, 86.50);
    invoice.add_cost("trim stock (LF)", 140.0, 3.25);
    invoice.add_cost("disposal fee", 1.0, 75.0);

    print!("{}", invoice.summary());

    let settings = Settings::in_memory(out_dir.join("settings.json"));
    let path = default_output_path(&invoice, &settings, out_dir);
    export_invoice(&invoice, &path, &RenderOptions::from_settings(&settings))?;
    println!("wrote {}", path.display());
    Ok(())
}
