//! Invoice document assembly: heading, services table, costs table,
//! subtotal rows, and the boxed grand total, serialized to a PDF.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::document::PdfDocument;
use crate::error::Result;
use crate::fonts::{Font, FontMetrics};
use crate::geometry::{
    line_height_mm, mm_from_inches, mm_to_pt, pt_to_mm, y_to_pt, PageCursor,
    DEFAULT_LETTERHEAD_IN, LEFT_MARGIN_MM, MAX_FONT_PT, MIN_FONT_PT, PAGE_HEIGHT_MM,
    PAGE_HEIGHT_PT, PAGE_WIDTH_MM, PAGE_WIDTH_PT, TOP_MARGIN_MM,
};
use crate::invoice::{format_date_short, Invoice};
use crate::naming;
use crate::settings::Settings;
use crate::tables::{
    cell_box, cell_text, fitted_size, render_service_table, render_table, Align, ServiceRow,
    TableSpec,
};

/// Border width of the grand-total box, mm. Heavier than cell rules.
const BOX_RULE_MM: f64 = 0.5;

/// Rendering knobs sourced from settings; defaults match a fresh install.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Reserved letterhead band on page 1, inches.
    pub letterhead_in: f64,
    /// Group integer digits of money values in threes.
    pub thousand_separators: bool,
    /// FlateDecode page content streams.
    pub compress: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            letterhead_in: DEFAULT_LETTERHEAD_IN,
            thousand_separators: true,
            compress: true,
        }
    }
}

impl RenderOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        RenderOptions {
            letterhead_in: settings.get_f64("letterhead.top_margin_in", DEFAULT_LETTERHEAD_IN),
            thousand_separators: settings.get_bool("pdf.thousand_separators", true),
            ..RenderOptions::default()
        }
    }
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

fn cost_spec() -> TableSpec {
    TableSpec::new(
        vec![80.0, 30.0, 30.0, 30.0],
        &["Description", "Qty", "Unit", "Total"],
        vec![Align::Left, Align::Right, Align::Right, Align::Right],
    )
}

/// Pick the global font size: the largest whole point size from the
/// maximum down to the minimum for which a rough row-count estimate fits
/// below the letterhead. The estimate ignores wrapping, so it can guess
/// small but never breaks correctness; real overflow is paginated.
pub fn choose_font_size(service_count: usize, cost_count: usize, letterhead_in: f64) -> f64 {
    let total_rows = (service_count + 1 + cost_count + 1 + 6) as f64;
    let avail = PAGE_HEIGHT_MM - mm_from_inches(letterhead_in) - TOP_MARGIN_MM;
    for pt in (MIN_FONT_PT as i64..=MAX_FONT_PT as i64).rev() {
        if total_rows * line_height_mm(pt as f64) < avail {
            return pt as f64;
        }
    }
    MIN_FONT_PT
}

/// Format a money value: two decimal places, fixed `.` decimal point,
/// comma thousands grouping when enabled. Never locale-dependent.
pub fn format_amount(value: f64, thousand_separators: bool) -> String {
    let fixed = format!("{:.2}", value);
    if !thousand_separators {
        return fixed;
    }
    let (int_part, frac) = match fixed.split_once('.') {
        Some(parts) => parts,
        None => (fixed.as_str(), "00"),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{frac}")
}

fn format_hours(hours: f64) -> String {
    format!("{hours:.2}")
}

/// A bold subtotal row: right-aligned label spanning all but the last
/// column, value in the last column. Only the label shrinks on overflow.
fn draw_total_row<W: Write>(
    doc: &mut PdfDocument<W>,
    cursor: &mut PageCursor,
    label: &str,
    value: &str,
    label_w_mm: f64,
    value_w_mm: f64,
    base_pt: f64,
) -> std::io::Result<()> {
    let row_h = line_height_mm(base_pt);
    if !cursor.fits(row_h) {
        doc.begin_page(PAGE_WIDTH_PT, PAGE_HEIGHT_PT)?;
        cursor.turn_page();
    }
    let y = cursor.y_mm();
    let label_pt = fitted_size(label, Font::HelveticaBold, base_pt, label_w_mm);
    cell_box(doc, LEFT_MARGIN_MM, y, label_w_mm, row_h, None, 0.2);
    cell_text(
        doc,
        LEFT_MARGIN_MM,
        y,
        label_w_mm,
        row_h,
        label,
        Font::HelveticaBold,
        label_pt,
        Align::Right,
    );
    let value_x = LEFT_MARGIN_MM + label_w_mm;
    cell_box(doc, value_x, y, value_w_mm, row_h, None, 0.2);
    cell_text(
        doc,
        value_x,
        y,
        value_w_mm,
        row_h,
        value,
        Font::HelveticaBold,
        base_pt,
        Align::Right,
    );
    cursor.advance(row_h * 1.5);
    Ok(())
}

/// Render `invoice` as a complete PDF into `writer` and return the writer.
pub fn render_invoice<W: Write>(
    invoice: &Invoice,
    writer: W,
    opts: &RenderOptions,
) -> Result<W> {
    let base_pt = choose_font_size(
        invoice.services.len(),
        invoice.costs.len(),
        opts.letterhead_in,
    );
    let line_h = line_height_mm(base_pt);
    log::debug!(
        "rendering invoice for {:?}: {} services, {} costs, {base_pt} pt",
        invoice.client_name,
        invoice.services.len(),
        invoice.costs.len()
    );

    let mut doc = PdfDocument::new(writer)?;
    doc.set_compression(opts.compress);
    doc.set_info("Title", &format!("Invoice - {}", invoice.client_name));
    doc.begin_page(PAGE_WIDTH_PT, PAGE_HEIGHT_PT)?;
    let mut cursor = PageCursor::new(opts.letterhead_in);

    // Heading: title line, then client and date lines in the base font.
    let heading = |y: f64, h: f64, pt: f64| y_to_pt(y + h / 2.0 + 0.3 * pt_to_mm(pt));
    let x0 = mm_to_pt(LEFT_MARGIN_MM);
    let title_pt = base_pt + 4.0;
    doc.text(
        x0,
        heading(cursor.y_mm(), 2.0 * line_h, title_pt),
        Font::HelveticaBold,
        title_pt,
        "Invoice",
    );
    cursor.advance(2.0 * line_h + line_h / 2.0);
    doc.text(
        x0,
        heading(cursor.y_mm(), line_h, base_pt),
        Font::Helvetica,
        base_pt,
        &format!("Invoice for: {}", invoice.client_name),
    );
    cursor.advance(line_h);
    doc.text(
        x0,
        heading(cursor.y_mm(), line_h, base_pt),
        Font::Helvetica,
        base_pt,
        &format!("Date:        {}", invoice.invoice_date),
    );
    cursor.advance(2.0 * line_h);

    // Services, sorted by date.
    let svc_spec = service_spec();
    let svc_rows: Vec<ServiceRow> = invoice
        .services_by_date()
        .into_iter()
        .map(|item| ServiceRow {
            date: format_date_short(item.date),
            description: item.description.clone(),
            hours: format_hours(item.hours),
            rate: format_amount(item.rate, opts.thousand_separators),
            amount: format_amount(item.amount(), opts.thousand_separators),
        })
        .collect();
    render_service_table(&mut doc, &mut cursor, &svc_spec, &svc_rows, base_pt)?;
    cursor.advance(line_h / 2.0);

    let svc_label_w: f64 = svc_spec.col_widths_mm[..4].iter().sum();
    draw_total_row(
        &mut doc,
        &mut cursor,
        "TOTAL SERVICE FEES",
        &format_amount(invoice.total_services(), opts.thousand_separators),
        svc_label_w,
        svc_spec.col_widths_mm[4],
        base_pt,
    )?;

    // Costs, in insertion order.
    let cost_spec = cost_spec();
    let cost_rows: Vec<Vec<String>> = invoice
        .costs
        .iter()
        .map(|c| {
            vec![
                c.description.clone(),
                format_amount(c.quantity, opts.thousand_separators),
                format_amount(c.unit_price, opts.thousand_separators),
                format_amount(c.total(), opts.thousand_separators),
            ]
        })
        .collect();
    render_table(&mut doc, &mut cursor, &cost_spec, &cost_rows, base_pt)?;
    cursor.advance(line_h / 2.0);

    let cost_label_w: f64 = cost_spec.col_widths_mm[..3].iter().sum();
    draw_total_row(
        &mut doc,
        &mut cursor,
        "TOTAL COSTS",
        &format_amount(invoice.total_costs(), opts.thousand_separators),
        cost_label_w,
        cost_spec.col_widths_mm[3],
        base_pt,
    )?;

    // Boxed grand total, right-aligned, sized to its own text.
    let gt_pt = base_pt + 2.0;
    let gt = format!(
        "GRAND TOTAL: {}",
        format_amount(invoice.grand_total(), opts.thousand_separators)
    );
    let box_h = line_height_mm(base_pt) * 1.2;
    if !cursor.fits(box_h) {
        doc.begin_page(PAGE_WIDTH_PT, PAGE_HEIGHT_PT)?;
        cursor.turn_page();
    }
    let box_w = FontMetrics::text_width_mm(&gt, Font::HelveticaBold, gt_pt) + 6.0;
    let box_x = PAGE_WIDTH_MM - LEFT_MARGIN_MM - box_w;
    cell_box(&mut doc, box_x, cursor.y_mm(), box_w, box_h, None, BOX_RULE_MM);
    cell_text(
        &mut doc,
        box_x,
        cursor.y_mm(),
        box_w,
        box_h,
        &gt,
        Font::HelveticaBold,
        gt_pt,
        Align::Center,
    );
    cursor.advance(box_h);

    doc.end_page()?;
    let mut writer = doc.end_document()?;
    writer.flush()?;
    Ok(writer)
}

/// Render `invoice` and write it to `path` atomically: the document is
/// built in a temp file in the target directory and renamed into place,
/// so a failed render never leaves a partial file at the destination.
pub fn export_invoice(invoice: &Invoice, path: &Path, opts: &RenderOptions) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let tmp = NamedTempFile::new_in(dir)?;
    let buffered = std::io::BufWriter::new(tmp.as_file().try_clone()?);
    let writer = render_invoice(invoice, buffered, opts)?;
    drop(writer);
    tmp.persist(path).map_err(|e| e.error)?;
    log::info!("PDF saved as {}", path.display());
    Ok(())
}

/// Output path for an invoice under `dir`, built from the naming template
/// in `settings` and uniquified against existing files.
pub fn default_output_path(invoice: &Invoice, settings: &Settings, dir: &Path) -> PathBuf {
    let template = settings.get_str("pdf.file_naming_template", naming::DEFAULT_TEMPLATE);
    let name =
        naming::filename_from_template(&template, &invoice.client_name, &invoice.invoice_date);
    naming::uniquify(&dir.join(name))
}
