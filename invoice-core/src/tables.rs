//! Table rendering with automatic pagination.
//!
//! Two renderers share the header/page-break machinery: a simple one where
//! every row is a single text line, and a wrapped one for service rows whose
//! description may wrap to several lines and split across page boundaries.
//! Both run in millimetres from the page top; conversion to PDF points
//! happens at the drawing calls.

use std::io::{self, Write};

use crate::document::{Color, PdfDocument};
use crate::fonts::{Font, FontMetrics};
use crate::geometry::{
    line_height_mm, mm_to_pt, pt_to_mm, y_to_pt, PageCursor, LEFT_MARGIN_MM, MIN_FONT_PT,
    PAGE_HEIGHT_PT, PAGE_WIDTH_PT,
};
use crate::wrap::wrap;

/// Interior cell padding on each side, mm.
pub const CELL_PAD_MM: f64 = 1.0;

/// Cell border width, mm.
const RULE_WIDTH_MM: f64 = 0.2;

fn header_fill() -> Color {
    Color::rgb8(200, 220, 255)
}

fn body_fill() -> Color {
    Color::rgb8(245, 245, 245)
}

/// Horizontal text alignment within a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Column layout for one table: widths, header captions, body alignments.
#[derive(Debug, Clone)]
pub struct TableSpec {
    pub col_widths_mm: Vec<f64>,
    pub headers: Vec<String>,
    pub aligns: Vec<Align>,
}

impl TableSpec {
    pub fn new(col_widths_mm: Vec<f64>, headers: &[&str], aligns: Vec<Align>) -> Self {
        debug_assert_eq!(col_widths_mm.len(), headers.len());
        debug_assert_eq!(col_widths_mm.len(), aligns.len());
        TableSpec {
            col_widths_mm,
            headers: headers.iter().map(|h| h.to_string()).collect(),
            aligns,
        }
    }

    pub fn total_width_mm(&self) -> f64 {
        self.col_widths_mm.iter().sum()
    }
}

/// Font size for a single-line cell: the base size, shrunk proportionally
/// (down to the fixed minimum) when the text would overflow the column
/// minus a 2 mm allowance.
pub(crate) fn fitted_size(text: &str, font: Font, base_pt: f64, col_w_mm: f64) -> f64 {
    let text_w = FontMetrics::text_width_mm(text, font, base_pt);
    if text_w > col_w_mm - 2.0 {
        (base_pt * (col_w_mm - 2.0) / text_w).max(MIN_FONT_PT)
    } else {
        base_pt
    }
}

/// Draw a cell background (optional) and its border.
pub(crate) fn cell_box<W: Write>(
    doc: &mut PdfDocument<W>,
    x_mm: f64,
    y_mm: f64,
    w_mm: f64,
    h_mm: f64,
    fill: Option<Color>,
    rule_mm: f64,
) {
    let (x, y) = (mm_to_pt(x_mm), y_to_pt(y_mm + h_mm));
    let (w, h) = (mm_to_pt(w_mm), mm_to_pt(h_mm));
    if let Some(color) = fill {
        doc.fill_rect(x, y, w, h, color);
    }
    doc.stroke_rect(x, y, w, h, Color::black(), mm_to_pt(rule_mm));
}

/// Place one line of text inside a cell, vertically centered.
pub(crate) fn cell_text<W: Write>(
    doc: &mut PdfDocument<W>,
    x_mm: f64,
    y_mm: f64,
    w_mm: f64,
    h_mm: f64,
    text: &str,
    font: Font,
    size_pt: f64,
    align: Align,
) {
    if text.is_empty() {
        return;
    }
    let text_w = FontMetrics::text_width_mm(text, font, size_pt);
    let tx = match align {
        Align::Left => x_mm + CELL_PAD_MM,
        Align::Center => x_mm + (w_mm - text_w) / 2.0,
        Align::Right => x_mm + w_mm - CELL_PAD_MM - text_w,
    };
    // Baseline sits a little below the cell midline.
    let baseline_mm = y_mm + h_mm / 2.0 + 0.3 * pt_to_mm(size_pt);
    doc.text(mm_to_pt(tx), y_to_pt(baseline_mm), font, size_pt, text);
}

fn draw_cell<W: Write>(
    doc: &mut PdfDocument<W>,
    x_mm: f64,
    y_mm: f64,
    w_mm: f64,
    h_mm: f64,
    text: &str,
    font: Font,
    size_pt: f64,
    align: Align,
    fill: Option<Color>,
) {
    cell_box(doc, x_mm, y_mm, w_mm, h_mm, fill, RULE_WIDTH_MM);
    cell_text(doc, x_mm, y_mm, w_mm, h_mm, text, font, size_pt, align);
}

/// Draw the shaded bold header row and advance the cursor past it.
fn draw_header_row<W: Write>(
    doc: &mut PdfDocument<W>,
    cursor: &mut PageCursor,
    spec: &TableSpec,
    base_pt: f64,
) {
    let row_h = line_height_mm(base_pt);
    let mut x = LEFT_MARGIN_MM;
    for (caption, &w) in spec.headers.iter().zip(&spec.col_widths_mm) {
        let size = fitted_size(caption, Font::HelveticaBold, base_pt, w);
        draw_cell(
            doc,
            x,
            cursor.y_mm(),
            w,
            row_h,
            caption,
            Font::HelveticaBold,
            size,
            Align::Center,
            Some(header_fill()),
        );
        x += w;
    }
    cursor.advance(row_h);
}

/// Start a fresh page mid-table: plain top margin, header redrawn.
fn start_table_page<W: Write>(
    doc: &mut PdfDocument<W>,
    cursor: &mut PageCursor,
    spec: &TableSpec,
    base_pt: f64,
) -> io::Result<()> {
    doc.begin_page(PAGE_WIDTH_PT, PAGE_HEIGHT_PT)?;
    cursor.turn_page();
    draw_header_row(doc, cursor, spec, base_pt);
    Ok(())
}

/// Render a table of single-line rows.
///
/// Rows alternate a light background fill, and the alternation state is
/// deliberately not reset on page breaks. A cell whose text overflows its
/// column is shrunk per [`fitted_size`]; the row height never changes.
pub fn render_table<W: Write>(
    doc: &mut PdfDocument<W>,
    cursor: &mut PageCursor,
    spec: &TableSpec,
    rows: &[Vec<String>],
    base_pt: f64,
) -> io::Result<()> {
    let row_h = line_height_mm(base_pt);
    draw_header_row(doc, cursor, spec, base_pt);

    let mut fill = true;
    for row in rows {
        if !cursor.fits(row_h) {
            start_table_page(doc, cursor, spec, base_pt)?;
        }
        let bg = fill.then(body_fill);
        let mut x = LEFT_MARGIN_MM;
        for ((text, &w), &align) in row.iter().zip(&spec.col_widths_mm).zip(&spec.aligns) {
            let size = fitted_size(text, Font::Helvetica, base_pt, w);
            draw_cell(
                doc,
                x,
                cursor.y_mm(),
                w,
                row_h,
                text,
                Font::Helvetica,
                size,
                align,
                bg,
            );
            x += w;
        }
        cursor.advance(row_h);
        fill = !fill;
    }
    Ok(())
}

/// One service row, already formatted for display. Column order is
/// date, description, hours, rate, amount.
#[derive(Debug, Clone)]
pub struct ServiceRow {
    pub date: String,
    pub description: String,
    pub hours: String,
    pub rate: String,
    pub amount: String,
}

/// Render the services table, wrapping descriptions and splitting rows
/// across page boundaries when their wrapped lines do not all fit.
///
/// Each pass of the inner loop draws one chunk: as many description lines
/// as the page has room for, never fewer than one. All five cell borders
/// are drawn at the chunk height before any text. The single-line columns
/// are placed on the first chunk only; continuation chunks keep the bordered
/// cells blank so a split row reads as one row. The background fill
/// alternates once per logical row, not per chunk.
pub fn render_service_table<W: Write>(
    doc: &mut PdfDocument<W>,
    cursor: &mut PageCursor,
    spec: &TableSpec,
    rows: &[ServiceRow],
    base_pt: f64,
) -> io::Result<()> {
    let line_h = line_height_mm(base_pt);
    let min_chunk_h = 2.0 * CELL_PAD_MM + line_h;
    let desc_w = spec.col_widths_mm[1];
    let inner_w = desc_w - 2.0 * CELL_PAD_MM;

    draw_header_row(doc, cursor, spec, base_pt);

    let mut fill = true;
    for row in rows {
        let lines = wrap(&row.description, inner_w, |s| {
            FontMetrics::text_width_mm(s, Font::Helvetica, base_pt)
        });

        let mut start_index = 0;
        let mut first_chunk = true;
        while start_index < lines.len() {
            if !cursor.fits(min_chunk_h) {
                start_table_page(doc, cursor, spec, base_pt)?;
            }
            let room = cursor.remaining_mm() - 2.0 * CELL_PAD_MM;
            let k = ((room / line_h).floor() as usize)
                .max(1)
                .min(lines.len() - start_index);
            let chunk_h = 2.0 * CELL_PAD_MM + k as f64 * line_h;
            let y = cursor.y_mm();

            // Borders first, full chunk height, so text never interrupts them.
            let bg = fill.then(body_fill);
            let mut x = LEFT_MARGIN_MM;
            for &w in &spec.col_widths_mm {
                cell_box(doc, x, y, w, chunk_h, bg, RULE_WIDTH_MM);
                x += w;
            }

            if first_chunk {
                let singles = [
                    (0, &row.date),
                    (2, &row.hours),
                    (3, &row.rate),
                    (4, &row.amount),
                ];
                for (col, text) in singles {
                    let x: f64 = spec.col_widths_mm[..col].iter().sum();
                    let w = spec.col_widths_mm[col];
                    let size = fitted_size(text, Font::Helvetica, base_pt, w);
                    cell_text(
                        doc,
                        LEFT_MARGIN_MM + x,
                        y,
                        w,
                        chunk_h,
                        text,
                        Font::Helvetica,
                        size,
                        spec.aligns[col],
                    );
                }
            }

            let desc_x = LEFT_MARGIN_MM + spec.col_widths_mm[0] + CELL_PAD_MM;
            for (j, line) in lines[start_index..start_index + k].iter().enumerate() {
                let baseline_mm =
                    y + CELL_PAD_MM + (j as f64 + 0.5) * line_h + 0.3 * pt_to_mm(base_pt);
                doc.text(
                    mm_to_pt(desc_x),
                    y_to_pt(baseline_mm),
                    Font::Helvetica,
                    base_pt,
                    line,
                );
            }

            cursor.advance(chunk_h);
            start_index += k;
            first_chunk = false;
        }
        fill = !fill;
    }
    Ok(())
}
