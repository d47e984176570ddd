use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::fonts::Font;
use crate::objects::{ObjId, PdfObject};
use crate::writer::{escape_pdf_string, PdfWriter};

const CATALOG_OBJ: ObjId = ObjId(1, 0);
const PAGES_OBJ: ObjId = ObjId(2, 0);
const FONT_HELV_OBJ: ObjId = ObjId(3, 0);
const FONT_HELV_BOLD_OBJ: ObjId = ObjId(4, 0);
const FIRST_PAGE_OBJ_NUM: u32 = 5;

/// RGB color for PDF graphics operations, each component 0.0 to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    /// Convenience for 0–255 component values.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Color {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    pub fn black() -> Self {
        Color::rgb(0.0, 0.0, 0.0)
    }
}

/// High-level API for building PDF documents.
///
/// Generic over `Write` so it works with files (`BufWriter<File>`),
/// in-memory buffers (`Vec<u8>`), or any other writer.
///
/// Pages are written incrementally: `end_page()` flushes page data to the
/// writer and frees page content from memory, keeping memory flat even for
/// invoices spanning many pages.
pub struct PdfDocument<W: Write> {
    writer: PdfWriter<W>,
    info: Vec<(String, String)>,
    page_obj_ids: Vec<ObjId>,
    current_page: Option<PageBuilder>,
    next_obj_num: u32,
    compress: bool,
}

struct PageBuilder {
    width: f64,
    height: f64,
    content_ops: Vec<u8>,
}

impl PdfDocument<BufWriter<File>> {
    /// Create a new PDF document that writes to a file.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> PdfDocument<W> {
    /// Create a new PDF document that writes to the given writer.
    /// Writes the PDF header and the shared font objects immediately.
    pub fn new(writer: W) -> io::Result<Self> {
        let mut pdf_writer = PdfWriter::new(writer);
        pdf_writer.write_header()?;

        for (id, font) in [
            (FONT_HELV_OBJ, Font::Helvetica),
            (FONT_HELV_BOLD_OBJ, Font::HelveticaBold),
        ] {
            let obj = PdfObject::dict(vec![
                ("Type", PdfObject::name("Font")),
                ("Subtype", PdfObject::name("Type1")),
                ("BaseFont", PdfObject::name(font.pdf_base_name())),
            ]);
            pdf_writer.write_object(id, &obj)?;
        }

        Ok(PdfDocument {
            writer: pdf_writer,
            info: Vec::new(),
            page_obj_ids: Vec::new(),
            current_page: None,
            next_obj_num: FIRST_PAGE_OBJ_NUM,
            compress: false,
        })
    }

    /// Set a document info entry (e.g. "Creator", "Title").
    pub fn set_info(&mut self, key: &str, value: &str) -> &mut Self {
        self.info.push((key.to_string(), value.to_string()));
        self
    }

    /// Enable or disable FlateDecode compression of page content streams.
    pub fn set_compression(&mut self, enabled: bool) -> &mut Self {
        self.compress = enabled;
        self
    }

    /// Begin a new page with the given dimensions in points.
    /// If a page is currently open, it is closed first.
    pub fn begin_page(&mut self, width: f64, height: f64) -> io::Result<()> {
        if self.current_page.is_some() {
            self.end_page()?;
        }
        self.current_page = Some(PageBuilder {
            width,
            height,
            content_ops: Vec::new(),
        });
        Ok(())
    }

    /// Number of pages started so far, including the currently open one.
    pub fn page_count(&self) -> usize {
        self.page_obj_ids.len() + usize::from(self.current_page.is_some())
    }

    fn page_mut(&mut self) -> &mut PageBuilder {
        self.current_page
            .as_mut()
            .expect("content op with no open page")
    }

    /// Fill a rectangle. Coordinates in points, bottom-left origin;
    /// (x, y) is the lower-left corner.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        let ops = format!(
            "q\n{} {} {} rg\n{} {} {} {} re\nf\nQ\n",
            format_coord(color.r),
            format_coord(color.g),
            format_coord(color.b),
            format_coord(x),
            format_coord(y),
            format_coord(w),
            format_coord(h),
        );
        self.page_mut().content_ops.extend_from_slice(ops.as_bytes());
    }

    /// Stroke a rectangle outline.
    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color, line_width: f64) {
        let ops = format!(
            "q\n{} {} {} RG\n{} w\n{} {} {} {} re\nS\nQ\n",
            format_coord(color.r),
            format_coord(color.g),
            format_coord(color.b),
            format_coord(line_width),
            format_coord(x),
            format_coord(y),
            format_coord(w),
            format_coord(h),
        );
        self.page_mut().content_ops.extend_from_slice(ops.as_bytes());
    }

    /// Stroke a straight line from (x1, y1) to (x2, y2).
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Color, line_width: f64) {
        let ops = format!(
            "q\n{} {} {} RG\n{} w\n{} {} m\n{} {} l\nS\nQ\n",
            format_coord(color.r),
            format_coord(color.g),
            format_coord(color.b),
            format_coord(line_width),
            format_coord(x1),
            format_coord(y1),
            format_coord(x2),
            format_coord(y2),
        );
        self.page_mut().content_ops.extend_from_slice(ops.as_bytes());
    }

    /// Place a single line of text with its baseline at (x, y) in points.
    ///
    /// The fill color is always set explicitly inside the BT block;
    /// otherwise the color left over from background drawing would bleed
    /// into the glyphs and make text invisible on filled cells.
    pub fn text(&mut self, x: f64, y: f64, font: Font, font_size: f64, s: &str) {
        if s.is_empty() {
            return;
        }
        let ops = format!(
            "BT\n0 0 0 rg\n/{} {} Tf\n{} {} Td\n({}) Tj\nET\n",
            font.pdf_name(),
            format_coord(font_size),
            format_coord(x),
            format_coord(y),
            escape_pdf_string(s),
        );
        self.page_mut().content_ops.extend_from_slice(ops.as_bytes());
    }

    /// End the current page. Writes page objects to the writer and frees
    /// page content from memory.
    pub fn end_page(&mut self) -> io::Result<()> {
        let page = self
            .current_page
            .take()
            .expect("end_page called with no open page");

        let content_id = ObjId(self.next_obj_num, 0);
        self.next_obj_num += 1;
        let page_id = ObjId(self.next_obj_num, 0);
        self.next_obj_num += 1;

        let content_stream = if self.compress {
            let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
            enc.write_all(&page.content_ops)?;
            let compressed = enc.finish()?;
            PdfObject::stream(
                vec![("Filter", PdfObject::name("FlateDecode"))],
                compressed,
            )
        } else {
            PdfObject::stream(vec![], page.content_ops)
        };
        self.writer.write_object(content_id, &content_stream)?;

        let page_dict = PdfObject::dict(vec![
            ("Type", PdfObject::name("Page")),
            ("Parent", PdfObject::Reference(PAGES_OBJ)),
            (
                "MediaBox",
                PdfObject::array(vec![
                    PdfObject::Integer(0),
                    PdfObject::Integer(0),
                    PdfObject::Real(page.width),
                    PdfObject::Real(page.height),
                ]),
            ),
            ("Contents", PdfObject::Reference(content_id)),
            (
                "Resources",
                PdfObject::dict(vec![(
                    "Font",
                    PdfObject::dict(vec![
                        ("F1", PdfObject::Reference(FONT_HELV_OBJ)),
                        ("F2", PdfObject::Reference(FONT_HELV_BOLD_OBJ)),
                    ]),
                )]),
            ),
        ]);
        self.writer.write_object(page_id, &page_dict)?;

        self.page_obj_ids.push(page_id);
        Ok(())
    }

    /// Finish the document. Writes the catalog, pages tree, info
    /// dictionary, xref table, and trailer. Consumes self.
    pub fn end_document(mut self) -> io::Result<W> {
        if self.current_page.is_some() {
            self.end_page()?;
        }

        let info_id = if !self.info.is_empty() {
            let id = ObjId(self.next_obj_num, 0);
            self.next_obj_num += 1;
            let entries: Vec<(&str, PdfObject)> = self
                .info
                .iter()
                .map(|(k, v)| (k.as_str(), PdfObject::literal_string(v)))
                .collect();
            self.writer.write_object(id, &PdfObject::dict(entries))?;
            Some(id)
        } else {
            None
        };

        let kids: Vec<PdfObject> = self
            .page_obj_ids
            .iter()
            .map(|id| PdfObject::Reference(*id))
            .collect();
        let page_count = self.page_obj_ids.len() as i64;
        let pages = PdfObject::dict(vec![
            ("Type", PdfObject::name("Pages")),
            ("Kids", PdfObject::Array(kids)),
            ("Count", PdfObject::Integer(page_count)),
        ]);
        self.writer.write_object(PAGES_OBJ, &pages)?;

        let catalog = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::Reference(PAGES_OBJ)),
        ]);
        self.writer.write_object(CATALOG_OBJ, &catalog)?;

        self.writer.write_xref_and_trailer(CATALOG_OBJ, info_id)?;

        Ok(self.writer.into_inner())
    }
}

/// Format a coordinate value for PDF content streams.
pub(crate) fn format_coord(v: f64) -> String {
    if v == v.floor() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.4}", v);
        let s = s.trim_end_matches('0');
        let s = s.trim_end_matches('.');
        s.to_string()
    }
}
