//! Page geometry and unit conversion.
//!
//! Layout math runs in millimetres measured from the top of the page (the
//! convention the invoice layout was designed in); the document layer takes
//! points with a bottom-left origin. `y_to_pt` bridges the two.

/// US Letter, 612 x 792 pt.
pub const PAGE_WIDTH_PT: f64 = 612.0;
pub const PAGE_HEIGHT_PT: f64 = 792.0;
pub const PAGE_WIDTH_MM: f64 = 215.9;
pub const PAGE_HEIGHT_MM: f64 = 279.4;

pub const LEFT_MARGIN_MM: f64 = 15.0;
/// Plain top margin used on pages after the first.
pub const TOP_MARGIN_MM: f64 = 20.0;
/// Safety margin at the bottom of every page.
pub const BOTTOM_MARGIN_MM: f64 = 5.0;

pub const MAX_FONT_PT: f64 = 14.0;
pub const MIN_FONT_PT: f64 = 10.0;

/// Default reserved letterhead band on page 1, in inches.
pub const DEFAULT_LETTERHEAD_IN: f64 = 2.5;

pub fn mm_from_inches(inches: f64) -> f64 {
    inches * 25.4
}

pub fn mm_to_pt(mm: f64) -> f64 {
    mm * 72.0 / 25.4
}

pub fn pt_to_mm(pt: f64) -> f64 {
    pt * 25.4 / 72.0
}

/// Height of one text line in millimetres for a font size in points.
pub fn line_height_mm(font_size_pt: f64) -> f64 {
    font_size_pt * 0.35
}

/// Vertical content start for a page: the letterhead band on page 1,
/// the plain top margin on every page after it. `page` is zero-based.
pub fn top_offset_mm(page: usize, letterhead_in: f64) -> f64 {
    if page == 0 {
        mm_from_inches(letterhead_in)
    } else {
        TOP_MARGIN_MM
    }
}

/// Convert a y position in millimetres from the page top to a PDF
/// y coordinate in points from the page bottom.
pub fn y_to_pt(y_mm: f64) -> f64 {
    mm_to_pt(PAGE_HEIGHT_MM - y_mm)
}

/// Typed drawing cursor: current page index and y position (mm from the
/// page top). All page-fit checks are pure functions over it.
#[derive(Debug, Clone)]
pub struct PageCursor {
    page: usize,
    y_mm: f64,
    letterhead_in: f64,
}

impl PageCursor {
    /// Cursor at the top of page 1, below the letterhead band.
    pub fn new(letterhead_in: f64) -> Self {
        PageCursor {
            page: 0,
            y_mm: top_offset_mm(0, letterhead_in),
            letterhead_in,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn y_mm(&self) -> f64 {
        self.y_mm
    }

    /// Lowest y a row may extend to (page height minus bottom margin).
    pub fn limit_mm(&self) -> f64 {
        PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM
    }

    /// Vertical space left on the current page.
    pub fn remaining_mm(&self) -> f64 {
        self.limit_mm() - self.y_mm
    }

    /// Whether a block of the given height fits on the current page.
    pub fn fits(&self, height_mm: f64) -> bool {
        self.y_mm + height_mm <= self.limit_mm()
    }

    /// Move the cursor down by `height_mm`.
    pub fn advance(&mut self, height_mm: f64) {
        self.y_mm += height_mm;
    }

    /// Move to the top of the next page (plain top margin, no letterhead).
    pub fn turn_page(&mut self) {
        self.page += 1;
        self.y_mm = top_offset_mm(self.page, self.letterhead_in);
    }
}
