//! Invoice PDF engine: a measurement-driven table layout and pagination
//! core plus the invoice data model, settings store, and export helpers
//! that sit on top of it.

pub mod document;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod invoice;
pub mod naming;
pub mod objects;
pub mod render;
pub mod settings;
pub mod tables;
pub mod wrap;
pub mod writer;

pub use document::{Color, PdfDocument};
pub use error::{InvoiceError, Result};
pub use invoice::{CostItem, Invoice, ServiceItem};
pub use render::{export_invoice, render_invoice, RenderOptions};
pub use settings::Settings;
