//! Converts a JSON-described invoice into an A4 PDF.
//!
//! The pipeline has four stages: [`input`] resolves the raw JSON with its
//! defaults, [`compute`] derives line items and totals, [`model`] assembles
//! the presentation blocks and [`render`] lays them out and writes the file.

pub mod builder;
pub mod compute;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod input;
pub mod model;
pub mod render;

use std::io::Read;
use std::path::Path;

pub use compute::{compute, format_money, InvoiceSummary};
pub use error::{InputError, InvoiceError, RenderError};
pub use input::InvoiceInput;
pub use model::InvoiceDocument;

/// Reads an invoice from `reader` and writes its PDF to `output`.
///
/// Nothing is written when the input cannot be parsed; an existing file at
/// `output` is replaced only once the PDF is complete.
pub fn convert<R: Read>(reader: R, output: &Path) -> Result<(), InvoiceError> {
    let input = InvoiceInput::from_reader(reader)?;
    let summary = compute(&input);
    let document = InvoiceDocument::assemble(&input, &summary);
    render::render_to_file(&document, output)?;
    Ok(())
}
