//! Error types surfaced by the invoice pipeline.
//!
//! Only two classes of failure exist: the invoice could not be read from its
//! source ([`InputError`]) or the PDF could not be produced ([`RenderError`]).
//! Malformed numeric fields are not errors; they are coerced while the input
//! is resolved.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading and parsing the invoice document.
#[derive(Debug, Error)]
pub enum InputError {
    /// The input stream could not be read to the end.
    #[error("{0}")]
    Read(#[source] io::Error),
    /// The input was not valid JSON.
    #[error("{0}")]
    Parse(#[source] serde_json::Error),
    /// The JSON document was valid but not an object.
    #[error("expected a JSON object at the top level, found {found}")]
    NotAnObject {
        /// JSON type name of the value that was found instead.
        found: &'static str,
    },
}

/// Failures while laying out or writing the PDF.
#[derive(Debug, Error)]
pub enum RenderError {
    /// genpdf rejected the document or failed while rendering it.
    #[error("{0}")]
    Layout(#[source] genpdf::error::Error),
    /// printpdf failed while producing the built-in font variant.
    #[error("{0}")]
    Builtin(String),
    /// The rendered bytes could not be persisted.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        /// Target path of the failed write.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

impl From<genpdf::error::Error> for RenderError {
    fn from(err: genpdf::error::Error) -> Self {
        Self::Layout(err)
    }
}

/// Top-level error returned by [`crate::convert`].
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// See [`InputError`].
    #[error("Could not read JSON from stdin: {0}")]
    Input(#[from] InputError),
    /// See [`RenderError`].
    #[error("Failed to generate PDF: {0}")]
    Render(#[from] RenderError),
}
