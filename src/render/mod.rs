//! Turns an assembled [`InvoiceDocument`] into PDF bytes and persists them.
//!
//! The font probe decides the backend: a loadable system font goes through
//! the genpdf layout in [`layout`], otherwise [`builtin`] places the blocks
//! with printpdf's Helvetica. Either way the whole PDF is produced in memory
//! before the output path is touched.

pub mod builtin;
pub mod layout;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::RenderError;
use crate::fonts;
use crate::model::InvoiceDocument;

/// Renders the document with the best available font.
pub fn render_document(document: &InvoiceDocument) -> Result<Vec<u8>, RenderError> {
    match fonts::load_probed_family() {
        Some(family) => layout::render(document, family),
        None => builtin::render(document),
    }
}

/// Renders the document and writes it to `path`, replacing any existing
/// file.
pub fn render_to_file(document: &InvoiceDocument, path: &Path) -> Result<(), RenderError> {
    let bytes = render_document(document)?;
    write_atomically(path, &bytes)
}

/// Writes `bytes` to a temporary sibling of `path` and renames it into
/// place, so `path` ends up either complete or untouched.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let write_error = |source: io::Error| RenderError::Write {
        path: path.to_path_buf(),
        source,
    };

    let temporary = temporary_sibling(path).ok_or_else(|| {
        write_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "output path has no file name",
        ))
    })?;

    if let Err(err) = fs::write(&temporary, bytes) {
        let _ = fs::remove_file(&temporary);
        return Err(write_error(err));
    }
    if let Err(err) = fs::rename(&temporary, path) {
        let _ = fs::remove_file(&temporary);
        return Err(write_error(err));
    }

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn temporary_sibling(path: &Path) -> Option<PathBuf> {
    let file_name = path.file_name()?;
    let mut temporary_name = std::ffi::OsString::from(".");
    temporary_name.push(file_name);
    temporary_name.push(format!(".{}.tmp", std::process::id()));
    Some(path.with_file_name(temporary_name))
}
