//! Font discovery for the invoice renderer.
//!
//! A fixed, ordered list of system font files is probed for one with broad
//! glyph coverage. The lookup itself ([`probe`]) is pure and takes the
//! existence check as a parameter; only [`load_probed_family`] touches the
//! file system. Nothing here fails the run: when no candidate can be loaded
//! the renderer switches to the built-in Helvetica typeface.

use std::path::{Path, PathBuf};

use genpdf::error::Error;
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

/// Logical name the probed family is reported under in the logs.
///
/// genpdf identifies a `FontFamily` by value and keeps no name for it, so
/// this label only ties log lines to whichever candidate was loaded.
pub const FONT_FAMILY_NAME: &str = "InvoiceFont";

/// A system font file, optionally paired with its bold face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontCandidate {
    pub regular: &'static str,
    pub bold: Option<&'static str>,
}

/// Probe order: macOS Arial, then the common Linux sans families.
pub const FONT_CANDIDATES: &[FontCandidate] = &[
    FontCandidate {
        regular: "/System/Library/Fonts/Supplemental/Arial.ttf",
        bold: Some("/System/Library/Fonts/Supplemental/Arial Bold.ttf"),
    },
    FontCandidate {
        regular: "/Library/Fonts/Arial.ttf",
        bold: Some("/Library/Fonts/Arial Bold.ttf"),
    },
    FontCandidate {
        regular: "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        bold: Some("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
    },
    FontCandidate {
        regular: "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        bold: Some("/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf"),
    },
];

/// Result of the font probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontChoice {
    /// A system font file was found.
    System {
        regular: PathBuf,
        bold: Option<PathBuf>,
    },
    /// No candidate exists; use the built-in Helvetica typeface.
    Builtin,
}

/// Returns the first candidate whose regular face exists.
///
/// The bold face is only reported when it exists as well.
pub fn probe<F>(candidates: &[FontCandidate], exists: F) -> FontChoice
where
    F: Fn(&Path) -> bool,
{
    candidates
        .iter()
        .find(|candidate| exists(Path::new(candidate.regular)))
        .map(|candidate| FontChoice::System {
            regular: PathBuf::from(candidate.regular),
            bold: candidate
                .bold
                .map(Path::new)
                .filter(|bold| exists(bold))
                .map(Path::to_path_buf),
        })
        .unwrap_or(FontChoice::Builtin)
}

/// Loads a family from a single regular face and an optional bold face.
///
/// Italic faces reuse the upright ones; a missing bold face reuses the
/// regular face.
pub fn load_family(regular: &Path, bold: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    let regular = FontData::load(regular, None)?;
    let bold = match bold {
        Some(path) => match FontData::load(path, None) {
            Ok(data) => data,
            Err(err) => {
                warn!(
                    "Bold face {} unusable ({}); reusing the regular face.",
                    path.display(),
                    err
                );
                regular.clone()
            }
        },
        None => regular.clone(),
    };

    Ok(FontFamily {
        regular: regular.clone(),
        bold: bold.clone(),
        italic: regular,
        bold_italic: bold,
    })
}

/// Walks [`FONT_CANDIDATES`] and returns the first family that loads.
///
/// A candidate that exists but cannot be parsed is logged and skipped.
/// `None` means the built-in typeface should be used.
pub fn load_probed_family() -> Option<FontFamily<FontData>> {
    let mut remaining = FONT_CANDIDATES;
    while !remaining.is_empty() {
        let FontChoice::System { regular, bold } = probe(remaining, Path::is_file) else {
            break;
        };

        match load_family(&regular, bold.as_deref()) {
            Ok(family) => {
                debug!(
                    "Using '{}' family from {}",
                    FONT_FAMILY_NAME,
                    regular.display()
                );
                return Some(family);
            }
            Err(err) => warn!(
                "Font candidate {} exists but failed to load: {}",
                regular.display(),
                err
            ),
        }

        let position = remaining
            .iter()
            .position(|candidate| Path::new(candidate.regular) == regular)
            .map_or(remaining.len(), |index| index + 1);
        remaining = &remaining[position..];
    }

    debug!("No system font candidate available; using built-in Helvetica");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANDIDATES: &[FontCandidate] = &[
        FontCandidate {
            regular: "/a/Regular.ttf",
            bold: Some("/a/Bold.ttf"),
        },
        FontCandidate {
            regular: "/b/Regular.ttf",
            bold: Some("/b/Bold.ttf"),
        },
        FontCandidate {
            regular: "/c/Regular.ttf",
            bold: None,
        },
    ];

    #[test]
    fn picks_first_existing_candidate() {
        let choice = probe(CANDIDATES, |path| path.starts_with("/b") || path.starts_with("/c"));

        assert_eq!(
            choice,
            FontChoice::System {
                regular: PathBuf::from("/b/Regular.ttf"),
                bold: Some(PathBuf::from("/b/Bold.ttf")),
            }
        );
    }

    #[test]
    fn omits_missing_bold_face() {
        let choice = probe(CANDIDATES, |path| path == Path::new("/a/Regular.ttf"));

        assert_eq!(
            choice,
            FontChoice::System {
                regular: PathBuf::from("/a/Regular.ttf"),
                bold: None,
            }
        );
    }

    #[test]
    fn falls_back_to_builtin_when_nothing_exists() {
        assert_eq!(probe(CANDIDATES, |_| false), FontChoice::Builtin);
        assert_eq!(probe(&[], |_| true), FontChoice::Builtin);
    }

    #[test]
    fn bold_alone_does_not_select_a_candidate() {
        let choice = probe(CANDIDATES, |path| path.ends_with("Bold.ttf"));
        assert_eq!(choice, FontChoice::Builtin);
    }

    #[test]
    fn loading_a_missing_file_is_an_error() {
        assert!(load_family(Path::new("/__invoice_pdf_missing__/font.ttf"), None).is_err());
    }
}
