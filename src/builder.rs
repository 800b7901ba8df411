//! genpdf document construction for the invoice layout.

use genpdf::error::Error;
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style;
use genpdf::{self, Margins, PageDecorator, PaperSize, Size};

/// Page margins on every side, in millimetres.
pub const PAGE_MARGIN_MM: i32 = 18;
/// Base font size of body text, in points.
pub const BODY_FONT_SIZE: u8 = 11;

/// Builder for `genpdf::Document` instances pre-configured for invoices.
pub struct DocumentBuilder {
    font_family: FontFamily<FontData>,
    title: Option<String>,
    paper_size: Size,
    margins: Margins,
    font_size: u8,
}

impl DocumentBuilder {
    /// Creates a builder for A4 pages with the default invoice margins.
    pub fn new(font_family: FontFamily<FontData>) -> Self {
        Self {
            font_family,
            title: None,
            paper_size: PaperSize::A4.into(),
            margins: Margins::all(PAGE_MARGIN_MM),
            font_size: BODY_FONT_SIZE,
        }
    }

    /// Sets the title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builds a fully configured `genpdf::Document` instance.
    pub fn build(self) -> genpdf::Document {
        let mut document = genpdf::Document::new(self.font_family);
        if let Some(title) = self.title {
            document.set_title(title);
        }
        document.set_paper_size(self.paper_size);
        document.set_font_size(self.font_size);
        document.set_page_decorator(MarginDecorator::new(self.margins));
        document
    }
}

/// Page decorator that only insets every page by fixed margins.
struct MarginDecorator {
    page: usize,
    margins: Margins,
}

impl MarginDecorator {
    fn new(margins: Margins) -> Self {
        Self { page: 0, margins }
    }
}

impl PageDecorator for MarginDecorator {
    fn decorate_page<'a>(
        &mut self,
        _context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        _style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.page += 1;
        log::debug!("Laying out page {}", self.page);
        area.add_margins(self.margins);
        Ok(area)
    }
}
