//! Fallback layout through printpdf's built-in Helvetica, used when no
//! system font could be loaded.
//!
//! genpdf needs TrueType metrics for every font, so this path places the
//! blocks itself. Text widths come from the standard Helvetica advance
//! widths, which is enough for right alignment and word wrapping. Built-in
//! fonts only cover WinAnsi; other characters are printed as `?`.

use std::io::BufWriter;
use std::ops::Range;

use log::debug;
use printpdf::{
    BuiltinFont, Color, Greyscale, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};

use crate::error::RenderError;
use crate::model::{
    Block, HorizontalAlignment, InvoiceDocument, ItemTable, MetaField, PartyColumn, TotalsRow,
    ITEM_COLUMN_ALIGNMENT, ITEM_COLUMN_WEIGHTS,
};

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 18.0;
const CONTENT_WIDTH_MM: f64 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
const USABLE_HEIGHT_MM: f64 = PAGE_HEIGHT_MM - 2.0 * MARGIN_MM;
const PT_TO_MM: f64 = 0.352_778;
const LINE_SPACING: f64 = 1.25;
const CELL_PADDING_MM: f64 = 1.5;
const GRID_THICKNESS_PT: f64 = 0.5;
const GRID_GREY: f64 = 0.5;
const HEADER_GREY: f64 = 0.83;

const TITLE_SIZE: f64 = 16.0;
const HEADING_SIZE: f64 = 12.0;
const BODY_SIZE: f64 = 11.0;
const TABLE_SIZE: f64 = 10.0;

const TOTALS_LABEL_WIDTH_MM: f64 = 60.0;
const TOTALS_VALUE_WIDTH_MM: f64 = 40.0;
const META_SEPARATOR: &str = "    ";
const LAYER_NAME: &str = "Invoice";

/// Helvetica advance widths for `' '..='~'`, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

// Helvetica-Bold runs about 8% wider than the regular face.
const BOLD_WIDTH_FACTOR: f64 = 1.08;

/// Width of `text` in millimetres at `size` points.
pub(crate) fn text_width(text: &str, size: f64, bold: bool) -> f64 {
    let units: u32 = text
        .chars()
        .map(|ch| match ch {
            ' '..='~' => u32::from(HELVETICA_WIDTHS[ch as usize - ' ' as usize]),
            _ => u32::from(HELVETICA_WIDTHS['?' as usize - ' ' as usize]),
        })
        .sum();
    let factor = if bold { BOLD_WIDTH_FACTOR } else { 1.0 };
    f64::from(units) / 1000.0 * size * PT_TO_MM * factor
}

/// Splits `text` into lines no wider than `max_width` millimetres.
///
/// Words longer than a full line are broken between characters. An empty
/// input yields a single empty line.
pub(crate) fn wrap(text: &str, max_width: f64, size: f64, bold: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_owned()
        } else {
            format!("{} {}", current, word)
        };
        if text_width(&candidate, size, bold) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        for ch in word.chars() {
            current.push(ch);
            if text_width(&current, size, bold) > max_width && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::replace(&mut current, ch.to_string()));
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn winansi_safe(text: &str) -> String {
    text.chars()
        .map(|ch| if matches!(ch, ' '..='~') { ch } else { '?' })
        .collect()
}

fn line_height(size: f64) -> f64 {
    size * LINE_SPACING * PT_TO_MM
}

/// Lays out the document with Helvetica and returns the PDF bytes.
pub fn render(document: &InvoiceDocument) -> Result<Vec<u8>, RenderError> {
    let mut page = PageWriter::new(document.title())?;
    for block in document.blocks() {
        page.block(block);
    }
    let bytes = page.finish()?;
    debug!("built-in layout produced {} bytes", bytes.len());
    Ok(bytes)
}

/// Cursor over the pages of a printpdf document; `y` is the top of the free
/// space, measured from the bottom edge.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f64,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, RenderError> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            LAYER_NAME,
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|err| RenderError::Builtin(err.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|err| RenderError::Builtin(err.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);

        let writer = Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        };
        writer.prepare_layer();
        Ok(writer)
    }

    fn prepare_layer(&self) {
        self.layer
            .set_outline_color(Color::Greyscale(Greyscale::new(GRID_GREY, None)));
        self.layer.set_outline_thickness(GRID_THICKNESS_PT);
    }

    fn finish(self) -> Result<Vec<u8>, RenderError> {
        let mut writer = BufWriter::new(Vec::new());
        self.doc
            .save(&mut writer)
            .map_err(|err| RenderError::Builtin(err.to_string()))?;
        writer
            .into_inner()
            .map_err(|err| RenderError::Builtin(err.to_string()))
    }

    /// Starts a new page unless `height` still fits above the bottom margin.
    fn ensure_space(&mut self, height: f64) {
        if self.y - height >= MARGIN_MM || self.y >= PAGE_HEIGHT_MM - MARGIN_MM {
            return;
        }
        self.new_page();
    }

    /// Moves a block of `height` to a fresh page when it would fit there
    /// whole but not in the space left on this one.
    fn keep_together(&mut self, height: f64) {
        if height <= USABLE_HEIGHT_MM {
            self.ensure_space(height);
        }
    }

    /// Number of `line`-high lines that fit above the bottom margin once
    /// `overhead` is reserved.
    fn lines_that_fit(&self, line: f64, overhead: f64) -> usize {
        let free = self.y - MARGIN_MM - overhead;
        // Tolerate rounding when the space is an exact multiple of `line`.
        ((free / line) + 1e-9).floor().max(0.0) as usize
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.prepare_layer();
        self.y = PAGE_HEIGHT_MM - MARGIN_MM;
    }

    fn font(&self, bold: bool) -> &IndirectFontRef {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }

    /// Prints one line with its top edge at `top`.
    fn text(&self, text: &str, x: f64, top: f64, size: f64, bold: bool) {
        let baseline = top - size * PT_TO_MM;
        self.layer.use_text(
            winansi_safe(text),
            size,
            Mm(x),
            Mm(baseline),
            self.font(bold),
        );
    }

    /// Prints one line aligned within `[x, x + width]`.
    #[allow(clippy::too_many_arguments)]
    fn aligned_text(
        &self,
        text: &str,
        x: f64,
        width: f64,
        top: f64,
        size: f64,
        bold: bool,
        alignment: HorizontalAlignment,
    ) {
        let free = (width - text_width(text, size, bold)).max(0.0);
        let offset = match alignment {
            HorizontalAlignment::Left => 0.0,
            HorizontalAlignment::Center => free / 2.0,
            HorizontalAlignment::Right => free,
        };
        self.text(text, x + offset, top, size, bold);
    }

    fn stroke(&self, points: &[(f64, f64)]) {
        self.layer.add_shape(Line {
            points: points
                .iter()
                .map(|&(x, y)| (Point::new(Mm(x), Mm(y)), false))
                .collect(),
            is_closed: false,
            has_fill: false,
            has_stroke: true,
            is_clipping_path: false,
        });
    }

    fn fill_rect(&self, x: f64, top: f64, width: f64, height: f64, grey: f64) {
        self.layer
            .set_fill_color(Color::Greyscale(Greyscale::new(grey, None)));
        self.layer.add_shape(Line {
            points: vec![
                (Point::new(Mm(x), Mm(top)), false),
                (Point::new(Mm(x + width), Mm(top)), false),
                (Point::new(Mm(x + width), Mm(top - height)), false),
                (Point::new(Mm(x), Mm(top - height)), false),
            ],
            is_closed: true,
            has_fill: true,
            has_stroke: false,
            is_clipping_path: false,
        });
        self.layer
            .set_fill_color(Color::Greyscale(Greyscale::new(0.0, None)));
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Title(title) => self.paragraph(title, TITLE_SIZE, true),
            Block::Metadata(fields) => {
                let line = fields
                    .iter()
                    .map(MetaField::text)
                    .collect::<Vec<_>>()
                    .join(META_SEPARATOR);
                self.paragraph(&line, BODY_SIZE, false);
            }
            Block::Parties { seller, buyer } => self.parties(seller, buyer),
            Block::Items(table) => self.items(table),
            Block::Totals(rows) => self.totals(rows),
            Block::Spacer(points) => self.y -= points * PT_TO_MM,
        }
    }

    fn paragraph(&mut self, text: &str, size: f64, bold: bool) {
        for line in wrap(text, CONTENT_WIDTH_MM, size, bold) {
            self.ensure_space(line_height(size));
            self.text(&line, MARGIN_MM, self.y, size, bold);
            self.y -= line_height(size);
        }
    }

    fn party_lines(column: &PartyColumn, width: f64) -> Vec<String> {
        column
            .lines()
            .iter()
            .flat_map(|line| wrap(line, width, BODY_SIZE, false))
            .collect()
    }

    fn parties(&mut self, seller: &PartyColumn, buyer: &PartyColumn) {
        let column_width = CONTENT_WIDTH_MM / 2.0;
        let seller_lines = Self::party_lines(seller, column_width - CELL_PADDING_MM);
        let buyer_lines = Self::party_lines(buyer, column_width - CELL_PADDING_MM);
        let body_lines = seller_lines.len().max(buyer_lines.len());
        let height = line_height(HEADING_SIZE) + body_lines as f64 * line_height(BODY_SIZE);
        self.keep_together(height);

        let buyer_x = MARGIN_MM + column_width;
        self.ensure_space(line_height(HEADING_SIZE));
        self.text(seller.heading(), MARGIN_MM, self.y, HEADING_SIZE, true);
        self.text(buyer.heading(), buyer_x, self.y, HEADING_SIZE, true);
        self.y -= line_height(HEADING_SIZE);

        // A panel taller than a page continues line by line on the next one.
        for index in 0..body_lines {
            self.ensure_space(line_height(BODY_SIZE));
            if let Some(line) = seller_lines.get(index) {
                self.text(line, MARGIN_MM, self.y, BODY_SIZE, false);
            }
            if let Some(line) = buyer_lines.get(index) {
                self.text(line, buyer_x, self.y, BODY_SIZE, false);
            }
            self.y -= line_height(BODY_SIZE);
        }
        self.y -= CELL_PADDING_MM;
    }

    fn items(&mut self, table: &ItemTable) {
        let total_weight: usize = ITEM_COLUMN_WEIGHTS.iter().sum();
        let widths: Vec<f64> = ITEM_COLUMN_WEIGHTS
            .iter()
            .map(|weight| CONTENT_WIDTH_MM * *weight as f64 / total_weight as f64)
            .collect();

        self.table_row(&table.headers(), &widths, true);
        for item in table.rows() {
            self.table_row(&item.cells(), &widths, false);
        }
    }

    /// Draws one grid row. A row taller than the space left is split between
    /// lines, each page part getting its own frame and header shading.
    fn table_row(&mut self, cells: &[&str], widths: &[f64], header: bool) {
        let wrapped: Vec<Vec<String>> = cells
            .iter()
            .zip(widths)
            .map(|(text, width)| wrap(text, width - 2.0 * CELL_PADDING_MM, TABLE_SIZE, header))
            .collect();
        let line_count = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let padding = 2.0 * CELL_PADDING_MM;
        self.keep_together(line_count as f64 * line_height(TABLE_SIZE) + padding);

        let mut start = 0;
        while start < line_count {
            let mut fit = self.lines_that_fit(line_height(TABLE_SIZE), padding);
            if fit == 0 {
                self.new_page();
                fit = self.lines_that_fit(line_height(TABLE_SIZE), padding).max(1);
            }
            let end = (start + fit).min(line_count);
            self.row_part(&wrapped, widths, start..end, header);
            start = end;
            if start < line_count {
                self.new_page();
            }
        }
    }

    fn row_part(
        &mut self,
        wrapped: &[Vec<String>],
        widths: &[f64],
        lines: Range<usize>,
        header: bool,
    ) {
        let height = lines.len() as f64 * line_height(TABLE_SIZE) + 2.0 * CELL_PADDING_MM;
        let top = self.y;
        if header {
            self.fill_rect(MARGIN_MM, top, CONTENT_WIDTH_MM, height, HEADER_GREY);
        }

        let mut x = MARGIN_MM;
        for ((column, width), alignment) in wrapped.iter().zip(widths).zip(ITEM_COLUMN_ALIGNMENT) {
            let mut line_top = top - CELL_PADDING_MM;
            for line in column.iter().skip(lines.start).take(lines.len()) {
                self.aligned_text(
                    line,
                    x + CELL_PADDING_MM,
                    width - 2.0 * CELL_PADDING_MM,
                    line_top,
                    TABLE_SIZE,
                    header,
                    alignment,
                );
                line_top -= line_height(TABLE_SIZE);
            }
            x += width;
        }

        let bottom = top - height;
        let right = MARGIN_MM + CONTENT_WIDTH_MM;
        self.stroke(&[(MARGIN_MM, top), (right, top)]);
        self.stroke(&[(MARGIN_MM, bottom), (right, bottom)]);
        let mut x = MARGIN_MM;
        self.stroke(&[(x, top), (x, bottom)]);
        for width in widths {
            x += width;
            self.stroke(&[(x, top), (x, bottom)]);
        }
        self.y = bottom;
    }

    fn totals(&mut self, rows: &[TotalsRow]) {
        let value_x = MARGIN_MM + CONTENT_WIDTH_MM - TOTALS_VALUE_WIDTH_MM;
        let label_x = value_x - TOTALS_LABEL_WIDTH_MM;
        let height = line_height(BODY_SIZE) + 2.0 * CELL_PADDING_MM;

        for row in rows {
            self.ensure_space(height);
            let top = self.y - CELL_PADDING_MM;
            self.text(&row.label, label_x + CELL_PADDING_MM, top, BODY_SIZE, false);
            self.aligned_text(
                &row.value,
                value_x + CELL_PADDING_MM,
                TOTALS_VALUE_WIDTH_MM - 2.0 * CELL_PADDING_MM,
                top,
                BODY_SIZE,
                false,
                HorizontalAlignment::Right,
            );
            self.y -= height;
        }
    }
}
