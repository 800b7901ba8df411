//! Element implementations the invoice layout needs beyond the `genpdf`
//! primitives.

use std::rc::Rc;

use genpdf::elements::{PaddedElement, Paragraph};
use genpdf::error::Error;
use genpdf::style::{Color, Style};
use genpdf::{render, Alignment, Element, Margins, Mm, Position, RenderResult, Size};

use crate::model::HorizontalAlignment;

/// Padding inside every table cell, in millimetres.
pub const CELL_PADDING_MM: f64 = 1.5;
/// Grey level of the shaded table header.
pub const HEADER_SHADE: Color = Color::Greyscale(211);

// Distance between hatch strokes; the default stroke is wider than this.
const SHADE_STROKE_STEP_MM: f64 = 0.25;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn cell_margins() -> Margins {
    let padding = mm_from_f64(CELL_PADDING_MM);
    Margins::trbl(padding, padding, padding, padding)
}

impl From<HorizontalAlignment> for Alignment {
    fn from(alignment: HorizontalAlignment) -> Self {
        match alignment {
            HorizontalAlignment::Left => Alignment::Left,
            HorizontalAlignment::Center => Alignment::Center,
            HorizontalAlignment::Right => Alignment::Right,
        }
    }
}

/// A padded, aligned paragraph used for table cells.
pub fn cell(text: &str, alignment: HorizontalAlignment) -> PaddedElement<Paragraph> {
    Paragraph::new(text)
        .aligned(alignment.into())
        .padded(cell_margins())
}

/// Number of lines `text` takes when wrapped to `max_width`.
///
/// Words are split after each space and filled greedily, the way
/// `Paragraph` wraps them. A word wider than the line gets a line of its
/// own. Empty text still occupies one line.
pub fn wrapped_line_count<F>(text: &str, max_width: f64, measure: F) -> usize
where
    F: Fn(&str) -> f64,
{
    let mut lines = 1;
    let mut x = 0.0;
    for word in text.split_inclusive(' ') {
        let width = measure(word);
        if x > 0.0 && x + width > max_width {
            lines += 1;
            x = 0.0;
        }
        x += width;
    }
    lines
}

/// Labels and column weights of one shaded header row.
///
/// Every cell of the row is shaded to the height of the tallest wrapped
/// label, so the background stays continuous when a label needs more than
/// one line.
#[derive(Clone, Debug)]
pub struct ShadedRow {
    columns: Rc<[(String, usize)]>,
}

impl ShadedRow {
    pub fn new<'a, I>(columns: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, usize)>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|(label, weight)| (label.to_owned(), weight))
                .collect(),
        }
    }

    /// The cell for the given column.
    pub fn cell(&self, column: usize, alignment: HorizontalAlignment) -> ShadedCell {
        ShadedCell {
            row: self.clone(),
            column,
            alignment: alignment.into(),
            shade: HEADER_SHADE,
            style: Style::new(),
        }
    }

    fn total_weight(&self) -> usize {
        self.columns.iter().map(|(_, weight)| weight).sum()
    }

    /// Lines of the tallest label when the row spans `row_width` millimetres.
    pub fn line_count<F>(&self, row_width: f64, measure: F) -> usize
    where
        F: Fn(&str) -> f64,
    {
        let total = self.total_weight().max(1) as f64;
        self.columns
            .iter()
            .map(|(label, weight)| {
                let inner = row_width * *weight as f64 / total - 2.0 * CELL_PADDING_MM;
                wrapped_line_count(label, inner, &measure)
            })
            .max()
            .unwrap_or(1)
    }
}

/// A table header cell painted on a grey background.
///
/// `genpdf` has no filled shapes, so the background is drawn as closely
/// spaced horizontal strokes before the text is printed on top.
pub struct ShadedCell {
    row: ShadedRow,
    column: usize,
    alignment: Alignment,
    shade: Color,
    style: Style,
}

impl ShadedCell {
    /// Sets the style merged over the inherited one and returns the cell.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn text(&self) -> &str {
        self.row
            .columns
            .get(self.column)
            .map_or("", |(label, _)| label.as_str())
    }

    /// Width of the whole row, derived from this cell's share of it.
    fn row_width(&self, cell_width: Mm) -> f64 {
        let weight = self
            .row
            .columns
            .get(self.column)
            .map_or(1, |(_, weight)| *weight)
            .max(1);
        mm_to_f64(cell_width) * self.row.total_weight() as f64 / weight as f64
    }
}

impl Element for ShadedCell {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let style = style.and(self.style);
        let padding = mm_from_f64(CELL_PADDING_MM);
        let lines = self
            .row
            .line_count(self.row_width(area.size().width), |word| {
                mm_to_f64(style.str_width(&context.font_cache, word))
            });
        let line_height = style.line_height(&context.font_cache);
        let height = line_height * lines as f64 + padding + padding;

        let mut result = RenderResult::default();
        if height > area.size().height {
            result.has_more = true;
            return Ok(result);
        }

        let width = area.size().width;
        let stroke = Style::new().with_color(self.shade);
        let mut offset = 0.0;
        while offset <= mm_to_f64(height) {
            let y = mm_from_f64(offset);
            area.draw_line(vec![Position::new(0, y), Position::new(width, y)], stroke);
            offset += SHADE_STROKE_STEP_MM;
        }

        area.add_margins(cell_margins());
        let mut text = Paragraph::new(self.text()).aligned(self.alignment);
        let text_result = text.render(context, area, style)?;
        result.has_more = text_result.has_more;
        result.size = Size::new(width, height.max(text_result.size.height + padding + padding));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ITEM_COLUMN_WEIGHTS, ITEM_HEADERS};

    // Two millimetres per character, spaces included.
    fn monospace(text: &str) -> f64 {
        text.chars().count() as f64 * 2.0
    }

    #[test]
    fn counts_wrapped_lines_like_a_paragraph() {
        assert_eq!(wrapped_line_count("Unit price", 20.0, monospace), 1);
        assert_eq!(wrapped_line_count("Unit price", 12.0, monospace), 2);
        assert_eq!(wrapped_line_count("a b c", 4.0, monospace), 3);
        assert_eq!(wrapped_line_count("", 10.0, monospace), 1);
    }

    #[test]
    fn overlong_word_takes_a_single_line() {
        assert_eq!(wrapped_line_count("Consulting", 4.0, monospace), 1);
        assert_eq!(wrapped_line_count("A Consulting", 4.0, monospace), 2);
    }

    #[test]
    fn header_row_is_as_tall_as_its_longest_label() {
        let row = ShadedRow::new(ITEM_HEADERS.into_iter().zip(ITEM_COLUMN_WEIGHTS));

        // "Unit price" is 20 mm wide but its column leaves about 19 mm.
        assert_eq!(row.line_count(174.0, monospace), 2);
        assert_eq!(row.line_count(400.0, monospace), 1);
    }

    #[test]
    fn every_cell_reads_its_own_label() {
        let row = ShadedRow::new([("#", 1), ("VAT %", 3)]);

        let cell = row.cell(1, HorizontalAlignment::Right);
        assert_eq!(cell.text(), "VAT %");
        assert_eq!(cell.row_width(mm_from_f64(30.0)), 40.0);
        assert_eq!(row.cell(5, HorizontalAlignment::Left).text(), "");
    }
}
