//! Block layout through genpdf, used whenever a system font was found.

use genpdf::elements::{Break, FrameCellDecorator, LinearLayout, Paragraph, TableLayout};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::Style;
use genpdf::Element;
use log::debug;

use crate::builder::{DocumentBuilder, BODY_FONT_SIZE};
use crate::elements::{cell, ShadedRow};
use crate::error::RenderError;
use crate::model::{
    Block, HorizontalAlignment, InvoiceDocument, ItemTable, MetaField, PartyColumn, TotalsRow,
    ITEM_COLUMN_ALIGNMENT, ITEM_COLUMN_WEIGHTS,
};

const TITLE_FONT_SIZE: u8 = 16;
const HEADING_FONT_SIZE: u8 = 12;
const TABLE_FONT_SIZE: u8 = 10;
const META_SEPARATOR: &str = "    ";

/// Blank lead, label and value columns; the last two span 100 mm of the
/// 174 mm content width.
const TOTALS_COLUMN_WEIGHTS: [usize; 3] = [74, 60, 40];

/// Lays out the document with the given font family and returns the PDF
/// bytes.
pub fn render(
    document: &InvoiceDocument,
    font_family: FontFamily<FontData>,
) -> Result<Vec<u8>, RenderError> {
    let mut pdf = DocumentBuilder::new(font_family)
        .with_title(document.title())
        .build();

    for block in document.blocks() {
        push_block(&mut pdf, block)?;
    }

    let mut bytes = Vec::new();
    pdf.render(&mut bytes)?;
    debug!("genpdf produced {} bytes", bytes.len());
    Ok(bytes)
}

fn push_block(pdf: &mut genpdf::Document, block: &Block) -> Result<(), RenderError> {
    match block {
        Block::Title(title) => pdf.push(
            Paragraph::new(title.as_str())
                .styled(Style::new().bold().with_font_size(TITLE_FONT_SIZE)),
        ),
        Block::Metadata(fields) => {
            let line = fields
                .iter()
                .map(MetaField::text)
                .collect::<Vec<_>>()
                .join(META_SEPARATOR);
            pdf.push(Paragraph::new(line));
        }
        Block::Parties { seller, buyer } => pdf.push(parties_table(seller, buyer)?),
        Block::Items(table) => pdf.push(
            items_table(table)?.styled(Style::new().with_font_size(TABLE_FONT_SIZE)),
        ),
        Block::Totals(rows) => pdf.push(totals_table(rows)?),
        Block::Spacer(points) => pdf.push(Break::new(points / f64::from(BODY_FONT_SIZE))),
    }
    Ok(())
}

fn party_body(column: &PartyColumn) -> LinearLayout {
    let mut body = LinearLayout::vertical();
    for line in column.lines() {
        body.push(Paragraph::new(line.as_str()));
    }
    body
}

fn parties_table(seller: &PartyColumn, buyer: &PartyColumn) -> Result<TableLayout, RenderError> {
    let heading = Style::new().bold().with_font_size(HEADING_FONT_SIZE);
    let mut table = TableLayout::new(vec![1, 1]);
    table
        .row()
        .element(Paragraph::new(seller.heading()).styled(heading))
        .element(Paragraph::new(buyer.heading()).styled(heading))
        .push()?;
    table
        .row()
        .element(party_body(seller))
        .element(party_body(buyer))
        .push()?;
    Ok(table)
}

fn items_table(items: &ItemTable) -> Result<TableLayout, RenderError> {
    let mut table = TableLayout::new(ITEM_COLUMN_WEIGHTS.to_vec());
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let headers = ShadedRow::new(items.headers().into_iter().zip(ITEM_COLUMN_WEIGHTS));
    let mut header = table.row();
    for (column, alignment) in ITEM_COLUMN_ALIGNMENT.into_iter().enumerate() {
        header.push_element(headers.cell(column, alignment).with_style(Style::new().bold()));
    }
    header.push()?;

    for item in items.rows() {
        let mut row = table.row();
        for (text, alignment) in item.cells().iter().zip(ITEM_COLUMN_ALIGNMENT) {
            row.push_element(cell(text, alignment));
        }
        row.push()?;
    }
    debug!("items table holds {} rows", items.rows().len());
    Ok(table)
}

fn totals_table(rows: &[TotalsRow]) -> Result<TableLayout, RenderError> {
    let mut table = TableLayout::new(TOTALS_COLUMN_WEIGHTS.to_vec());
    for total in rows {
        table
            .row()
            .element(Paragraph::default())
            .element(cell(&total.label, HorizontalAlignment::Left))
            .element(cell(&total.value, HorizontalAlignment::Right))
            .push()?;
    }
    Ok(table)
}
