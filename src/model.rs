//! Presentation blocks describing the logical content of an invoice page.
//!
//! The types in this module are the output of the assembly stage. They carry
//! final text only and never reference a rendering crate, so both layout
//! backends consume the same block sequence.

use crate::compute::{ComputedLineItem, InvoiceSummary};
use crate::input::{InvoiceInput, Party};

/// Column headings of the items table.
pub const ITEM_HEADERS: [&str; 8] = [
    "#",
    "Item",
    "Quantity",
    "Unit price",
    "Net",
    "VAT %",
    "VAT",
    "Gross",
];

/// Relative widths of the items table columns.
pub const ITEM_COLUMN_WEIGHTS: [usize; 8] = [12, 55, 28, 28, 25, 18, 25, 28];

/// Horizontal alignment of a table column.
///
/// The variants map directly to [`genpdf::Alignment`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    /// Left aligned content.
    #[default]
    Left,
    /// Center aligned content.
    Center,
    /// Right aligned content.
    Right,
}

/// Alignment of each items table column: index centred, description left,
/// everything numeric right.
pub const ITEM_COLUMN_ALIGNMENT: [HorizontalAlignment; 8] = [
    HorizontalAlignment::Center,
    HorizontalAlignment::Left,
    HorizontalAlignment::Right,
    HorizontalAlignment::Right,
    HorizontalAlignment::Right,
    HorizontalAlignment::Right,
    HorizontalAlignment::Right,
    HorizontalAlignment::Right,
];

/// A labelled value on the metadata line.
#[derive(Clone, Debug, PartialEq)]
pub struct MetaField {
    pub label: &'static str,
    pub value: String,
}

impl MetaField {
    /// Renders the field as `label: value`.
    pub fn text(&self) -> String {
        format!("{}: {}", self.label, self.value)
    }
}

/// One column of the parties panel.
#[derive(Clone, Debug, PartialEq)]
pub struct PartyColumn {
    heading: &'static str,
    lines: Vec<String>,
}

impl PartyColumn {
    /// Creates an empty column with the given heading.
    pub fn new(heading: &'static str) -> Self {
        Self {
            heading,
            lines: Vec::new(),
        }
    }

    /// Builds a column from a party, keeping only the fields that are present.
    ///
    /// Bank details are only included when the party carries them, which is
    /// the case for the seller.
    pub fn from_party(heading: &'static str, party: &Party) -> Self {
        Self::new(heading)
            .with_line(party.name.clone())
            .with_line(party.address.clone())
            .with_line(party.city.clone())
            .with_line(prefixed("Tax ID", party.tax_id.as_deref()))
            .with_line(prefixed("Account", party.account.as_deref()))
            .with_line(prefixed("Bank", party.bank.as_deref()))
    }

    /// Appends a line when one is given and returns the updated column.
    pub fn with_line(mut self, line: impl Into<Option<String>>) -> Self {
        if let Some(line) = line.into() {
            self.lines.push(line);
        }
        self
    }

    /// Returns the heading shown above the column body.
    pub fn heading(&self) -> &str {
        self.heading
    }

    /// Returns the body lines in display order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

fn prefixed(label: &str, value: Option<&str>) -> Option<String> {
    value.map(|value| format!("{}: {}", label, value))
}

/// Items table: fixed header followed by one row per line item.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemTable {
    rows: Vec<ComputedLineItem>,
}

impl ItemTable {
    /// Creates a table over the given rows.
    pub fn new(rows: Vec<ComputedLineItem>) -> Self {
        Self { rows }
    }

    /// Returns the column headings.
    pub fn headers(&self) -> [&'static str; 8] {
        ITEM_HEADERS
    }

    /// Returns the body rows.
    pub fn rows(&self) -> &[ComputedLineItem] {
        &self.rows
    }
}

/// A label/value pair in the totals panel.
#[derive(Clone, Debug, PartialEq)]
pub struct TotalsRow {
    pub label: String,
    pub value: String,
}

impl TotalsRow {
    fn new(label: impl Into<String>, value: String) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Individual content blocks that make up the invoice, in page order.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Large bold heading.
    Title(String),
    /// Labelled fields printed on a single line.
    Metadata(Vec<MetaField>),
    /// Seller and buyer side by side.
    Parties {
        seller: PartyColumn,
        buyer: PartyColumn,
    },
    /// The line item table.
    Items(ItemTable),
    /// Right-aligned totals panel.
    Totals(Vec<TotalsRow>),
    /// Vertical gap measured in points.
    Spacer(f64),
}

impl Block {
    /// Convenience helper for a vertical gap.
    pub fn spacer(points: f64) -> Self {
        Self::Spacer(points)
    }
}

/// The assembled invoice: an ordered list of blocks plus document metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct InvoiceDocument {
    title: String,
    blocks: Vec<Block>,
}

impl InvoiceDocument {
    /// Creates an empty document with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    /// Assembles the page content from the resolved input and its computed
    /// amounts.
    pub fn assemble(input: &InvoiceInput, summary: &InvoiceSummary) -> Self {
        let title = format!("INVOICE {}", input.invoice_number);

        let metadata = vec![
            MetaField {
                label: "Issued",
                value: input.issue_date.clone(),
            },
            MetaField {
                label: "Sale date",
                value: input.sale_date.clone(),
            },
            MetaField {
                label: "Due",
                value: input.due_date.clone(),
            },
            MetaField {
                label: "Place",
                value: input.place.clone(),
            },
        ];

        let totals = vec![
            TotalsRow::new("Net total:", summary.money(summary.totals.total_net)),
            TotalsRow::new(
                format!("VAT {}:", summary.vat_label),
                summary.money(summary.totals.vat_amount),
            ),
            TotalsRow::new("Amount due:", summary.money(summary.totals.gross)),
        ];

        Self::new(title.clone())
            .with_block(Block::Title(title))
            .with_block(Block::spacer(6.0))
            .with_block(Block::Metadata(metadata))
            .with_block(Block::spacer(10.0))
            .with_block(Block::Parties {
                seller: PartyColumn::from_party("Seller", &input.seller),
                buyer: PartyColumn::from_party("Buyer", &input.buyer),
            })
            .with_block(Block::spacer(12.0))
            .with_block(Block::Items(ItemTable::new(summary.items.clone())))
            .with_block(Block::spacer(10.0))
            .with_block(Block::Totals(totals))
    }

    /// Returns the document title, used for the PDF metadata.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the blocks in page order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Appends a block and returns the updated document.
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }
}
