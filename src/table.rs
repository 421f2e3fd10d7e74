//! Line-item grids of both documents.
//!
//! A table is built as plain rows of cell text first, then drawn as a grid
//! whose row heights follow the wrapped cell contents.

use crate::canvas::{Align, Canvas, Rgb};
use crate::font_metrics::FontFace;
use crate::format::{self, NumberFormat, BOX_UNIT, EACH_UNIT, VOLUME_UNIT, WEIGHT_UNIT};
use crate::model::{BoxEntry, LineItem, ShipmentDocument};
use tracing::debug;

const CELL_PADDING: f32 = 1.5;
const LINE_HEIGHT_FACTOR: f32 = 1.15;
const GRID_LINE_WIDTH: f32 = 0.2;
const HEAD_FONT_SIZE: f32 = 8.0;
const BODY_FONT_SIZE: f32 = 9.0;
const TOTAL_FILL: Rgb = Rgb::gray(240);

/// Number of leading columns describing packages.
pub const MARKS_COLUMNS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub width: f32,
    pub align: Align,
}

const fn col(width: f32, align: Align) -> Column {
    Column { width, align }
}

pub const INVOICE_COLUMNS: [Column; 12] = [
    col(12.0, Align::Center), // box title
    col(21.0, Align::Center), // box size
    col(12.0, Align::Center), // box count
    col(13.0, Align::Center), // no.
    col(34.0, Align::Left),   // model
    col(70.0, Align::Left),   // description
    col(27.0, Align::Center), // hs code
    col(19.0, Align::Center), // quantity
    col(11.0, Align::Center), // currency
    col(22.0, Align::Right),  // unit price
    col(11.0, Align::Center), // currency
    col(25.0, Align::Right),  // amount
];

pub const PACKING_COLUMNS: [Column; 10] = [
    col(14.0, Align::Center),
    col(24.0, Align::Center),
    col(14.0, Align::Center),
    col(12.0, Align::Center),
    col(35.0, Align::Left),
    col(77.0, Align::Left),
    col(25.0, Align::Center), // quantity
    col(25.0, Align::Center), // net weight
    col(25.0, Align::Center), // gross weight
    col(25.0, Align::Center), // measurement
];

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub span: usize,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Cell {
            text: text.into(),
            span: 1,
        }
    }

    pub fn spanning(text: impl Into<String>, span: usize) -> Self {
        Cell {
            text: text.into(),
            span: span.max(1),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Header,
    Body,
    Total,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub kind: RowKind,
    pub cells: Vec<Cell>,
}

impl Row {
    fn body(cells: Vec<String>) -> Self {
        Row {
            kind: RowKind::Body,
            cells: cells.into_iter().map(Cell::new).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub header: Row,
    /// Body rows followed by the Total row.
    pub rows: Vec<Row>,
}

impl Table {
    pub fn width(&self) -> f32 {
        self.columns.iter().map(|c| c.width).sum()
    }
}

/// Pair two sequences by position, padding the shorter one with `None`.
///
/// The pairing is purely positional: element `i` of `left` has no relation to
/// element `i` of `right` beyond sharing a display row.
pub fn zip_padded<'a, A, B>(
    left: &'a [A],
    right: &'a [B],
) -> impl Iterator<Item = (Option<&'a A>, Option<&'a B>)> + 'a {
    let rows = left.len().max(right.len());
    (0..rows).map(move |i| (left.get(i), right.get(i)))
}

/// Sum of all box quantities, missing quantities counting as zero.
pub fn total_box_count(boxes: &[BoxEntry]) -> u64 {
    boxes.iter().map(|b| b.quantity.unwrap_or(0) as u64).sum()
}

fn marks_cells(entry: Option<&BoxEntry>) -> [String; MARKS_COLUMNS] {
    match entry {
        Some(b) => [
            format::box_title(b),
            format::box_dimensions(b),
            format::count_with_unit(b.quantity.map(i64::from), BOX_UNIT),
        ],
        None => Default::default(),
    }
}

fn item_quantity(item: &LineItem) -> String {
    format::count_with_unit(item.quantity, item.unit.as_deref().unwrap_or(""))
}

fn sequence(item: &LineItem) -> String {
    item.sequence.map(|s| s.to_string()).unwrap_or_default()
}

fn total_label(doc: &ShipmentDocument) -> Cell {
    Cell::spanning(
        format!("Total :{}{}", total_box_count(&doc.boxes), BOX_UNIT),
        MARKS_COLUMNS,
    )
}

fn header(cells: Vec<Cell>) -> Row {
    Row {
        kind: RowKind::Header,
        cells,
    }
}

pub fn commercial_invoice_table(doc: &ShipmentDocument, fmt: &NumberFormat) -> Table {
    let mut rows: Vec<Row> = zip_padded(&doc.boxes, &doc.items)
        .map(|(entry, item)| {
            let mut cells = marks_cells(entry).to_vec();
            match item {
                Some(item) => cells.extend([
                    sequence(item),
                    item.model_label().to_string(),
                    item.description_label().to_string(),
                    item.hs_code.clone().unwrap_or_default(),
                    item_quantity(item),
                    doc.currency.clone(),
                    fmt.amount(item.unit_price.as_ref()),
                    doc.currency.clone(),
                    fmt.amount(item.amount.as_ref()),
                ]),
                None => cells.extend(std::iter::repeat(String::new()).take(9)),
            }
            Row::body(cells)
        })
        .collect();

    let mut total = vec![total_label(doc)];
    total.extend(
        [
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            format::count_with_unit(doc.totals.quantity, EACH_UNIT),
            String::new(),
            String::new(),
            doc.currency.clone(),
            fmt.amount(doc.totals.amount.as_ref()),
        ]
        .map(Cell::new),
    );
    rows.push(Row {
        kind: RowKind::Total,
        cells: total,
    });

    Table {
        columns: INVOICE_COLUMNS.to_vec(),
        header: header(vec![
            Cell::spanning("12.Marks and No.of PKGS", MARKS_COLUMNS),
            Cell::new("13.No."),
            Cell::new("14.Model"),
            Cell::new("15.Description of Goods"),
            Cell::new("16.H.S.Code"),
            Cell::new("17.Quantity"),
            Cell::spanning("18.Unit Price", 2),
            Cell::spanning("19.Amount", 2),
        ]),
        rows,
    }
}

pub fn packing_list_table(doc: &ShipmentDocument, fmt: &NumberFormat) -> Table {
    let mut rows: Vec<Row> = zip_padded(&doc.boxes, &doc.items)
        .map(|(entry, item)| {
            let mut cells = marks_cells(entry).to_vec();
            match item {
                Some(item) => cells.extend([
                    sequence(item),
                    item.model_label().to_string(),
                    item.description_label().to_string(),
                    item_quantity(item),
                    fmt.measure(item.net_weight.as_ref(), WEIGHT_UNIT),
                    fmt.measure(item.gross_weight.as_ref(), WEIGHT_UNIT),
                    fmt.measure(item.cbm.as_ref(), VOLUME_UNIT),
                ]),
                None => cells.extend(std::iter::repeat(String::new()).take(7)),
            }
            Row::body(cells)
        })
        .collect();

    let totals = &doc.totals;
    let mut total = vec![total_label(doc)];
    total.extend(
        [
            String::new(),
            String::new(),
            String::new(),
            format::count_with_unit(totals.quantity, EACH_UNIT),
            fmt.measure(totals.net_weight.as_ref(), WEIGHT_UNIT),
            fmt.measure(totals.gross_weight.as_ref(), WEIGHT_UNIT),
            fmt.measure(totals.cbm.as_ref(), VOLUME_UNIT),
        ]
        .map(Cell::new),
    );
    rows.push(Row {
        kind: RowKind::Total,
        cells: total,
    });

    Table {
        columns: PACKING_COLUMNS.to_vec(),
        header: header(vec![
            Cell::spanning("10.Marks and No.of PKGS", MARKS_COLUMNS),
            Cell::new("11.No."),
            Cell::new("12.Model"),
            Cell::new("13.Description of Goods"),
            Cell::new("14.Quantity"),
            Cell::new("15.Net Weight"),
            Cell::new("16.Gross Weight"),
            Cell::new("17.Measurement"),
        ]),
        rows,
    }
}

// ============================================================================
// DRAWING
// ============================================================================

struct PlacedCell<'a> {
    x: f32,
    width: f32,
    align: Align,
    lines: Vec<String>,
    cell: &'a Cell,
}

fn row_style(kind: RowKind) -> (FontFace, f32) {
    match kind {
        RowKind::Header => (FontFace::Bold, HEAD_FONT_SIZE),
        RowKind::Body => (FontFace::Regular, BODY_FONT_SIZE),
        RowKind::Total => (FontFace::Bold, BODY_FONT_SIZE),
    }
}

/// Resolve each cell's horizontal span and wrap its text.
fn place_cells<'a>(canvas: &Canvas, columns: &[Column], row: &'a Row, left: f32) -> Vec<PlacedCell<'a>> {
    let mut placed = Vec::with_capacity(row.cells.len());
    let mut col_index = 0;
    let mut x = left;

    for cell in &row.cells {
        if col_index >= columns.len() {
            break;
        }
        let end = (col_index + cell.span).min(columns.len());
        let width: f32 = columns[col_index..end].iter().map(|c| c.width).sum();
        let align = match row.kind {
            RowKind::Header => Align::Center,
            _ => columns[col_index].align,
        };
        let lines = canvas.split_text_to_size(&cell.text, width - 2.0 * CELL_PADDING);

        placed.push(PlacedCell {
            x,
            width,
            align,
            lines,
            cell,
        });
        x += width;
        col_index = end;
    }

    placed
}

/// Wrap a row's cells with its font and return them with the row height.
fn measure_row<'a>(
    canvas: &mut Canvas,
    columns: &[Column],
    row: &'a Row,
    left: f32,
) -> (Vec<PlacedCell<'a>>, f32) {
    let (face, size) = row_style(row.kind);
    canvas.set_font(face, size);

    let cells = place_cells(canvas, columns, row, left);
    let line_h = canvas.line_height(LINE_HEIGHT_FACTOR);
    let max_lines = cells.iter().map(|c| c.lines.len()).max().unwrap_or(1).max(1);
    (cells, max_lines as f32 * line_h + 2.0 * CELL_PADDING)
}

fn draw_row(canvas: &mut Canvas, columns: &[Column], row: &Row, left: f32, top: f32) -> f32 {
    let (cells, height) = measure_row(canvas, columns, row, left);
    let line_h = canvas.line_height(LINE_HEIGHT_FACTOR);
    let fill = (row.kind == RowKind::Total).then_some(TOTAL_FILL);

    for placed in &cells {
        canvas.rect(placed.x, top, placed.width, height, fill, true);

        if placed.cell.is_blank() {
            continue;
        }
        // Vertically centred block of lines
        let block = placed.lines.len() as f32 * line_h;
        let first_top = top + (height - block) / 2.0;
        let baseline_offset = (line_h + canvas.ascent()) / 2.0;
        for (i, line) in placed.lines.iter().enumerate() {
            let y = first_top + i as f32 * line_h + baseline_offset;
            canvas.text_in(
                line,
                placed.x + CELL_PADDING,
                placed.width - 2.0 * CELL_PADDING,
                y,
                placed.align,
            );
        }
    }

    top + height
}

/// Draw the grid with its top-left corner at (`left`, `top`) and return the
/// y coordinate of its bottom edge on the last page it reaches.
///
/// A row that would cross the bottom margin moves to a new page, where the
/// header row is repeated at `margin`.
pub fn draw_table(canvas: &mut Canvas, table: &Table, left: f32, top: f32, margin: f32) -> f32 {
    canvas.set_line_width(GRID_LINE_WIDTH);
    let limit = canvas.page_height() - margin;

    let mut y = draw_row(canvas, &table.columns, &table.header, left, top);
    for row in &table.rows {
        let (_, height) = measure_row(canvas, &table.columns, row, left);
        if y + height > limit {
            canvas.add_page();
            y = draw_row(canvas, &table.columns, &table.header, left, margin);
            debug!(page = canvas.pages().len(), "table continued on a new page");
        }
        y = draw_row(canvas, &table.columns, row, left, y);
    }

    canvas.set_font(FontFace::Regular, BODY_FONT_SIZE);
    y
}
