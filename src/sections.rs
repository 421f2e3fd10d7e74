//! Header block and the numbered boxes above the line-item table.
//!
//! Every section takes the cursor position it starts at and returns the
//! position it ends at, so the page reads strictly top to bottom.

use crate::canvas::{Align, Canvas};
use crate::cursor::{LayoutCursor, DATA_INDENT, LINE_HEIGHT};
use crate::font_metrics::FontFace;
use crate::model::{Party, ShipmentDocument};

pub const PAGE_WIDTH: f32 = 297.0;
pub const PAGE_HEIGHT: f32 = 210.0;
pub const MARGIN: f32 = 10.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
pub const CONTENT_RIGHT: f32 = PAGE_WIDTH - MARGIN;

pub const LEFT_COL_WIDTH: f32 = 180.0;
pub const RIGHT_COL_X: f32 = 195.0;
pub const RIGHT_COL_WIDTH: f32 = CONTENT_RIGHT - RIGHT_COL_X;
/// Vertical rule between the two columns.
pub const DIVIDER_X: f32 = RIGHT_COL_X - 3.0;

// Second field of the port and carrier rows
const MID_COL_X: f32 = MARGIN + 90.0;
const MID_DIVIDER_X: f32 = MARGIN + 87.0;
// Date next to a reference number in the right column
const DATE_X: f32 = RIGHT_COL_X + 50.0;

const HEADER_TOP: f32 = 10.0;
const LETTERHEAD_SIZE: f32 = 14.0;
pub const BODY_FONT_SIZE: f32 = 9.0;
const RULE_WIDTH: f32 = 0.2;
const CONTACT_GAP: &str = "    ";

pub const INVOICE_TITLE: &str = "COMMERCIAL INVOICE";
pub const PACKING_LIST_TITLE: &str = "PACKING LIST";

fn left_column(y: f32) -> LayoutCursor {
    LayoutCursor::new(MARGIN, y, LEFT_COL_WIDTH - 3.0)
}

fn right_column(y: f32) -> LayoutCursor {
    LayoutCursor::new(RIGHT_COL_X, y, RIGHT_COL_WIDTH - 2.0)
}

/// Contact person and phone on one line; either may be missing.
pub fn contact_line(party: &Party) -> String {
    [party.contact_person.trim(), party.phone.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(CONTACT_GAP)
}

fn full_rule(canvas: &mut Canvas, y: f32) {
    canvas.line(MARGIN, y, CONTENT_RIGHT, y);
}

fn left_rule(canvas: &mut Canvas, y: f32) {
    canvas.line(MARGIN, y, DIVIDER_X, y);
}

fn divider(canvas: &mut Canvas, x: f32, top: f32, bottom: f32) {
    canvas.line(x, top - LINE_HEIGHT, x, bottom);
}

/// Letterhead, document title and the rule under them. Returns the y of the
/// first body line.
pub fn draw_header(canvas: &mut Canvas, letterhead: &str, title: &str) -> f32 {
    let baseline = HEADER_TOP + 6.5;
    canvas.set_font(FontFace::Bold, LETTERHEAD_SIZE);
    canvas.text(letterhead, MARGIN, baseline);
    canvas.text_in(title, MARGIN, CONTENT_WIDTH, baseline, Align::Right);

    let rule_y = HEADER_TOP + 7.0;
    canvas.set_line_width(RULE_WIDTH);
    full_rule(canvas, rule_y);

    canvas.set_font(FontFace::Regular, BODY_FONT_SIZE);
    rule_y + 7.0
}

/// Company, wrapped address and contact of a party.
fn draw_party(canvas: &mut Canvas, cursor: &mut LayoutCursor, party: &Party) {
    cursor.draw_wrapped_text(canvas, &party.company_name);
    cursor.draw_wrapped_text(canvas, &party.address);
    cursor.draw_text(canvas, &contact_line(party));
}

fn draw_remarks(canvas: &mut Canvas, cursor: &mut LayoutCursor, doc: &ShipmentDocument) {
    for remark in [
        &doc.shipment_type,
        &doc.trade_terms,
        &doc.origin_description,
        &doc.additional_remarks,
    ] {
        cursor.draw_optional_text(canvas, remark);
    }
}

/// Shipper on the left; invoice number and date on the right.
fn draw_shipper_rows(canvas: &mut Canvas, doc: &ShipmentDocument, y: f32) -> (LayoutCursor, f32) {
    let mut left = left_column(y);
    left.draw_label(canvas, "1.Shipper / Exporter", 5.0);
    let mut right = right_column(y);
    right.draw_label(canvas, "8.Invoice No. and Date", 5.0);

    let row_y = left.current_y();
    canvas.text(&doc.invoice_number, RIGHT_COL_X + DATA_INDENT, row_y);
    canvas.text(&doc.invoice_date, DATE_X, row_y);
    left.draw_text(canvas, &doc.shipper.company_name);

    (left, row_y)
}

pub fn invoice_shipper_section(canvas: &mut Canvas, doc: &ShipmentDocument, y: f32) -> f32 {
    let (mut left, row_y) = draw_shipper_rows(canvas, doc, y);
    canvas.line(DIVIDER_X, row_y + 1.0, CONTENT_RIGHT, row_y + 1.0);
    left.advance(1.0);
    left.draw_wrapped_text(canvas, &doc.shipper.address);
    left.draw_text(canvas, &contact_line(&doc.shipper));
    left.advance(1.0);

    let mut lc = right_column(y + 9.0);
    lc.draw_label(canvas, "9.No. & Date of L/C", 5.0);
    canvas.text(&doc.lc_date, DATE_X, lc.current_y());
    lc.draw_text(canvas, &doc.lc_no);

    let bottom = left.current_y().max(lc.current_y());
    divider(canvas, DIVIDER_X, y, bottom);
    bottom
}

pub fn packing_shipper_section(canvas: &mut Canvas, doc: &ShipmentDocument, y: f32) -> f32 {
    let (mut left, _) = draw_shipper_rows(canvas, doc, y);
    left.draw_wrapped_text(canvas, &doc.shipper.address);
    left.draw_text(canvas, &contact_line(&doc.shipper));
    left.advance(1.0);

    let bottom = left.current_y();
    divider(canvas, DIVIDER_X, y, bottom);
    bottom
}

pub fn sold_to_section(canvas: &mut Canvas, doc: &ShipmentDocument, y: f32) -> f32 {
    let mut left = left_column(y);
    left.draw_label(canvas, "2.Sold to", LINE_HEIGHT);
    let mut right = right_column(y);
    right.draw_label(canvas, "10.L/C Issuing Bank", LINE_HEIGHT);

    draw_party(canvas, &mut left, &doc.sold_to);
    right.draw_optional_text(canvas, &doc.lc_issuing_bank);

    let bottom = left.current_y().max(right.current_y());
    divider(canvas, DIVIDER_X, y, bottom);
    bottom
}

pub fn customer_section(canvas: &mut Canvas, doc: &ShipmentDocument, y: f32) -> f32 {
    let mut left = left_column(y);
    left.draw_label(canvas, "2.Customer", LINE_HEIGHT);
    let mut right = right_column(y);
    right.draw_label(canvas, "9.Remarks", LINE_HEIGHT);

    draw_party(canvas, &mut left, &doc.sold_to);
    draw_remarks(canvas, &mut right, doc);

    let bottom = left.current_y().max(right.current_y());
    divider(canvas, DIVIDER_X, y, bottom);
    bottom
}

pub fn invoice_ship_to_section(canvas: &mut Canvas, doc: &ShipmentDocument, y: f32) -> f32 {
    let mut left = left_column(y);
    left.draw_label(canvas, "3.Ship to", LINE_HEIGHT);
    let mut right = right_column(y);
    right.draw_label(canvas, "11.Remarks", LINE_HEIGHT);

    draw_party(canvas, &mut left, &doc.ship_to);
    draw_remarks(canvas, &mut right, doc);

    let bottom = left.current_y().max(right.current_y());
    divider(canvas, DIVIDER_X, y, bottom);
    bottom
}

pub fn packing_ship_to_section(canvas: &mut Canvas, doc: &ShipmentDocument, y: f32) -> f32 {
    let mut left = left_column(y);
    left.draw_label(canvas, "3.Ship to", LINE_HEIGHT);
    draw_party(canvas, &mut left, &doc.ship_to);

    // Right column stays empty; the divider continues the one from the customer box
    let bottom = left.current_y();
    divider(canvas, DIVIDER_X, y, bottom);
    bottom
}

/// Two labelled fields side by side in the left column.
fn field_pair_section(
    canvas: &mut Canvas,
    y: f32,
    first: (&str, &str),
    second: (&str, &str),
) -> f32 {
    let mut left = LayoutCursor::new(MARGIN, y, MID_DIVIDER_X - MARGIN);
    let mut mid = LayoutCursor::new(MID_COL_X, y, DIVIDER_X - MID_COL_X);

    left.draw_label(canvas, first.0, LINE_HEIGHT);
    mid.draw_label(canvas, second.0, LINE_HEIGHT);
    left.draw_text(canvas, first.1);
    mid.draw_text(canvas, second.1);

    let bottom = left.current_y().max(mid.current_y());
    divider(canvas, MID_DIVIDER_X, y, bottom);
    divider(canvas, DIVIDER_X, y, bottom);
    bottom
}

pub fn port_section(canvas: &mut Canvas, doc: &ShipmentDocument, y: f32) -> f32 {
    let bottom = field_pair_section(
        canvas,
        y,
        ("4.Port of Loading", &doc.port_of_loading),
        ("5.Final Destination", &doc.final_destination),
    );
    left_rule(canvas, bottom);
    bottom
}

pub fn carrier_section(canvas: &mut Canvas, doc: &ShipmentDocument, y: f32) -> f32 {
    field_pair_section(
        canvas,
        y,
        ("6.Carrier", &doc.carrier_name),
        ("7.Freight on or about", &doc.freight_date),
    )
}

/// Boxes 1 to 11 of the commercial invoice. Returns the top of the table.
pub fn invoice_sections(canvas: &mut Canvas, doc: &ShipmentDocument, y: f32) -> f32 {
    let mut y = invoice_shipper_section(canvas, doc, y);
    full_rule(canvas, y);
    y += LINE_HEIGHT;

    y = sold_to_section(canvas, doc, y);
    full_rule(canvas, y);
    y += LINE_HEIGHT;

    y = invoice_ship_to_section(canvas, doc, y);
    left_rule(canvas, y);
    y += LINE_HEIGHT;

    y = port_section(canvas, doc, y);
    y += LINE_HEIGHT;

    y = carrier_section(canvas, doc, y);
    full_rule(canvas, y);
    y + 5.0
}

/// Boxes 1 to 9 of the packing list. Returns the top of the table.
pub fn packing_sections(canvas: &mut Canvas, doc: &ShipmentDocument, y: f32) -> f32 {
    let mut y = packing_shipper_section(canvas, doc, y);
    full_rule(canvas, y);
    y += LINE_HEIGHT;

    y = customer_section(canvas, doc, y);
    left_rule(canvas, y);
    y += LINE_HEIGHT;

    y = packing_ship_to_section(canvas, doc, y);
    left_rule(canvas, y);
    y += LINE_HEIGHT;

    y = port_section(canvas, doc, y);
    y += LINE_HEIGHT;

    y = carrier_section(canvas, doc, y);
    full_rule(canvas, y);
    y + 5.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawOp;
    use crate::testutil::sample_shipment;
    use pretty_assertions::assert_eq;

    fn text_at<'a>(canvas: &'a Canvas, needle: &str) -> Option<(f32, f32)> {
        canvas.pages()[0].ops.iter().find_map(|op| match op {
            DrawOp::Text { x, y, text, .. } if text == needle => Some((*x, *y)),
            _ => None,
        })
    }

    #[test]
    fn test_contact_line_skips_missing_parts() {
        let mut party = Party {
            contact_person: "J. Park".into(),
            phone: "+82 51 000 0000".into(),
            ..Default::default()
        };
        assert_eq!(contact_line(&party), "J. Park    +82 51 000 0000");
        party.phone = " ".into();
        assert_eq!(contact_line(&party), "J. Park");
        party.contact_person.clear();
        assert_eq!(contact_line(&party), "");
    }

    #[test]
    fn test_header_places_title_at_right_margin() {
        let mut canvas = Canvas::new(PAGE_WIDTH, PAGE_HEIGHT);
        let body_y = draw_header(&mut canvas, "Solmith Co., Ltd.", INVOICE_TITLE);
        assert_eq!(body_y, 24.0);

        let (x, y) = text_at(&canvas, INVOICE_TITLE).unwrap();
        canvas.set_font(FontFace::Bold, LETTERHEAD_SIZE);
        let right_edge = x + canvas.text_width(INVOICE_TITLE);
        assert!((right_edge - CONTENT_RIGHT).abs() < 1e-3);
        assert_eq!(y, 16.5);
        assert_eq!(text_at(&canvas, "Solmith Co., Ltd."), Some((MARGIN, 16.5)));
    }

    #[test]
    fn test_shipper_section_layout() {
        let doc = sample_shipment();
        let mut canvas = Canvas::new(PAGE_WIDTH, PAGE_HEIGHT);
        let bottom = invoice_shipper_section(&mut canvas, &doc, 24.0);

        assert_eq!(text_at(&canvas, "1.Shipper / Exporter"), Some((10.0, 24.0)));
        assert_eq!(text_at(&canvas, &doc.invoice_number), Some((197.0, 29.0)));
        assert_eq!(text_at(&canvas, &doc.invoice_date), Some((245.0, 29.0)));
        assert_eq!(text_at(&canvas, "9.No. & Date of L/C"), Some((195.0, 33.0)));
        assert_eq!(text_at(&canvas, &doc.lc_no), Some((197.0, 38.0)));
        // label + 5, company + 4, gap 1, address + 4, contact + 4, gap 1
        assert_eq!(bottom, 43.0);
    }

    #[test]
    fn test_remarks_skip_blank_lines() {
        let mut doc = sample_shipment();
        doc.shipment_type.clear();
        let mut canvas = Canvas::new(PAGE_WIDTH, PAGE_HEIGHT);
        invoice_ship_to_section(&mut canvas, &doc, 50.0);

        assert_eq!(text_at(&canvas, &doc.trade_terms), Some((197.0, 54.0)));
    }

    #[test]
    fn test_section_bottom_covers_taller_column() {
        let mut doc = sample_shipment();
        doc.additional_remarks = "Partial shipment allowed. Transshipment prohibited. \
            Documents to be presented within 21 days after the date of shipment."
            .into();
        let mut canvas = Canvas::new(PAGE_WIDTH, PAGE_HEIGHT);
        let bottom = invoice_ship_to_section(&mut canvas, &doc, 50.0);

        let lowest_text = canvas.pages()[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { y, .. } => Some(*y),
                _ => None,
            })
            .fold(0.0_f32, f32::max);
        assert!(bottom > lowest_text);
    }

    #[test]
    fn test_sections_descend() {
        let doc = sample_shipment();
        let mut canvas = Canvas::new(PAGE_WIDTH, PAGE_HEIGHT);
        let invoice_top = invoice_sections(&mut canvas, &doc, 24.0);
        let mut canvas = Canvas::new(PAGE_WIDTH, PAGE_HEIGHT);
        let packing_top = packing_sections(&mut canvas, &doc, 24.0);

        assert!(invoice_top > 24.0 && invoice_top < PAGE_HEIGHT);
        assert!(packing_top > 24.0 && packing_top < PAGE_HEIGHT);
        assert!(text_at(&canvas, "2.Customer").is_some());
        assert!(text_at(&canvas, "10.L/C Issuing Bank").is_none());
    }

    #[test]
    fn test_packing_ship_to_keeps_divider_with_empty_right_column() {
        let mut canvas = Canvas::new(PAGE_WIDTH, PAGE_HEIGHT);
        let top = 60.0;
        let bottom = packing_ship_to_section(&mut canvas, &sample_shipment(), top);
        assert!(bottom > top);

        let ops = &canvas.pages()[0].ops;
        assert!(ops.iter().any(|op| matches!(
            op,
            DrawOp::Line { x1, y1, x2, y2, .. }
                if *x1 == DIVIDER_X && *x2 == DIVIDER_X && *y1 == top - LINE_HEIGHT && *y2 == bottom
        )));
        assert!(ops.iter().all(|op| match op {
            DrawOp::Text { x, .. } => *x < DIVIDER_X,
            _ => true,
        }));
    }
}
