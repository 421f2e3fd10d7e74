use lopdf::Document;
use shipdoc::canvas::DrawOp;
use shipdoc::{
    layout_commercial_invoice, render_combined, render_commercial_invoice, render_packing_list,
    GeneratorOptions, ShipmentDocument,
};

fn shipment() -> ShipmentDocument {
    serde_json::from_str(include_str!("fixtures/shipment.json")).unwrap()
}

fn page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes).unwrap().get_pages().len()
}

#[test]
fn renders_each_kind_with_expected_pages() {
    let doc = shipment();
    let options = GeneratorOptions::default();

    let invoice = render_commercial_invoice(&doc, &options, None).unwrap();
    let packing = render_packing_list(&doc, &options, None).unwrap();
    let combined = render_combined(&doc, &options, None).unwrap();

    assert_eq!(invoice.file_name, "SM-2024-0315_Commercial_Invoice.pdf");
    assert_eq!(packing.file_name, "SM-2024-0315_Packing_List.pdf");
    assert_eq!(combined.file_name, "SM-2024-0315_Combined.pdf");

    assert_eq!(page_count(&invoice.bytes), 1);
    assert_eq!(page_count(&packing.bytes), 1);
    assert_eq!(page_count(&combined.bytes), 2);
}

#[test]
fn output_is_byte_identical_across_runs() {
    let doc = shipment();
    let options = GeneratorOptions::default();

    for _ in 0..3 {
        let a = render_combined(&doc, &options, None).unwrap();
        let b = render_combined(&doc, &options, None).unwrap();
        assert!(a.bytes == b.bytes);
    }
}

#[test]
fn pages_are_landscape_a4() {
    let file = render_packing_list(&shipment(), &GeneratorOptions::default(), None).unwrap();
    let pdf = Document::load_mem(&file.bytes).unwrap();
    let (_, page_id) = pdf.get_pages().into_iter().next().unwrap();

    let media_box = pdf
        .get_dictionary(page_id)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_float().unwrap_or_else(|_| v.as_i64().unwrap() as f32))
        .collect::<Vec<f32>>();

    // 297 x 210 mm in points
    assert!((media_box[2] - 841.89).abs() < 0.5);
    assert!((media_box[3] - 595.28).abs() < 0.5);
}

#[test]
fn everything_stays_on_the_page() {
    let canvas = layout_commercial_invoice(&shipment(), &GeneratorOptions::default(), None);
    let page = &canvas.pages()[0];

    for op in &page.ops {
        let (x, y) = match op {
            DrawOp::Text { x, y, .. } => (*x, *y),
            DrawOp::Line { x2, y2, .. } => (*x2, *y2),
            DrawOp::Rect { x, y, w, h, .. } => (x + w, y + h),
            DrawOp::Image { x, y, w, h, .. } => (x + w, y + h),
        };
        assert!(x <= page.width && y <= page.height, "{op:?} is off the page");
    }
}

#[test]
fn missing_optional_fields_render() {
    let doc: ShipmentDocument = serde_json::from_str(
        r#"{
            "invoiceNumber": "SM-EMPTY",
            "boxes": [{ "quantity": null }],
            "items": [{ "sequence": 1, "unitPrice": "", "amount": null }]
        }"#,
    )
    .unwrap();

    let file = render_combined(&doc, &GeneratorOptions::default(), None).unwrap();
    assert_eq!(page_count(&file.bytes), 2);
}

#[test]
fn long_shipments_continue_on_extra_pages() {
    let mut doc = shipment();
    let first = doc.items[0].clone();
    doc.items = (1..=40)
        .map(|n| shipdoc::model::LineItem {
            sequence: Some(n),
            ..first.clone()
        })
        .collect();

    let options = GeneratorOptions::default();
    let invoice = page_count(&render_commercial_invoice(&doc, &options, None).unwrap().bytes);
    let packing = page_count(&render_packing_list(&doc, &options, None).unwrap().bytes);
    let combined = page_count(&render_combined(&doc, &options, None).unwrap().bytes);

    assert!(invoice > 1);
    assert!(packing > 1);
    assert_eq!(combined, invoice + packing);
}
