//! # Receipt Composer
//!
//! Pure transform from a [`ServiceRecord`] to a [`ReceiptDocument`].
//!
//! `compose` is deterministic and total: every valid record produces a
//! document, empty fields render as empty text rather than failing, and
//! the timestamp comes from the record itself so equal inputs always give
//! byte-identical documents. No I/O happens here.
//!
//! ## Layout
//!
//! ```text
//! ┌────────────────────────────────┐
//! │            CMS                 │  shop name, double size, centered
//! │   Computer & Mobile Service    │  header lines
//! │       +389 70 402 386          │
//! │     21-Aug-26    14:03:17      │  timestamp from created_at
//! │ ------------------------------ │
//! │ Emri/Ime: Ana K                │  left-aligned intake block
//! │ Mob: cracked screen            │
//! │                                │
//! │ Tel: 070123456   Cmimi: 25.00  │
//! │ ------------------------------ │
//! │  Për servisimin ... me SMS     │  closing lines, centered
//! │        Ju Faleminderit         │
//! └────────────────────────────────┘  cut
//! ```

use crate::config::ReceiptLayout;
use crate::document::{Alignment, ReceiptDocument, TextSize};
use crate::record::ServiceRecord;

/// Timestamp formats on the receipt, fixed by the layout.
const DATE_FORMAT: &str = "%d-%b-%y";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Compose the receipt document for one service record.
pub fn compose(record: &ServiceRecord, layout: &ReceiptLayout) -> ReceiptDocument {
    let mut doc = ReceiptDocument::new();

    // Header: shop name big and centered, then the subtitle lines.
    doc.align(Alignment::Center).size(TextSize::Double);
    doc.text(&layout.shop_name);
    doc.size(TextSize::Normal);
    for line in &layout.header_lines {
        doc.text(line);
    }
    doc.text(format!(
        "{}\t{}",
        record.created_at.format(DATE_FORMAT),
        record.created_at.format(TIME_FORMAT)
    ));
    doc.text(layout.divider());

    // Intake block, left-aligned.
    doc.align(Alignment::Left);
    doc.text(format!("{}: {}", layout.name_label, record.full_name));
    doc.text(format!("{}: {}", record.device_type, record.problem));
    doc.feed(2);
    doc.text(format!(
        "{}: {} \t {}: {}{}",
        layout.phone_label,
        record.phone_number,
        layout.price_label,
        record.price,
        layout.currency_suffix
    ));
    doc.text(layout.divider());

    // Closing message, centered.
    doc.align(Alignment::Center);
    for line in &layout.closing_lines {
        doc.text(line);
    }
    doc.feed(1);
    doc.cut();

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Directive;
    use crate::record::DeviceType;
    use chrono::TimeZone;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn sample() -> ServiceRecord {
        ServiceRecord {
            full_name: "Ana K".to_string(),
            device_type: DeviceType::Mob,
            problem: "cracked screen".to_string(),
            phone_number: "070123456".to_string(),
            price: Decimal::new(2500, 2),
            is_ready: None,
            created_at: Utc.with_ymd_and_hms(2026, 8, 21, 14, 3, 17).unwrap(),
        }
    }

    #[test]
    fn test_compose_is_deterministic() {
        let record = sample();
        let layout = ReceiptLayout::default();
        assert_eq!(compose(&record, &layout), compose(&record, &layout));
    }

    #[test]
    fn test_compose_is_well_formed() {
        let doc = compose(&sample(), &ReceiptLayout::default());
        assert!(doc.is_well_formed());
    }

    #[test]
    fn test_compose_renders_problem_line() {
        let doc = compose(&sample(), &ReceiptLayout::default());
        assert!(doc.text_lines().any(|l| l == "Mob: cracked screen"));
    }

    #[test]
    fn test_compose_renders_price_row_with_currency() {
        let layout = ReceiptLayout::default();
        let doc = compose(&sample(), &layout);
        let price_row = doc
            .text_lines()
            .find(|l| l.contains("25.00"))
            .expect("price row present");
        assert!(price_row.contains("070123456"));
        assert!(price_row.ends_with(&layout.currency_suffix));
    }

    #[test]
    fn test_compose_renders_timestamp_from_record() {
        let doc = compose(&sample(), &ReceiptLayout::default());
        assert!(doc.text_lines().any(|l| l == "21-Aug-26\t14:03:17"));
    }

    #[test]
    fn test_compose_is_total_over_empty_fields() {
        let mut record = sample();
        record.full_name.clear();
        record.problem.clear();
        record.phone_number.clear();
        let doc = compose(&record, &ReceiptLayout::default());
        assert!(doc.is_well_formed());
        assert!(doc.text_lines().any(|l| l == "Emri/Ime: "));
    }

    #[test]
    fn test_shop_name_is_double_size_centered() {
        let doc = compose(&sample(), &ReceiptLayout::default());
        let directives = doc.directives();
        // Init, center, double, shop name — the header prefix is fixed.
        assert_eq!(directives[0], Directive::InitPrinter);
        assert_eq!(directives[1], Directive::SetAlign(Alignment::Center));
        assert_eq!(directives[2], Directive::SetSize(TextSize::Double));
        assert_eq!(directives[3], Directive::TextLine("CMS".to_string()));
        // Size returns to normal before the subtitle lines.
        assert_eq!(directives[4], Directive::SetSize(TextSize::Normal));
    }
}
