//! End-to-end pipeline tests: draft record in, ESC/POS bytes out.
//!
//! These exercise the public API the way the CLI does — store, composer,
//! encoder and transport wired together through the controller — with the
//! mock transport standing in for the printer.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use servis::compose::compose;
use servis::config::{PrintConfig, ReceiptLayout};
use servis::controller::{PrintJobController, SharedTransport};
use servis::protocol;
use servis::record::{DeviceType, ServiceRecord};
use servis::store::{MemoryStore, RecordStore};
use servis::transport::mock::{MockEvent, MockProbe};
use servis::transport::MockTransport;
use servis::PrintError;

fn draft(name: &str) -> ServiceRecord {
    ServiceRecord::draft(
        name,
        DeviceType::Mob,
        "cracked screen",
        "070123456",
        Decimal::new(2500, 2),
    )
}

fn pipeline(
    transport: MockTransport,
) -> (
    PrintJobController<MemoryStore>,
    Arc<MemoryStore>,
    MockProbe,
) {
    let probe = transport.probe();
    let shared: SharedTransport = Arc::new(Mutex::new(Box::new(transport)));
    let store = Arc::new(MemoryStore::new());
    let controller = PrintJobController::new(store.clone(), shared, &PrintConfig::default());
    (controller, store, probe)
}

#[tokio::test]
async fn test_submitted_job_is_the_encoded_receipt() {
    let (controller, store, probe) = pipeline(MockTransport::new());

    let outcome = controller.submit(draft("Ana K")).await;
    let stored = outcome.persisted.expect("persisted");
    assert!(matches!(outcome.printed, Some(Ok(()))));

    // The delivered bytes are exactly what composing and encoding the
    // stored record produces.
    let expected = protocol::encode(&compose(&stored.record, &ReceiptLayout::default()));
    let jobs = probe.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0], expected);

    // Framed as one complete document: init first, cut last.
    assert_eq!(&jobs[0][..2], [0x1B, 0x40]);
    assert_eq!(&jobs[0][jobs[0].len() - 3..], [0x1D, 0x56, 0x00]);

    assert_eq!(store.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_receipt_content_reaches_the_wire() {
    let (controller, _store, probe) = pipeline(MockTransport::new());

    let mut record = draft("Ana K");
    record.created_at = Utc.with_ymd_and_hms(2026, 8, 21, 14, 3, 17).unwrap();
    controller.submit(record).await;

    let job = probe.jobs().remove(0);
    let directives = protocol::decode(&job).expect("wire bytes decode");
    let doc = servis::document::ReceiptDocument::from_directives(directives);
    let lines: Vec<&str> = doc.text_lines().collect();

    assert_eq!(lines[0], "CMS");
    assert!(lines.contains(&"Computer & Mobile Service"));
    assert!(lines.contains(&"21-Aug-26\t14:03:17"));
    assert!(lines.contains(&"Emri/Ime: Ana K"));
    assert!(lines.contains(&"Mob: cracked screen"));
    assert!(lines.iter().any(|l| l.contains("25.00 den.")));
    assert!(lines.contains(&"Ju Faleminderit / Vi Blagodarime"));
}

#[tokio::test]
async fn test_concurrent_submissions_never_interleave_on_the_wire() {
    // A per-send delay widens the window in which a second job could
    // interleave if the transport were not serialized.
    let transport = MockTransport::new().with_send_delay(Duration::from_millis(20));
    let (controller, _store, probe) = pipeline(transport);

    tokio::join!(controller.submit(draft("Ana K")), controller.submit(draft("Bekim H")));

    assert_eq!(probe.jobs().len(), 2);

    // Every SendStart is followed by its SendEnd before the next job
    // starts; overlapping sends would show Start, Start, ...
    let send_phases: Vec<MockEvent> = probe
        .events()
        .into_iter()
        .filter(|e| matches!(e, MockEvent::SendStart | MockEvent::SendEnd))
        .collect();
    assert_eq!(
        send_phases,
        vec![
            MockEvent::SendStart,
            MockEvent::SendEnd,
            MockEvent::SendStart,
            MockEvent::SendEnd,
        ]
    );
}

#[tokio::test]
async fn test_print_failure_leaves_record_stored() {
    let transport = MockTransport::new();
    let probe = transport.probe();
    probe.fail_connect(true);
    let shared: SharedTransport = Arc::new(Mutex::new(Box::new(transport)));
    let store = Arc::new(MemoryStore::new());
    let controller = PrintJobController::new(store.clone(), shared, &PrintConfig::default());

    let outcome = controller.submit(draft("Ana K")).await;

    // Connection refused: printing failed, persistence did not.
    assert!(outcome.persisted.is_ok());
    assert!(matches!(outcome.printed, Some(Err(PrintError::Connection(_)))));
    assert!(!outcome.clear_draft());

    let all = store.list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].record.full_name, "Ana K");

    // Nothing reached the wire.
    assert!(probe.jobs().is_empty());
}

#[tokio::test]
async fn test_back_to_back_submissions_reuse_the_connection() {
    let (controller, _store, probe) = pipeline(MockTransport::new());

    controller.submit(draft("Ana K")).await;
    controller.submit(draft("Bekim H")).await;
    controller.submit(draft("Clara M")).await;

    let connects = probe
        .events()
        .iter()
        .filter(|e| **e == MockEvent::Connect)
        .count();
    assert_eq!(connects, 1);
    assert_eq!(probe.jobs().len(), 3);
}
