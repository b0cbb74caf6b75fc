use eeghub::core::HubRecord;
use eeghub::hub::{CurrentValue, LiveHub};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_empty_before_first_update() {
    let hub = LiveHub::new();

    assert_eq!(hub.snapshot(), CurrentValue::Empty);
    assert!(hub.snapshot().record().is_none());
    assert_eq!(hub.snapshot_text(), "No data received yet.");
}

#[test]
fn test_last_write_wins() {
    let hub = LiveHub::new();

    hub.update(HubRecord::Line("x".into()));
    hub.update(HubRecord::Line("y".into()));

    assert_eq!(hub.snapshot_text(), "y");
    assert_eq!(hub.snapshot().record(), Some(&HubRecord::Line("y".into())));
    assert!(!hub.snapshot().is_empty());
}

#[test]
fn test_snapshot_unaffected_by_later_update() {
    let hub = LiveHub::new();
    hub.update(HubRecord::Line("first".into()));

    let held = hub.snapshot();
    hub.update(HubRecord::Line("second".into()));

    assert_eq!(held.record(), Some(&HubRecord::Line("first".into())));
    assert_eq!(hub.snapshot_text(), "second");
}

#[test]
fn test_concurrent_readers_see_only_written_values_in_order() {
    const UPDATES: u64 = 20_000;

    let hub = Arc::new(LiveHub::new());
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let hub = Arc::clone(&hub);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut last_sequence = 0;
                let mut observed = 0u64;
                while !done.load(Ordering::Acquire) {
                    match hub.snapshot() {
                        CurrentValue::Empty => assert_eq!(last_sequence, 0),
                        CurrentValue::Populated { sequence, record } => {
                            // The writer stores "r{n}" as update number n
                            assert_eq!(*record, HubRecord::Line(format!("r{}", sequence)));
                            assert!(sequence >= last_sequence);
                            last_sequence = sequence;
                            observed += 1;
                        }
                    }
                }
                observed
            })
        })
        .collect();

    let writer = {
        let hub = Arc::clone(&hub);
        thread::spawn(move || {
            for n in 1..=UPDATES {
                let sequence = hub.update(HubRecord::Line(format!("r{}", n)));
                assert_eq!(sequence, n);
            }
        })
    };

    writer.join().unwrap();
    done.store(true, Ordering::Release);
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(hub.snapshot().sequence(), UPDATES);
    assert_eq!(hub.snapshot_text(), format!("r{}", UPDATES));
}
