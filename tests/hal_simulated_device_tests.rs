use eeghub::codec::{align, decode, LoadOutcome};
use eeghub::core::{Frame, PacketGeometry};
use eeghub::hal::mock::{EventInjection, SimulatedDevice, SimulatedDeviceConfig};

#[test]
fn test_counter_wraps_at_256() {
    let mut device = SimulatedDevice::new(SimulatedDeviceConfig {
        seed: Some(3),
        ..Default::default()
    });

    let counters: Vec<u8> = (0..300)
        .map(|_| device.next_frame().unwrap()[0])
        .collect();

    assert_eq!(counters[0], 0);
    assert_eq!(counters[255], 255);
    assert_eq!(counters[256], 0);
    assert_eq!(counters[299], 43);
}

#[test]
fn test_drop_every_skips_counter_values() {
    let mut device = SimulatedDevice::new(SimulatedDeviceConfig {
        drop_every: Some(3),
        seed: Some(3),
        ..Default::default()
    });

    let counters: Vec<u8> = (0..6).map(|_| device.next_frame().unwrap()[0]).collect();

    assert_eq!(counters, vec![0, 1, 3, 4, 6, 7]);
}

#[test]
fn test_same_seed_same_capture() {
    let config = SimulatedDeviceConfig {
        geometry: PacketGeometry::THIRTY_TWO_CHANNEL,
        seed: Some(99),
        ..Default::default()
    };

    let a = SimulatedDevice::new(config.clone()).capture(20).unwrap();
    let b = SimulatedDevice::new(config).capture(20).unwrap();

    assert_eq!(a.len(), 20 * 99);
    assert_eq!(a, b);
}

#[test]
fn test_injected_event_decodes_as_marker() {
    let geometry = PacketGeometry::EIGHT_CHANNEL;
    let mut device = SimulatedDevice::new(SimulatedDeviceConfig {
        geometry,
        amplitude: 0.0,
        noise: 0.0,
        event: Some(EventInjection {
            channel: 5,
            code: 0xC8,
            every: 4,
        }),
        seed: Some(0),
        ..Default::default()
    });

    let bytes = device.capture(8).unwrap();
    let LoadOutcome::Aligned(frames) = align(&bytes, geometry) else {
        panic!("expected frames");
    };

    let marked: Vec<u64> = frames
        .iter()
        .filter(|frame| !decode(frame, true).events.is_empty())
        .map(|frame| frame.index())
        .collect();
    assert_eq!(marked, vec![0, 4]);

    let first = Frame::new(geometry, 0, &bytes[..geometry.packet_size()]).unwrap();
    assert_eq!(first.triplet(5), [0xC8, 0, 0]);
}

#[test]
fn test_samples_stay_in_range() {
    let mut device = SimulatedDevice::new(SimulatedDeviceConfig {
        amplitude: 1.0,
        noise: 1.0,
        seed: Some(11),
        ..Default::default()
    });

    // encode_frame rejects out-of-range samples
    for _ in 0..500 {
        assert!(device.next_frame().is_ok());
    }
}

#[test]
fn test_lines_advance_over_time() {
    let mut device = SimulatedDevice::new(SimulatedDeviceConfig {
        noise: 0.0,
        seed: Some(5),
        ..Default::default()
    });

    let first = device.next_line(2);
    let second = device.next_line(2);

    assert_ne!(first, second);
    assert!(first
        .trim_end()
        .split(',')
        .all(|value| value.parse::<f64>().is_ok()));
}
