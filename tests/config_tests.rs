use eeghub::config::HubConfig;
use eeghub::core::PacketGeometry;
use eeghub::error::ConfigError;
use eeghub::hal::Framing;
use eeghub::resilience::RetryPolicy;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_partial_config_keeps_defaults() {
    let config = HubConfig::from_json(r#"{"port": 9191}"#).unwrap();

    assert_eq!(config.port, 9191);
    assert_eq!(config.address, "127.0.0.1");
    assert_eq!(config.framing, Framing::Lines);
    assert_eq!(config.retry, RetryPolicy::Fixed { delay_ms: 1000 });
}

#[test]
fn test_frames_framing_and_retry() {
    let json = r#"{
        "address": "0.0.0.0",
        "framing": {
            "mode": "frames",
            "geometry": { "header_bytes": 3, "channel_count": 32 },
            "extract_events": true
        },
        "retry": { "kind": "exponential", "base_ms": 100, "max_ms": 5000 },
        "placeholder": "waiting"
    }"#;

    let config = HubConfig::from_json(json).unwrap();

    assert_eq!(config.bind_address(), "0.0.0.0:9090");
    assert_eq!(
        config.framing,
        Framing::Frames {
            geometry: PacketGeometry::THIRTY_TWO_CHANNEL,
            extract_events: true,
        }
    );
    assert_eq!(
        config.retry,
        RetryPolicy::Exponential { base_ms: 100, max_ms: 5000 }
    );
    assert_eq!(config.placeholder, "waiting");
}

#[test]
fn test_invalid_geometry_rejected() {
    let json = r#"{"framing": {"mode": "frames", "geometry": {"header_bytes": 3, "channel_count": 0}}}"#;

    assert!(matches!(
        HubConfig::from_json(json),
        Err(ConfigError::Geometry(_))
    ));
}

#[test]
fn test_malformed_json_rejected() {
    assert!(matches!(
        HubConfig::from_json("{ port: }"),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"port": 0, "max_line_bytes": 4096}}"#).unwrap();

    let config = HubConfig::load(file.path()).unwrap();
    assert_eq!(config.port, 0);
    assert_eq!(config.max_line_bytes, 4096);

    assert!(matches!(
        HubConfig::load(file.path().with_extension("missing")),
        Err(ConfigError::Read { .. })
    ));
}
