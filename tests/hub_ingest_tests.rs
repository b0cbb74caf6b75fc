use anyhow::Result;
use eeghub::codec::encode_frame;
use eeghub::config::HubConfig;
use eeghub::core::{HubRecord, PacketGeometry};
use eeghub::engine::{HubRuntime, IngestState, RuntimeStatus};
use eeghub::hal::Framing;
use eeghub::resilience::RetryPolicy;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

fn local_config() -> HubConfig {
    HubConfig {
        port: 0,
        ..Default::default()
    }
}

/// Poll `condition` until it holds or five seconds pass
async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within 5s"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_lines_reach_the_hub() -> Result<()> {
    let mut runtime = HubRuntime::new(local_config());
    runtime.start().await?;
    assert_eq!(runtime.status(), RuntimeStatus::Running);

    let hub = runtime.hub();
    assert_eq!(hub.snapshot_text(), "No data received yet.");

    let mut stream = TcpStream::connect(runtime.local_addr().unwrap()).await?;
    stream.write_all(b"0.1,0.2,0.3\n").await?;
    wait_until(|| hub.snapshot_text() == "0.1,0.2,0.3").await;

    stream.write_all(b"0.4,0.5,0.6\r\n").await?;
    wait_until(|| hub.snapshot_text() == "0.4,0.5,0.6").await;

    let metrics = runtime.metrics().snapshot();
    assert_eq!(metrics.records_ingested, 2);
    assert_eq!(metrics.connections_total, 1);

    runtime.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_reaccepts_after_producer_disconnects() -> Result<()> {
    let mut runtime = HubRuntime::new(local_config());
    runtime.start().await?;
    let addr = runtime.local_addr().unwrap();
    let hub = runtime.hub();
    let state = runtime.ingest_state().unwrap();

    let mut first = TcpStream::connect(addr).await?;
    first.write_all(b"first\n").await?;
    wait_until(|| hub.snapshot_text() == "first").await;

    drop(first);
    wait_until(|| *state.borrow() == IngestState::Accepting).await;
    // Last value survives the disconnect
    assert_eq!(hub.snapshot_text(), "first");

    let mut second = TcpStream::connect(addr).await?;
    second.write_all(b"second\n").await?;
    wait_until(|| hub.snapshot_text() == "second").await;

    let metrics = runtime.metrics().snapshot();
    assert_eq!(metrics.connections_total, 2);
    assert_eq!(metrics.connections_superseded, 0);

    runtime.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_newer_connection_supersedes_current() -> Result<()> {
    let mut runtime = HubRuntime::new(local_config());
    runtime.start().await?;
    let addr = runtime.local_addr().unwrap();
    let hub = runtime.hub();
    let metrics = runtime.metrics();

    let mut old = TcpStream::connect(addr).await?;
    old.write_all(b"old\n").await?;
    wait_until(|| hub.snapshot_text() == "old").await;

    let mut new = TcpStream::connect(addr).await?;
    wait_until(|| metrics.snapshot().connections_superseded == 1).await;
    new.write_all(b"new\n").await?;
    wait_until(|| hub.snapshot_text() == "new").await;

    // The superseded connection is no longer read
    let _ = old.write_all(b"stale\n").await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(hub.snapshot_text(), "new");

    runtime.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_oversized_line_dropped_and_stream_continues() -> Result<()> {
    let mut runtime = HubRuntime::new(HubConfig {
        max_line_bytes: 8,
        ..local_config()
    });
    runtime.start().await?;
    let hub = runtime.hub();

    let mut stream = TcpStream::connect(runtime.local_addr().unwrap()).await?;
    stream.write_all(b"0123456789abcdef\nok\n").await?;
    wait_until(|| hub.snapshot_text() == "ok").await;

    let metrics = runtime.metrics().snapshot();
    assert_eq!(metrics.records_dropped, 1);
    assert_eq!(metrics.records_ingested, 1);

    runtime.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_frames_decoded_and_gaps_counted() -> Result<()> {
    let geometry = PacketGeometry::EIGHT_CHANNEL;
    let mut runtime = HubRuntime::new(HubConfig {
        framing: Framing::Frames {
            geometry,
            extract_events: true,
        },
        ..local_config()
    });
    runtime.start().await?;
    let hub = runtime.hub();
    let metrics = runtime.metrics();

    let mut payload = Vec::new();
    for counter in [0u8, 1, 3] {
        let samples = [i32::from(counter); 8];
        payload.extend(encode_frame(geometry, counter, &samples)?);
    }
    let mut stream = TcpStream::connect(runtime.local_addr().unwrap()).await?;
    stream.write_all(&payload).await?;

    wait_until(|| metrics.snapshot().records_ingested == 3).await;
    assert_eq!(metrics.snapshot().sync_gaps, 1);
    assert_eq!(metrics.snapshot().bytes_received, 81);

    match hub.snapshot().record() {
        Some(HubRecord::Decoded(record)) => {
            assert_eq!(record.frame_index, 2);
            assert_eq!(record.counter, 3);
            assert_eq!(record.samples, vec![3; 8]);
        }
        other => panic!("expected decoded record, got {:?}", other),
    }

    runtime.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_shutdown_closes_listener_and_keeps_value() -> Result<()> {
    let mut runtime = HubRuntime::new(local_config());
    runtime.start().await?;
    let addr = runtime.local_addr().unwrap();
    let hub = runtime.hub();
    let state = runtime.ingest_state().unwrap();

    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(b"last\n").await?;
    wait_until(|| hub.snapshot_text() == "last").await;

    runtime.shutdown().await?;
    assert_eq!(runtime.status(), RuntimeStatus::Stopped);
    assert_eq!(*state.borrow(), IngestState::Stopped);
    assert!(TcpStream::connect(addr).await.is_err());
    assert_eq!(hub.snapshot_text(), "last");

    Ok(())
}

#[tokio::test]
async fn test_bind_conflict_fails_start() -> Result<()> {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = occupied.local_addr()?.port();

    let mut runtime = HubRuntime::new(HubConfig {
        port,
        ..local_config()
    });

    assert!(runtime.start().await.is_err());
    assert_eq!(runtime.status(), RuntimeStatus::Error);
    assert!(runtime.local_addr().is_none());

    Ok(())
}

#[tokio::test]
async fn test_double_start_rejected() -> Result<()> {
    let mut runtime = HubRuntime::new(local_config());
    runtime.start().await?;

    assert!(runtime.start().await.is_err());
    assert_eq!(runtime.status(), RuntimeStatus::Running);

    runtime.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_invalid_frame_geometry_fails_start() -> Result<()> {
    let mut runtime = HubRuntime::new(HubConfig {
        framing: Framing::Frames {
            geometry: PacketGeometry {
                header_bytes: 0,
                channel_count: 0,
            },
            extract_events: false,
        },
        ..local_config()
    });

    assert!(runtime.start().await.is_err());
    assert_eq!(runtime.status(), RuntimeStatus::Error);
    assert!(runtime.local_addr().is_none());

    Ok(())
}

#[tokio::test]
#[allow(deprecated)]
async fn test_reset_backs_off_then_accepts_next_producer() -> Result<()> {
    let mut runtime = HubRuntime::new(HubConfig {
        retry: RetryPolicy::Fixed { delay_ms: 300 },
        ..local_config()
    });
    runtime.start().await?;
    let addr = runtime.local_addr().unwrap();
    let hub = runtime.hub();
    let metrics = runtime.metrics();
    let state = runtime.ingest_state().unwrap();

    let mut first = TcpStream::connect(addr).await?;
    first.write_all(b"before reset\n").await?;
    wait_until(|| hub.snapshot_text() == "before reset").await;

    // Zero linger turns the close into an RST
    first.set_linger(Some(Duration::ZERO))?;
    drop(first);

    wait_until(|| *state.borrow() == IngestState::Backoff { attempt: 1 }).await;
    assert_eq!(metrics.snapshot().read_errors, 1);
    wait_until(|| *state.borrow() == IngestState::Accepting).await;

    let mut second = TcpStream::connect(addr).await?;
    second.write_all(b"after reset\n").await?;
    wait_until(|| hub.snapshot_text() == "after reset").await;

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.read_errors, 1);
    assert_eq!(snapshot.connections_total, 2);

    runtime.shutdown().await?;
    Ok(())
}
