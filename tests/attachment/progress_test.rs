//! Progress reporting while attachment bytes are read.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use courier::attachment::ProgressReader;
use courier::content::ContentStream;
use courier::events::{ProgressBus, ProgressListener};
use tokio::io::AsyncReadExt;

fn recording() -> (ProgressListener, Arc<Mutex<Vec<(u64, u64)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let listener: ProgressListener = Arc::new(move |current: u64, total: u64| {
        sink.lock().expect("lock").push((current, total));
    });
    (listener, seen)
}

fn stream(bytes: &[u8]) -> ContentStream {
    Box::new(Cursor::new(bytes.to_vec()))
}

#[tokio::test]
async fn reports_monotonic_cumulative_counts() {
    let body = vec![7u8; 10_000];
    let (listener, seen) = recording();
    let mut reader = ProgressReader::new(stream(&body), 10_000, listener);

    let mut chunk = [0u8; 1_024];
    let mut copied = Vec::new();
    loop {
        let n = reader.read(&mut chunk).await.expect("read");
        if n == 0 {
            break;
        }
        copied.extend_from_slice(&chunk[..n]);
    }

    assert_eq!(copied, body);
    assert_eq!(reader.bytes_read(), 10_000);

    let seen = seen.lock().expect("lock").clone();
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0].0 < w[1].0));
    assert!(seen.iter().all(|&(_, total)| total == 10_000));
    assert_eq!(seen.last().map(|&(current, _)| current), Some(10_000));
}

#[tokio::test]
async fn empty_stream_reports_nothing() {
    let (listener, seen) = recording();
    let mut reader = ProgressReader::new(stream(b""), 0, listener);
    let mut out = Vec::new();
    reader.read_to_end(&mut out).await.expect("read");
    assert!(out.is_empty());
    assert!(seen.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn bus_listener_feeds_subscribers() {
    let bus = ProgressBus::new(16);
    let mut rx = bus.subscribe();
    let mut reader = ProgressReader::new(stream(b"abcdef"), 6, bus.listener_for(5));
    let mut out = Vec::new();
    reader.read_to_end(&mut out).await.expect("read");

    let event = rx.recv().await.expect("event");
    assert_eq!(event.message_id, 5);
    assert_eq!(event.total, 6);
    assert_eq!(event.current, 6);
}

#[test]
fn publishing_without_subscribers_is_silent() {
    let bus = ProgressBus::new(0);
    (bus.listener_for(1))(1, 2);
}
