mod mock_venue;

use std::sync::Arc;
use std::time::Duration;

use corelib::Venue;
use engine::{EngineConfig, Pipeline};
use mock_venue::MockVenue;
use scheduler::{ReportStore, SchedulerError, TickRunner};
use tokio::sync::{mpsc, watch};

fn pipeline(a: MockVenue, b: MockVenue, lookup_timeout: Duration) -> Arc<Pipeline> {
    let cfg = EngineConfig {
        lookup_timeout,
        ..Default::default()
    };
    Arc::new(Pipeline::new(cfg, Arc::new(a), Arc::new(b)).unwrap())
}

#[tokio::test(start_paused = true)]
async fn every_tick_publishes_a_newer_report() {
    let store = ReportStore::new();
    let (report_tx, mut report_rx) = mpsc::channel(8);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let runner = TickRunner::new(
        pipeline(MockVenue::new(Venue::A), MockVenue::new(Venue::B), Duration::from_secs(5)),
        store.clone(),
        Duration::from_secs(10),
    )
    .unwrap()
    .with_report_channel(report_tx);
    let handle = runner.spawn(shutdown_rx);

    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(report_rx.recv().await.unwrap().run_id);
    }
    assert_eq!(ids, [1, 2, 3]);

    let latest = store.latest().await.unwrap();
    assert_eq!(latest.run_id, 3);
    assert_eq!(latest.contract_counts.venue_a, 1);

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn overrunning_runs_are_aborted_and_never_stored() {
    let store = ReportStore::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Each run needs 15s but a new tick fires every 10s.
    let runner = TickRunner::new(
        pipeline(
            MockVenue::stalling(Venue::A, Duration::from_secs(15)),
            MockVenue::new(Venue::B),
            Duration::from_secs(60),
        ),
        store.clone(),
        Duration::from_secs(10),
    )
    .unwrap();
    let handle = runner.spawn(shutdown_rx);

    tokio::time::sleep(Duration::from_secs(45)).await;
    assert!(store.latest().await.is_none());

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
    assert!(store.latest().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_shutdown_sender_stops_the_runner() {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = TickRunner::new(
        pipeline(MockVenue::new(Venue::A), MockVenue::new(Venue::B), Duration::from_secs(5)),
        ReportStore::new(),
        Duration::from_secs(1),
    )
    .unwrap()
    .spawn(shutdown_rx);

    drop(shutdown_tx);
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("runner should stop")
        .unwrap();
}

#[test]
fn zero_interval_is_rejected_up_front() {
    let result = TickRunner::new(
        pipeline(MockVenue::new(Venue::A), MockVenue::new(Venue::B), Duration::from_secs(5)),
        ReportStore::new(),
        Duration::ZERO,
    );
    assert_eq!(result.err(), Some(SchedulerError::ZeroInterval));
}
