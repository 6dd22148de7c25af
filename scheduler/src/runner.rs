//! Periodic driver for the pipeline.
//!
//! Each tick starts a fresh run on its own task. A run still in flight when
//! the next tick fires is aborted and its partial results are discarded.

use std::sync::Arc;
use std::time::Duration;

use corelib::PipelineReport;
use engine::Pipeline;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::SchedulerError;
use crate::store::ReportStore;

pub type ReportSender = mpsc::Sender<Arc<PipelineReport>>;

pub struct TickRunner {
    pipeline: Arc<Pipeline>,
    store: ReportStore,
    interval: Duration,
    report_tx: Option<ReportSender>,
}

impl TickRunner {
    pub fn new(
        pipeline: Arc<Pipeline>,
        store: ReportStore,
        interval: Duration,
    ) -> Result<Self, SchedulerError> {
        if interval.is_zero() {
            return Err(SchedulerError::ZeroInterval);
        }
        Ok(Self {
            pipeline,
            store,
            interval,
            report_tx: None,
        })
    }

    /// Also publish every stored report on `tx`.
    pub fn with_report_channel(mut self, tx: ReportSender) -> Self {
        self.report_tx = Some(tx);
        self
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Tick until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut in_flight: Option<JoinHandle<()>> = None;
        let mut run_id: u64 = 0;

        info!(interval_ms = self.interval.as_millis() as u64, "tick runner started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(prev) = in_flight.take() {
                        if !prev.is_finished() {
                            warn!(run_id, "previous run still in flight; aborting it");
                            prev.abort();
                        }
                    }
                    run_id += 1;
                    in_flight = Some(self.start_run(run_id));
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        if let Some(h) = in_flight {
            h.abort();
        }
        info!(last_run_id = run_id, "tick runner stopped");
    }

    fn start_run(&self, run_id: u64) -> JoinHandle<()> {
        let pipeline = Arc::clone(&self.pipeline);
        let store = self.store.clone();
        let report_tx = self.report_tx.clone();

        tokio::spawn(async move {
            let report = Arc::new(pipeline.run_now(run_id).await);

            if !store.replace(Arc::clone(&report)).await {
                debug!(run_id, "newer report already stored; dropping");
                return;
            }
            if let Some(tx) = report_tx {
                if tx.send(report).await.is_err() {
                    debug!(run_id, "report receiver gone");
                }
            }
        })
    }
}
