use std::sync::Arc;

use corelib::PipelineReport;
use tokio::sync::RwLock;

/// Latest completed pipeline report.
///
/// Each write replaces the previous report wholesale; readers never see a mix
/// of two runs. A report older than the stored one is rejected.
#[derive(Clone, Default)]
pub struct ReportStore {
    inner: Arc<RwLock<Option<Arc<PipelineReport>>>>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn latest(&self) -> Option<Arc<PipelineReport>> {
        self.inner.read().await.clone()
    }

    /// Store `report` unless a report with a higher or equal run id is already
    /// held. Returns whether it was stored.
    pub async fn replace(&self, report: Arc<PipelineReport>) -> bool {
        let mut g = self.inner.write().await;
        if g.as_ref().is_some_and(|cur| cur.run_id >= report.run_id) {
            return false;
        }
        *g = Some(report);
        true
    }
}
