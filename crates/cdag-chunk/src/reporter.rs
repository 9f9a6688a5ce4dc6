use std::fmt;
use std::time::{Duration, Instant};

use cdag_store::DualStore;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace, warn};

use crate::config::MIN_REPORT_INTERVAL;
use crate::error::ChunkResult;

/// Outcome of one scan of the complete map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Report {
    /// Keys in the complete map.
    pub count: usize,
    /// Change since the previous scan; `None` on the first scan.
    pub delta: Option<i64>,
    /// Wall time the scan took.
    pub elapsed: Duration,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} complete chunks stored", self.count)?;
        match self.delta {
            Some(d) if d >= 0 => write!(f, ", {d} more since last report")?,
            Some(d) => write!(f, ", {} fewer since last report", d.unsigned_abs())?,
            None => {}
        }
        write!(f, " (scan took {:.3} ms)", self.elapsed.as_secs_f64() * 1000.0)
    }
}

/// Counts the complete map and tracks growth between scans.
///
/// Read-only: it never writes to either map and takes no lock that a store
/// or retrieve would wait on.
pub struct Reporter {
    store: DualStore,
    last_count: Option<usize>,
}

impl Reporter {
    pub fn new(store: DualStore) -> Self {
        Self {
            store,
            last_count: None,
        }
    }

    /// Walk every key of the complete map once.
    pub async fn scan(&mut self) -> ChunkResult<Report> {
        let started = Instant::now();
        let count = self.store.complete_keys().await?.len();
        let elapsed = started.elapsed();

        let delta = self.last_count.map(|last| count as i64 - last as i64);
        self.last_count = Some(count);
        Ok(Report {
            count,
            delta,
            elapsed,
        })
    }

    /// Run [`scan`](Self::scan) every `interval` on a tokio task.
    ///
    /// The first scan happens one interval after spawning. Intervals below
    /// [`MIN_REPORT_INTERVAL`] are raised to it.
    pub fn spawn(mut self, interval: Duration) -> ReporterHandle {
        let interval = interval.max(MIN_REPORT_INTERVAL);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let (latest_tx, latest_rx) = watch::channel(None);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => match self.scan().await {
                        Ok(report) => {
                            if report.delta.is_some_and(|d| d != 0) {
                                debug!(count = report.count, delta = report.delta, "{report}");
                            } else {
                                trace!(count = report.count, "{report}");
                            }
                            latest_tx.send_replace(Some(report));
                        }
                        Err(e) => warn!(error = %e, "chunk report failed"),
                    },
                }
            }
            debug!("reporter stopped");
        });

        ReporterHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
            latest: latest_rx,
        }
    }
}

/// Owns a running reporter task.
///
/// [`shutdown`](Self::shutdown) stops the task and waits for it. Dropping the
/// handle without calling it aborts the task.
pub struct ReporterHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    latest: watch::Receiver<Option<Report>>,
}

impl ReporterHandle {
    /// Most recent successful report, if any scan has completed.
    pub fn latest(&self) -> Option<Report> {
        *self.latest.borrow()
    }

    /// Wait until the next report is published.
    ///
    /// Returns `None` once the reporter has stopped.
    pub async fn next_report(&mut self) -> Option<Report> {
        self.latest.changed().await.ok()?;
        *self.latest.borrow_and_update()
    }

    /// Stop the reporter and wait for the task to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "reporter task panicked");
                }
            }
        }
    }
}

impl Drop for ReporterHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
