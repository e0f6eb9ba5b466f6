//! Background ingestion loop
//!
//! Each cycle fetches the newest videos for the configured keyword and appends
//! every returned item to the store, then sleeps for the configured interval.
//! Cancellation is checked before every fetch and while sleeping; a fetch or a
//! persist that has started always runs to completion.
//!
//! Nothing is deduplicated: overlapping fetch windows produce duplicate rows.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::models::NewVideo;
use crate::services::store::{StoreError, VideoStore};
use crate::youtube::{SearchOrder, SearchRequest, SourceError, VideoSource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestPhase {
    #[default]
    Idle,
    Fetching,
    Persisting,
    Sleeping,
    Cancelled,
    /// Stopped by a fatal error
    Halted,
}

/// What to do when a cycle fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop ingesting and report the error
    Halt,
    /// Log, wait `base * 2^(failures - 1)` capped at `max`, then try again
    Backoff { base: Duration, max: Duration },
}

impl FailurePolicy {
    /// Delay before the next attempt, or `None` if the loop should stop
    fn retry_delay(&self, consecutive_failures: u32) -> Option<Duration> {
        match *self {
            FailurePolicy::Halt => None,
            FailurePolicy::Backoff { base, max } => {
                let factor = 2u32.saturating_pow(consecutive_failures.saturating_sub(1));
                Some(base.saturating_mul(factor).min(max))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub keyword: String,
    pub published_after: DateTime<Utc>,
    pub max_results: u32,
    pub interval: Duration,
    pub failure_policy: FailurePolicy,
}

/// Live view of the loop, published on every phase change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStatus {
    pub phase: IngestPhase,
    /// Completed cycles
    pub cycles: u64,
    /// Records written since start
    pub persisted: u64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

/// Read handle on the loop's status
#[derive(Debug, Clone)]
pub struct IngestMonitor {
    rx: watch::Receiver<IngestStatus>,
}

impl IngestMonitor {
    pub fn snapshot(&self) -> IngestStatus {
        self.rx.borrow().clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Totals for a loop that ended by cancellation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub cycles: u64,
    pub persisted: u64,
}

pub struct IngestionLoop {
    source: Arc<dyn VideoSource>,
    store: Arc<dyn VideoStore>,
    config: IngestConfig,
    status: watch::Sender<IngestStatus>,
}

impl IngestionLoop {
    pub fn new(source: Arc<dyn VideoSource>, store: Arc<dyn VideoStore>, config: IngestConfig) -> Self {
        let (status, _) = watch::channel(IngestStatus::default());
        Self {
            source,
            store,
            config,
            status,
        }
    }

    pub fn monitor(&self) -> IngestMonitor {
        IngestMonitor {
            rx: self.status.subscribe(),
        }
    }

    /// Run until `cancel` fires (`Ok`) or a cycle fails under [`FailurePolicy::Halt`] (`Err`)
    pub async fn run(self, cancel: CancellationToken) -> Result<IngestReport, IngestError> {
        let mut report = IngestReport::default();
        let mut consecutive_failures: u32 = 0;

        info!(
            keyword = %self.config.keyword,
            published_after = %self.config.published_after,
            interval_secs = self.config.interval.as_secs(),
            "[ingest] Starting"
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let wait = match self.run_cycle(&mut report).await {
                Ok(()) => {
                    consecutive_failures = 0;
                    report.cycles += 1;
                    self.status.send_modify(|s| {
                        s.cycles = report.cycles;
                        s.consecutive_failures = 0;
                    });
                    self.config.interval
                }
                Err(e) => {
                    consecutive_failures += 1;
                    let message = e.to_string();
                    self.status.send_modify(|s| {
                        s.consecutive_failures = consecutive_failures;
                        s.last_error = Some(message);
                    });

                    let Some(delay) = self.config.failure_policy.retry_delay(consecutive_failures) else {
                        error!(error = %e, cycle = report.cycles + 1, "[ingest] Cycle failed, halting");
                        self.set_phase(IngestPhase::Halted);
                        return Err(e);
                    };

                    warn!(
                        error = %e,
                        consecutive_failures,
                        retry_in_secs = delay.as_secs_f64(),
                        "[ingest] Cycle failed, backing off"
                    );
                    delay
                }
            };

            self.set_phase(IngestPhase::Sleeping);
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        self.set_phase(IngestPhase::Cancelled);
        info!(
            cycles = report.cycles,
            persisted = report.persisted,
            "[ingest] Cancelled"
        );
        Ok(report)
    }

    async fn run_cycle(&self, report: &mut IngestReport) -> Result<(), IngestError> {
        self.set_phase(IngestPhase::Fetching);
        let request = SearchRequest {
            keyword: self.config.keyword.clone(),
            published_after: self.config.published_after,
            max_results: self.config.max_results,
            order: SearchOrder::Date,
        };
        let items = self.source.search(&request).await?;

        info!(
            keyword = %request.keyword,
            items = items.len(),
            cycle = report.cycles + 1,
            "[ingest] Fetched"
        );

        self.set_phase(IngestPhase::Persisting);
        for item in items {
            let record = self.store.create(NewVideo::from(item)).await?;
            debug!(id = record.id, title = %record.title, "[ingest] Stored video");

            report.persisted += 1;
            self.status.send_modify(|s| s.persisted += 1);
        }

        Ok(())
    }

    fn set_phase(&self, phase: IngestPhase) {
        self.status.send_modify(|s| s.phase = phase);
    }
}
