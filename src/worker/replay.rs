use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use log::{error, info, warn};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::db::models::{Checkpoint, CHECKPOINT_ID};
use crate::db::{load, save};
use crate::worker::engine::{Engine, Outcome};
use crate::worker::events::LogEvent;

const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub applied: u64,
    pub skipped: u64,
    /// Events at or before the stored checkpoint
    pub already_applied: u64,
    pub failed: u64,
}

/// Feeds an ordered NDJSON event stream through the engine, one event at a
/// time, persisting a checkpoint after each event.
pub struct Replayer {
    engine: Engine,
    halt_on_error: bool,
}

impl Replayer {
    pub fn new(engine: Engine, halt_on_error: bool) -> Self {
        Self { engine, halt_on_error }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub async fn replay_file(
        &mut self,
        path: impl AsRef<Path>,
        cancellation_token: CancellationToken,
    ) -> anyhow::Result<ReplayStats> {
        let path = path.as_ref();
        let file = File::open(path)
            .await
            .with_context(|| format!("Failed to open event file {}", path.display()))?;

        self.run(BufReader::new(file), cancellation_token).await
    }

    pub async fn run<R: AsyncBufRead + Unpin>(
        &mut self,
        reader: R,
        cancellation_token: CancellationToken,
    ) -> anyhow::Result<ReplayStats> {
        let mut stats = ReplayStats::default();
        let mut last_progress_log = Instant::now();

        let mut checkpoint = load::<Checkpoint, _>(self.engine.store(), CHECKPOINT_ID).await?;
        if let Some(ref cp) = checkpoint {
            info!(
                "[replay] resuming after block={} log_index={}",
                cp.block_number, cp.log_index
            );
        }

        let mut lines = reader.lines();
        let mut line_number = 0u64;

        while let Some(line) = lines.next_line().await.context("Failed to read event stream")? {
            line_number += 1;

            if cancellation_token.is_cancelled() {
                info!("[replay] received cancellation signal at line {}", line_number);
                break;
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let event: LogEvent = match serde_json::from_str(line) {
                Ok(event) => event,
                Err(e) => {
                    if self.halt_on_error {
                        return Err(e).with_context(|| format!("Malformed event at line {}", line_number));
                    }
                    error!("[replay] malformed event at line {}: {}", line_number, e);
                    stats.failed += 1;
                    continue;
                },
            };

            let (block_number, log_index) = (event.meta.block_number, event.meta.log_index);
            if checkpoint
                .as_ref()
                .is_some_and(|cp| cp.covers(block_number, log_index))
            {
                stats.already_applied += 1;
                continue;
            }

            match self.engine.handle(&event).await {
                Ok(Outcome::Applied) => stats.applied += 1,
                Ok(Outcome::Skipped(_)) => stats.skipped += 1,
                Err(e) => {
                    if self.halt_on_error {
                        return Err(e).with_context(|| format!("Replay halted at line {}", line_number));
                    }
                    warn!("[replay] event at line {} failed, continuing: {:#}", line_number, e);
                    stats.failed += 1;
                },
            }

            let next = Checkpoint::new(block_number, log_index);
            save(self.engine.store(), &next).await?;
            checkpoint = Some(next);

            if last_progress_log.elapsed() >= PROGRESS_LOG_INTERVAL {
                info!(
                    "[replay] at block {} (applied={} skipped={} failed={})",
                    block_number, stats.applied, stats.skipped, stats.failed
                );
                last_progress_log = Instant::now();
            }
        }

        info!(
            "[replay] done: applied={} skipped={} already_applied={} failed={} guard_firings={}",
            stats.applied,
            stats.skipped,
            stats.already_applied,
            stats.failed,
            self.engine.math().guard_firings()
        );

        Ok(stats)
    }
}
