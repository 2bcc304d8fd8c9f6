// File: ./src/timeline.rs
use crate::config::Config;
use crate::entry::{RenderEntry, adapt};
use crate::pipeline::AggregationPipeline;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// One entry plus the instant after which it should be rebuilt.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub entry: RenderEntry,
    pub next_refresh: DateTime<Utc>,
}

pub struct TimelineProvider {
    pipeline: AggregationPipeline,
}

impl TimelineProvider {
    pub fn new(pipeline: AggregationPipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &AggregationPipeline {
        &self.pipeline
    }

    pub fn placeholder(&self) -> RenderEntry {
        RenderEntry::placeholder(self.pipeline.now())
    }

    /// Runs the pipeline once for `config`. Never fails; on any read problem
    /// the entry is the fallback one.
    pub async fn timeline(&self, config: &Config) -> Timeline {
        let now = self.pipeline.now();
        let result = self.pipeline.aggregate(config).await;
        let entry = adapt(result, &config.widget(), config.view_mode, now);
        Timeline {
            entry,
            next_refresh: now + config.refresh_interval(),
        }
    }
}

/// Handle to a running timeline actor. Dropping it stops the actor.
pub struct TimelineHandle {
    reload: mpsc::Sender<()>,
    pub entries: mpsc::Receiver<Timeline>,
}

impl TimelineHandle {
    /// Asks for an immediate rebuild. No-op if one is already queued.
    pub fn reload(&self) {
        let _ = self.reload.try_send(());
    }
}

/// Spawns the periodic driver: builds a timeline immediately, then every
/// refresh interval or on `reload()`.
pub fn spawn_timeline(provider: Arc<TimelineProvider>, config: Config) -> TimelineHandle {
    let (entry_tx, entry_rx) = mpsc::channel(4);
    let (reload_tx, mut reload_rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let interval = config.refresh_interval().to_std().unwrap_or_default();
        loop {
            let timeline = provider.timeline(&config).await;
            log::debug!(
                "Tick: mode={}, headline='{}', next refresh {}",
                timeline.entry.mode,
                timeline.entry.title,
                timeline.next_refresh
            );
            if entry_tx.send(timeline).await.is_err() {
                // Receiver gone, exit actor
                break;
            }

            tokio::select! {
                _ = sleep(interval) => {}
                msg = reload_rx.recv() => {
                    if msg.is_none() {
                        break;
                    }
                    log::debug!("Reload requested");
                }
            }
        }
    });

    TimelineHandle {
        reload: reload_tx,
        entries: entry_rx,
    }
}
