//! Migration pipeline orchestration.
//!
//! A fixed pool of workers drains a bounded channel of queue handles fed by
//! the enumerator. Each queue is owned by exactly one worker for its whole
//! migration, so workers share nothing but the channel.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::instrument::WithSubscriber;
use tracing::{debug, error, info};

use crate::config::{MigrationConfig, MigrationOptions};
use crate::connectors::{
    create_destination, create_source, DestinationQueueService, SourceQueueService,
};
use crate::enumerator::list_all_queues;
use crate::error::Result;
use crate::migrator::{QueueMigrator, QueueOutcome};
use crate::queue::QueueRef;

/// Migration statistics.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MigrationStats {
    /// Queues handed to workers.
    pub queues_total: u64,
    /// Queues that reached the end of their migration.
    pub queues_migrated: u64,
    /// Queues aborted part way.
    pub queues_failed: u64,
    /// Messages moved to the destination.
    pub messages_moved: u64,
    /// Message batches processed.
    pub batches: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
}

impl MigrationStats {
    /// Calculate throughput (messages per second).
    #[must_use]
    pub fn throughput(&self) -> f64 {
        if self.duration_secs > 0.0 {
            self.messages_moved as f64 / self.duration_secs
        } else {
            0.0
        }
    }

    fn record(&mut self, outcome: &QueueOutcome) {
        if outcome.is_success() {
            self.queues_migrated += 1;
        } else {
            self.queues_failed += 1;
        }
        self.messages_moved += outcome.messages();
        self.batches += outcome.batches();
    }

    fn merge(&mut self, other: &Self) {
        self.queues_migrated += other.queues_migrated;
        self.queues_failed += other.queues_failed;
        self.messages_moved += other.messages_moved;
        self.batches += other.batches;
    }
}

/// Migration pipeline.
pub struct Pipeline {
    options: MigrationOptions,
    source: Arc<dyn SourceQueueService>,
    migrator: Arc<QueueMigrator>,
    show_progress: bool,
}

impl Pipeline {
    /// Create a pipeline talking to the services named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if either client cannot be created.
    pub fn new(config: MigrationConfig) -> Result<Self> {
        let source = create_source(&config)?;
        let destination = create_destination(&config)?;
        Ok(Self::with_services(config.options, source, destination))
    }

    /// Create a pipeline over already-built services.
    pub fn with_services(
        options: MigrationOptions,
        source: Arc<dyn SourceQueueService>,
        destination: Arc<dyn DestinationQueueService>,
    ) -> Self {
        let migrator = Arc::new(QueueMigrator::new(Arc::clone(&source), destination, &options));
        Self {
            options,
            source,
            migrator,
            show_progress: false,
        }
    }

    /// Draw a progress bar over migrated queues.
    #[must_use]
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Run the migration.
    ///
    /// With a single queue configured, migrates just that queue on the
    /// calling task. Otherwise enumerates the source and fans the queues out
    /// to `threads` workers, returning once every worker has exited.
    pub async fn run(&self) -> MigrationStats {
        let start = std::time::Instant::now();

        let single = self.options.queue.as_deref().filter(|q| !q.is_empty());
        let mut stats = match single {
            Some(name) => self.run_single(name).await,
            None => self.run_all().await,
        };

        stats.duration_secs = start.elapsed().as_secs_f64();
        stats
    }

    async fn run_single(&self, name: &str) -> MigrationStats {
        let outcome = self.migrator.migrate(&QueueRef::new(name)).await;
        let mut stats = MigrationStats {
            queues_total: 1,
            ..MigrationStats::default()
        };
        stats.record(&outcome);
        stats
    }

    async fn run_all(&self) -> MigrationStats {
        let threads = self.options.threads.max(1);
        let (tx, rx) = mpsc::channel::<QueueRef>(threads);
        let rx = Arc::new(Mutex::new(rx));
        let progress = create_progress_bar(self.show_progress);

        let mut workers = JoinSet::new();
        for worker in 0..threads {
            let rx = Arc::clone(&rx);
            let migrator = Arc::clone(&self.migrator);
            let progress = progress.clone();

            workers.spawn(async move {
                let mut stats = MigrationStats::default();
                loop {
                    let next = rx.lock().await.recv().await;
                    let Some(queue) = next else { break };

                    let outcome = migrator.migrate(&queue).await;
                    stats.record(&outcome);
                    progress.inc(1);
                }
                debug!(worker, migrated = stats.queues_migrated, "worker finished");
                stats
            }
            .with_current_subscriber());
        }

        let queues = list_all_queues(self.source.as_ref()).await;
        info!(n = queues.len(), "moving queues");
        progress.set_length(queues.len() as u64);

        let mut stats = MigrationStats {
            queues_total: queues.len() as u64,
            ..MigrationStats::default()
        };

        for queue in queues {
            if tx.send(queue).await.is_err() {
                error!("all workers exited before the queue list was drained");
                break;
            }
        }
        drop(tx);

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(worker_stats) => stats.merge(&worker_stats),
                Err(e) => error!(err = %e, "worker task failed"),
            }
        }

        progress.finish_and_clear();
        info!("doneso");
        stats
    }
}

fn create_progress_bar(show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} queues ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    pb
}
