//! Single-queue migration: configuration first, then the message backlog.

use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::MigrationOptions;
use crate::connectors::{DestinationQueueService, SourceQueueService};
use crate::error::Error;
use crate::queue::{QueueRef, QueueSpec};

/// Maximum number of messages fetched and pushed per round trip.
pub const MESSAGES_PER_BATCH: usize = 100;

/// Step at which a queue migration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Fetching the source queue info.
    Info,
    /// Creating the destination queue.
    Create,
    /// Fetching a message batch from the source.
    FetchMessages,
    /// Pushing a message batch to the destination.
    PushMessages,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "info",
            Self::Create => "create",
            Self::FetchMessages => "fetch_messages",
            Self::PushMessages => "push_messages",
        };
        f.write_str(name)
    }
}

/// Why a created queue had no messages moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Push queues have no backlog to poll.
    PushQueue,
    /// Message transfer is disabled for the run.
    SkipMessages,
}

/// Result of migrating one queue.
#[derive(Debug)]
pub enum QueueOutcome {
    /// Queue created and its backlog drained to the destination.
    Migrated {
        /// Messages pushed (and then deleted from the source).
        messages: u64,
        /// Fetch/push/delete cycles performed.
        batches: u64,
    },
    /// Queue created; messages deliberately left alone.
    MetadataOnly {
        /// Why messages were not moved.
        reason: SkipReason,
    },
    /// Dry run: info fetched and destination definition derived, nothing written.
    DryRun {
        /// The definition that would have been created.
        spec: QueueSpec,
    },
    /// Migration stopped at `stage`; the queue may be partially migrated.
    Aborted {
        /// Failing step.
        stage: Stage,
        /// Remote error.
        error: Error,
        /// Messages already moved before the failure.
        messages: u64,
        /// Complete cycles before the failure.
        batches: u64,
    },
}

impl QueueOutcome {
    fn aborted(stage: Stage, error: Error) -> Self {
        Self::Aborted {
            stage,
            error,
            messages: 0,
            batches: 0,
        }
    }

    /// Whether the queue reached the end of its migration.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Aborted { .. })
    }

    /// Messages moved, including those moved before an abort.
    #[must_use]
    pub fn messages(&self) -> u64 {
        match self {
            Self::Migrated { messages, .. } | Self::Aborted { messages, .. } => *messages,
            _ => 0,
        }
    }

    /// Batches moved, including those moved before an abort.
    #[must_use]
    pub fn batches(&self) -> u64 {
        match self {
            Self::Migrated { batches, .. } | Self::Aborted { batches, .. } => *batches,
            _ => 0,
        }
    }
}

/// Migrates queues from a source service to a destination service.
///
/// Every step is terminal on failure: there are no retries and nothing
/// already written to the destination is rolled back.
pub struct QueueMigrator {
    source: Arc<dyn SourceQueueService>,
    destination: Arc<dyn DestinationQueueService>,
    skip_messages: bool,
    dry_run: bool,
}

impl QueueMigrator {
    /// Create a migrator over the two services.
    pub fn new(
        source: Arc<dyn SourceQueueService>,
        destination: Arc<dyn DestinationQueueService>,
        options: &MigrationOptions,
    ) -> Self {
        Self {
            source,
            destination,
            skip_messages: options.skip_messages,
            dry_run: options.dry_run,
        }
    }

    /// Migrate one queue.
    pub async fn migrate(&self, queue: &QueueRef) -> QueueOutcome {
        let q = queue.name.as_str();

        let info = match self.source.queue_info(q).await {
            Ok(info) => info,
            Err(e) => {
                error!(err = %e, q, "error getting queue info");
                return QueueOutcome::aborted(Stage::Info, e);
            }
        };

        let spec = QueueSpec::from_descriptor(&info);

        if self.dry_run {
            info!(q, queue_type = ?spec.queue_type, n = info.size, "dry run, not creating queue");
            return QueueOutcome::DryRun { spec };
        }

        if let Err(e) = self.destination.create_queue(&spec).await {
            error!(err = %e, q, "error making v3 queue");
            return QueueOutcome::aborted(Stage::Create, e);
        }

        if info.is_push() {
            info!(q, "push queue, skipping message migration");
            return QueueOutcome::MetadataOnly {
                reason: SkipReason::PushQueue,
            };
        }
        if self.skip_messages {
            info!(q, "skipping messages because you told me to");
            return QueueOutcome::MetadataOnly {
                reason: SkipReason::SkipMessages,
            };
        }

        info!(q, n = info.size, "moving messages");
        self.transfer_messages(q).await
    }

    /// Fetch, push, then delete, one batch at a time until the source is empty.
    async fn transfer_messages(&self, q: &str) -> QueueOutcome {
        let mut messages = 0u64;
        let mut batches = 0u64;

        loop {
            let batch = match self.source.get_messages(q, MESSAGES_PER_BATCH).await {
                Ok(batch) => batch,
                Err(e) => {
                    error!(err = %e, q, "error getting messages from v2 queue");
                    return QueueOutcome::Aborted {
                        stage: Stage::FetchMessages,
                        error: e,
                        messages,
                        batches,
                    };
                }
            };
            if batch.is_empty() {
                return QueueOutcome::Migrated { messages, batches };
            }

            let count = batch.len() as u64;
            let (ids, bodies): (Vec<String>, Vec<String>) =
                batch.into_iter().map(|m| (m.id, m.body)).unzip();

            if let Err(e) = self.destination.push_messages(q, &bodies).await {
                error!(err = %e, q, "error pushing messages to v3");
                return QueueOutcome::Aborted {
                    stage: Stage::PushMessages,
                    error: e,
                    messages,
                    batches,
                };
            }

            // Delete outcomes are not checked.
            for id in &ids {
                let _ = self.source.delete_message(q, id).await;
            }

            messages += count;
            batches += 1;
        }
    }
}
