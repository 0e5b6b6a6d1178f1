//! Clients for the source (v2) and destination (v3) queue services.

pub mod common;
pub mod v2;
pub mod v3;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::MigrationConfig;
use crate::error::Result;
use crate::queue::{Message, QueueDescriptor, QueueRef, QueueSpec};

/// Read side of a migration: the service queues are moved away from.
///
/// Implement this trait to migrate from another service or to drive the
/// migrator in tests.
#[async_trait]
pub trait SourceQueueService: Send + Sync {
    /// Project the service is scoped to, for logging.
    fn project_id(&self) -> &str;

    /// Lists one page of queues.
    ///
    /// # Arguments
    ///
    /// * `page` - Zero-based page index
    /// * `per_page` - Page size, at most 100
    async fn list_queues(&self, page: usize, per_page: usize) -> Result<Vec<QueueRef>>;

    /// Fetches the full configuration of a queue.
    async fn queue_info(&self, queue: &str) -> Result<QueueDescriptor>;

    /// Fetches up to `n` messages from a queue.
    async fn get_messages(&self, queue: &str, n: usize) -> Result<Vec<Message>>;

    /// Deletes one message by its source id.
    async fn delete_message(&self, queue: &str, message_id: &str) -> Result<()>;
}

/// Write side of a migration: the service queues are moved to.
#[async_trait]
pub trait DestinationQueueService: Send + Sync {
    /// Creates (or updates) a queue with the given definition.
    async fn create_queue(&self, spec: &QueueSpec) -> Result<()>;

    /// Pushes message bodies, in order, as one batch. Returns the new ids.
    async fn push_messages(&self, queue: &str, bodies: &[String]) -> Result<Vec<String>>;
}

/// Create the source client from configuration.
pub fn create_source(config: &MigrationConfig) -> Result<Arc<dyn SourceQueueService>> {
    let client = v2::V2Client::new(config.source.clone(), request_timeout(config))?;
    Ok(Arc::new(client))
}

/// Create the destination client from configuration.
pub fn create_destination(config: &MigrationConfig) -> Result<Arc<dyn DestinationQueueService>> {
    let client = v3::V3Client::new(config.destination.clone(), request_timeout(config))?;
    Ok(Arc::new(client))
}

fn request_timeout(config: &MigrationConfig) -> Option<Duration> {
    config
        .options
        .request_timeout_secs
        .map(Duration::from_secs)
}
