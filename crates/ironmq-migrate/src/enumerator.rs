//! Source queue enumeration.

use tracing::{debug, error};

use crate::connectors::SourceQueueService;
use crate::queue::QueueRef;

/// Page size used when listing queues. A shorter page marks the last one.
pub const QUEUES_PER_PAGE: usize = 100;

/// Walks every page of the source queue list, starting at page 0.
///
/// Stops at the first page holding fewer than [`QUEUES_PER_PAGE`] entries.
/// A failed page is logged and counts as an empty page, which therefore
/// also ends the walk; enumeration itself never fails.
pub async fn list_all_queues(source: &dyn SourceQueueService) -> Vec<QueueRef> {
    let mut queues = Vec::new();

    for page in 0.. {
        let batch = match source.list_queues(page, QUEUES_PER_PAGE).await {
            Ok(batch) => batch,
            Err(e) => {
                error!(
                    page,
                    project_id = source.project_id(),
                    err = %e,
                    "error getting queues"
                );
                Vec::new()
            }
        };

        debug!(page, n = batch.len(), "listed queue page");
        let last_page = batch.len() < QUEUES_PER_PAGE;
        queues.extend(batch);
        if last_page {
            break;
        }
    }

    queues
}
