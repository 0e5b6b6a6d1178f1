// Migration tool - pedantic lints relaxed for CLI ergonomics
#![allow(clippy::pedantic)]

//! # IronMQ Migration Tool
//!
//! `ironmq-migrate` is a CLI tool and library for moving queues from the v2
//! IronMQ service to the v3 service: queue configuration always, and the
//! pending messages of pull queues unless told otherwise.
//!
//! ## How a queue moves
//!
//! | Step | Source (v2) | Destination (v3) |
//! |------|-------------|------------------|
//! | 1 | fetch queue info | |
//! | 2 | | create queue (`pull`, `multicast` or `unicast`) |
//! | 3 | fetch up to 100 messages | push bodies as one batch |
//! | 4 | delete each pushed message | |
//!
//! Steps 3 and 4 repeat until the source returns an empty batch. Push
//! queues and `--skip-messages` runs stop after step 2. Delivery is
//! at-least-once: a message is deleted from the source only after its
//! batch was accepted by the destination.
//!
//! ## Quick Start
//!
//! ```bash
//! ironmq-migrate --v2_project_id P2 --v2_token T2 \
//!                --v3_project_id P3 --v3_token T3 --threads 4
//!
//! # Just one queue, metadata only
//! ironmq-migrate --config migration.yaml --queue orders --skip-messages
//! ```
//!
//! ## Configuration Example
//!
//! ```yaml
//! source:
//!   project_id: 4ccf...
//!   token: v2-token
//!   host: mq-aws-us-east-1.iron.io
//!
//! destination:
//!   project_id: 5dd0...
//!   token: v3-token
//!
//! options:
//!   threads: 4
//!   skip_messages: false
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod connectors;
pub mod enumerator;
pub mod error;
pub mod migrator;
pub mod pipeline;
pub mod queue;

pub use config::{ConnectionSettings, MigrationConfig, MigrationOptions};
pub use connectors::{DestinationQueueService, SourceQueueService};
pub use enumerator::list_all_queues;
pub use error::{Error, Result};
pub use migrator::{QueueMigrator, QueueOutcome, SkipReason, Stage};
pub use pipeline::{MigrationStats, Pipeline};
pub use queue::{Message, PushType, QueueDescriptor, QueueRef, QueueSpec, QueueType, Subscriber};
