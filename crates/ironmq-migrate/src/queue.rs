//! Queue and message types shared by both services.
//!
//! Source-side types deserialize from v2 responses; [`QueueSpec`] is the
//! destination (v3) queue definition derived from a [`QueueDescriptor`].

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Handle to a source queue, as returned by queue enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueueRef {
    /// Queue name, unique per project.
    pub name: String,
}

impl QueueRef {
    /// Builds a handle for a queue known by name only.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Push delivery mode of a push queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushType {
    /// Every subscriber receives every message.
    Multicast,
    /// Each message goes to one subscriber.
    Unicast,
}

/// A push-queue delivery target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Endpoint URL.
    pub url: String,
    /// Custom headers sent with each delivery.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub headers: HashMap<String, String>,
}

/// Snapshot of a source queue's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueueDescriptor {
    /// Queue name.
    pub name: String,
    /// Push mode; `None` for pull queues.
    #[serde(default, deserialize_with = "deserialize_push_type")]
    pub push_type: Option<PushType>,
    /// Delivery retry count (push queues).
    #[serde(default, deserialize_with = "null_as_default")]
    pub retries: u32,
    /// Seconds between delivery retries (push queues).
    #[serde(default, deserialize_with = "null_as_default")]
    pub retries_delay: u32,
    /// Queue receiving messages that exhausted their retries.
    #[serde(default, deserialize_with = "null_as_default")]
    pub error_queue: String,
    /// Delivery targets, in configured order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subscribers: Vec<Subscriber>,
    /// Approximate number of messages on the queue.
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u64,
}

impl QueueDescriptor {
    /// Whether the queue delivers by push and therefore has no backlog to poll.
    #[must_use]
    pub fn is_push(&self) -> bool {
        self.push_type.is_some()
    }
}

/// Treats a missing, empty or `"pull"` type as a pull queue.
fn deserialize_push_type<'de, D>(deserializer: D) -> Result<Option<PushType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") | Some("pull") => Ok(None),
        Some("multicast") => Ok(Some(PushType::Multicast)),
        Some("unicast") => Ok(Some(PushType::Unicast)),
        Some(other) => Err(serde::de::Error::unknown_variant(
            other,
            &["pull", "multicast", "unicast"],
        )),
    }
}

/// Reads an explicit `null` as the field's zero value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A message read from the source queue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    /// Source-assigned id; only meaningful for deleting from the source.
    pub id: String,
    /// Opaque body.
    pub body: String,
}

/// Queue type on the destination service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueType {
    /// Polled by consumers.
    Pull,
    /// Push to every subscriber.
    Multicast,
    /// Push to one subscriber per message.
    Unicast,
}

impl From<PushType> for QueueType {
    fn from(push_type: PushType) -> Self {
        match push_type {
            PushType::Multicast => Self::Multicast,
            PushType::Unicast => Self::Unicast,
        }
    }
}

/// Push configuration of a destination queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSettings {
    /// Delivery retry count.
    pub retries: u32,
    /// Seconds between delivery retries.
    pub retries_delay: u32,
    /// Queue receiving undeliverable messages.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_queue: String,
    /// Delivery targets.
    pub subscribers: Vec<Subscriber>,
}

/// Destination queue definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSpec {
    /// Queue name, copied verbatim from the source.
    pub name: String,
    /// Queue type; always set explicitly.
    #[serde(rename = "type")]
    pub queue_type: QueueType,
    /// Present only for push queues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<PushSettings>,
}

impl QueueSpec {
    /// Derives the destination definition for a source queue.
    ///
    /// Push queues keep their type, retry policy, error queue and subscribers
    /// (in order); pull queues are created with an explicit `pull` type.
    #[must_use]
    pub fn from_descriptor(info: &QueueDescriptor) -> Self {
        match info.push_type {
            Some(push_type) => Self {
                name: info.name.clone(),
                queue_type: push_type.into(),
                push: Some(PushSettings {
                    retries: info.retries,
                    retries_delay: info.retries_delay,
                    error_queue: info.error_queue.clone(),
                    subscribers: info
                        .subscribers
                        .iter()
                        .map(|s| Subscriber {
                            url: s.url.clone(),
                            headers: s.headers.clone(),
                        })
                        .collect(),
                }),
            },
            None => Self {
                name: info.name.clone(),
                queue_type: QueueType::Pull,
                push: None,
            },
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
