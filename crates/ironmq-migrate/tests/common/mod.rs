//! In-memory queue services that record every call.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use ironmq_migrate::{
    DestinationQueueService, Error, Message, PushType, QueueDescriptor, QueueRef, QueueSpec,
    Result, SourceQueueService, Subscriber,
};

/// A call observed by the fake source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    List(usize),
    Info(String),
    Get(String),
    Delete(String, String),
}

#[derive(Default)]
struct SourceState {
    pending: HashMap<String, VecDeque<Message>>,
    reserved: HashMap<String, Vec<Message>>,
    calls: Vec<SourceCall>,
}

/// v2 stand-in: messages move from pending to reserved on fetch and
/// disappear on delete.
pub struct FakeSource {
    names: Vec<String>,
    infos: HashMap<String, QueueDescriptor>,
    failing_pages: HashSet<usize>,
    failing_info: HashSet<String>,
    failing_fetch: HashSet<String>,
    state: Mutex<SourceState>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            infos: HashMap::new(),
            failing_pages: HashSet::new(),
            failing_info: HashSet::new(),
            failing_fetch: HashSet::new(),
            state: Mutex::new(SourceState::default()),
        }
    }

    /// Adds a pull queue holding `messages` messages named `{name}-{i}`.
    pub fn with_pull_queue(mut self, name: &str, messages: usize) -> Self {
        let backlog = (0..messages)
            .map(|i| Message {
                id: format!("{name}#{i}"),
                body: format!("{name}-{i}"),
            })
            .collect();
        self.state
            .get_mut()
            .unwrap()
            .pending
            .insert(name.to_string(), backlog);
        self.add(QueueDescriptor {
            name: name.to_string(),
            push_type: None,
            retries: 0,
            retries_delay: 0,
            error_queue: String::new(),
            subscribers: Vec::new(),
            size: messages as u64,
        })
    }

    /// Adds a multicast push queue that also has messages sitting on it.
    pub fn with_push_queue(mut self, name: &str) -> Self {
        self.state.get_mut().unwrap().pending.insert(
            name.to_string(),
            VecDeque::from([Message {
                id: "stray".to_string(),
                body: "stray".to_string(),
            }]),
        );
        self.add(QueueDescriptor {
            name: name.to_string(),
            push_type: Some(PushType::Multicast),
            retries: 3,
            retries_delay: 60,
            error_queue: format!("{name}-errors"),
            subscribers: vec![
                Subscriber {
                    url: "https://first.example.com".to_string(),
                    headers: HashMap::from([("X-Key".to_string(), "1".to_string())]),
                },
                Subscriber {
                    url: "https://second.example.com".to_string(),
                    headers: HashMap::new(),
                },
            ],
            size: 1,
        })
    }

    pub fn with_pull_queues(mut self, count: usize, messages: usize) -> Self {
        for i in 0..count {
            self = self.with_pull_queue(&format!("queue-{i:03}"), messages);
        }
        self
    }

    pub fn failing_page(mut self, page: usize) -> Self {
        self.failing_pages.insert(page);
        self
    }

    pub fn failing_info(mut self, name: &str) -> Self {
        self.failing_info.insert(name.to_string());
        self
    }

    pub fn failing_fetch(mut self, name: &str) -> Self {
        self.failing_fetch.insert(name.to_string());
        self
    }

    fn add(mut self, info: QueueDescriptor) -> Self {
        self.names.push(info.name.clone());
        self.infos.insert(info.name.clone(), info);
        self
    }

    pub fn calls(&self) -> Vec<SourceCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.count(|c| matches!(c, SourceCall::List(_)))
    }

    pub fn get_calls(&self, queue: &str) -> usize {
        self.count(|c| matches!(c, SourceCall::Get(q) if q == queue))
    }

    pub fn deletes(&self, queue: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SourceCall::Delete(q, id) if q == queue => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Messages still on the source, pending or reserved.
    pub fn remaining(&self, queue: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.pending.get(queue).map_or(0, VecDeque::len)
            + state.reserved.get(queue).map_or(0, Vec::len)
    }

    fn count(&self, pred: impl Fn(&SourceCall) -> bool) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: SourceCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl SourceQueueService for FakeSource {
    fn project_id(&self) -> &str {
        "fake-v2"
    }

    async fn list_queues(&self, page: usize, per_page: usize) -> Result<Vec<QueueRef>> {
        self.record(SourceCall::List(page));
        if self.failing_pages.contains(&page) {
            return Err(Error::Api {
                service: "v2",
                status: 500,
                body: "list failed".to_string(),
            });
        }
        Ok(self
            .names
            .iter()
            .skip(page * per_page)
            .take(per_page)
            .map(|n| QueueRef::new(n.as_str()))
            .collect())
    }

    async fn queue_info(&self, queue: &str) -> Result<QueueDescriptor> {
        self.record(SourceCall::Info(queue.to_string()));
        if self.failing_info.contains(queue) {
            return Err(Error::Api {
                service: "v2",
                status: 503,
                body: "info failed".to_string(),
            });
        }
        self.infos
            .get(queue)
            .cloned()
            .ok_or_else(|| Error::NotFound(queue.to_string()))
    }

    async fn get_messages(&self, queue: &str, n: usize) -> Result<Vec<Message>> {
        self.record(SourceCall::Get(queue.to_string()));
        if self.failing_fetch.contains(queue) {
            return Err(Error::Api {
                service: "v2",
                status: 500,
                body: "fetch failed".to_string(),
            });
        }
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        let pending = state.pending.entry(queue.to_string()).or_default();
        let take = n.min(pending.len());
        let batch: Vec<Message> = pending.drain(..take).collect();
        state
            .reserved
            .entry(queue.to_string())
            .or_default()
            .extend(batch.iter().cloned());
        Ok(batch)
    }

    async fn delete_message(&self, queue: &str, message_id: &str) -> Result<()> {
        self.record(SourceCall::Delete(queue.to_string(), message_id.to_string()));
        let mut state = self.state.lock().unwrap();
        if let Some(reserved) = state.reserved.get_mut(queue) {
            reserved.retain(|m| m.id != message_id);
        }
        Ok(())
    }
}

#[derive(Default)]
struct DestinationState {
    created: Vec<QueueSpec>,
    pushes: Vec<(String, Vec<String>)>,
}

/// v3 stand-in recording created queues and pushed batches.
#[derive(Default)]
pub struct FakeDestination {
    failing_create: HashSet<String>,
    failing_push: HashSet<String>,
    state: Mutex<DestinationState>,
}

impl FakeDestination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_create(mut self, name: &str) -> Self {
        self.failing_create.insert(name.to_string());
        self
    }

    pub fn failing_push(mut self, name: &str) -> Self {
        self.failing_push.insert(name.to_string());
        self
    }

    pub fn created(&self) -> Vec<QueueSpec> {
        self.state.lock().unwrap().created.clone()
    }

    /// Batch sizes pushed to `queue`, in order.
    pub fn batch_sizes(&self, queue: &str) -> Vec<usize> {
        self.state
            .lock()
            .unwrap()
            .pushes
            .iter()
            .filter(|(q, _)| q == queue)
            .map(|(_, bodies)| bodies.len())
            .collect()
    }

    /// Every body pushed to `queue`, in order.
    pub fn bodies(&self, queue: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .pushes
            .iter()
            .filter(|(q, _)| q == queue)
            .flat_map(|(_, bodies)| bodies.iter().cloned())
            .collect()
    }

    pub fn push_calls(&self) -> usize {
        self.state.lock().unwrap().pushes.len()
    }
}

#[async_trait]
impl DestinationQueueService for FakeDestination {
    async fn create_queue(&self, spec: &QueueSpec) -> Result<()> {
        if self.failing_create.contains(&spec.name) {
            return Err(Error::Api {
                service: "v3",
                status: 500,
                body: "create failed".to_string(),
            });
        }
        self.state.lock().unwrap().created.push(spec.clone());
        Ok(())
    }

    async fn push_messages(&self, queue: &str, bodies: &[String]) -> Result<Vec<String>> {
        if self.failing_push.contains(queue) {
            return Err(Error::Api {
                service: "v3",
                status: 500,
                body: "push failed".to_string(),
            });
        }
        let ids = (0..bodies.len()).map(|i| format!("v3-{i}")).collect();
        self.state
            .lock()
            .unwrap()
            .pushes
            .push((queue.to_string(), bodies.to_vec()));
        Ok(ids)
    }
}
