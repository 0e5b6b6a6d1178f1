//! Source client for the v2 queue service (REST API version 1).

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::ConnectionSettings;
use crate::connectors::common::{
    authorize, check_status, create_http_client, decode, endpoint, validate_settings,
};
use crate::connectors::SourceQueueService;
use crate::error::Result;
use crate::queue::{Message, QueueDescriptor, QueueRef};

/// REST API version spoken by the v2 service.
pub const API_VERSION: u8 = 1;

const SERVICE: &str = "v2";

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    messages: Vec<Message>,
}

/// v2 service client.
pub struct V2Client {
    settings: ConnectionSettings,
    base_url: String,
    client: Client,
}

impl V2Client {
    /// Creates a new client for the given project.
    pub fn new(settings: ConnectionSettings, timeout: Option<Duration>) -> Result<Self> {
        validate_settings(&settings)?;
        Ok(Self {
            base_url: settings.base_url(API_VERSION),
            client: create_http_client(timeout)?,
            settings,
        })
    }

    fn queues_url(&self) -> Result<Url> {
        endpoint(&self.base_url, &["queues"])
    }

    fn queue_url(&self, queue: &str) -> Result<Url> {
        endpoint(&self.base_url, &["queues", queue])
    }

    fn messages_url(&self, queue: &str) -> Result<Url> {
        endpoint(&self.base_url, &["queues", queue, "messages"])
    }

    fn message_url(&self, queue: &str, message_id: &str) -> Result<Url> {
        endpoint(&self.base_url, &["queues", queue, "messages", message_id])
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        authorize(self.client.request(method, url), &self.settings.token)
    }
}

#[async_trait]
impl SourceQueueService for V2Client {
    fn project_id(&self) -> &str {
        &self.settings.project_id
    }

    async fn list_queues(&self, page: usize, per_page: usize) -> Result<Vec<QueueRef>> {
        let response = self
            .request(Method::GET, self.queues_url()?)
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await?;
        let response = check_status(response, SERVICE).await?;
        decode(response, "queue list").await
    }

    async fn queue_info(&self, queue: &str) -> Result<QueueDescriptor> {
        let response = self
            .request(Method::GET, self.queue_url(queue)?)
            .send()
            .await?;
        let response = check_status(response, SERVICE).await?;
        decode(response, "queue info").await
    }

    async fn get_messages(&self, queue: &str, n: usize) -> Result<Vec<Message>> {
        let response = self
            .request(Method::GET, self.messages_url(queue)?)
            .query(&[("n", n)])
            .send()
            .await?;
        let response = check_status(response, SERVICE).await?;
        let body: MessagesResponse = decode(response, "messages").await?;
        debug!(q = queue, n = body.messages.len(), "fetched messages");
        Ok(body.messages)
    }

    async fn delete_message(&self, queue: &str, message_id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, self.message_url(queue, message_id)?)
            .send()
            .await?;
        check_status(response, SERVICE).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "v2_tests.rs"]
mod tests;
