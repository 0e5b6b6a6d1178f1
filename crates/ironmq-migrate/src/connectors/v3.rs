//! Destination client for the v3 queue service.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ConnectionSettings;
use crate::connectors::common::{
    authorize, check_status, create_http_client, decode, endpoint, validate_settings,
};
use crate::connectors::DestinationQueueService;
use crate::error::Result;
use crate::queue::QueueSpec;

/// REST API version spoken by the v3 service.
pub const API_VERSION: u8 = 3;

const SERVICE: &str = "v3";

#[derive(Debug, Serialize)]
struct CreateQueueRequest<'a> {
    queue: &'a QueueSpec,
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    messages: Vec<PushMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct PushMessage<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    #[serde(default)]
    ids: Vec<String>,
}

/// v3 service client.
pub struct V3Client {
    settings: ConnectionSettings,
    base_url: String,
    client: Client,
}

impl V3Client {
    /// Creates a new client for the given project.
    pub fn new(settings: ConnectionSettings, timeout: Option<Duration>) -> Result<Self> {
        validate_settings(&settings)?;
        Ok(Self {
            base_url: settings.base_url(API_VERSION),
            client: create_http_client(timeout)?,
            settings,
        })
    }

    fn queue_url(&self, queue: &str) -> Result<Url> {
        endpoint(&self.base_url, &["queues", queue])
    }

    fn messages_url(&self, queue: &str) -> Result<Url> {
        endpoint(&self.base_url, &["queues", queue, "messages"])
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        authorize(self.client.request(method, url), &self.settings.token)
    }
}

#[async_trait]
impl DestinationQueueService for V3Client {
    async fn create_queue(&self, spec: &QueueSpec) -> Result<()> {
        let response = self
            .request(Method::PUT, self.queue_url(&spec.name)?)
            .json(&CreateQueueRequest { queue: spec })
            .send()
            .await?;
        check_status(response, SERVICE).await?;
        Ok(())
    }

    async fn push_messages(&self, queue: &str, bodies: &[String]) -> Result<Vec<String>> {
        let body = PushRequest {
            messages: bodies.iter().map(|b| PushMessage { body: b }).collect(),
        };
        let response = self
            .request(Method::POST, self.messages_url(queue)?)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response, SERVICE).await?;
        let pushed: PushResponse = decode(response, "push response").await?;
        Ok(pushed.ids)
    }
}

#[cfg(test)]
#[path = "v3_tests.rs"]
mod tests;
