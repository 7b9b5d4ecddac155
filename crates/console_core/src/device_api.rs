//! HTTP seam to the device server.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::{
    domain::DeviceSelection,
    protocol::{StatusResponse, DRIVERS_PATH, START_PATH, STATUS_PATH, STOP_PATH},
};

#[async_trait]
pub trait DeviceServerApi: Send + Sync {
    async fn start(&self, selection: &DeviceSelection) -> Result<()>;
    async fn stop(&self) -> Result<()>;
    async fn status(&self) -> Result<StatusResponse>;
    /// The body is only checked for success; callers may log it.
    async fn active_drivers(&self) -> Result<Value>;
}

pub struct HttpDeviceServer {
    http: Client,
    server_url: String,
}

impl HttpDeviceServer {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self { http, server_url }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.server_url)
    }
}

#[async_trait]
impl DeviceServerApi for HttpDeviceServer {
    async fn start(&self, selection: &DeviceSelection) -> Result<()> {
        self.http
            .post(self.url(START_PATH))
            .json(selection)
            .send()
            .await
            .context("failed to send start request")?
            .error_for_status()?;
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.http
            .get(self.url(STOP_PATH))
            .send()
            .await
            .context("failed to send stop request")?
            .error_for_status()?;
        Ok(())
    }

    async fn status(&self) -> Result<StatusResponse> {
        let status = self
            .http
            .get(self.url(STATUS_PATH))
            .send()
            .await
            .context("failed to fetch server status")?
            .error_for_status()?
            .json()
            .await
            .context("invalid status body")?;
        Ok(status)
    }

    async fn active_drivers(&self) -> Result<Value> {
        let body = self
            .http
            .get(self.url(DRIVERS_PATH))
            .send()
            .await
            .context("failed to fetch active drivers")?
            .error_for_status()?
            .text()
            .await
            .context("failed to read drivers body")?;
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}
