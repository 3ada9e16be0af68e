//! Shinobi video-management backend client
//!
//! Cameras are mapped to Shinobi monitors by host address, either from the
//! static `monitors` table in the config or by asking Shinobi for its
//! monitor list.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::ShinobiConfig;
use crate::dispatch::MotionTrigger;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("no monitor configured for camera {0}")]
    UnknownCamera(String),

    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend rejected request ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
}

pub struct ShinobiClient {
    config: ShinobiConfig,
    client: Client,
}

impl ShinobiClient {
    pub fn new(config: ShinobiConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn monitors_url(&self) -> String {
        format!(
            "{}/{}/monitor/{}",
            self.base_url(),
            self.config.api_key,
            self.config.group_key
        )
    }

    fn motion_url(&self, monitor_id: &str) -> String {
        format!(
            "{}/{}/motion/{}/{}",
            self.base_url(),
            self.config.api_key,
            self.config.group_key,
            monitor_id
        )
    }

    /// Query string payload for the motion endpoint
    fn motion_data(&self, monitor_id: &str) -> Value {
        json!({
            "plug": monitor_id,
            "name": self.config.motion_name,
            "reason": "motion",
            "confidence": self.config.confidence,
        })
    }

    /// Find the monitor id for a camera host
    async fn resolve_monitor(&self, host: &str) -> Result<String, BackendError> {
        if let Some(mid) = self.config.monitors.get(host) {
            return Ok(mid.clone());
        }

        debug!("Looking up Shinobi monitor for {}", host);
        let response = self.client.get(self.monitors_url()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Rejected { status, body });
        }

        let monitors: Value = response.json().await?;
        find_monitor(&monitors, host)
            .ok_or_else(|| BackendError::UnknownCamera(host.to_string()))
    }

    /// Mark the camera's monitor as detecting motion, returning Shinobi's reply
    pub async fn notify_motion(&self, host: &str) -> Result<String, BackendError> {
        let monitor_id = self.resolve_monitor(host).await?;
        let data = self.motion_data(&monitor_id).to_string();

        let response = self
            .client
            .get(self.motion_url(&monitor_id))
            .query(&[("data", data)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BackendError::Rejected { status, body });
        }
        Ok(body)
    }
}

#[async_trait]
impl MotionTrigger for ShinobiClient {
    async fn trigger_motion(&self, host: &str) -> anyhow::Result<String> {
        Ok(self.notify_motion(host).await?)
    }
}

/// Pick the monitor whose `host` matches from a monitor list response.
/// Shinobi returns a bare object instead of an array when only one monitor
/// exists.
fn find_monitor(monitors: &Value, host: &str) -> Option<String> {
    let candidates: Vec<&Value> = match monitors {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![monitors],
        _ => Vec::new(),
    };

    candidates
        .into_iter()
        .find(|m| m["host"].as_str() == Some(host))
        .and_then(|m| m["mid"].as_str())
        .map(str::to_string)
}
