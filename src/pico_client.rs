#![cfg_attr(feature = "mock", allow(dead_code, unused_imports))]

use crate::{config::PeerConfig, http_client::peer_http_client};
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
#[cfg(feature = "mock")]
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;
use trait_variant::make;

/// Normalized answer of a tag-status poll
///
/// Serialized as-is to HTTP clients, so absent values are rendered as `null`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PollResult {
    pub tag_detected: bool,
    pub position: Option<String>,
    pub timestamp: Option<Value>,
    pub error: Option<String>,
}

impl PollResult {
    /// The firmware does not report where the tag was read.
    pub const UNKNOWN_POSITION: &str = "unknown";

    pub const UNREACHABLE_MESSAGE: &str =
        "Kon geen verbinding maken met Pico W of geen geldige response ontvangen";

    pub fn detected(tag_detected: bool, timestamp: Option<Value>) -> Self {
        PollResult {
            tag_detected,
            position: Some(Self::UNKNOWN_POSITION.to_string()),
            timestamp,
            error: None,
        }
    }

    pub fn unreachable() -> Self {
        Self::failed(Self::UNREACHABLE_MESSAGE)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        PollResult {
            tag_detected: false,
            position: None,
            timestamp: None,
            error: Some(message.into()),
        }
    }
}

/// Reasons a single poll attempt fails; every variant is retried
#[derive(Debug, Error)]
pub enum PollError {
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),
    #[error("failed to connect: {0}")]
    Connection(#[source] reqwest::Error),
    #[error("invalid response: {0}")]
    MalformedBody(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for PollError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PollError::Timeout(e)
        } else if e.is_connect() {
            PollError::Connection(e)
        } else {
            PollError::Unexpected(e.to_string())
        }
    }
}

#[make(Send)]
#[cfg_attr(feature = "mock", automock)]
pub trait PeerDeviceClient {
    async fn nfc_status(&self) -> Result<PollResult>;
}

#[derive(Clone)]
pub struct PicoClient {
    client: Client,
    config: PeerConfig,
    url: String,
}

impl PicoClient {
    pub fn new(config: PeerConfig) -> Result<Self> {
        config.validate().context("invalid peer configuration")?;
        let client = peer_http_client(config.timeout)?;
        let url = config.nfc_url();

        Ok(PicoClient {
            client,
            config,
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Query the peer until it answers with a valid reading or the attempts run out
    ///
    /// Never fails: exhaustion is reported through [`PollResult::unreachable`].
    pub async fn poll(&self) -> PollResult {
        let max_retries = self.config.max_retries;

        for attempt in 1..=max_retries {
            info!("attempt {attempt}/{max_retries} to reach peer at {}", self.url);

            match self.fetch().await {
                Ok(result) => return result,
                Err(e) => log_attempt_failure(attempt, &e),
            }

            if attempt < max_retries {
                sleep(self.config.retry_delay).await;
            }
        }

        error!("peer unreachable after {max_retries} attempts");
        PollResult::unreachable()
    }

    async fn fetch(&self) -> Result<PollResult, PollError> {
        let res = self.client.get(&self.url).send().await?;
        let status = res.status();
        let body = res.text().await?;
        debug!("peer response ({status}): {body}");

        if !status.is_success() {
            return Err(PollError::Unexpected(format!(
                "peer responded with status {status}"
            )));
        }

        parse_reading(&body)
    }
}

impl PeerDeviceClient for PicoClient {
    async fn nfc_status(&self) -> Result<PollResult> {
        Ok(self.poll().await)
    }
}

fn log_attempt_failure(attempt: u32, e: &PollError) {
    match e {
        PollError::Timeout(_) | PollError::MalformedBody(_) => {
            warn!("attempt {attempt} failed: {e}")
        }
        PollError::Connection(_) | PollError::Unexpected(_) => {
            error!("attempt {attempt} failed: {e}")
        }
    }
}

fn parse_reading(body: &str) -> Result<PollResult, PollError> {
    let data: Value = serde_json::from_str(body)
        .map_err(|e| PollError::MalformedBody(format!("failed to parse JSON: {e}")))?;

    let data = match data {
        Value::Object(data) => data,
        other => {
            return Err(PollError::MalformedBody(format!(
                "expected a JSON object but got {other}"
            )));
        }
    };

    let tag_detected = match data.get("tag_detected") {
        Some(Value::Bool(detected)) => *detected,
        Some(other) => {
            return Err(PollError::MalformedBody(format!(
                "'tag_detected' is not a boolean: {other}"
            )));
        }
        None => {
            return Err(PollError::MalformedBody(
                "response is missing 'tag_detected' field".to_string(),
            ));
        }
    };

    let timestamp = data.get("timestamp").filter(|t| !t.is_null()).cloned();

    Ok(PollResult::detected(tag_detected, timestamp))
}
