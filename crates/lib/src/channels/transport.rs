//! Outbound delivery: one POST of a JSON body per call, keyed by the destination token.

use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("webhook api error: {0}")]
    Api(String),
    #[error("webhook rejected message: errcode {code}: {message}")]
    Rejected { code: i64, message: String },
}

/// Delivers one serialized message to the provider.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// POST `body` to the channel identified by `key`. No retries.
    async fn send(&self, body: Vec<u8>, key: &str) -> Result<(), TransportError>;
}

/// Provider reply, e.g. `{"errcode":0,"errmsg":"ok"}`.
#[derive(Debug, Deserialize)]
struct WebhookReply {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

/// Client for a webhook endpoint that takes the destination key as `?key=`.
#[derive(Clone)]
pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn send(&self, body: Vec<u8>, key: &str) -> Result<(), TransportError> {
        let res = self
            .client
            .post(&self.url)
            .query(&[("key", key)])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(TransportError::Api(format!("{} {}", status, body)));
        }
        let text = res.text().await?;
        check_reply(&text)
    }
}

/// A 2xx reply may still carry a non-zero errcode. Bodies that are not JSON are accepted.
fn check_reply(text: &str) -> Result<(), TransportError> {
    match serde_json::from_str::<WebhookReply>(text) {
        Ok(reply) if reply.errcode != 0 => Err(TransportError::Rejected {
            code: reply.errcode,
            message: reply.errmsg,
        }),
        _ => Ok(()),
    }
}
