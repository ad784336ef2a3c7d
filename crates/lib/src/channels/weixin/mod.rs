//! WeCom (企业微信) group-robot channel.
//!
//! The robot API caps `text` content at 2048 bytes and `markdown` content at 4096 bytes.
//! Payloads within the cap are relayed byte-for-byte; larger ones are split into several
//! messages sent one after another, stopping at the first failed delivery.

pub mod message;

use crate::channels::registry::{Relay, RelayError};
use crate::channels::segment;
use crate::channels::transport::WebhookTransport;
use async_trait::async_trait;
use message::{MessageKind, WebhookMessage};
use std::sync::Arc;

/// Text content limit in bytes (API maximum 2048, kept with headroom).
pub const TEXT_LIMIT: usize = 2040;
/// Markdown content limit in bytes (API maximum 4096, kept with headroom).
pub const MARKDOWN_LIMIT: usize = 4090;

/// Byte limit for a kind's content; `None` for kinds that are never split.
pub fn content_limit(kind: MessageKind) -> Option<usize> {
    match kind {
        MessageKind::Text => Some(TEXT_LIMIT),
        MessageKind::Markdown => Some(MARKDOWN_LIMIT),
        MessageKind::Unknown => None,
    }
}

/// Segmenting relay for the WeCom webhook.
pub struct WeixinChannel {
    id: String,
    transport: Arc<dyn WebhookTransport>,
}

impl WeixinChannel {
    pub fn new(transport: Arc<dyn WebhookTransport>) -> Self {
        Self {
            id: "weixin".to_string(),
            transport,
        }
    }

    async fn send_raw(&self, payload: &[u8], key: &str) -> Result<(), RelayError> {
        self.transport.send(payload.to_vec(), key).await?;
        Ok(())
    }
}

#[async_trait]
impl Relay for WeixinChannel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn convert_and_send(&self, payload: &[u8], key: &str) -> Result<(), RelayError> {
        let message = WebhookMessage::from_payload(payload);
        let kind = message.kind();
        let (Some(content), Some(limit)) = (message.content(), content_limit(kind)) else {
            log::debug!("weixin: relaying {} byte payload unmodified", payload.len());
            return self.send_raw(payload, key).await;
        };
        if content.len() <= limit {
            return self.send_raw(payload, key).await;
        }

        let segments = segment::split_content(content, limit);
        let total = segments.len();
        log::info!(
            "weixin: {:?} content of {} bytes exceeds {}, sending {} segments",
            kind,
            content.len(),
            limit,
            total
        );
        for (i, seg) in segments.into_iter().enumerate() {
            let body = message.with_content(seg.content).encode()?;
            if let Err(e) = self.transport.send(body, key).await {
                log::warn!("weixin: segment {}/{} failed: {}", i + 1, total, e);
                return Err(e.into());
            }
        }
        Ok(())
    }
}
