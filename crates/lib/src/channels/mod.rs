//! Relay channels (e.g. WeCom group robot).
//!
//! Relay trait and registry so the gateway can look up a handler by routing name. Each
//! channel parses the inbound payload, splits oversized content to the provider's byte
//! limits and delivers the parts in order through a [`WebhookTransport`].

mod registry;
pub mod segment;
mod transport;
pub mod weixin;

pub use registry::{Relay, RelayError, RelayRegistry};
pub use transport::{HttpTransport, TransportError, WebhookTransport};
pub use weixin::WeixinChannel;
