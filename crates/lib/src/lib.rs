//! HookRelay core library: configuration, relay channels and the HTTP gateway.
//!
//! Inbound webhook payloads are parsed, split to the provider's per-message byte limits
//! when necessary, and delivered in order.

pub mod channels;
pub mod config;
pub mod gateway;
