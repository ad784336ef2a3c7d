//! Gateway: HTTP intake for webhook payloads.
//!
//! `POST /transfer/:name?key=<token>` looks the routing name up in the relay registry and
//! relays the request body; `GET /` is a health probe.

mod server;

pub use server::{router, run_gateway, GatewayState, TransferError};
