//! Shared types and client for Open Live Score.
//!
//! This crate carries the wire objects exchanged between the live-score
//! server and its consumers (clock snapshots, match events, aggregated
//! stats, WebSocket frames), the viewer-side notification dedup cache,
//! and, behind the `client` feature, a typed HTTP/WebSocket client
//! with a polling fallback for live subscriptions.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod objects;
pub mod viewed;

#[cfg(feature = "client")]
pub mod client;
