//! Open Live Score server library.
//!
//! The binary in `main.rs` wires these modules together; they are
//! exposed as a library so integration tests can drive the router
//! in-process.

pub mod api;
pub mod config;
pub mod server;
pub mod shutdown;
pub mod state;
