//! Outbound adapters implementing the domain ports.
//!
//! - **rest**: PostgREST-style record store over reqwest
//! - **storage**: bucket/path object storage over reqwest
//! - **memory**: process-local stand-ins for tests and demos
//! - **notifier**: `tracing`-backed user notifications
//!
//! Adapters translate between wire formats and port types. They contain no
//! business logic.

mod http_support;
pub mod memory;
pub mod notifier;
pub mod rest;
pub mod storage;
