//! Inbound adapters that drive domain services from the outside world.
//!
//! [`campaign_cli`] walks a campaign from a line-oriented terminal.

pub mod campaign_cli;
