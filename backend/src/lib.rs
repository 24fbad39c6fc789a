//! Lead editing and calling-campaign core.
//!
//! The crate is laid out hexagonally: [`domain`] holds the lead schema, the
//! data-access services, and the campaign store; [`outbound`] implements the
//! ports against a PostgREST-style backend or in memory; [`inbound`] drives a
//! campaign from a terminal. [`config`] resolves backend settings.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
#[doc(hidden)]
pub mod test_support;
