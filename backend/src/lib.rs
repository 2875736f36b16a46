//! Shared shopping-list synchronisation and access-control core.
//!
//! - `domain`: lists, items, access predicates, the list store and editors
//! - `outbound`: in-memory and Persistence Service sync strategies
//! - `config`: process settings loaded through OrthoConfig
//! - `wiring`: assembles the core from settings
//!
//! The CLI binary in `main.rs` is a thin inbound adapter over [`wiring`].

pub mod config;
pub mod domain;
pub mod outbound;
pub mod wiring;
