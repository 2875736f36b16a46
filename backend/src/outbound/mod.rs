//! Outbound adapters implementing domain ports.
//!
//! - **mock**: in-memory list store with artificial latency and a JSON seed
//! - **remote**: reqwest client for the Persistence Service
//!
//! Adapters are thin translators between domain types and their transport
//! representation. They contain no access rules.

pub mod mock;
pub mod remote;
