//! In-memory outbound adapters used when the sync mode is `mock`.

mod in_memory_list_sync;
mod seed;

pub use in_memory_list_sync::{DEFAULT_MOCK_LATENCY, InMemoryListSync};
pub use seed::{MockSeed, SeedError};
