// Configuration loading
pub mod config;

// Ephemeral TTL key-value storage
pub mod store;

// OAuth relay HTTP API
pub mod relay;

pub use relay::{create_relay_router, RelayAppState, TokenPayload};
