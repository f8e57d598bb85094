//! Adapters between the outside world and the dispatcher.

pub mod mcp;
