//! Line-delimited JSON-RPC adapter: transport loop, envelope router and
//! error translation.

pub mod error_translator;
pub mod stdio_server;

pub use error_translator::{to_error_object, transport_error};
pub use stdio_server::StdioServer;
