//! Mail service client

pub mod client;

pub use client::HttpMailClient;
