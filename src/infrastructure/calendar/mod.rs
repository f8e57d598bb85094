//! Calendar service client

pub mod client;

pub use client::HttpCalendarClient;
