//! Workspace (database/document) service client

pub mod client;

pub use client::HttpWorkspaceClient;
