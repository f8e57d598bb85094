//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - WorkspaceClient: database/document service operations
//! - CalendarClient: calendar service operations
//! - MailClient: mail service operations
//! - CredentialProvider: bearer token supply
//!
//! The dispatcher only ever talks to these traits, so every action handler can
//! be exercised against the recording mocks in `infrastructure::mock`.

pub mod calendar_client;
pub mod credentials;
pub mod mail_client;
pub mod workspace_client;

pub use calendar_client::{CalendarClient, EventQuery, FreeBusyRequest};
pub use credentials::CredentialProvider;
pub use mail_client::{LabelChanges, MailClient, MailQuery, OutgoingMessage};
pub use workspace_client::{
    CreatePageRequest, PageRequest, QueryRequest, SearchRequest, WorkspaceClient,
};
