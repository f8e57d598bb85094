//! Application services: the action dispatcher and the rules it applies
//! between the envelope and the service clients.

pub mod calendar_actions;
pub mod conflict;
pub mod dispatcher;
pub mod enrichment;
pub mod mail_actions;
pub mod message_builder;
pub mod resolver;
pub mod schema_cache;
pub mod shaping;
pub mod workspace_actions;

pub use calendar_actions::CalendarActions;
pub use dispatcher::ActionDispatcher;
pub use enrichment::PeopleEnrichment;
pub use mail_actions::MailActions;
pub use message_builder::MessageParts;
pub use resolver::{IdSource, IdentifierResolver, ResolvedId};
pub use schema_cache::{DatabaseSchema, SchemaCache};
pub use workspace_actions::WorkspaceActions;
