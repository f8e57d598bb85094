pub mod action;
pub mod args;
pub mod calendar;
pub mod config;
pub mod envelope;
pub mod mail;
pub mod workspace;

pub use action::{ActionSpec, Capability, ParamKind, ParamSpec};
pub use calendar::CalendarAction;
pub use config::{
    AutoAssignConfig, CalendarConfig, Config, ConflictPolicy, DuplicateRolePolicy, HttpConfig,
    LoggingConfig, MailConfig, RotationPolicy, WorkspaceConfig,
};
pub use envelope::{ErrorObject, Method, RequestEnvelope, ResponseEnvelope};
pub use mail::MailAction;
pub use workspace::WorkspaceAction;
