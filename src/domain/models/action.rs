//! Declarative action tables.
//!
//! Each capability owns one static table of [`ActionSpec`]s. The same table
//! drives required-parameter validation, dispatch lookup and the schema
//! returned by `list-capabilities`, so the three cannot drift apart.

use serde_json::{json, Map, Value};

use crate::domain::errors::ValidationError;

use super::calendar::CALENDAR_ACTIONS;
use super::mail::MAIL_ACTIONS;
use super::workspace::WORKSPACE_ACTIONS;

/// JSON shape accepted for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A JSON string.
    String,
    /// A JSON integer.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// A JSON object, passed through untouched.
    Object,
    /// An array of objects, such as blocks or sorts.
    Array,
    /// A string array, or one comma-separated string.
    StringArray,
    /// A string or an object (e.g. event times, recipients).
    StringOrObject,
}

impl ParamKind {
    /// JSON schema fragment for this kind.
    pub fn schema(self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Object => json!({ "type": "object" }),
            Self::Array => json!({ "type": "array", "items": { "type": "object" } }),
            Self::StringArray => json!({
                "oneOf": [
                    { "type": "array", "items": { "type": "string" } },
                    { "type": "string" }
                ]
            }),
            Self::StringOrObject => json!({
                "oneOf": [ { "type": "string" }, { "type": "object" } ]
            }),
        }
    }
}

/// One named argument of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Argument key in the `arguments` object.
    pub name: &'static str,
    /// Accepted JSON shape.
    pub kind: ParamKind,
    /// Shown to clients in the input schema.
    pub description: &'static str,
}

/// Compact constructor used by the static tables.
pub const fn param(name: &'static str, kind: ParamKind, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        description,
    }
}

/// Contract for one action: its required and optional arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpec {
    /// Value of the `action` argument.
    pub name: &'static str,
    pub description: &'static str,
    /// Must be present and non-empty.
    pub required: &'static [ParamSpec],
    /// Advertised, never enforced.
    pub optional: &'static [ParamSpec],
}

impl ActionSpec {
    /// Fail fast on the first required argument that is absent or empty.
    pub fn check_required(&self, args: &Map<String, Value>) -> Result<(), ValidationError> {
        for spec in self.required {
            if args.get(spec.name).is_none_or(is_blank) {
                return Err(ValidationError::missing(spec.name, self.name));
            }
        }
        Ok(())
    }

    /// All parameters, required first.
    pub fn params(&self) -> impl Iterator<Item = &'static ParamSpec> {
        self.required.iter().chain(self.optional.iter())
    }

    fn describe(&self) -> Value {
        json!({
            "description": self.description,
            "required": self.required.iter().map(|p| p.name).collect::<Vec<_>>(),
            "optional": self.optional.iter().map(|p| p.name).collect::<Vec<_>>(),
        })
    }
}

/// Null, blank strings and empty collections count as "not supplied".
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// One externally invokable capability per service integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    Workspace,
    Calendar,
    Mail,
}

impl Capability {
    /// Every capability, in listing order.
    pub const ALL: [Self; 3] = [Self::Workspace, Self::Calendar, Self::Mail];

    /// Tool name as exposed to clients.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Calendar => "calendar",
            Self::Mail => "mail",
        }
    }

    /// Exact, case-sensitive match on [`name`](Self::name).
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Tool description for `tools/list`.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Workspace => {
                "Query, create and update pages, databases, blocks, users and comments in the \
                 document/database workspace. Select the operation with `action`."
            }
            Self::Calendar => {
                "List, search, create, update and delete calendar events and check free/busy \
                 windows. Select the operation with `action`."
            }
            Self::Mail => {
                "List, read, send, label, trash and delete mail messages, threads, labels and \
                 drafts. Select the operation with `action`."
            }
        }
    }

    /// Static action table of the capability.
    pub const fn actions(self) -> &'static [ActionSpec] {
        match self {
            Self::Workspace => WORKSPACE_ACTIONS,
            Self::Calendar => CALENDAR_ACTIONS,
            Self::Mail => MAIL_ACTIONS,
        }
    }

    /// Looks up one action by name.
    pub fn action(self, name: &str) -> Option<&'static ActionSpec> {
        self.actions().iter().find(|spec| spec.name == name)
    }

    /// Action names, for error messages and the `action` enum.
    pub fn action_names(self) -> Vec<&'static str> {
        self.actions().iter().map(|spec| spec.name).collect()
    }

    /// Input schema covering every action of the capability.
    ///
    /// `properties` is the union of all action parameters; the per-action
    /// contract is listed under `actions`.
    pub fn input_schema(self) -> Value {
        let mut properties = Map::new();
        properties.insert(
            "action".to_string(),
            json!({
                "type": "string",
                "enum": self.action_names(),
                "description": "Operation to perform",
            }),
        );

        let mut actions = Map::new();
        for spec in self.actions() {
            for p in spec.params() {
                properties.entry(p.name.to_string()).or_insert_with(|| {
                    let mut schema = p.kind.schema();
                    schema["description"] = Value::String(p.description.to_string());
                    schema
                });
            }
            actions.insert(spec.name.to_string(), spec.describe());
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": ["action"],
            "actions": actions,
        })
    }

    /// Entry for the `list-capabilities` response.
    pub fn descriptor(self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "inputSchema": self.input_schema(),
        })
    }
}
