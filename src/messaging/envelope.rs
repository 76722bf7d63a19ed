use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed enumeration of persistence operations. Every envelope carries
/// exactly one tag; the tag determines which fields and document the
/// receiving actor expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Register,
    Login,
    LookupByEmail,
    LookupByUsername,
    LookupByField,
    Update,
    Delete,
    Follow,
    Unfollow,
    CreateArticle,
}

/// Well-known envelope field keys.
pub mod fields {
    /// Lookup key for by-email / by-username lookups.
    pub const CRITERIA: &str = "criteria";
    /// Username identifying the record a user update applies to.
    pub const EXISTING: &str = "existing";
    /// Field name for generic by-field lookups.
    pub const FIELD: &str = "field";
    /// Field value for generic by-field lookups.
    pub const VALUE: &str = "value";
    /// Username on the receiving end of a follow edge.
    pub const FOLLOWED: &str = "followed";
    /// Email of the user initiating a follow edge.
    pub const FOLLOWER: &str = "follower";
}

/// The message unit sent across the addressable channel: one action tag,
/// string fields keyed by the tag's contract, and an optional document body.
/// Immutable once built; construction consumes the builder and the bus takes
/// ownership on send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    action: Action,
    fields: HashMap<String, String>,
    document: Option<Value>,
}

impl Envelope {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            fields: HashMap::new(),
            document: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_document(mut self, document: Value) -> Self {
        self.document = Some(document);
        self
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn document(&self) -> Option<&Value> {
        self.document.as_ref()
    }

    pub fn take_document(&mut self) -> Option<Value> {
        self.document.take()
    }
}

/// One correlated reply per sent envelope: either a details document or a
/// failure reason, never both. The enum representation makes the
/// exactly-one-of invariant unrepresentable to violate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reply {
    Success { details: Value },
    Failure { reason: String },
}

impl Reply {
    pub fn success(details: Value) -> Self {
        Self::Success { details }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
