//! Actor snapshot model: actors, roles and grants
//!
//! Resources and actions are closed enums for the dashboard taxonomy, with an
//! `Other` fallback so values the permission service adds later still compare
//! correctly. Every string is normalized (trimmed, lowercased) on the way in,
//! which is what makes evaluation case-insensitive.
//!
//! Decoding is lenient: a grant with a missing or malformed `actions` field
//! decodes as a grant that matches nothing, and a role that is not an object
//! is dropped. One corrupt entry never fails the whole snapshot.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Protected domain category
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    /// Wildcard `"all"`, matches every requested resource
    All,
    Orders,
    Products,
    Coupons,
    Campaigns,
    Shipments,
    Returns,
    Transactions,
    Customers,
    Roles,
    Settings,
    /// Any value outside the known taxonomy, stored lowercased
    Other(String),
}

impl Resource {
    /// Parse a resource name case-insensitively
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "all" => Resource::All,
            "orders" => Resource::Orders,
            "products" => Resource::Products,
            "coupons" => Resource::Coupons,
            "campaigns" => Resource::Campaigns,
            "shipments" => Resource::Shipments,
            "returns" => Resource::Returns,
            "transactions" => Resource::Transactions,
            "customers" => Resource::Customers,
            "roles" => Resource::Roles,
            "settings" => Resource::Settings,
            _ => Resource::Other(normalized),
        }
    }

    /// Canonical (lowercase) name
    pub fn as_str(&self) -> &str {
        match self {
            Resource::All => "all",
            Resource::Orders => "orders",
            Resource::Products => "products",
            Resource::Coupons => "coupons",
            Resource::Campaigns => "campaigns",
            Resource::Shipments => "shipments",
            Resource::Returns => "returns",
            Resource::Transactions => "transactions",
            Resource::Customers => "customers",
            Resource::Roles => "roles",
            Resource::Settings => "settings",
            Resource::Other(name) => name,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Resource::All)
    }
}

/// Operation on a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Wildcard, written `"*"` or `"all"`
    All,
    Create,
    Read,
    Update,
    Delete,
    /// Any value outside the known taxonomy, stored lowercased
    Other(String),
}

impl Action {
    /// Parse an action name case-insensitively
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "*" | "all" => Action::All,
            "create" => Action::Create,
            "read" => Action::Read,
            "update" => Action::Update,
            "delete" => Action::Delete,
            _ => Action::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Action::All => "*",
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Other(name) => name,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Action::All)
    }
}

/// Actor-level override tag carried alongside the roles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyRole {
    /// Store owner: every check passes without consulting roles
    Owner,
    Other(String),
}

impl LegacyRole {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        if normalized == "owner" {
            LegacyRole::Owner
        } else {
            LegacyRole::Other(normalized)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LegacyRole::Owner => "owner",
            LegacyRole::Other(name) => name,
        }
    }
}

macro_rules! string_backed {
    ($ty:ident) => {
        impl From<&str> for $ty {
            fn from(raw: &str) -> Self {
                $ty::parse(raw)
            }
        }

        impl From<String> for $ty {
            fn from(raw: String) -> Self {
                $ty::parse(&raw)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok($ty::parse(&raw))
            }
        }
    };
}

string_backed!(Resource);
string_backed!(Action);
string_backed!(LegacyRole);

/// A resource paired with the actions allowed on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    /// `None` when the service sent a grant without a usable resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
    pub actions: Vec<Action>,
}

impl Grant {
    /// Create a grant on `resource` for the given actions
    pub fn new<R, I, A>(resource: R, actions: I) -> Self
    where
        R: Into<Resource>,
        I: IntoIterator<Item = A>,
        A: Into<Action>,
    {
        Self {
            resource: Some(resource.into()),
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    /// A grant that matches nothing
    pub fn empty() -> Self {
        Self { resource: None, actions: Vec::new() }
    }

    fn from_value(value: &Value) -> Self {
        let Value::Object(fields) = value else {
            return Self::empty();
        };

        let resource = fields.get("resource").and_then(Value::as_str).map(Resource::parse);
        let actions = match fields.get("actions") {
            Some(Value::Array(items)) => {
                items.iter().filter_map(Value::as_str).map(Action::parse).collect()
            }
            _ => Vec::new(),
        };

        Self { resource, actions }
    }
}

impl<'de> Deserialize<'de> for Grant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Grant::from_value(&value))
    }
}

/// Named bundle of grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub name: String,
    pub is_active: bool,
    #[serde(rename = "permissions")]
    pub grants: Vec<Grant>,
}

impl Role {
    /// Create an active role with no grants
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_active: true, grants: Vec::new() }
    }

    pub fn with_grant(mut self, grant: Grant) -> Self {
        self.grants.push(grant);
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    fn from_value(value: &Value) -> Option<Self> {
        let Value::Object(fields) = value else {
            return None;
        };

        let name = fields.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
        // Only an explicit `true` activates a role
        let is_active = fields.get("isActive").and_then(Value::as_bool).unwrap_or(false);
        let grants = match fields.get("permissions").or_else(|| fields.get("grants")) {
            Some(Value::Array(items)) => items.iter().map(Grant::from_value).collect(),
            _ => Vec::new(),
        };

        Some(Self { name, is_active, grants })
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Role::from_value(&value).ok_or_else(|| serde::de::Error::custom("role must be an object"))
    }
}

/// Permission snapshot for one actor, as of the last successful load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorSnapshot {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_role: Option<LegacyRole>,
    pub roles: Vec<Role>,
}

impl ActorSnapshot {
    /// Create a snapshot with no roles and no legacy role
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), legacy_role: None, roles: Vec::new() }
    }

    /// Create an owner snapshot
    pub fn owner(id: impl Into<String>) -> Self {
        Self::new(id).with_legacy_role("owner")
    }

    pub fn with_legacy_role(mut self, legacy_role: impl Into<LegacyRole>) -> Self {
        self.legacy_role = Some(legacy_role.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    pub fn is_owner(&self) -> bool {
        matches!(self.legacy_role, Some(LegacyRole::Owner))
    }

    /// Roles that take part in evaluation
    pub fn active_roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter().filter(|role| role.is_active)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActor {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    legacy_role: Value,
    #[serde(default)]
    roles: Vec<Value>,
}

impl<'de> Deserialize<'de> for ActorSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawActor::deserialize(deserializer)?;

        // Services disagree on numeric vs string ids
        let id = match raw.id {
            Value::String(id) => id,
            Value::Number(id) => id.to_string(),
            _ => String::new(),
        };

        Ok(Self {
            id,
            legacy_role: raw.legacy_role.as_str().map(LegacyRole::parse),
            roles: raw.roles.iter().filter_map(Role::from_value).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_parse_is_case_insensitive() {
        assert_eq!(Resource::parse("Orders"), Resource::Orders);
        assert_eq!(Resource::parse("  ALL "), Resource::All);
        assert_eq!(Resource::parse("Gift-Cards"), Resource::Other("gift-cards".to_string()));
        assert_eq!(Resource::parse("Gift-Cards").as_str(), "gift-cards");
    }

    #[test]
    fn test_action_wildcards() {
        assert_eq!(Action::parse("*"), Action::All);
        assert_eq!(Action::parse("ALL"), Action::All);
        assert_eq!(Action::parse("Read"), Action::Read);
        assert_eq!(Action::parse("export"), Action::Other("export".to_string()));
    }

    #[test]
    fn test_snapshot_decodes_service_payload() {
        let payload = r#"{
            "id": "act_42",
            "legacyRole": "Staff",
            "roles": [
                {"name": "Fulfilment", "isActive": true,
                 "permissions": [{"resource": "Orders", "actions": ["read", "UPDATE"]}]},
                {"name": "Old", "isActive": false,
                 "permissions": [{"resource": "products", "actions": ["*"]}]}
            ]
        }"#;

        let snapshot: ActorSnapshot = serde_json::from_str(payload).unwrap();

        assert_eq!(snapshot.id, "act_42");
        assert!(!snapshot.is_owner());
        assert_eq!(snapshot.roles.len(), 2);
        assert_eq!(snapshot.active_roles().count(), 1);
        assert_eq!(snapshot.roles[0].grants[0], Grant::new("orders", ["read", "update"]));
    }

    #[test]
    fn test_malformed_grants_decode_as_empty() {
        let payload = r#"{
            "id": 7,
            "roles": [
                {"name": "Broken", "grants": [
                    {"resource": "orders"},
                    {"resource": "orders", "actions": "read"},
                    {"resource": "orders", "actions": [1, "read"]},
                    "garbage"
                ]},
                42
            ]
        }"#;

        let snapshot: ActorSnapshot = serde_json::from_str(payload).unwrap();

        assert_eq!(snapshot.id, "7");
        assert_eq!(snapshot.roles.len(), 1);
        let grants = &snapshot.roles[0].grants;
        assert!(!snapshot.roles[0].is_active);
        assert!(grants[0].actions.is_empty());
        assert!(grants[1].actions.is_empty());
        assert_eq!(grants[2].actions, vec![Action::Read]);
        assert_eq!(grants[3], Grant::empty());
    }

    #[test]
    fn test_role_without_boolean_active_flag_is_inactive() {
        let payload = r#"{
            "id": "act_5",
            "roles": [
                {"name": "Corrupt", "isActive": "false",
                 "permissions": [{"resource": "orders", "actions": ["*"]}]},
                {"name": "Unflagged",
                 "permissions": [{"resource": "settings", "actions": ["delete"]}]},
                {"name": "Nulled", "isActive": null,
                 "permissions": [{"resource": "all", "actions": ["read"]}]}
            ]
        }"#;

        let snapshot: ActorSnapshot = serde_json::from_str(payload).unwrap();

        assert_eq!(snapshot.roles.len(), 3);
        assert_eq!(snapshot.active_roles().count(), 0);
        assert!(!crate::permissions::evaluate_str(Some(&snapshot), &["orders"], "read"));
        assert!(!crate::permissions::evaluate_str(Some(&snapshot), &["settings"], "delete"));
        assert!(!crate::permissions::evaluate_str(Some(&snapshot), &["products"], "read"));
    }

    #[test]
    fn test_snapshot_serializes_in_service_shape() {
        let snapshot = ActorSnapshot::owner("act_1")
            .with_role(Role::new("Support").with_grant(Grant::new("returns", ["read"])));

        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["legacyRole"], "owner");
        assert_eq!(json["roles"][0]["isActive"], true);
        assert_eq!(json["roles"][0]["permissions"][0]["resource"], "returns");

        let back: ActorSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }
}
