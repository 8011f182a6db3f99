//! Wire schemas for the managed entities.
//!
//! Records are transient copies of server state. Field names follow the
//! API's camelCase; unknown fields are ignored and identifiers are
//! normalized to strings whether the server sends them as strings or
//! numbers.

pub mod client;
pub mod department;
pub mod designation;
pub mod organization;
pub mod role;
pub mod user;

pub use client::{Client, CreateClient, ProjectManager, UpdateClient};
pub use department::{CreateDepartment, Department, UpdateDepartment};
pub use designation::{CreateDesignation, Designation, UpdateDesignation};
pub use organization::{CreateOrganization, Organization, UpdateOrganization};
pub use role::{CreateRole, Role, UpdateRole};
pub use user::{AdminUser, CreateAdminUser, UpdateAdminUser};

use serde::{Deserialize, Deserializer, Serialize};

/// A related entity embedded in a record, e.g. a department's organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

pub(crate) fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

pub(crate) fn de_opt_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}

/// `null` becomes `false` instead of a decode error.
pub(crate) fn de_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Option::<bool>::deserialize(deserializer).map(Option::unwrap_or_default)
}
