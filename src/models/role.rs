use serde::{Deserialize, Serialize};

use super::de_id;
use crate::repository::Resource;
use crate::validation::{is_blank, FieldErrors, Validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateRole {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRole {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Validate for CreateRole {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("name", Some(&self.name), "Role name is required");
        errors.into_result()
    }
}

impl Validate for UpdateRole {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.is_some() && is_blank(self.name.as_deref()) {
            errors.add("name", "Role name is required");
        }
        errors.into_result()
    }
}

impl Resource for Role {
    type Create = CreateRole;
    type Update = UpdateRole;

    const SINGULAR: &'static str = "role";
    const PLURAL: &'static str = "roles";
    const PATH: &'static str = "/api/roles";
    const COLLECTION_KEYS: &'static [&'static str] = &["roles"];

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}
