use serde::{Deserialize, Serialize};

use super::{de_flag, de_id, de_opt_id, EntityRef};
use crate::repository::Resource;
use crate::validation::{is_blank, FieldErrors, Validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub organisation_id: Option<String>,
    #[serde(default, deserialize_with = "de_flag")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityRef>,
}

impl Department {
    /// Owning organisation id, from the flat field or the embedded relation.
    pub fn organisation_id(&self) -> Option<&str> {
        self.organisation_id
            .as_deref()
            .or_else(|| self.organisation.as_ref().map(|o| o.id.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartment {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub organisation_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Validate for CreateDepartment {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("name", Some(&self.name), "Department name is required");
        errors.require("organisationId", Some(&self.organisation_id), "Organization is required");
        errors.into_result()
    }
}

impl Validate for UpdateDepartment {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.is_some() && is_blank(self.name.as_deref()) {
            errors.add("name", "Department name is required");
        }
        if self.organisation_id.is_some() && is_blank(self.organisation_id.as_deref()) {
            errors.add("organisationId", "Organization is required");
        }
        errors.into_result()
    }
}

impl Resource for Department {
    type Create = CreateDepartment;
    type Update = UpdateDepartment;

    const SINGULAR: &'static str = "department";
    const PLURAL: &'static str = "departments";
    const PATH: &'static str = "/api/departments";
    const COLLECTION_KEYS: &'static [&'static str] = &["departments"];
    const LIST_FILTERS: &'static [&'static str] = &["organisationId"];

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}
