use serde::{Deserialize, Serialize};

use super::{de_flag, de_id};
use crate::repository::Resource;
use crate::validation::{is_blank, FieldErrors, Validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Designation {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_flag")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateDesignation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDesignation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Validate for CreateDesignation {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("name", Some(&self.name), "Designation name is required");
        errors.into_result()
    }
}

impl Validate for UpdateDesignation {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.is_some() && is_blank(self.name.as_deref()) {
            errors.add("name", "Designation name is required");
        }
        errors.into_result()
    }
}

impl Resource for Designation {
    type Create = CreateDesignation;
    type Update = UpdateDesignation;

    const SINGULAR: &'static str = "designation";
    const PLURAL: &'static str = "designations";
    const PATH: &'static str = "/api/designations";
    const COLLECTION_KEYS: &'static [&'static str] = &["designations"];

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}
