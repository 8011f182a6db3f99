use serde::{Deserialize, Serialize};

use super::{de_flag, de_id};
use crate::repository::Resource;
use crate::validation::{is_blank, is_email, is_phone, FieldErrors, Validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de_flag")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganization {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

fn check_contact(errors: &mut FieldErrors, email: Option<&str>, phone: Option<&str>) {
    if let Some(email) = email.filter(|e| !e.is_empty()) {
        if !is_email(email) {
            errors.add("email", "Invalid email format");
        }
    }
    if let Some(phone) = phone.filter(|p| !p.is_empty()) {
        if !is_phone(phone) {
            errors.add("phone", "Invalid phone number format");
        }
    }
}

impl Validate for CreateOrganization {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("name", Some(&self.name), "Organization name is required");
        check_contact(&mut errors, self.email.as_deref(), self.phone.as_deref());
        errors.into_result()
    }
}

impl Validate for UpdateOrganization {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.is_some() && is_blank(self.name.as_deref()) {
            errors.add("name", "Organization name is required");
        }
        check_contact(&mut errors, self.email.as_deref(), self.phone.as_deref());
        errors.into_result()
    }
}

impl Resource for Organization {
    type Create = CreateOrganization;
    type Update = UpdateOrganization;

    const SINGULAR: &'static str = "organization";
    const PLURAL: &'static str = "organizations";
    const PATH: &'static str = "/api/organisations";
    const COLLECTION_KEYS: &'static [&'static str] = &["organisations", "organizations"];

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_minimal_record() {
        let org: Organization =
            serde_json::from_value(json!({"id": "1", "name": "Acme", "isActive": true})).unwrap();
        assert_eq!(org.id, "1");
        assert!(org.is_active);
        assert_eq!(org.address, None);
    }

    #[test]
    fn name_is_required() {
        let errors = CreateOrganization::default().validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Organization name is required"));
    }

    #[test]
    fn contact_fields_are_checked_only_when_present() {
        let ok = CreateOrganization {
            name: "Acme".to_string(),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let bad = CreateOrganization {
            name: "Acme".to_string(),
            email: Some("acme".to_string()),
            phone: Some("call me".to_string()),
            ..Default::default()
        };
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Invalid email format"));
        assert_eq!(errors.get("phone"), Some("Invalid phone number format"));
    }

    #[test]
    fn update_omits_unset_fields() {
        let update = UpdateOrganization {
            is_active: Some(false),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"isActive": false}));
        assert!(update.validate().is_ok());
    }
}
