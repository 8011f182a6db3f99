use serde::{Deserialize, Serialize, Serializer};

use super::{de_flag, de_id, EntityRef};
use crate::repository::Resource;
use crate::validation::{is_blank, is_email, FieldErrors, Validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub mobile_no: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_leader: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_manager: Option<EntityRef>,
    #[serde(default, deserialize_with = "de_flag")]
    pub is_verified: bool,
}

impl AdminUser {
    /// Display name: `name`, else first/last, else email.
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.email.clone()
        } else {
            full
        }
    }

    /// Reduced form used for team leader / manager pickers.
    pub fn as_member(&self) -> EntityRef {
        EntityRef {
            id: self.id.clone(),
            name: self.display_name(),
            email: Some(self.email.clone()),
        }
    }
}

/// Relation ids: an empty string is sent as `null` so the relation is cleared.
fn blank_as_null<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => serializer.serialize_str(v),
        _ => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_no: Option<String>,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "blank_as_null")]
    pub organisation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "blank_as_null")]
    pub department_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "blank_as_null")]
    pub designation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "blank_as_null")]
    pub reporting_team_leader_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "blank_as_null")]
    pub reporting_team_manager_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "blank_as_null")]
    pub organisation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "blank_as_null")]
    pub department_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "blank_as_null")]
    pub designation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "blank_as_null")]
    pub reporting_team_leader_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "blank_as_null")]
    pub reporting_team_manager_id: Option<String>,
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if is_blank(Some(email)) {
        errors.add("email", "Email is required");
    } else if !is_email(email) {
        errors.add("email", "Invalid email format");
    }
}

impl Validate for CreateAdminUser {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        errors.require("password", Some(&self.password), "Password is required");
        let named = [&self.name, &self.first_name, &self.last_name]
            .iter()
            .any(|v| !is_blank(v.as_deref()));
        if !named {
            errors.add("name", "Name or First/Last name is required");
        }
        errors.into_result()
    }
}

impl Validate for UpdateAdminUser {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(email) = &self.email {
            check_email(&mut errors, email);
        }
        if self.password.is_some() && is_blank(self.password.as_deref()) {
            errors.add("password", "Password cannot be blank");
        }
        errors.into_result()
    }
}

impl Resource for AdminUser {
    type Create = CreateAdminUser;
    type Update = UpdateAdminUser;

    const SINGULAR: &'static str = "user";
    const PLURAL: &'static str = "users";
    const PATH: &'static str = "/api/admin/users";
    const COLLECTION_KEYS: &'static [&'static str] = &["users"];

    fn create_path() -> String {
        format!("{}/create", Self::PATH)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.email
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_requires_email_password_and_some_name() {
        let errors = CreateAdminUser::default().validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
        assert_eq!(errors.get("name"), Some("Name or First/Last name is required"));

        let ok = CreateAdminUser {
            first_name: Some("Alice".to_string()),
            email: "alice@x.com".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn blank_relation_ids_are_sent_as_null() {
        let update = UpdateAdminUser {
            department_id: Some(String::new()),
            role: Some("admin".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"role": "admin", "departmentId": null})
        );
    }

    #[test]
    fn display_name_falls_back_to_parts_then_email() {
        let mut user: AdminUser = serde_json::from_value(json!({
            "id": 9,
            "email": "bob@x.com",
            "firstName": "Bob",
            "lastName": "Stone",
            "isVerified": true
        }))
        .unwrap();
        assert_eq!(user.display_name(), "Bob Stone");
        user.first_name = None;
        user.last_name = None;
        assert_eq!(user.display_name(), "bob@x.com");
        assert_eq!(user.as_member().id, "9");
    }
}
