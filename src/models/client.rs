use serde::{Deserialize, Serialize};

use super::{de_id, de_opt_id, EntityRef};
use crate::repository::Resource;
use crate::validation::{is_blank, is_email, FieldErrors, Validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub client_code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub coordinator_first_name: Option<String>,
    #[serde(default)]
    pub coordinator_last_name: Option<String>,
    #[serde(default)]
    pub coordinator_email: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub department_id: Option<String>,
    #[serde(default)]
    pub office_no: Option<String>,
    #[serde(default)]
    pub mobile_no: Option<String>,
    #[serde(default)]
    pub street_address: Option<String>,
    #[serde(default)]
    pub tree_address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<EntityRef>,
    #[serde(default)]
    pub project_managers: Vec<ProjectManager>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectManager {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator_first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator_last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project_manager_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator_first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator_last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_manager_ids: Option<Vec<String>>,
}

fn check_coordinator_email(errors: &mut FieldErrors, email: Option<&str>) {
    if let Some(email) = email.filter(|e| !e.is_empty()) {
        if !is_email(email) {
            errors.add("coordinatorEmail", "Invalid email format");
        }
    }
}

impl Validate for CreateClient {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("name", Some(&self.name), "Client name is required");
        check_coordinator_email(&mut errors, self.coordinator_email.as_deref());
        errors.into_result()
    }
}

impl Validate for UpdateClient {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.is_some() && is_blank(self.name.as_deref()) {
            errors.add("name", "Client name is required");
        }
        check_coordinator_email(&mut errors, self.coordinator_email.as_deref());
        errors.into_result()
    }
}

impl Resource for Client {
    type Create = CreateClient;
    type Update = UpdateClient;

    const SINGULAR: &'static str = "client";
    const PLURAL: &'static str = "clients";
    const PATH: &'static str = "/api/clients";
    const COLLECTION_KEYS: &'static [&'static str] = &["clients"];

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
    fn decodes_relations() {
        let client: Client = serde_json::from_value(json!({
            "id": "c1",
            "name": "Globex",
            "department": {"id": "d1", "name": "Sales", "organisationId": "o1", "isActive": true},
            "projectManagers": [{"id": 3, "firstName": "Ann", "lastName": "Lee", "email": "ann@x.com", "name": "Ann Lee"}]
        }))
        .unwrap();
        assert_eq!(client.department.unwrap().name, "Sales");
        assert_eq!(client.project_managers[0].id, "3");
    }

    #[test]
    fn empty_manager_list_is_omitted_on_create() {
        let create = CreateClient {
            name: "Globex".to_string(),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&create).unwrap(), json!({"name": "Globex"}));
    }
}
