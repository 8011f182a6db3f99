//! Picker data for the user and client forms.
//!
//! The reads are independent, so they are issued together and joined. Each
//! result is applied on its own: a dataset that fails to load stays `None`
//! and does not hold back the others.

use serde::Serialize;

use crate::api::ApiClient;
use crate::error::ApiFailure;
use crate::models::{AdminUser, Department, Designation, EntityRef, Organization, ProjectManager, Role};
use crate::repository::{Repository, Resource};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserFormOptions {
    pub roles: Option<Vec<Role>>,
    pub organisations: Option<Vec<Organization>>,
    pub departments: Option<Vec<Department>>,
    pub designations: Option<Vec<Designation>>,
    /// Candidates for team leader / team manager
    pub team_members: Option<Vec<EntityRef>>,
}

impl UserFormOptions {
    pub fn is_complete(&self) -> bool {
        self.roles.is_some()
            && self.organisations.is_some()
            && self.departments.is_some()
            && self.designations.is_some()
            && self.team_members.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientFormOptions {
    pub departments: Option<Vec<EntityRef>>,
    pub project_managers: Option<Vec<ProjectManager>>,
}

fn settle<R: Resource>(result: Result<Vec<R>, ApiFailure>) -> Option<Vec<R>> {
    match result {
        Ok(records) => Some(records),
        Err(failure) => {
            tracing::warn!(resource = R::PLURAL, %failure, "option list failed to load");
            None
        }
    }
}

pub async fn load_user_form_options(api: &ApiClient, token: &str) -> UserFormOptions {
    let roles = Repository::<Role>::new(api.clone());
    let organisations = Repository::<Organization>::new(api.clone());
    let departments = Repository::<Department>::new(api.clone());
    let designations = Repository::<Designation>::new(api.clone());
    let users = Repository::<AdminUser>::new(api.clone());

    let (roles, organisations, departments, designations, users) = futures::join!(
        roles.fetch_all(token),
        organisations.fetch_all(token),
        departments.fetch_all(token),
        designations.fetch_all(token),
        users.fetch_all(token),
    );

    UserFormOptions {
        roles: settle(roles),
        organisations: settle(organisations),
        departments: settle(departments),
        designations: settle(designations),
        team_members: settle(users).map(|users| users.iter().map(AdminUser::as_member).collect()),
    }
}

pub async fn load_client_form_options(api: &ApiClient, token: &str) -> ClientFormOptions {
    let departments = Repository::<Department>::new(api.clone());
    let users = Repository::<AdminUser>::new(api.clone());

    let (departments, users) = futures::join!(departments.fetch_all(token), users.fetch_all(token));

    ClientFormOptions {
        departments: settle(departments).map(|depts| {
            depts
                .into_iter()
                .map(|d| EntityRef {
                    id: d.id,
                    name: d.name,
                    email: None,
                })
                .collect()
        }),
        project_managers: settle(users).map(|users| {
            users
                .into_iter()
                .map(|u| ProjectManager {
                    name: u.display_name(),
                    id: u.id,
                    first_name: u.first_name,
                    last_name: u.last_name,
                    email: u.email,
                })
                .collect()
        }),
    }
}
