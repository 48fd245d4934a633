use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError, Appointment, ProcedureCompletion};
use crate::forms::UserForm;
use crate::session::Role;

/// Account record as listed by the users endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    pub login: String,
    #[serde(default)]
    pub roles: Vec<RoleEntry>,
}

/// Role as it appears inside a user record: either a bare label or a
/// `{ "name": label }` object, depending on the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleEntry {
    Named { name: Role },
    Label(Role),
}

impl RoleEntry {
    pub fn role(&self) -> &Role {
        match self {
            RoleEntry::Named { name } => name,
            RoleEntry::Label(role) => role,
        }
    }
}

impl User {
    pub fn role_list(&self) -> Vec<Role> {
        self.roles.iter().map(|entry| entry.role().clone()).collect()
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.iter().any(|entry| entry.role() == role)
    }

    /// Doctors and nurses; the pool cabinets are assigned from.
    pub fn is_medical_staff(&self) -> bool {
        self.roles.iter().any(|entry| entry.role().is_medical_staff())
    }

    /// Comma-separated short role names for list views.
    pub fn roles_label(&self) -> String {
        if self.roles.is_empty() {
            return Role::User.short_name().to_string();
        }
        self.roles
            .iter()
            .map(|entry| entry.role().short_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Personal data shown on the regular user's dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

/// One past or current shift of a user with what happened during it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserShiftInfo {
    pub shift_id: i64,
    pub shift_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub room_number: Option<String>,
    #[serde(default)]
    pub room_description: Option<String>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub completed_procedures: Vec<ProcedureCompletion>,
}

pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, "users"))
            .await
    }

    /// Accounts holding only the regular user role.
    pub async fn list_regular(&self) -> Result<Vec<User>, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, "users/regular"))
            .await
    }

    pub async fn get(&self, id: i64) -> Result<User, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, &format!("users/{}", id)))
            .await
    }

    /// Create an account. With `with_roles` the backend applies the form's
    /// roles, otherwise it assigns the default role.
    pub async fn create(&self, form: &UserForm, with_roles: bool) -> Result<User, ApiError> {
        let mut request = self.client.request(Method::POST, "users").json(form);
        if with_roles {
            request = request.query(&[("withRoles", true)]);
        }
        self.client.fetch(request).await
    }

    /// Update an account. Roles are only changed when `update_roles` is set.
    pub async fn update(
        &self,
        id: i64,
        form: &UserForm,
        update_roles: bool,
    ) -> Result<User, ApiError> {
        let mut request = self
            .client
            .request(Method::PUT, &format!("users/{}", id))
            .json(form);
        if update_roles {
            request = request.query(&[("updateRoles", true)]);
        }
        self.client.fetch(request).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .execute(self.client.request(Method::DELETE, &format!("users/{}", id)))
            .await
    }

    /// Every role label the backend can grant.
    pub async fn roles(&self) -> Result<Vec<Role>, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, "users/roles"))
            .await
    }

    pub async fn profile(&self, id: i64) -> Result<UserProfile, ApiError> {
        self.client
            .fetch(
                self.client
                    .request(Method::GET, &format!("users/{}/profile", id)),
            )
            .await
    }

    pub async fn shifts(&self, id: i64) -> Result<Vec<UserShiftInfo>, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, &format!("users/{}/shifts", id)))
            .await
    }
}
