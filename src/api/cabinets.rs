use std::collections::BTreeMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError};
use crate::forms::CabinetForm;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cabinet {
    pub id: i64,
    pub number: String,
    pub name: String,
}

/// Link between a staff member and a cabinet. All staff-cabinet endpoints
/// return this shape; which side is filled in depends on the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffAssignment {
    pub cabinet_id: i64,
    #[serde(default)]
    pub cabinet_number: Option<String>,
    #[serde(default)]
    pub cabinet_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_full_name: Option<String>,
    #[serde(default)]
    pub user_login: Option<String>,
}

impl StaffAssignment {
    pub fn cabinet_label(&self) -> String {
        format!(
            "Кабинет {}: {}",
            self.cabinet_number.as_deref().unwrap_or("-"),
            self.cabinet_name.as_deref().unwrap_or("")
        )
    }

    pub fn member(&self) -> Option<StaffMember> {
        Some(StaffMember {
            id: self.user_id?,
            full_name: self.user_full_name.clone().unwrap_or_default(),
            login: self.user_login.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffMember {
    pub id: i64,
    pub full_name: String,
    pub login: Option<String>,
}

/// Group a flat assignment list by cabinet, keeping assignment order.
/// Entries without a user are skipped.
pub fn group_assignments(assignments: &[StaffAssignment]) -> BTreeMap<i64, Vec<StaffMember>> {
    let mut grouped: BTreeMap<i64, Vec<StaffMember>> = BTreeMap::new();
    for assignment in assignments {
        if let Some(member) = assignment.member() {
            grouped.entry(assignment.cabinet_id).or_default().push(member);
        }
    }
    grouped
}

pub struct CabinetsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CabinetsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Cabinet>, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, "cabinets"))
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Cabinet, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, &format!("cabinets/{}", id)))
            .await
    }

    pub async fn create(&self, form: &CabinetForm) -> Result<Cabinet, ApiError> {
        self.client
            .fetch(self.client.request(Method::POST, "cabinets").json(form))
            .await
    }

    pub async fn update(&self, id: i64, form: &CabinetForm) -> Result<Cabinet, ApiError> {
        let request = self
            .client
            .request(Method::PUT, &format!("cabinets/{}", id))
            .json(form);
        self.client.fetch(request).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .execute(self.client.request(Method::DELETE, &format!("cabinets/{}", id)))
            .await
    }

    /// Whether a cabinet with this number already exists.
    pub async fn exists(&self, number: &str) -> Result<bool, ApiError> {
        let request = self
            .client
            .request(Method::GET, "cabinets/exists")
            .query(&[("number", number)]);
        self.client.fetch(request).await
    }
}

/// Assignment of medical staff to cabinets.
pub struct StaffCabinetsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> StaffCabinetsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn assign(&self, user_id: i64, cabinet_id: i64) -> Result<(), ApiError> {
        let request = self
            .client
            .request(Method::POST, "staff-cabinets")
            .query(&[("userId", user_id), ("cabinetId", cabinet_id)]);
        self.client.execute(request).await
    }

    pub async fn unassign(&self, user_id: i64, cabinet_id: i64) -> Result<(), ApiError> {
        let request = self
            .client
            .request(Method::DELETE, "staff-cabinets")
            .query(&[("userId", user_id), ("cabinetId", cabinet_id)]);
        self.client.execute(request).await
    }

    /// Cabinets a staff member works in.
    pub async fn for_user(&self, user_id: i64) -> Result<Vec<StaffAssignment>, ApiError> {
        self.client
            .fetch(
                self.client
                    .request(Method::GET, &format!("staff-cabinets/by-user/{}", user_id)),
            )
            .await
    }

    pub async fn for_cabinet(&self, cabinet_id: i64) -> Result<Vec<StaffAssignment>, ApiError> {
        self.client
            .fetch(
                self.client
                    .request(Method::GET, &format!("staff-cabinets/by-cabinet/{}", cabinet_id)),
            )
            .await
    }

    pub async fn all(&self) -> Result<Vec<StaffAssignment>, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, "staff-cabinets/assignments"))
            .await
    }
}
