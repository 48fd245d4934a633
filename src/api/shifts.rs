use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError};
use crate::forms::ShiftForm;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: i64,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, alias = "isActive")]
    pub active: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl Shift {
    /// Status label shown in shift tables.
    pub fn status_label(&self) -> &'static str {
        if self.active { "Активна" } else { "Неактивна" }
    }
}

pub struct ShiftsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ShiftsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Shift>, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, "shifts"))
            .await
    }

    pub async fn active(&self) -> Result<Vec<Shift>, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, "shifts/active"))
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Shift, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, &format!("shifts/{}", id)))
            .await
    }

    pub async fn create(&self, form: &ShiftForm) -> Result<Shift, ApiError> {
        self.client
            .fetch(self.client.request(Method::POST, "shifts").json(form))
            .await
    }

    pub async fn update(&self, id: i64, form: &ShiftForm) -> Result<Shift, ApiError> {
        let request = self
            .client
            .request(Method::PUT, &format!("shifts/{}", id))
            .json(form);
        self.client.fetch(request).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .execute(self.client.request(Method::DELETE, &format!("shifts/{}", id)))
            .await
    }

    pub async fn set_active(&self, id: i64, active: bool) -> Result<(), ApiError> {
        let request = self
            .client
            .request(Method::PATCH, &format!("shifts/{}/status", id))
            .query(&[("isActive", active)]);
        self.client.execute(request).await
    }
}
