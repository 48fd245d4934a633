use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError};
use crate::forms::ProcedureForm;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub cabinet_id: Option<i64>,
    #[serde(default)]
    pub cabinet_number: Option<String>,
    #[serde(default)]
    pub cabinet_name: Option<String>,
    /// Minutes
    #[serde(default)]
    pub default_duration: Option<i32>,
}

impl Procedure {
    pub fn cabinet_label(&self) -> String {
        match (&self.cabinet_number, &self.cabinet_name) {
            (Some(number), Some(name)) => format!("{} - {}", number, name),
            (Some(number), None) => number.clone(),
            (None, Some(name)) => name.clone(),
            (None, None) => "Не назначен".to_string(),
        }
    }
}

pub struct ProceduresApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ProceduresApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Procedure>, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, "procedures"))
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Procedure, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, &format!("procedures/{}", id)))
            .await
    }

    pub async fn for_cabinet(&self, cabinet_id: i64) -> Result<Vec<Procedure>, ApiError> {
        self.client
            .fetch(
                self.client
                    .request(Method::GET, &format!("procedures/by-cabinet/{}", cabinet_id)),
            )
            .await
    }

    pub async fn create(&self, form: &ProcedureForm) -> Result<Procedure, ApiError> {
        self.client
            .fetch(self.client.request(Method::POST, "procedures").json(form))
            .await
    }

    pub async fn update(&self, id: i64, form: &ProcedureForm) -> Result<Procedure, ApiError> {
        let request = self
            .client
            .request(Method::PUT, &format!("procedures/{}", id))
            .json(form);
        self.client.fetch(request).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .execute(self.client.request(Method::DELETE, &format!("procedures/{}", id)))
            .await
    }
}
