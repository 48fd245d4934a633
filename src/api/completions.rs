use chrono::NaiveDateTime;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError};

/// Record of an appointment carried out by a nurse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureCompletion {
    pub id: i64,
    pub appointment_id: i64,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub completed_by_id: Option<i64>,
    #[serde(default)]
    pub completed_by_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub procedure_name: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub cabinet_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompletion {
    pub appointment_id: i64,
    pub user_id: i64,
    pub notes: String,
}

pub struct CompletionsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CompletionsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, completion: &NewCompletion) -> Result<ProcedureCompletion, ApiError> {
        self.client
            .fetch(
                self.client
                    .request(Method::POST, "procedure-completions")
                    .json(completion),
            )
            .await
    }

    pub async fn for_appointment(
        &self,
        appointment_id: i64,
    ) -> Result<Vec<ProcedureCompletion>, ApiError> {
        let path = format!("procedure-completions/by-appointment/{}", appointment_id);
        self.client
            .fetch(self.client.request(Method::GET, &path))
            .await
    }

    pub async fn for_user(&self, user_id: i64) -> Result<Vec<ProcedureCompletion>, ApiError> {
        let path = format!("procedure-completions/by-user/{}", user_id);
        self.client
            .fetch(self.client.request(Method::GET, &path))
            .await
    }
}
