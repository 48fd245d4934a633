use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError};

/// A user's enrolment in a shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default)]
    pub id: Option<i64>,
    pub user_id: i64,
    #[serde(default)]
    pub user_full_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_phone: Option<String>,
    #[serde(default)]
    pub shift_id: Option<i64>,
    #[serde(default)]
    pub shift_name: Option<String>,
    #[serde(default)]
    pub room_id: Option<i64>,
    #[serde(default)]
    pub room_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRegistration {
    pub user_id: i64,
    pub shift_id: i64,
    pub room_id: Option<i64>,
}

pub struct RegistrationsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> RegistrationsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn register(&self, registration: &NewRegistration) -> Result<(), ApiError> {
        self.client
            .execute(
                self.client
                    .request(Method::POST, "registrations")
                    .json(registration),
            )
            .await
    }

    pub async fn for_user(&self, user_id: i64) -> Result<Vec<Registration>, ApiError> {
        self.client
            .fetch(
                self.client
                    .request(Method::GET, &format!("registrations/user/{}", user_id)),
            )
            .await
    }

    pub async fn for_shift(&self, shift_id: i64) -> Result<Vec<Registration>, ApiError> {
        self.client
            .fetch(
                self.client
                    .request(Method::GET, &format!("registrations/shift/{}", shift_id)),
            )
            .await
    }

    pub async fn unregister(&self, user_id: i64, shift_id: i64) -> Result<(), ApiError> {
        let path = format!("registrations/user/{}/shift/{}", user_id, shift_id);
        self.client
            .execute(self.client.request(Method::DELETE, &path))
            .await
    }
}
