use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError};
use crate::forms::RoomForm;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i64,
    pub number: String,
    pub capacity: i32,
    #[serde(default)]
    pub description: Option<String>,
}

pub struct RoomsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> RoomsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Room>, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, "rooms"))
            .await
    }

    /// Rooms with free places during the given shift.
    pub async fn available(&self, shift_id: i64) -> Result<Vec<Room>, ApiError> {
        let request = self
            .client
            .request(Method::GET, "rooms/available")
            .query(&[("shiftId", shift_id)]);
        self.client.fetch(request).await
    }

    pub async fn create(&self, form: &RoomForm) -> Result<Room, ApiError> {
        self.client
            .fetch(self.client.request(Method::POST, "rooms").json(form))
            .await
    }

    pub async fn update(&self, id: i64, form: &RoomForm) -> Result<Room, ApiError> {
        let request = self
            .client
            .request(Method::PUT, &format!("rooms/{}", id))
            .json(form);
        self.client.fetch(request).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .execute(self.client.request(Method::DELETE, &format!("rooms/{}", id)))
            .await
    }
}
