use crate::api::{ApiClient, ApiError, News, Procedure, Shift};

/// Pages anyone can open: news, upcoming shifts and the procedure catalogue.
pub struct PublicView {
    client: ApiClient,
}

impl PublicView {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn news(&self) -> Result<Vec<News>, ApiError> {
        self.client.news().list().await
    }

    pub async fn active_shifts(&self) -> Result<Vec<Shift>, ApiError> {
        self.client.shifts().active().await
    }

    pub async fn procedures(&self) -> Result<Vec<Procedure>, ApiError> {
        self.client.procedures().list().await
    }
}
