use chrono::NaiveDateTime;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError};
use crate::forms::{FieldErrors, NewsForm};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct News {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Multipart body with `title`, `content` and an optional `imageFile` part.
fn multipart(form: &NewsForm) -> Result<Form, ApiError> {
    let body = Form::new()
        .text("title", form.title.clone())
        .text("content", form.content.clone());

    let Some(image) = &form.image else {
        return Ok(body);
    };

    let part = Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.content_type)
        .map_err(|_| {
            let mut errors = FieldErrors::new();
            errors.insert("imageFile", "Только JPG, PNG или GIF");
            ApiError::Validation(errors)
        })?;
    Ok(body.part("imageFile", part))
}

pub struct NewsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> NewsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Published news, newest first as returned by the backend. No
    /// credential needed.
    pub async fn list(&self) -> Result<Vec<News>, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, "news"))
            .await
    }

    pub async fn create(&self, form: &NewsForm) -> Result<News, ApiError> {
        let request = self
            .client
            .request(Method::POST, "news")
            .multipart(multipart(form)?);
        self.client.fetch(request).await
    }

    pub async fn update(&self, id: i64, form: &NewsForm) -> Result<News, ApiError> {
        let request = self
            .client
            .request(Method::PUT, &format!("news/{}", id))
            .multipart(multipart(form)?);
        self.client.fetch(request).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .execute(self.client.request(Method::DELETE, &format!("news/{}", id)))
            .await
    }
}
