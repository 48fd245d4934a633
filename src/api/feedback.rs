use chrono::NaiveDateTime;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError};
use crate::forms::FieldErrors;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: i64,
    #[serde(default)]
    pub user_full_name: Option<String>,
    pub message: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub read: bool,
}

/// Longest accepted feedback message, in characters.
pub const MAX_FEEDBACK_LEN: usize = 1000;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewFeedback<'a> {
    message: &'a str,
    user_id: i64,
    user_full_name: &'a str,
}

pub struct FeedbackApi<'a> {
    client: &'a ApiClient,
}

impl<'a> FeedbackApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Feedback>, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, "feedback"))
            .await
    }

    pub async fn unread(&self) -> Result<Vec<Feedback>, ApiError> {
        self.client
            .fetch(self.client.request(Method::GET, "feedback/unread"))
            .await
    }

    /// Submit a message as the signed-in user.
    pub async fn send(&self, message: &str) -> Result<(), ApiError> {
        let message = message.trim();
        let mut errors = FieldErrors::new();
        if message.is_empty() {
            errors.insert("message", "Пожалуйста, введите сообщение");
        } else if message.chars().count() > MAX_FEEDBACK_LEN {
            errors.insert(
                "message",
                "Сообщение слишком длинное (максимум 1000 символов)",
            );
        }
        errors.into_result()?;

        let identity = self.client.identity()?;
        let body = NewFeedback {
            message,
            user_id: identity.id,
            user_full_name: &identity.login,
        };
        self.client
            .execute(self.client.request(Method::POST, "feedback").json(&body))
            .await
    }

    pub async fn mark_read(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .execute(
                self.client
                    .request(Method::PUT, &format!("feedback/{}/read", id)),
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .execute(self.client.request(Method::DELETE, &format!("feedback/{}", id)))
            .await
    }
}
