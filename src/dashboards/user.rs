use serde::Serialize;

use crate::api::{ApiClient, ApiError, Shift, UserProfile, UserShiftInfo};

#[derive(Debug, Serialize)]
pub struct UserOverview {
    pub profile: UserProfile,
    /// Shifts the user took part in, with their appointments and completed
    /// procedures.
    pub history: Vec<UserShiftInfo>,
    pub active_shifts: Vec<Shift>,
}

/// Personal page of a regular user.
pub struct UserDashboard {
    client: ApiClient,
}

impl UserDashboard {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn overview(&self) -> Result<UserOverview, ApiError> {
        let me = self.client.identity()?;
        let users = self.client.users();
        let shifts_api = self.client.shifts();
        let (profile, history, active_shifts) = futures::try_join!(
            users.profile(me.id),
            users.shifts(me.id),
            shifts_api.active(),
        )?;
        Ok(UserOverview {
            profile,
            history,
            active_shifts,
        })
    }

    pub async fn send_feedback(&self, message: &str) -> Result<(), ApiError> {
        self.client.feedback().send(message).await
    }
}
