//! Typed clients for the sanatorium REST API.
//!
//! [`ApiClient`] issues every request through the session's credential
//! interceptor. A 401 on a request that carried a token ends that session and
//! surfaces as [`ApiError::SessionExpired`]. The per-collection clients are
//! borrowed views obtained from accessor methods, e.g. `client.users()`.

mod appointments;
mod cabinets;
mod completions;
mod error;
mod feedback;
mod news;
mod procedures;
mod registrations;
mod rooms;
mod shifts;
mod users;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::backend::error_message;
use crate::session::{Identity, SessionStore};

pub use appointments::{Appointment, AppointmentsApi, NewAppointment};
pub use cabinets::{
    Cabinet, CabinetsApi, StaffAssignment, StaffCabinetsApi, StaffMember, group_assignments,
};
pub use completions::{CompletionsApi, NewCompletion, ProcedureCompletion};
pub use error::{
    ApiError, CONNECTION_MESSAGE, NOT_SIGNED_IN_MESSAGE, ResultExt, SESSION_EXPIRED_MESSAGE,
};
pub use feedback::{Feedback, FeedbackApi, MAX_FEEDBACK_LEN};
pub use news::{News, NewsApi};
pub use procedures::{Procedure, ProceduresApi};
pub use registrations::{NewRegistration, Registration, RegistrationsApi};
pub use rooms::{Room, RoomsApi};
pub use shifts::{Shift, ShiftsApi};
pub use users::{RoleEntry, User, UserProfile, UserShiftInfo, UsersApi};

#[derive(Clone)]
pub struct ApiClient {
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Identity of the signed-in user, for calls made on their behalf.
    pub fn identity(&self) -> Result<Arc<Identity>, ApiError> {
        self.session.current_identity().ok_or(ApiError::NotSignedIn)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn rooms(&self) -> RoomsApi<'_> {
        RoomsApi::new(self)
    }

    pub fn news(&self) -> NewsApi<'_> {
        NewsApi::new(self)
    }

    pub fn shifts(&self) -> ShiftsApi<'_> {
        ShiftsApi::new(self)
    }

    pub fn cabinets(&self) -> CabinetsApi<'_> {
        CabinetsApi::new(self)
    }

    pub fn staff_cabinets(&self) -> StaffCabinetsApi<'_> {
        StaffCabinetsApi::new(self)
    }

    pub fn procedures(&self) -> ProceduresApi<'_> {
        ProceduresApi::new(self)
    }

    pub fn appointments(&self) -> AppointmentsApi<'_> {
        AppointmentsApi::new(self)
    }

    pub fn completions(&self) -> CompletionsApi<'_> {
        CompletionsApi::new(self)
    }

    pub fn registrations(&self) -> RegistrationsApi<'_> {
        RegistrationsApi::new(self)
    }

    pub fn feedback(&self) -> FeedbackApi<'_> {
        FeedbackApi::new(self)
    }

    /// Unauthenticated builder for a path under the API root.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.session.backend().request(method, path)
    }

    /// Send with the current credential and map failure statuses.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let (request, token) = self.session.attach_credential(request);
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::transport("Request", e))?;

        let status = response.status();
        debug!(url = %response.url(), status = %status, "Response");
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            if let Some(token) = token {
                self.session.expire(&token).await;
                return Err(ApiError::SessionExpired);
            }
        }

        Err(match error_message(response).await {
            Some(message) => ApiError::rejected(status, message),
            None => ApiError::Status(status),
        })
    }

    /// Send and decode a JSON body.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::transport("Response", e))
    }

    /// Send and ignore any body.
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await?;
        Ok(())
    }
}
