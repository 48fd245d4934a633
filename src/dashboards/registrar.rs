use serde::Serialize;
use tracing::info;

use super::today;
use crate::api::{ApiClient, ApiError, NewRegistration, Registration, Room, Shift, User};
use crate::forms::{FormMode, UserForm};
use crate::session::Role;

#[derive(Debug, Serialize)]
pub struct RegistrarOverview {
    /// Accounts holding only the regular user role.
    pub users: Vec<User>,
    pub active_shifts: Vec<Shift>,
}

/// What a registration call did, relative to the previous state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered { with_room: bool },
    RoomChanged,
    RemovedFromRoom,
}

impl RegistrationOutcome {
    pub fn message(self) -> &'static str {
        match self {
            RegistrationOutcome::Registered { with_room: true } => {
                "Пользователь успешно зарегистрирован на смену с комнатой"
            }
            RegistrationOutcome::Registered { with_room: false } => {
                "Пользователь успешно зарегистрирован на смену без комнаты"
            }
            RegistrationOutcome::RoomChanged => "Комната успешно изменена",
            RegistrationOutcome::RemovedFromRoom => "Пользователь удален из комнаты",
        }
    }
}

/// Registration desk: regular users and their shift enrolment.
pub struct RegistrarDashboard {
    client: ApiClient,
}

impl RegistrarDashboard {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn overview(&self) -> Result<RegistrarOverview, ApiError> {
        let users_api = self.client.users();
        let shifts_api = self.client.shifts();
        let (users, active_shifts) = futures::try_join!(
            users_api.list_regular(),
            shifts_api.active(),
        )?;
        Ok(RegistrarOverview {
            users,
            active_shifts,
        })
    }

    /// Create a regular user. Whatever roles the form holds, the account gets
    /// the user role only.
    pub async fn create_user(&self, form: &UserForm) -> Result<User, ApiError> {
        let form = UserForm {
            roles: vec![Role::User],
            ..form.clone()
        };
        form.validate(FormMode::Create, today()).into_result()?;

        let user = self.client.users().create(&form, false).await?;
        info!(user_id = user.id, login = %user.login, "User registered");
        Ok(user)
    }

    /// Update a user's personal data; roles are left alone.
    pub async fn update_user(&self, id: i64, form: &UserForm) -> Result<User, ApiError> {
        form.validate(FormMode::Edit, today()).into_result()?;
        self.client.users().update(id, form, false).await
    }

    pub async fn registrations(&self, user_id: i64) -> Result<Vec<Registration>, ApiError> {
        self.client.registrations().for_user(user_id).await
    }

    pub async fn available_rooms(&self, shift_id: i64) -> Result<Vec<Room>, ApiError> {
        self.client.rooms().available(shift_id).await
    }

    /// Register a user for a shift, optionally into a room. Registering again
    /// for the same shift changes or clears the room.
    pub async fn register(
        &self,
        user_id: i64,
        shift_id: i64,
        room_id: Option<i64>,
    ) -> Result<RegistrationOutcome, ApiError> {
        let existing = self.registrations(user_id).await?;
        let registered = existing.iter().any(|r| r.shift_id == Some(shift_id));

        self.client
            .registrations()
            .register(&NewRegistration {
                user_id,
                shift_id,
                room_id,
            })
            .await?;

        let outcome = match (registered, room_id.is_some()) {
            (true, true) => RegistrationOutcome::RoomChanged,
            (true, false) => RegistrationOutcome::RemovedFromRoom,
            (false, with_room) => RegistrationOutcome::Registered { with_room },
        };
        info!(user_id, shift_id, ?room_id, ?outcome, "Registration saved");
        Ok(outcome)
    }

    pub async fn unregister(&self, user_id: i64, shift_id: i64) -> Result<(), ApiError> {
        self.client
            .registrations()
            .unregister(user_id, shift_id)
            .await?;
        info!(user_id, shift_id, "Registration removed");
        Ok(())
    }
}
