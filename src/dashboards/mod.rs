//! Role dashboards.
//!
//! Each dashboard owns an [`ApiClient`] and exposes the operations its role
//! performs. Forms are validated before any request is made; a rejected form
//! comes back as [`ApiError::Validation`](crate::api::ApiError::Validation).
//! Calls that act on behalf of the signed-in user read the identity from the
//! session at call time.

mod admin;
mod doctor;
mod nurse;
mod public;
mod registrar;
mod user;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::api::{ApiClient, Appointment};
use crate::listing::Searchable;
use crate::router::DashboardKind;

pub use admin::{AdminDashboard, CabinetOverview, ProcedureOverview, UsersOverview};
pub use doctor::{DoctorDashboard, DoctorOverview};
pub use nurse::{NurseDashboard, NurseOverview, ProcedureStatus, group_by_patient};
pub use public::PublicView;
pub use registrar::{RegistrarDashboard, RegistrarOverview, RegistrationOutcome};
pub use user::{UserDashboard, UserOverview};

/// Shown in place of a missing phone or email.
pub const NOT_SPECIFIED: &str = "не указан";

/// Generic load failure notice.
pub const LOAD_FAILED: &str = "Ошибка загрузки данных";

/// Today's local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Patient row on the doctor and nurse dashboards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Patient {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub room_number: Option<String>,
    /// Appointments that placed the patient on this list, if any.
    pub appointments: Vec<Appointment>,
}

impl Searchable for Patient {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.full_name.as_str(), self.email.as_str(), self.phone.as_str()]
    }
}

fn or_not_specified(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => NOT_SPECIFIED.to_string(),
    }
}

/// A mounted dashboard.
pub enum Dashboard {
    Admin(AdminDashboard),
    Registrar(RegistrarDashboard),
    Doctor(DoctorDashboard),
    Nurse(NurseDashboard),
    User(UserDashboard),
}

impl Dashboard {
    pub fn mount(kind: DashboardKind, client: ApiClient) -> Self {
        match kind {
            DashboardKind::Admin => Dashboard::Admin(AdminDashboard::new(client)),
            DashboardKind::Registrar => Dashboard::Registrar(RegistrarDashboard::new(client)),
            DashboardKind::Doctor => Dashboard::Doctor(DoctorDashboard::new(client)),
            DashboardKind::Nurse => Dashboard::Nurse(NurseDashboard::new(client)),
            DashboardKind::User => Dashboard::User(UserDashboard::new(client)),
        }
    }

    pub fn kind(&self) -> DashboardKind {
        match self {
            Dashboard::Admin(_) => DashboardKind::Admin,
            Dashboard::Registrar(_) => DashboardKind::Registrar,
            Dashboard::Doctor(_) => DashboardKind::Doctor,
            Dashboard::Nurse(_) => DashboardKind::Nurse,
            Dashboard::User(_) => DashboardKind::User,
        }
    }
}
