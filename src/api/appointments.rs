use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError};

/// A procedure scheduled for a patient during a shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    #[serde(default)]
    pub procedure_id: Option<i64>,
    #[serde(default)]
    pub procedure_name: Option<String>,
    #[serde(default)]
    pub student_id: Option<i64>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub student_phone: Option<String>,
    #[serde(default)]
    pub student_email: Option<String>,
    #[serde(default)]
    pub doctor_id: Option<i64>,
    #[serde(default)]
    pub shift_id: Option<i64>,
    #[serde(default)]
    pub appointment_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub cabinet_number: Option<String>,
    #[serde(default)]
    pub cabinet_name: Option<String>,
    #[serde(default)]
    pub default_duration: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub procedure_id: i64,
    pub student_id: i64,
    pub doctor_id: i64,
    pub shift_id: i64,
    pub appointment_date: NaiveDate,
    pub notes: String,
}

#[derive(Serialize)]
struct NoteUpdate<'a> {
    note: &'a str,
}

pub struct AppointmentsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AppointmentsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, appointment: &NewAppointment) -> Result<Appointment, ApiError> {
        self.client
            .fetch(
                self.client
                    .request(Method::POST, "appointments")
                    .json(appointment),
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .execute(
                self.client
                    .request(Method::DELETE, &format!("appointments/{}", id)),
            )
            .await
    }

    pub async fn update_note(&self, id: i64, note: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .request(Method::PATCH, &format!("appointments/{}/note", id))
            .json(&NoteUpdate { note });
        self.client.execute(request).await
    }

    /// A patient's appointments during one shift.
    pub async fn for_patient(
        &self,
        patient_id: i64,
        shift_id: i64,
    ) -> Result<Vec<Appointment>, ApiError> {
        let path = format!("appointments/student/{}/shift/{}", patient_id, shift_id);
        self.client
            .fetch(self.client.request(Method::GET, &path))
            .await
    }

    /// Appointments booked into a cabinet during one shift.
    pub async fn for_cabinet(
        &self,
        shift_id: i64,
        cabinet_id: i64,
    ) -> Result<Vec<Appointment>, ApiError> {
        let path = format!("appointments/shift/{}/cabinet/{}", shift_id, cabinet_id);
        self.client
            .fetch(self.client.request(Method::GET, &path))
            .await
    }
}
