use serde::Serialize;
use tracing::info;

use super::{Patient, or_not_specified, today};
use crate::api::{ApiClient, ApiError, Appointment, NewAppointment, Procedure, Shift};
use crate::forms::FieldErrors;

#[derive(Debug, Serialize)]
pub struct DoctorOverview {
    pub active_shifts: Vec<Shift>,
    pub procedures: Vec<Procedure>,
}

/// Prescribing procedures to patients registered for a shift.
pub struct DoctorDashboard {
    client: ApiClient,
}

impl DoctorDashboard {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn overview(&self) -> Result<DoctorOverview, ApiError> {
        let shifts_api = self.client.shifts();
        let procedures_api = self.client.procedures();
        let (active_shifts, procedures) = futures::try_join!(
            shifts_api.active(),
            procedures_api.list(),
        )?;
        Ok(DoctorOverview {
            active_shifts,
            procedures,
        })
    }

    /// Everyone registered for the shift.
    pub async fn patients(&self, shift_id: i64) -> Result<Vec<Patient>, ApiError> {
        let registrations = self.client.registrations().for_shift(shift_id).await?;
        Ok(registrations
            .into_iter()
            .map(|r| Patient {
                id: r.user_id,
                full_name: r.user_full_name.unwrap_or_default(),
                phone: or_not_specified(r.user_phone.as_deref()),
                email: or_not_specified(r.user_email.as_deref()),
                room_number: r.room_number,
                appointments: Vec::new(),
            })
            .collect())
    }

    pub async fn appointments(
        &self,
        patient_id: i64,
        shift_id: i64,
    ) -> Result<Vec<Appointment>, ApiError> {
        self.client
            .appointments()
            .for_patient(patient_id, shift_id)
            .await
    }

    /// Prescribe a procedure dated today and signed by the current doctor.
    /// Returns the patient's refreshed appointments.
    pub async fn assign_procedure(
        &self,
        patient_id: i64,
        shift_id: i64,
        procedure_id: Option<i64>,
        notes: &str,
    ) -> Result<Vec<Appointment>, ApiError> {
        let Some(procedure_id) = procedure_id else {
            let mut errors = FieldErrors::new();
            errors.insert("procedureId", "Выберите процедуру");
            return Err(errors.into());
        };
        let doctor = self.client.identity()?;

        let appointment = NewAppointment {
            procedure_id,
            student_id: patient_id,
            doctor_id: doctor.id,
            shift_id,
            appointment_date: today(),
            notes: notes.to_string(),
        };
        self.client.appointments().create(&appointment).await?;
        info!(patient_id, shift_id, procedure_id, doctor_id = doctor.id, "Procedure prescribed");

        self.appointments(patient_id, shift_id).await
    }

    /// Cancel an appointment. Returns the patient's refreshed appointments.
    pub async fn remove_appointment(
        &self,
        appointment_id: i64,
        patient_id: i64,
        shift_id: i64,
    ) -> Result<Vec<Appointment>, ApiError> {
        self.client.appointments().delete(appointment_id).await?;
        info!(appointment_id, "Appointment removed");
        self.appointments(patient_id, shift_id).await
    }

    pub async fn update_note(&self, appointment_id: i64, note: &str) -> Result<(), ApiError> {
        self.client
            .appointments()
            .update_note(appointment_id, note)
            .await
    }
}
