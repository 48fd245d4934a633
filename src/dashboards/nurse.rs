use futures::future::try_join_all;
use serde::Serialize;
use tracing::info;

use super::{Patient, or_not_specified, today};
use crate::api::{
    ApiClient, ApiError, Appointment, NewCompletion, ProcedureCompletion, Shift, StaffAssignment,
};

#[derive(Debug, Serialize)]
pub struct NurseOverview {
    /// Cabinets the nurse is assigned to.
    pub cabinets: Vec<StaffAssignment>,
    pub active_shifts: Vec<Shift>,
}

/// An appointment with its completion history.
#[derive(Debug, Clone, Serialize)]
pub struct ProcedureStatus {
    pub appointment: Appointment,
    pub completions: Vec<ProcedureCompletion>,
    pub completed_today: bool,
}

/// Group appointments into patients, in the order each patient first
/// appears. Appointments without a patient are dropped.
pub fn group_by_patient(appointments: Vec<Appointment>) -> Vec<Patient> {
    let mut patients: Vec<Patient> = Vec::new();
    for appointment in appointments {
        let Some(id) = appointment.student_id else {
            continue;
        };
        match patients.iter_mut().find(|p| p.id == id) {
            Some(patient) => patient.appointments.push(appointment),
            None => patients.push(Patient {
                id,
                full_name: appointment.student_name.clone().unwrap_or_default(),
                phone: or_not_specified(appointment.student_phone.as_deref()),
                email: or_not_specified(appointment.student_email.as_deref()),
                room_number: None,
                appointments: vec![appointment],
            }),
        }
    }
    patients
}

/// Carrying out prescribed procedures in the nurse's cabinets.
pub struct NurseDashboard {
    client: ApiClient,
}

impl NurseDashboard {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn overview(&self) -> Result<NurseOverview, ApiError> {
        let nurse = self.client.identity()?;
        let staff_cabinets_api = self.client.staff_cabinets();
        let shifts_api = self.client.shifts();
        let (cabinets, active_shifts) = futures::try_join!(
            staff_cabinets_api.for_user(nurse.id),
            shifts_api.active(),
        )?;
        Ok(NurseOverview {
            cabinets,
            active_shifts,
        })
    }

    /// Patients with appointments in the cabinet during the shift.
    pub async fn patients(&self, cabinet_id: i64, shift_id: i64) -> Result<Vec<Patient>, ApiError> {
        let appointments = self
            .client
            .appointments()
            .for_cabinet(shift_id, cabinet_id)
            .await?;
        Ok(group_by_patient(appointments))
    }

    /// The patient's appointments in the given cabinet, each with its
    /// completions.
    pub async fn procedures(
        &self,
        patient: &Patient,
        cabinet_number: Option<&str>,
    ) -> Result<Vec<ProcedureStatus>, ApiError> {
        let today = today();
        let completions = self.client.completions();
        let relevant: Vec<&Appointment> = patient
            .appointments
            .iter()
            .filter(|a| a.cabinet_number.as_deref() == cabinet_number)
            .collect();

        let histories = try_join_all(relevant.iter().map(|a| completions.for_appointment(a.id))).await?;

        Ok(relevant
            .into_iter()
            .zip(histories)
            .map(|(appointment, completions)| ProcedureStatus {
                completed_today: completions
                    .iter()
                    .any(|c| c.completed_at.is_some_and(|at| at.date() == today)),
                appointment: appointment.clone(),
                completions,
            })
            .collect())
    }

    /// Record that the appointment was carried out today by the current nurse.
    pub async fn complete(&self, appointment_id: i64) -> Result<ProcedureCompletion, ApiError> {
        let nurse = self.client.identity()?;
        let completion = NewCompletion {
            appointment_id,
            user_id: nurse.id,
            notes: format!("Выполнено {}", today().format("%d.%m.%Y")),
        };
        let created = self.client.completions().create(&completion).await?;
        info!(appointment_id, nurse_id = nurse.id, "Procedure completed");
        Ok(created)
    }
}
