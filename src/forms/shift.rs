use chrono::NaiveDate;
use serde::Serialize;

use super::{FieldErrors, REQUIRED, check_max, check_required_max};
use crate::api::Shift;

/// Shift form. Serializes as the create/update request body.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftForm {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub active: bool,
    pub description: String,
}

impl ShiftForm {
    pub fn from_shift(shift: &Shift) -> Self {
        Self {
            name: shift.name.clone(),
            start_date: Some(shift.start_date),
            end_date: Some(shift.end_date),
            active: shift.active,
            description: shift.description.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self, today: NaiveDate) -> FieldErrors {
        let mut errors = FieldErrors::new();

        check_required_max(&mut errors, "name", &self.name, 50);

        match self.start_date {
            None => errors.insert("startDate", REQUIRED),
            Some(start) if start < today => {
                errors.insert("startDate", "Дата начала не может быть в прошлом")
            }
            Some(_) => {}
        }

        match (self.start_date, self.end_date) {
            (_, None) => errors.insert("endDate", REQUIRED),
            (Some(start), Some(end)) if end <= start => errors.insert(
                "endDate",
                "Дата окончания должна быть позже даты начала",
            ),
            _ => {}
        }

        check_max(&mut errors, "description", &self.description, 200);

        errors
    }
}
