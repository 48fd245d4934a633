use std::collections::BTreeMap;

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use super::today;
use crate::api::{
    ApiClient, ApiError, Cabinet, Feedback, News, Procedure, Room, Shift, StaffMember, User,
    group_assignments,
};
use crate::forms::{CabinetForm, FormMode, NewsForm, ProcedureForm, RoomForm, ShiftForm, UserForm};
use crate::session::Role;

#[derive(Debug, Serialize)]
pub struct UsersOverview {
    pub users: Vec<User>,
    /// Roles offered in the user form.
    pub roles: Vec<Role>,
}

#[derive(Debug, Serialize)]
pub struct CabinetOverview {
    pub cabinets: Vec<Cabinet>,
    /// Assigned staff keyed by cabinet id.
    pub staff: BTreeMap<i64, Vec<StaffMember>>,
    /// Users that can be assigned: doctors and nurses.
    pub medical_staff: Vec<User>,
}

impl CabinetOverview {
    pub fn staff_of(&self, cabinet_id: i64) -> &[StaffMember] {
        self.staff.get(&cabinet_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Serialize)]
pub struct ProcedureOverview {
    pub procedures: Vec<Procedure>,
    /// Cabinets offered in the procedure form.
    pub cabinets: Vec<Cabinet>,
}

/// Full administration: users, rooms, news, shifts, cabinets, procedures
/// and feedback.
pub struct AdminDashboard {
    client: ApiClient,
}

impl AdminDashboard {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn users_overview(&self) -> Result<UsersOverview, ApiError> {
        let users = self.client.users();
        let (users, roles) = futures::try_join!(users.list(), users.roles())?;
        Ok(UsersOverview { users, roles })
    }

    /// Create (`id` is `None`) or update a user, roles included.
    pub async fn save_user(&self, id: Option<i64>, form: &UserForm) -> Result<User, ApiError> {
        let mode = if id.is_some() { FormMode::Edit } else { FormMode::Create };
        form.validate(mode, today()).into_result()?;

        let user = match id {
            Some(id) => self.client.users().update(id, form, true).await?,
            None => self.client.users().create(form, true).await?,
        };
        info!(user_id = user.id, login = %user.login, "User saved");
        Ok(user)
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        self.client.users().delete(id).await?;
        info!(user_id = id, "User deleted");
        Ok(())
    }

    pub async fn rooms(&self) -> Result<Vec<Room>, ApiError> {
        self.client.rooms().list().await
    }

    pub async fn save_room(&self, id: Option<i64>, form: &RoomForm) -> Result<Room, ApiError> {
        form.validate().into_result()?;
        match id {
            Some(id) => self.client.rooms().update(id, form).await,
            None => self.client.rooms().create(form).await,
        }
    }

    pub async fn delete_room(&self, id: i64) -> Result<(), ApiError> {
        self.client.rooms().delete(id).await
    }

    pub async fn news(&self) -> Result<Vec<News>, ApiError> {
        self.client.news().list().await
    }

    /// Publish or edit a news item. Editing without an image keeps the
    /// current one.
    pub async fn save_news(&self, id: Option<i64>, form: &NewsForm) -> Result<News, ApiError> {
        let mode = if id.is_some() { FormMode::Edit } else { FormMode::Create };
        form.validate(mode).into_result()?;
        match id {
            Some(id) => self.client.news().update(id, form).await,
            None => self.client.news().create(form).await,
        }
    }

    pub async fn delete_news(&self, id: i64) -> Result<(), ApiError> {
        self.client.news().delete(id).await
    }

    pub async fn shifts(&self) -> Result<Vec<Shift>, ApiError> {
        self.client.shifts().list().await
    }

    pub async fn save_shift(&self, id: Option<i64>, form: &ShiftForm) -> Result<Shift, ApiError> {
        form.validate(today()).into_result()?;
        match id {
            Some(id) => self.client.shifts().update(id, form).await,
            None => self.client.shifts().create(form).await,
        }
    }

    pub async fn delete_shift(&self, id: i64) -> Result<(), ApiError> {
        self.client.shifts().delete(id).await
    }

    /// Flip a shift between active and inactive. Returns the new state.
    pub async fn toggle_shift(&self, shift: &Shift) -> Result<bool, ApiError> {
        let active = !shift.active;
        self.client.shifts().set_active(shift.id, active).await?;
        info!(shift_id = shift.id, active, "Shift status changed");
        Ok(active)
    }

    pub async fn cabinet_overview(&self) -> Result<CabinetOverview, ApiError> {
        let cabinets_api = self.client.cabinets();
        let users_api = self.client.users();
        let staff_cabinets_api = self.client.staff_cabinets();
        let (cabinets, users, assignments) = futures::try_join!(
            cabinets_api.list(),
            users_api.list(),
            staff_cabinets_api.all(),
        )?;

        Ok(CabinetOverview {
            cabinets,
            staff: group_assignments(&assignments),
            medical_staff: users.into_iter().filter(User::is_medical_staff).collect(),
        })
    }

    /// Create or update a cabinet, then assign the given staff to it. A
    /// failed assignment is logged; the saved cabinet is still returned.
    pub async fn save_cabinet(
        &self,
        id: Option<i64>,
        form: &CabinetForm,
        assign: &[i64],
    ) -> Result<Cabinet, ApiError> {
        form.validate().into_result()?;
        let cabinet = match id {
            Some(id) => self.client.cabinets().update(id, form).await?,
            None => self.client.cabinets().create(form).await?,
        };

        let staff = self.client.staff_cabinets();
        let results = join_all(assign.iter().map(|user_id| staff.assign(*user_id, cabinet.id))).await;
        for (user_id, result) in assign.iter().zip(results) {
            if let Err(e) = result {
                warn!(user_id, cabinet_id = cabinet.id, error = %e, "Staff assignment failed");
            }
        }

        Ok(cabinet)
    }

    pub async fn delete_cabinet(&self, id: i64) -> Result<(), ApiError> {
        self.client.cabinets().delete(id).await
    }

    pub async fn assign_staff(&self, user_id: i64, cabinet_id: i64) -> Result<(), ApiError> {
        self.client.staff_cabinets().assign(user_id, cabinet_id).await
    }

    pub async fn unassign_staff(&self, user_id: i64, cabinet_id: i64) -> Result<(), ApiError> {
        self.client.staff_cabinets().unassign(user_id, cabinet_id).await
    }

    pub async fn procedure_overview(&self) -> Result<ProcedureOverview, ApiError> {
        let procedures_api = self.client.procedures();
        let cabinets_api = self.client.cabinets();
        let (procedures, cabinets) = futures::try_join!(
            procedures_api.list(),
            cabinets_api.list(),
        )?;
        Ok(ProcedureOverview {
            procedures,
            cabinets,
        })
    }

    pub async fn save_procedure(
        &self,
        id: Option<i64>,
        form: &ProcedureForm,
    ) -> Result<Procedure, ApiError> {
        form.validate().into_result()?;
        match id {
            Some(id) => self.client.procedures().update(id, form).await,
            None => self.client.procedures().create(form).await,
        }
    }

    pub async fn delete_procedure(&self, id: i64) -> Result<(), ApiError> {
        self.client.procedures().delete(id).await
    }

    pub async fn feedback(&self, unread_only: bool) -> Result<Vec<Feedback>, ApiError> {
        if unread_only {
            self.client.feedback().unread().await
        } else {
            self.client.feedback().list().await
        }
    }

    pub async fn mark_feedback_read(&self, id: i64) -> Result<(), ApiError> {
        self.client.feedback().mark_read(id).await
    }

    pub async fn delete_feedback(&self, id: i64) -> Result<(), ApiError> {
        self.client.feedback().delete(id).await
    }
}
