use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use super::{FieldErrors, REQUIRED};
use crate::api::User;
use crate::session::Role;

static FULL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L} \-']+$").expect("full name pattern"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s-]+$").expect("phone pattern"));

const LOGIN_LEN: std::ops::RangeInclusive<usize> = 3..=20;
const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 6..=120;

/// Whether a form creates a new record or edits an existing one. Editing
/// makes the password optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Account form used by the admin and registrar dashboards. Serializes as the
/// request body; the confirmation field never leaves the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub login: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip)]
    pub confirm_password: String,
    pub roles: Vec<Role>,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            birth_date: None,
            login: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            roles: vec![Role::User],
        }
    }
}

impl UserForm {
    /// Edit form prefilled from an existing account. Password fields start empty.
    pub fn from_user(user: &User) -> Self {
        Self {
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            birth_date: user.birth_date,
            login: user.login.clone(),
            password: String::new(),
            confirm_password: String::new(),
            roles: user.role_list(),
        }
    }

    /// Fill both password fields with a freshly generated password.
    pub fn with_generated_password(mut self) -> Self {
        let password = super::generate_password();
        self.confirm_password = password.clone();
        self.password = password;
        self
    }

    pub fn validate(&self, mode: FormMode, today: NaiveDate) -> FieldErrors {
        let mut errors = self.validate_profile(today);

        if self.email.is_empty() {
            errors.insert("email", REQUIRED);
        } else if !EMAIL.is_match(&self.email) {
            errors.insert("email", "Некорректный email");
        }

        if self.login.is_empty() {
            errors.insert("login", REQUIRED);
        } else if !LOGIN_LEN.contains(&self.login.chars().count()) {
            errors.insert("login", "Должно быть от 3 до 20 символов");
        }

        let password_len = self.password.chars().count();
        let password_required = mode == FormMode::Create;
        if (password_required || password_len > 0) && !PASSWORD_LEN.contains(&password_len) {
            errors.insert("password", "Должно быть от 6 до 120 символов");
        }
        if (password_required || !self.password.is_empty())
            && self.confirm_password != self.password
        {
            errors.insert("confirmPassword", "Пароли не совпадают");
        }

        if mode == FormMode::Create && self.roles.is_empty() {
            errors.insert("roles", "Выберите хотя бы одну роль");
        }

        errors
    }

    /// Checks for the personal fields only: name, phone and birth date.
    /// Used where the account fields are not editable.
    pub fn validate_profile(&self, today: NaiveDate) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.full_name.is_empty() {
            errors.insert("fullName", REQUIRED);
        } else if !FULL_NAME.is_match(&self.full_name) {
            errors.insert(
                "fullName",
                "Можно только буквы, пробелы, дефисы и апострофы",
            );
        }

        if !self.phone.is_empty() && !PHONE.is_match(&self.phone) {
            errors.insert("phone", "Некорректный формат телефона");
        }

        if self.birth_date.is_some_and(|date| date > today) {
            errors.insert("birthDate", "Дата не может быть в будущем");
        }

        errors
    }
}
