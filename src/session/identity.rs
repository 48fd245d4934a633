//! Authenticated principal and role labels.

use serde::{Deserialize, Serialize};

/// Access label granted to an identity.
///
/// Labels the client does not know are kept verbatim in `Unrecognized` so
/// they survive a storage round trip and can be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Admin,
    Registrar,
    Doctor,
    Nurse,
    Unrecognized(String),
}

impl Role {
    /// All labels the client knows, in selector order.
    pub const KNOWN: [Role; 5] = [
        Role::User,
        Role::Admin,
        Role::Registrar,
        Role::Doctor,
        Role::Nurse,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
            Role::Registrar => "ROLE_REGISTRAR",
            Role::Doctor => "ROLE_DOCTOR",
            Role::Nurse => "ROLE_NURSE",
            Role::Unrecognized(label) => label,
        }
    }

    pub fn parse(label: &str) -> Self {
        match label {
            "ROLE_USER" => Role::User,
            "ROLE_ADMIN" => Role::Admin,
            "ROLE_REGISTRAR" => Role::Registrar,
            "ROLE_DOCTOR" => Role::Doctor,
            "ROLE_NURSE" => Role::Nurse,
            other => Role::Unrecognized(other.to_string()),
        }
    }

    /// Name shown on the role selector card.
    pub fn display_name(&self) -> &str {
        match self {
            Role::User => "Пользователь",
            Role::Admin => "Администратор",
            Role::Registrar => "Регистратор",
            Role::Doctor => "Врач",
            Role::Nurse => "Медработник",
            Role::Unrecognized(label) => label,
        }
    }

    /// Compact name used in user tables.
    pub fn short_name(&self) -> &str {
        match self {
            Role::User => "Пользователь",
            Role::Admin => "Админ",
            Role::Registrar => "Регистратор",
            Role::Doctor => "Доктор",
            Role::Nurse => "Медработник",
            Role::Unrecognized(label) => label,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::User => "Студент/сотрудник",
            Role::Admin => "Полный доступ",
            Role::Registrar => "Оформление пользователей",
            Role::Doctor => "Осмотры и лечение",
            Role::Nurse => "Процедуры и уход",
            Role::Unrecognized(_) => "Описание роли",
        }
    }

    /// Doctors and nurses can be assigned to cabinets.
    pub fn is_medical_staff(&self) -> bool {
        matches!(self, Role::Doctor | Role::Nurse)
    }
}

impl From<String> for Role {
    fn from(label: String) -> Self {
        Role::parse(&label)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Unrecognized(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated principal, as stored under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub login: String,
    pub email: String,
    pub roles: Vec<Role>,
}

impl Identity {
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}
