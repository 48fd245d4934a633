//! Sign-in failure types.

/// Why a login attempt did not produce a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// Login or password left blank; nothing was sent
    MissingCredentials,
    /// Backend rejected the credentials (HTTP 401)
    InvalidCredentials,
    /// Any other backend failure, with its message when it sent one
    Rejected(Option<String>),
    /// Backend unreachable
    Connection,
    /// Signed in, but the session could not be persisted
    Storage,
}

impl LoginError {
    /// Human-readable message shown next to the login form.
    pub fn message(&self) -> &str {
        match self {
            LoginError::MissingCredentials => "Логин и пароль обязательны",
            LoginError::InvalidCredentials => "Неверный логин или пароль",
            LoginError::Rejected(Some(message)) => message,
            LoginError::Rejected(None) | LoginError::Storage => "Ошибка входа",
            LoginError::Connection => "Произошла ошибка при подключении к серверу",
        }
    }
}

impl std::fmt::Display for LoginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for LoginError {}
