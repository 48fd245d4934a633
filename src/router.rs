//! Role router: decides which dashboard the signed-in identity sees.
//!
//! The router observes the session through [`RoleRouter::sync`]. Whenever the
//! identity reference changes (sign in, sign out, a revalidated identity
//! with different content) the selection starts over. An identity holding
//! exactly one role goes straight to its dashboard; several roles show a
//! selector until one of them is picked.

use std::sync::Arc;

use tracing::{debug, info};

use crate::session::{Identity, Role, Session};

/// Dashboard rendered for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardKind {
    Admin,
    Registrar,
    Doctor,
    Nurse,
    User,
}

impl DashboardKind {
    /// Dispatch table from role label to dashboard.
    pub fn for_role(role: &Role) -> Option<Self> {
        match role {
            Role::Admin => Some(DashboardKind::Admin),
            Role::Registrar => Some(DashboardKind::Registrar),
            Role::Doctor => Some(DashboardKind::Doctor),
            Role::Nurse => Some(DashboardKind::Nurse),
            Role::User => Some(DashboardKind::User),
            Role::Unrecognized(_) => None,
        }
    }

    pub fn role(self) -> Role {
        match self {
            DashboardKind::Admin => Role::Admin,
            DashboardKind::Registrar => Role::Registrar,
            DashboardKind::Doctor => Role::Doctor,
            DashboardKind::Nurse => Role::Nurse,
            DashboardKind::User => Role::User,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            DashboardKind::Admin => "Панель администратора",
            DashboardKind::Registrar => "Панель регистратора",
            DashboardKind::Doctor => "Панель врача",
            DashboardKind::Nurse => "Панель медработника",
            DashboardKind::User => "Личный кабинет",
        }
    }
}

/// What the front-end should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteView {
    SignedOut,
    /// A token was restored and the identity is still being fetched.
    Loading,
    SelectRole {
        roles: Vec<Role>,
        /// Current choice when the selector was reopened to switch roles.
        selected: Option<Role>,
    },
    Dashboard(DashboardKind),
    /// The selected role has no dashboard in this client.
    Unrecognized(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    NotSignedIn,
    RoleNotGranted(Role),
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::NotSignedIn => write!(f, "Not signed in"),
            RouterError::RoleNotGranted(role) => write!(f, "Role {} is not granted", role),
        }
    }
}

impl std::error::Error for RouterError {}

#[derive(Debug, Default)]
pub struct RoleRouter {
    signed_in: bool,
    identity: Option<Arc<Identity>>,
    selected: Option<Role>,
    choosing: bool,
}

impl RoleRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router already synced with `session`.
    pub fn observing(session: &Session) -> Self {
        let mut router = Self::new();
        router.sync(session);
        router
    }

    /// Observe the current session. Returns true when the identity changed
    /// and the selection was reset.
    pub fn sync(&mut self, session: &Session) -> bool {
        self.signed_in = session.is_signed_in();

        let same = match (&self.identity, &session.identity) {
            (Some(seen), Some(current)) => Arc::ptr_eq(seen, current),
            (None, None) => true,
            _ => false,
        };
        if same {
            return false;
        }

        self.identity = session.identity.clone();
        self.selected = None;
        self.choosing = false;

        if let Some(identity) = &self.identity {
            if let [only] = identity.roles.as_slice() {
                debug!(role = %only, "Auto-selected only role");
                self.selected = Some(only.clone());
            }
        }
        true
    }

    pub fn identity(&self) -> Option<&Arc<Identity>> {
        self.identity.as_ref()
    }

    pub fn selected(&self) -> Option<&Role> {
        self.selected.as_ref()
    }

    /// Pick one of the identity's roles. A role the identity does not hold is
    /// rejected and the previous selection stays in place.
    pub fn select_role(&mut self, role: Role) -> Result<(), RouterError> {
        let Some(identity) = &self.identity else {
            return Err(RouterError::NotSignedIn);
        };
        if !identity.has_role(&role) {
            return Err(RouterError::RoleNotGranted(role));
        }

        info!(login = %identity.login, role = %role, "Role selected");
        self.selected = Some(role);
        self.choosing = false;
        Ok(())
    }

    /// Reopen the selector. Only meaningful with more than one role.
    pub fn change_role(&mut self) {
        if self.identity.as_ref().is_some_and(|i| i.roles.len() > 1) {
            self.choosing = true;
        }
    }

    pub fn view(&self) -> RouteView {
        let Some(identity) = &self.identity else {
            return if self.signed_in {
                RouteView::Loading
            } else {
                RouteView::SignedOut
            };
        };

        match &self.selected {
            Some(role) if !self.choosing => match DashboardKind::for_role(role) {
                Some(kind) => RouteView::Dashboard(kind),
                None => RouteView::Unrecognized(role.as_str().to_string()),
            },
            selected => RouteView::SelectRole {
                roles: identity.roles.clone(),
                selected: selected.clone(),
            },
        }
    }
}
