//! Subcommand handlers for the terminal front-end.

use serde::Serialize;
use tracing::info;

use crate::Client;
use crate::api::{ApiError, NOT_SIGNED_IN_MESSAGE};
use crate::cli::{Command, TableArgs};
use crate::dashboards::{Dashboard, LOAD_FAILED, PublicView};
use crate::forms::generate_password;
use crate::listing::{PAGE_SIZE, Searchable, paginate, search};
use crate::router::{DashboardKind, RouteView, RouterError};
use crate::session::{LoginError, Role};

#[derive(Debug)]
pub enum CommandError {
    Login(LoginError),
    /// API failure with the notice shown when the backend gave no message.
    Api { error: ApiError, fallback: &'static str },
    Router(RouterError),
    NotSignedIn,
    /// Several roles are held and none was chosen with `--role`.
    RoleRequired(Vec<Role>),
    UnknownRole(String),
    WrongDashboard { needed: DashboardKind, actual: DashboardKind },
    Output(serde_json::Error),
}

impl CommandError {
    fn api(fallback: &'static str) -> impl FnOnce(ApiError) -> Self {
        move |error| CommandError::Api { error, fallback }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Login(e) => write!(f, "{}", e),
            CommandError::Api { error, fallback } => {
                write!(f, "{}", error.user_message(fallback))
            }
            CommandError::Router(RouterError::NotSignedIn) | CommandError::NotSignedIn => {
                write!(f, "{}", NOT_SIGNED_IN_MESSAGE)
            }
            CommandError::Router(RouterError::RoleNotGranted(role)) => {
                write!(f, "Роль {} не назначена", role.display_name())
            }
            CommandError::RoleRequired(roles) => {
                let names: Vec<_> = roles.iter().map(Role::as_str).collect();
                write!(f, "Выберите роль (--role): {}", names.join(", "))
            }
            CommandError::UnknownRole(label) => write!(f, "Неизвестная роль: {}", label),
            CommandError::WrongDashboard { needed, actual } => write!(
                f,
                "Команда доступна в разделе «{}», выбран «{}»",
                needed.title(),
                actual.title()
            ),
            CommandError::Output(e) => write!(f, "Output error: {}", e),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<LoginError> for CommandError {
    fn from(e: LoginError) -> Self {
        CommandError::Login(e)
    }
}

impl From<RouterError> for CommandError {
    fn from(e: RouterError) -> Self {
        CommandError::Router(e)
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(e: serde_json::Error) -> Self {
        CommandError::Output(e)
    }
}

/// Output settings shared by all handlers.
pub struct Output {
    pub json: bool,
}

impl Output {
    fn value<T: Serialize>(&self, value: &T, text: impl FnOnce(&T)) -> Result<(), CommandError> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text(value);
        }
        Ok(())
    }

    /// Filter, paginate and print a table.
    fn table<T: Searchable + Serialize>(
        &self,
        title: &str,
        rows: &[T],
        args: &TableArgs,
        line: impl Fn(&T) -> String,
    ) -> Result<(), CommandError> {
        let found: Vec<&T> = search(rows, &args.search);
        let page = paginate(&found, args.page, PAGE_SIZE);

        if self.json {
            println!("{}", serde_json::to_string_pretty(page.items)?);
            return Ok(());
        }

        println!("{}", title);
        if page.items.is_empty() {
            println!("  Ничего не найдено");
            return Ok(());
        }
        for row in page.items {
            println!("  {}", line(*row));
        }
        if page.total_pages > 1 {
            println!("Страница {} из {}", page.number, page.total_pages);
        }
        Ok(())
    }

    fn notice(&self, message: &str) {
        if self.json {
            println!("{}", serde_json::json!({ "message": message }));
        } else {
            println!("{}", message);
        }
    }
}

/// Run one subcommand against a started client.
pub async fn run(
    client: &mut Client,
    command: Command,
    role: Option<Role>,
    out: &Output,
) -> Result<(), CommandError> {
    match command {
        Command::Login { login, password } => {
            client.session.login(&login, &password).await?;
            client.router.sync(&client.session.session());
            out.notice(&format!("Вход выполнен: {}", login));
            describe_route(client, out)
        }
        Command::Logout => {
            client.session.logout().await;
            client.router.sync(&client.session.session());
            out.notice("Выход выполнен");
            Ok(())
        }
        Command::Whoami { revalidate } => {
            if revalidate {
                client
                    .session
                    .revalidate()
                    .await
                    .map_err(CommandError::api(LOAD_FAILED))?;
                client.router.sync(&client.session.session());
            }
            let identity = client
                .session
                .current_identity()
                .ok_or(CommandError::NotSignedIn)?;
            out.value(&*identity, |identity| {
                println!("{} <{}> #{}", identity.login, identity.email, identity.id);
                for role in &identity.roles {
                    println!("  {} - {}", role.display_name(), role.description());
                }
            })
        }
        Command::Dashboard { table } => {
            let dashboard = mount(client, role)?;
            show_dashboard(&dashboard, &table, out).await
        }
        Command::News { table } => {
            let news = PublicView::new(client.api.clone())
                .news()
                .await
                .map_err(CommandError::api("Ошибка загрузки новостей"))?;
            out.table("Новости", &news, &table, |n| {
                let date = n
                    .created_at
                    .map(|at| at.format("%d.%m.%Y").to_string())
                    .unwrap_or_default();
                format!("{} {}", date, n.title)
            })
        }
        Command::Shifts { table } => {
            let shifts = PublicView::new(client.api.clone())
                .active_shifts()
                .await
                .map_err(CommandError::api("Ошибка загрузки смен"))?;
            out.table("Смены", &shifts, &table, |s| {
                format!(
                    "#{} {} ({} - {})",
                    s.id,
                    s.name,
                    s.start_date.format("%d.%m.%Y"),
                    s.end_date.format("%d.%m.%Y")
                )
            })
        }
        Command::Procedures { table } => {
            let procedures = PublicView::new(client.api.clone())
                .procedures()
                .await
                .map_err(CommandError::api("Ошибка загрузки процедур"))?;
            out.table("Процедуры", &procedures, &table, |p| {
                format!("#{} {} [{}]", p.id, p.name, p.cabinet_label())
            })
        }
        Command::Feedback { message } => {
            if client.session.current_identity().is_none() {
                return Err(CommandError::NotSignedIn);
            }
            client
                .api
                .feedback()
                .send(&message)
                .await
                .map_err(CommandError::api("Ошибка при отправке сообщения"))?;
            out.notice("Сообщение успешно отправлено!");
            Ok(())
        }
        Command::ToggleShift { shift_id } => {
            let admin = match mount(client, role)? {
                Dashboard::Admin(admin) => admin,
                other => return Err(wrong_dashboard(DashboardKind::Admin, &other)),
            };
            let fail = "Ошибка при изменении статуса смены";
            let shift = admin
                .client()
                .shifts()
                .get(shift_id)
                .await
                .map_err(CommandError::api(fail))?;
            let active = admin
                .toggle_shift(&shift)
                .await
                .map_err(CommandError::api(fail))?;
            out.notice(if active {
                "Смена активирована"
            } else {
                "Смена деактивирована"
            });
            Ok(())
        }
        Command::Register {
            user_id,
            shift_id,
            room,
        } => {
            let registrar = match mount(client, role)? {
                Dashboard::Registrar(registrar) => registrar,
                other => return Err(wrong_dashboard(DashboardKind::Registrar, &other)),
            };
            let outcome = registrar
                .register(user_id, shift_id, room)
                .await
                .map_err(CommandError::api("Ошибка при регистрации на смену"))?;
            out.notice(outcome.message());
            Ok(())
        }
        Command::Prescribe {
            patient_id,
            shift_id,
            procedure_id,
            notes,
        } => {
            let doctor = match mount(client, role)? {
                Dashboard::Doctor(doctor) => doctor,
                other => return Err(wrong_dashboard(DashboardKind::Doctor, &other)),
            };
            let appointments = doctor
                .assign_procedure(patient_id, shift_id, Some(procedure_id), &notes)
                .await
                .map_err(CommandError::api("Ошибка при добавлении процедуры"))?;
            info!(count = appointments.len(), "Patient appointments");
            out.notice("Процедура успешно добавлена");
            Ok(())
        }
        Command::Complete { appointment_id } => {
            let nurse = match mount(client, role)? {
                Dashboard::Nurse(nurse) => nurse,
                other => return Err(wrong_dashboard(DashboardKind::Nurse, &other)),
            };
            nurse
                .complete(appointment_id)
                .await
                .map_err(CommandError::api("Ошибка при отметке процедуры"))?;
            out.notice("Процедура успешно отмечена как выполненная на сегодня");
            Ok(())
        }
        Command::GeneratePassword => {
            out.notice(&generate_password());
            Ok(())
        }
    }
}

/// Resolve the dashboard for the session, applying `--role` when given.
fn mount(client: &mut Client, role: Option<Role>) -> Result<Dashboard, CommandError> {
    if let Some(role) = role {
        client.router.select_role(role)?;
    }
    match client.router.view() {
        RouteView::Dashboard(kind) => Ok(Dashboard::mount(kind, client.api.clone())),
        RouteView::SignedOut | RouteView::Loading => Err(CommandError::NotSignedIn),
        RouteView::SelectRole { roles, .. } => Err(CommandError::RoleRequired(roles)),
        RouteView::Unrecognized(label) => Err(CommandError::UnknownRole(label)),
    }
}

fn wrong_dashboard(needed: DashboardKind, mounted: &Dashboard) -> CommandError {
    CommandError::WrongDashboard {
        needed,
        actual: mounted.kind(),
    }
}

fn describe_route(client: &Client, out: &Output) -> Result<(), CommandError> {
    match client.router.view() {
        RouteView::Dashboard(kind) => out.notice(kind.title()),
        RouteView::SelectRole { roles, .. } => {
            out.notice("Выберите роль:");
            for role in roles {
                out.notice(&format!("  {} - {}", role.display_name(), role.description()));
            }
        }
        RouteView::Unrecognized(label) => return Err(CommandError::UnknownRole(label)),
        RouteView::SignedOut | RouteView::Loading => {}
    }
    Ok(())
}

async fn show_dashboard(
    dashboard: &Dashboard,
    table: &TableArgs,
    out: &Output,
) -> Result<(), CommandError> {
    let load = CommandError::api(LOAD_FAILED);
    match dashboard {
        Dashboard::Admin(admin) => {
            let overview = admin.users_overview().await.map_err(load)?;
            out.table("Пользователи", &overview.users, table, |u| {
                format!("#{} {} ({}) {}", u.id, u.full_name, u.login, u.roles_label())
            })
        }
        Dashboard::Registrar(registrar) => {
            let overview = registrar.overview().await.map_err(load)?;
            out.table("Пользователи", &overview.users, table, |u| {
                format!("#{} {} {}", u.id, u.full_name, u.email)
            })?;
            out.table("Активные смены", &overview.active_shifts, &TableArgs::default(), |s| {
                format!("#{} {}", s.id, s.name)
            })
        }
        Dashboard::Doctor(doctor) => {
            let overview = doctor.overview().await.map_err(load)?;
            out.table("Активные смены", &overview.active_shifts, &TableArgs::default(), |s| {
                format!("#{} {}", s.id, s.name)
            })?;
            out.table("Процедуры", &overview.procedures, table, |p| {
                format!("#{} {} [{}]", p.id, p.name, p.cabinet_label())
            })
        }
        Dashboard::Nurse(nurse) => {
            let overview = nurse.overview().await.map_err(load)?;
            out.value(&overview, |overview| {
                println!("Кабинеты");
                for cabinet in &overview.cabinets {
                    println!("  #{} {}", cabinet.cabinet_id, cabinet.cabinet_label());
                }
                println!("Активные смены");
                for shift in &overview.active_shifts {
                    println!("  #{} {}", shift.id, shift.name);
                }
            })
        }
        Dashboard::User(user) => {
            let overview = user.overview().await.map_err(load)?;
            out.value(&overview, |overview| {
                let profile = &overview.profile;
                println!("{} <{}>", profile.full_name, profile.email);
                println!(
                    "Телефон: {}",
                    profile.phone.as_deref().unwrap_or(crate::dashboards::NOT_SPECIFIED)
                );
                println!("Мои смены");
                for shift in &overview.history {
                    println!(
                        "  {} ({} - {}), процедур: {}, выполнено: {}",
                        shift.shift_name,
                        shift.start_date.format("%d.%m.%Y"),
                        shift.end_date.format("%d.%m.%Y"),
                        shift.appointments.len(),
                        shift.completed_procedures.len()
                    );
                }
            })
        }
    }
}
