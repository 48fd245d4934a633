mod common;

use common::{TestContext, TestSetup, account, query_param};
use sanatorium::Client;
use sanatorium::api::ApiError;
use sanatorium::cli::Command;
use sanatorium::commands::{CommandError, Output, run};
use sanatorium::dashboards::{
    AdminDashboard, DoctorDashboard, NurseDashboard, PublicView, RegistrarDashboard,
    RegistrationOutcome, UserDashboard,
};
use sanatorium::forms::{CabinetForm, NewsForm, NewsImage, UserForm};
use sanatorium::router::DashboardKind;
use sanatorium::session::Role;
use serde_json::Value;

async fn signed_in(login: &str, id: i64, roles: &[&str]) -> (TestContext, Client) {
    let ctx = TestSetup::new()
        .with_account(account(login, "pw", "T", id, roles))
        .build()
        .await;
    let mut client = ctx.client().await;
    client.session.login(login, "pw").await.unwrap();
    client.router.sync(&client.session.session());
    (ctx, client)
}

fn body_of(ctx: &TestContext, path: &str) -> Value {
    let calls = ctx.backend.calls_to(path);
    let call = calls.last().expect("call recorded");
    serde_json::from_str(&call.body).unwrap()
}

#[tokio::test]
async fn test_public_view_needs_no_session() {
    let ctx = TestSetup::new().build().await;
    let client = ctx.client().await;
    let public = PublicView::new(client.api.clone());

    let shifts = public.active_shifts().await.unwrap();
    assert_eq!(shifts.len(), 1);
    assert!(shifts[0].active);

    let procedures = public.procedures().await.unwrap();
    assert_eq!(procedures[0].cabinet_label(), "Кабинет 12: Массажный");
    assert_eq!(procedures[1].default_duration, None);

    assert_eq!(public.news().await.unwrap()[0].title, "Открытие сезона");
}

#[tokio::test]
async fn test_nurse_groups_patients_and_checks_completions() {
    let (ctx, client) = signed_in("vera", 3, &["ROLE_NURSE"]).await;
    let nurse = NurseDashboard::new(client.api.clone());

    let overview = nurse.overview().await.unwrap();
    assert_eq!(overview.cabinets.len(), 1);
    assert_eq!(overview.cabinets[0].cabinet_label(), "Кабинет 12: Массажный");
    assert_eq!(ctx.backend.calls_to("staff-cabinets/by-user/3").len(), 1);

    let patients = nurse.patients(2, 1).await.unwrap();
    let ids: Vec<i64> = patients.iter().map(|p| p.id).collect();
    assert_eq!(ids, [4, 5]);
    assert_eq!(patients[1].email, "dina@example.com");
    assert_eq!(patients[1].phone, "не указан");

    let procedures = nurse.procedures(&patients[0], Some("12")).await.unwrap();
    assert_eq!(procedures.len(), 1);
    assert_eq!(procedures[0].appointment.id, 10);
    assert_eq!(procedures[0].completions.len(), 1);
    assert!(!procedures[0].completed_today);
    assert!(ctx
        .backend
        .calls_to("procedure-completions/by-appointment/12")
        .is_empty());
}

#[tokio::test]
async fn test_nurse_completion_is_signed_by_current_user() {
    let (ctx, client) = signed_in("vera", 3, &["ROLE_NURSE"]).await;
    let nurse = NurseDashboard::new(client.api.clone());

    let completion = nurse.complete(11).await.unwrap();
    assert_eq!(completion.appointment_id, 11);

    let body = body_of(&ctx, "procedure-completions");
    assert_eq!(body["appointmentId"], 11);
    assert_eq!(body["userId"], 3);
    assert!(body["notes"].as_str().unwrap().starts_with("Выполнено "));
}

#[tokio::test]
async fn test_doctor_requires_procedure_choice() {
    let (ctx, client) = signed_in("boris", 2, &["ROLE_DOCTOR"]).await;
    let doctor = DoctorDashboard::new(client.api.clone());

    let err = doctor.assign_procedure(4, 1, None, "").await.unwrap_err();
    match err {
        ApiError::Validation(errors) => {
            assert_eq!(errors.get("procedureId"), Some("Выберите процедуру"))
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(ctx.backend.calls_to("appointments").is_empty());
}

#[tokio::test]
async fn test_doctor_prescribes_and_reloads_appointments() {
    let (ctx, client) = signed_in("boris", 2, &["ROLE_DOCTOR"]).await;
    let doctor = DoctorDashboard::new(client.api.clone());

    let appointments = doctor
        .assign_procedure(4, 1, Some(1), "после завтрака")
        .await
        .unwrap();
    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0].procedure_name.as_deref(), Some("Массаж"));

    let body = body_of(&ctx, "appointments");
    assert_eq!(body["procedureId"], 1);
    assert_eq!(body["studentId"], 4);
    assert_eq!(body["doctorId"], 2);
    assert_eq!(body["shiftId"], 1);
    assert_eq!(body["notes"], "после завтрака");
    assert_eq!(ctx.backend.calls_to("appointments/student/4/shift/1").len(), 1);
}

#[tokio::test]
async fn test_registrar_changes_room_of_registered_user() {
    let (ctx, client) = signed_in("rita", 6, &["ROLE_REGISTRAR"]).await;
    let registrar = RegistrarDashboard::new(client.api.clone());

    let outcome = registrar.register(4, 1, Some(5)).await.unwrap();
    assert_eq!(outcome, RegistrationOutcome::RoomChanged);
    assert_eq!(body_of(&ctx, "registrations")["roomId"], 5);

    let outcome = registrar.register(4, 1, None).await.unwrap();
    assert_eq!(outcome, RegistrationOutcome::RemovedFromRoom);
    assert_eq!(body_of(&ctx, "registrations")["roomId"], Value::Null);

    let outcome = registrar.register(4, 2, None).await.unwrap();
    assert_eq!(outcome, RegistrationOutcome::Registered { with_room: false });
}

#[tokio::test]
async fn test_registrar_creates_regular_user_only() {
    let (ctx, client) = signed_in("rita", 6, &["ROLE_REGISTRAR"]).await;
    let registrar = RegistrarDashboard::new(client.api.clone());

    let form = UserForm {
        full_name: "Дина Соколова".to_string(),
        email: "dina@example.com".to_string(),
        login: "dina".to_string(),
        roles: vec![Role::Admin],
        ..UserForm::default()
    }
    .with_generated_password();
    let user = registrar.create_user(&form).await.unwrap();
    assert_eq!(user.role_list(), vec![Role::User]);

    let calls = ctx.backend.calls_to("users");
    let created: Vec<_> = calls.iter().filter(|c| c.method == "POST").collect();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].query, None);

    let body: Value = serde_json::from_str(&created[0].body).unwrap();
    assert_eq!(body["roles"], serde_json::json!(["ROLE_USER"]));
    assert_eq!(body["login"], "dina");
    assert_eq!(body["password"].as_str().map(str::len), Some(12));
    assert!(body.get("confirmPassword").is_none());
}

fn news_form(image: Option<NewsImage>) -> NewsForm {
    NewsForm {
        title: "Новый корпус".to_string(),
        content: "Открыт бассейн".to_string(),
        image,
    }
}

fn png(file_name: &str) -> NewsImage {
    NewsImage {
        file_name: file_name.to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

#[tokio::test]
async fn test_admin_publishes_news_as_multipart() {
    let (ctx, client) = signed_in("alice", 1, &["ROLE_ADMIN"]).await;
    let admin = AdminDashboard::new(client.api.clone());

    let news = admin
        .save_news(None, &news_form(Some(png("pool.png"))))
        .await
        .unwrap();
    assert_eq!(news.title, "Новый корпус");

    let parts = body_of(&ctx, "news");
    assert_eq!(parts["title"], "Новый корпус");
    assert_eq!(parts["content"], "Открыт бассейн");
    assert_eq!(parts["imageFile"]["fileName"], "pool.png");
    assert_eq!(parts["imageFile"]["contentType"], "image/png");
    assert_eq!(parts["imageFile"]["len"], 4);
}

#[tokio::test]
async fn test_admin_edits_news_without_replacing_image() {
    let (ctx, client) = signed_in("alice", 1, &["ROLE_ADMIN"]).await;
    let admin = AdminDashboard::new(client.api.clone());

    let news = admin.save_news(Some(4), &news_form(None)).await.unwrap();
    assert_eq!(news.id, 4);

    let calls = ctx.backend.calls_to("news/4");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "PUT");

    let parts: Value = serde_json::from_str(&calls[0].body).unwrap();
    let mut names: Vec<&String> = parts.as_object().unwrap().keys().collect();
    names.sort();
    assert_eq!(names, ["content", "title"]);
}

#[tokio::test]
async fn test_news_image_rules_checked_before_sending() {
    let (ctx, client) = signed_in("alice", 1, &["ROLE_ADMIN"]).await;
    let admin = AdminDashboard::new(client.api.clone());

    let image_error = |err: ApiError| match err {
        ApiError::Validation(errors) => errors.get("imageFile").map(str::to_string),
        other => panic!("unexpected error: {:?}", other),
    };

    let err = admin.save_news(None, &news_form(None)).await.unwrap_err();
    assert_eq!(image_error(err).as_deref(), Some("Изображение обязательно"));

    let bmp = NewsImage {
        content_type: "image/bmp".to_string(),
        ..png("scan.bmp")
    };
    let err = admin.save_news(None, &news_form(Some(bmp))).await.unwrap_err();
    assert_eq!(image_error(err).as_deref(), Some("Только JPG, PNG или GIF"));

    let garbled = NewsImage {
        content_type: "not a mime type".to_string(),
        ..png("scan")
    };
    let err = client
        .api
        .news()
        .create(&news_form(Some(garbled)))
        .await
        .unwrap_err();
    assert_eq!(image_error(err).as_deref(), Some("Только JPG, PNG или GIF"));

    assert!(ctx.backend.calls_to("news").is_empty());
}

#[tokio::test]
async fn test_admin_saves_cabinet_despite_failed_assignment() {
    let (ctx, client) = signed_in("alice", 1, &["ROLE_ADMIN"]).await;
    let admin = AdminDashboard::new(client.api.clone());

    let form = CabinetForm {
        number: "15".to_string(),
        name: "Процедурный".to_string(),
    };
    let cabinet = admin.save_cabinet(None, &form, &[2, 3, 4]).await.unwrap();
    assert_eq!(cabinet.id, 8);
    assert_eq!(cabinet.number, "15");

    let calls = ctx.backend.calls_to("staff-cabinets");
    let mut assigned: Vec<String> = calls
        .iter()
        .filter_map(|c| query_param(c.query.as_deref(), "userId"))
        .collect();
    assigned.sort();
    assert_eq!(assigned, ["2", "3", "4"]);
    assert!(
        calls
            .iter()
            .all(|c| query_param(c.query.as_deref(), "cabinetId").as_deref() == Some("8"))
    );
    assert!(client.session.session().is_signed_in());
}

#[tokio::test]
async fn test_admin_cabinet_overview_lists_medical_staff() {
    let (_ctx, client) = signed_in("alice", 1, &["ROLE_ADMIN"]).await;
    let admin = AdminDashboard::new(client.api.clone());

    let overview = admin.cabinet_overview().await.unwrap();
    assert_eq!(overview.cabinets.len(), 2);

    let staff: Vec<&str> = overview
        .staff_of(2)
        .iter()
        .map(|m| m.full_name.as_str())
        .collect();
    assert_eq!(staff, ["Борис Петров", "Вера Смирнова"]);
    assert!(overview.staff_of(3).is_empty());

    let logins: Vec<&str> = overview
        .medical_staff
        .iter()
        .map(|u| u.login.as_str())
        .collect();
    assert_eq!(logins, ["boris", "vera"]);
}

#[tokio::test]
async fn test_admin_sees_backend_rejection_message() {
    let (_ctx, client) = signed_in("alice", 1, &["ROLE_ADMIN"]).await;
    let admin = AdminDashboard::new(client.api.clone());

    let err = admin.delete_room(3).await.unwrap_err();
    assert_eq!(err.user_message("Ошибка удаления"), "Комната занята");
    assert!(client.session.session().is_signed_in());
}

#[tokio::test]
async fn test_admin_toggles_shift_status() {
    let (ctx, client) = signed_in("alice", 1, &["ROLE_ADMIN"]).await;
    let admin = AdminDashboard::new(client.api.clone());

    let shift = client.api.shifts().get(1).await.unwrap();
    let active = admin.toggle_shift(&shift).await.unwrap();
    assert!(!active);

    let calls = ctx.backend.calls_to("shifts/1/status");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query.as_deref(), Some("isActive=false"));
}

#[tokio::test]
async fn test_user_overview_and_feedback() {
    let (ctx, client) = signed_in("gleb", 4, &["ROLE_USER"]).await;
    let user = UserDashboard::new(client.api.clone());

    let overview = user.overview().await.unwrap();
    assert_eq!(overview.profile.full_name, "Глеб Орлов");
    assert_eq!(overview.history.len(), 1);
    assert_eq!(overview.history[0].appointments.len(), 1);
    assert_eq!(overview.active_shifts.len(), 1);

    user.send_feedback("  Спасибо за смену!  ").await.unwrap();
    let body = body_of(&ctx, "feedback");
    assert_eq!(body["message"], "Спасибо за смену!");
    assert_eq!(body["userId"], 4);
    assert_eq!(body["userFullName"], "gleb");
}

#[tokio::test]
async fn test_blank_feedback_is_not_sent() {
    let (ctx, client) = signed_in("gleb", 4, &["ROLE_USER"]).await;
    let user = UserDashboard::new(client.api.clone());

    let err = user.send_feedback("   ").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert!(ctx.backend.calls_to("feedback").is_empty());
}

#[tokio::test]
async fn test_command_needs_matching_dashboard() {
    let (_ctx, mut client) = signed_in("vera", 3, &["ROLE_NURSE"]).await;
    let out = Output { json: true };

    let err = run(&mut client, Command::ToggleShift { shift_id: 1 }, None, &out)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommandError::WrongDashboard {
            needed: DashboardKind::Admin,
            actual: DashboardKind::Nurse,
        }
    ));
}

#[tokio::test]
async fn test_command_with_multiple_roles_requires_choice() {
    let (ctx, mut client) = signed_in("vera", 3, &["ROLE_NURSE", "ROLE_USER"]).await;
    let out = Output { json: true };

    let err = run(&mut client, Command::Complete { appointment_id: 10 }, None, &out)
        .await
        .unwrap_err();
    assert!(matches!(err, CommandError::RoleRequired(_)));

    run(
        &mut client,
        Command::Complete { appointment_id: 10 },
        Some(Role::Nurse),
        &out,
    )
    .await
    .unwrap();
    assert_eq!(ctx.backend.calls_to("procedure-completions").len(), 1);
}

#[tokio::test]
async fn test_command_rejects_role_not_granted() {
    let (_ctx, mut client) = signed_in("gleb", 4, &["ROLE_USER"]).await;
    let out = Output { json: true };

    let err = run(
        &mut client,
        Command::ToggleShift { shift_id: 1 },
        Some(Role::Admin),
        &out,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CommandError::Router(_)));
    assert_eq!(client.router.selected(), Some(&Role::User));
}
