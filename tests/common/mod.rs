#![allow(dead_code)]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{Body, to_bytes};
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use sanatorium::storage::{Storage, TOKEN_KEY, USER_KEY};
use sanatorium::{Client, ClientConfig, start_client};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

/// A request the mock backend received.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    /// Path below `/api/`, e.g. `auth/me`
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    /// Raw body, or for multipart requests a JSON object of the parts
    pub body: String,
}

#[derive(Clone)]
pub struct Account {
    pub login: String,
    pub password: String,
    pub token: String,
    pub identity: Value,
}

struct MockState {
    accounts: Vec<Account>,
    revoked: Mutex<HashSet<String>>,
    calls: Mutex<Vec<Call>>,
}

impl MockState {
    fn account_for(&self, headers: &HeaderMap) -> Option<&Account> {
        let token = headers
            .get("authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        if self.revoked.lock().unwrap().contains(token) {
            return None;
        }
        self.accounts.iter().find(|a| a.token == token)
    }
}

pub struct MockBackend {
    pub addr: SocketAddr,
    state: Arc<MockState>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    pub fn api_url(&self) -> Url {
        Url::parse(&format!("http://{}/api", self.addr)).unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }

    /// Make the backend reject a token from now on.
    pub fn revoke(&self, token: &str) {
        self.state.revoked.lock().unwrap().insert(token.to_string());
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn account(login: &str, password: &str, token: &str, id: i64, roles: &[&str]) -> Account {
    Account {
        login: login.to_string(),
        password: password.to_string(),
        token: token.to_string(),
        identity: json!({
            "id": id,
            "login": login,
            "email": format!("{}@example.com", login),
            "roles": roles,
        }),
    }
}

pub struct TestSetup {
    accounts: Vec<Account>,
}

impl TestSetup {
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
        }
    }

    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts.push(account);
        self
    }

    pub async fn build(self) -> TestContext {
        let state = Arc::new(MockState {
            accounts: self.accounts,
            revoked: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        });

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local address");
        let app = Router::new().fallback(handle).with_state(state.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let storage = Storage::open(":memory:")
            .await
            .expect("Failed to open test storage");

        TestContext {
            backend: MockBackend {
                addr,
                state,
                handle,
            },
            storage,
        }
    }
}

pub struct TestContext {
    pub backend: MockBackend,
    pub storage: Storage,
}

impl TestContext {
    /// Start a client on this context's storage, as a fresh process would.
    pub async fn client(&self) -> Client {
        start_client(ClientConfig {
            api_url: self.backend.api_url(),
            storage: self.storage.clone(),
        })
        .await
        .expect("Failed to start client")
    }

    pub async fn stored(&self) -> (Option<String>, Option<String>) {
        let kv = self.storage.kv();
        (
            kv.get(TOKEN_KEY).await.unwrap(),
            kv.get(USER_KEY).await.unwrap(),
        )
    }

    pub async fn store_token(&self, token: &str) {
        self.storage.kv().set(TOKEN_KEY, token).await.unwrap();
    }

    pub async fn store_identity(&self, identity: &Value) {
        self.storage
            .kv()
            .set(USER_KEY, &identity.to_string())
            .await
            .unwrap();
    }
}

fn shift(id: i64, name: &str, active: bool) -> Value {
    json!({
        "id": id,
        "name": name,
        "startDate": "2030-07-01",
        "endDate": "2030-07-21",
        "active": active,
        "description": null,
    })
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Unauthorized" })),
    )
        .into_response()
}

/// Summarize a multipart body as `{ name: text }` for text parts and
/// `{ name: { fileName, contentType, len } }` for file parts.
async fn multipart_parts(content_type: &str, bytes: Vec<u8>) -> Value {
    let request = axum::http::Request::builder()
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(bytes))
        .unwrap();
    let mut multipart = Multipart::from_request(request, &()).await.unwrap();

    let mut parts = serde_json::Map::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let part_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.unwrap();
        let value = match file_name {
            Some(file_name) => json!({
                "fileName": file_name,
                "contentType": part_type,
                "len": data.len(),
            }),
            None => json!(String::from_utf8_lossy(&data)),
        };
        parts.insert(name, value);
    }
    Value::Object(parts)
}

pub fn query_param(query: Option<&str>, key: &str) -> Option<String> {
    query?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| v.to_string())
    })
}

async fn handle(State(state): State<Arc<MockState>>, request: Request) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let headers = request.headers().clone();
    let bytes = to_bytes(request.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    let path = uri.path().trim_start_matches("/api/").to_string();
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = if content_type.starts_with("multipart/form-data") {
        multipart_parts(&content_type, bytes).await.to_string()
    } else {
        String::from_utf8_lossy(&bytes).to_string()
    };
    state.calls.lock().unwrap().push(Call {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.clone(),
    });

    let segments: Vec<&str> = path.split('/').collect();

    // Public endpoints
    match (method.as_str(), segments.as_slice()) {
        ("POST", ["auth", "signin"]) => {
            let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            if request["login"] == "broken" {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Сервис недоступен" })),
                )
                    .into_response();
            }
            let found = state
                .accounts
                .iter()
                .find(|a| request["login"] == a.login && request["password"] == a.password);
            return match found {
                Some(account) => {
                    let mut response = account.identity.clone();
                    response["token"] = json!(account.token);
                    Json(response).into_response()
                }
                None => unauthorized(),
            };
        }
        ("GET", ["shifts", "active"]) => {
            return Json(json!([shift(1, "Летняя смена", true)])).into_response();
        }
        ("GET", ["procedures"]) => {
            return Json(json!([
                {"id": 1, "name": "Массаж", "cabinetId": 2, "cabinetNumber": "12", "cabinetName": "Массажный", "defaultDuration": 30},
                {"id": 2, "name": "Ингаляция", "cabinetId": 3, "cabinetNumber": "14", "cabinetName": "Ингаляторий"}
            ]))
            .into_response();
        }
        ("GET", ["news"]) => {
            return Json(json!([
                {"id": 1, "title": "Открытие сезона", "content": "Ждем всех", "createdAt": "2030-06-01T10:00:00"}
            ]))
            .into_response();
        }
        _ => {}
    }

    let Some(account) = state.account_for(&headers) else {
        return unauthorized();
    };

    match (method.as_str(), segments.as_slice()) {
        ("GET", ["auth", "me"]) => Json(account.identity.clone()).into_response(),
        ("GET", ["users"]) => Json(json!([
            {"id": 1, "fullName": "Алиса Иванова", "email": "alice@example.com", "login": "alice", "roles": [{"name": "ROLE_ADMIN"}]},
            {"id": 2, "fullName": "Борис Петров", "email": "boris@example.com", "login": "boris", "phone": "+7 900", "roles": ["ROLE_DOCTOR"]},
            {"id": 3, "fullName": "Вера Смирнова", "email": "vera@example.com", "login": "vera", "roles": ["ROLE_NURSE", "ROLE_USER"]},
            {"id": 4, "fullName": "Глеб Орлов", "email": "gleb@example.com", "login": "gleb", "roles": ["ROLE_USER"]}
        ]))
        .into_response(),
        ("GET", ["users", "roles"]) => Json(json!([
            "ROLE_USER", "ROLE_ADMIN", "ROLE_REGISTRAR", "ROLE_DOCTOR", "ROLE_NURSE"
        ]))
        .into_response(),
        ("GET", ["cabinets"]) => Json(json!([
            {"id": 2, "number": "12", "name": "Массажный"},
            {"id": 3, "number": "14", "name": "Ингаляторий"}
        ]))
        .into_response(),
        ("GET", ["staff-cabinets", "assignments"]) => Json(json!([
            {"cabinetId": 2, "userId": 2, "userFullName": "Борис Петров", "userLogin": "boris"},
            {"cabinetId": 2, "userId": 3, "userFullName": "Вера Смирнова", "userLogin": "vera"}
        ]))
        .into_response(),
        ("GET", ["staff-cabinets", "by-user", _]) => Json(json!([
            {"cabinetId": 2, "cabinetNumber": "12", "cabinetName": "Массажный"}
        ]))
        .into_response(),
        ("GET", ["shifts", id]) => match id.parse::<i64>() {
            Ok(id) => Json(shift(id, "Летняя смена", true)).into_response(),
            Err(_) => StatusCode::NOT_FOUND.into_response(),
        },
        ("PATCH", ["shifts", _, "status"]) => StatusCode::OK.into_response(),
        ("GET", ["appointments", "shift", _, "cabinet", _]) => Json(json!([
            {"id": 10, "studentId": 4, "studentName": "Глеб Орлов", "procedureName": "Массаж", "cabinetNumber": "12"},
            {"id": 11, "studentId": 5, "studentName": "Дина Соколова", "studentEmail": "dina@example.com", "procedureName": "Массаж", "cabinetNumber": "12"},
            {"id": 12, "studentId": 4, "studentName": "Глеб Орлов", "procedureName": "Ингаляция", "cabinetNumber": "14"}
        ]))
        .into_response(),
        ("GET", ["procedure-completions", "by-appointment", id]) => {
            if *id == "10" {
                Json(json!([
                    {"id": 1, "appointmentId": 10, "completedAt": "2000-01-01T09:00:00", "completedByName": "Вера"}
                ]))
                .into_response()
            } else {
                Json(json!([])).into_response()
            }
        }
        ("POST", ["procedure-completions"]) => {
            let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            Json(json!({
                "id": 99,
                "appointmentId": request["appointmentId"],
                "completedById": request["userId"],
                "notes": request["notes"],
            }))
            .into_response()
        }
        ("POST", ["appointments"]) => {
            let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            Json(json!({ "id": 50, "procedureId": request["procedureId"] })).into_response()
        }
        ("GET", ["appointments", "student", _, "shift", _]) => Json(json!([
            {"id": 50, "procedureId": 1, "procedureName": "Массаж", "studentId": 4}
        ]))
        .into_response(),
        ("GET", ["registrations", "user", _]) => Json(json!([
            {"id": 7, "userId": 4, "shiftId": 1, "roomId": 3, "roomNumber": "201"}
        ]))
        .into_response(),
        ("POST", ["registrations"]) => StatusCode::OK.into_response(),
        ("GET", ["users", _, "profile"]) => Json(json!({
            "fullName": "Глеб Орлов", "email": "gleb@example.com", "birthDate": "2004-05-06"
        }))
        .into_response(),
        ("GET", ["users", _, "shifts"]) => Json(json!([
            {"shiftId": 1, "shiftName": "Летняя смена", "startDate": "2030-07-01", "endDate": "2030-07-21",
             "roomNumber": "201", "appointments": [{"id": 50, "procedureName": "Массаж"}], "completedProcedures": []}
        ]))
        .into_response(),
        ("POST", ["feedback"]) => StatusCode::CREATED.into_response(),
        ("POST", ["users"]) => {
            let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            Json(json!({
                "id": 9,
                "fullName": request["fullName"],
                "email": request["email"],
                "login": request["login"],
                "roles": request["roles"],
            }))
            .into_response()
        }
        ("POST", ["news"]) | ("PUT", ["news", _]) => {
            let parts: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            let id = segments.get(1).and_then(|id| id.parse::<i64>().ok()).unwrap_or(5);
            Json(json!({
                "id": id,
                "title": parts["title"],
                "content": parts["content"],
            }))
            .into_response()
        }
        ("POST", ["cabinets"]) => {
            let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            Json(json!({ "id": 8, "number": request["number"], "name": request["name"] }))
                .into_response()
        }
        ("POST", ["staff-cabinets"]) => {
            // User 3 is already assigned everywhere.
            if query_param(uri.query(), "userId").as_deref() == Some("3") {
                (
                    StatusCode::CONFLICT,
                    Json(json!({ "message": "Сотрудник уже назначен" })),
                )
                    .into_response()
            } else {
                StatusCode::OK.into_response()
            }
        }
        ("DELETE", ["rooms", _]) => (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Комната занята" })),
        )
            .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
