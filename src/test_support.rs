//! In-process stand-in for the REST backend and the card processor.

use async_trait::async_trait;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiClient;
use crate::config::{ApiConfig, PaymentConfig};
use crate::error::{ClientError, ClientResult};
use crate::models::{ConfirmedIntent, PaymentIntentStatus, RequestStatus, User};
use crate::payment::{PaymentMethod, PaymentProcessor};
use crate::session::{Credentials, KeyValueStore, MemoryStore, SessionCell};

#[derive(Default)]
pub struct MockState {
    pub requests: BTreeMap<u64, Value>,
    next_id: u64,
    pub patches: Vec<(u64, Value)>,
    /// (amount in minor units, request id)
    pub intents: Vec<(i64, u64)>,
    pub intent_currencies: Vec<String>,
    /// (intent id, publishable key)
    pub confirmations: Vec<(String, String)>,
    pub messages: Vec<Value>,
    pub last_list_email: Option<String>,
    pub last_list_status: Option<String>,
    pub profile_bio: Option<String>,
    pub fail_patch: bool,
    pub fail_logout: bool,
    pub omit_client_secret: bool,
    pub intent_error: Option<String>,
    pub webhook_marks_paid: bool,
    pub refresh_delay: Option<Duration>,
    pub fail_sends: bool,
    pub users: BTreeMap<u64, Value>,
    pub staff_updates: Vec<(u64, Value)>,
    pub resume_missing: bool,
    pub deleted_conversations: Vec<u64>,
}

type Shared = Arc<Mutex<MockState>>;

pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Shared,
}

impl MockBackend {
    pub const USER_TOKEN: &'static str = "user-token";
    pub const ADMIN_TOKEN: &'static str = "admin-token";
    pub const EXPIRED_TOKEN: &'static str = "expired-token";
    pub const REFRESHED_TOKEN: &'static str = "refreshed-token";
    pub const PUBLISHABLE_KEY: &'static str = "pk_test_mock";
    pub const RESUME_PDF: &'static [u8] = b"%PDF-1.4 resume";

    pub async fn start() -> Self {
        let users = [user_json(true), user_json(false)]
            .into_iter()
            .map(|mut user| {
                user["date_joined"] = json!("2026-01-05T10:00:00Z");
                (user["id"].as_u64().unwrap(), user)
            })
            .collect();
        let state: Shared = Arc::new(Mutex::new(MockState {
            next_id: 1,
            users,
            ..Default::default()
        }));

        let app = Router::new()
            .route("/api/v1/accounts/login/", post(login))
            .route("/api/v1/accounts/register/", post(register))
            .route("/api/v1/accounts/logout/", post(logout))
            .route("/api/v1/accounts/token/refresh/", post(refresh))
            .route("/api/v1/accounts/profile/", get(profile).patch(update_profile))
            .route("/api/v1/accounts/change-password/", post(change_password))
            .route("/api/v1/hiring/services/", get(services))
            .route("/api/v1/requests/", post(create_request))
            .route("/api/v1/hiring/requests/", get(list_requests))
            .route(
                "/api/v1/hiring/requests/:id/",
                get(get_request).patch(patch_request).delete(delete_request),
            )
            .route("/api/v1/create-payment-intent/", post(create_intent))
            .route("/v1/payment_intents/:id/confirm", post(confirm_intent))
            .route("/api/v1/chat/conversations/", get(conversations))
            .route(
                "/api/v1/chat/conversations/:id/",
                get(conversation).delete(delete_conversation),
            )
            .route("/api/v1/chat/conversations/:id/messages/", get(messages))
            .route("/api/v1/chat/conversations/:id/send_message/", post(send_message))
            .route("/api/v1/chat/notifications/", get(notifications))
            .route("/api/v1/dashboard/admin/admin_stats/", get(admin_stats))
            .route("/api/v1/dashboard/analytics/", get(analytics))
            .route("/api/v1/auth/users/", get(list_users))
            .route("/api/v1/auth/users/:id/", get(get_user).patch(patch_user))
            .route("/api/v1/portfolio/skills/", get(skills))
            .route("/api/v1/portfolio/resume/", get(resume))
            .route("/api/v1/portfolio/resume/download/", get(download_resume))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: format!("http://{}/api/v1", self.addr),
            timeout_secs: 5,
        }
    }

    pub fn payment_config(&self) -> PaymentConfig {
        PaymentConfig {
            publishable_key: Some(Self::PUBLISHABLE_KEY.to_string()),
            processor_url: format!("http://{}", self.addr),
            ..PaymentConfig::default()
        }
    }

    /// A client with an empty in-memory session store.
    pub fn client(&self) -> (ApiClient, Arc<dyn KeyValueStore>) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let cell = Arc::new(SessionCell::rehydrate(Arc::clone(&store)));
        let api = ApiClient::new(&self.api_config(), cell).unwrap();
        (api, store)
    }

    pub fn login_user(&self, api: &ApiClient) -> Arc<Credentials> {
        install(api, Self::USER_TOKEN, user_json(false))
    }

    pub fn login_admin(&self, api: &ApiClient) -> Arc<Credentials> {
        install(api, Self::ADMIN_TOKEN, user_json(true))
    }

    pub fn login_expired(&self, api: &ApiClient) -> Arc<Credentials> {
        install(api, Self::EXPIRED_TOKEN, user_json(false))
    }

    pub fn seed_request(&self, status: RequestStatus, price: Option<f64>, email: &str) -> u64 {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.requests.insert(
            id,
            json!({
                "id": id,
                "ticket_number": format!("HR-2026-{:04}", id),
                "title": "Build me a site",
                "description": "A portfolio site with a blog and a contact form",
                "service_type": 1,
                "priority": "medium",
                "status": status,
                "quoted_price": price.map(|p| format!("{:.2}", p)),
                "name": "A B",
                "email": email,
                "created_at": "2026-10-01T09:30:00Z",
            }),
        );
        id
    }
}

fn install(api: &ApiClient, token: &str, user: Value) -> Arc<Credentials> {
    let user: User = serde_json::from_value(user).unwrap();
    api.session()
        .install(Credentials {
            token: token.to_string(),
            refresh_token: Some("refresh-1".to_string()),
            user,
        })
        .unwrap()
}

fn user_json(admin: bool) -> Value {
    json!({
        "id": if admin { 1 } else { 2 },
        "email": if admin { "admin@example.com" } else { "user@example.com" },
        "first_name": "Test",
        "last_name": "User",
        "role": if admin { "admin" } else { "user" },
        "is_staff": admin,
    })
}

fn reject(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn authorize(headers: &HeaderMap) -> Result<(), Response> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match token {
        Some(MockBackend::USER_TOKEN)
        | Some(MockBackend::ADMIN_TOKEN)
        | Some(MockBackend::REFRESHED_TOKEN) => Ok(()),
        Some(_) => Err(reject(
            StatusCode::UNAUTHORIZED,
            json!({"detail": "Token is invalid or expired"}),
        )),
        None => Err(reject(
            StatusCode::UNAUTHORIZED,
            json!({"detail": "Authentication credentials were not provided."}),
        )),
    }
}

fn authorize_admin(headers: &HeaderMap) -> Result<(), Response> {
    authorize(headers)?;
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if token == Some(MockBackend::ADMIN_TOKEN) {
        Ok(())
    } else {
        Err(reject(
            StatusCode::FORBIDDEN,
            json!({"detail": "You do not have permission to perform this action."}),
        ))
    }
}

fn not_found() -> Response {
    reject(StatusCode::NOT_FOUND, json!({"detail": "Not found."}))
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != "secret" {
        return reject(StatusCode::UNAUTHORIZED, json!({"message": "Invalid credentials"}));
    }
    let mut user = user_json(false);
    user["email"] = body["email"].clone();
    Json(json!({"user": user, "token": MockBackend::USER_TOKEN, "refresh_token": "refresh-1"}))
        .into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == "taken@example.com" {
        return reject(
            StatusCode::BAD_REQUEST,
            json!({"errors": {"email": ["A user with this email already exists"]}}),
        );
    }
    let mut user = user_json(false);
    user["email"] = body["email"].clone();
    (
        StatusCode::CREATED,
        Json(json!({"user": user, "token": MockBackend::USER_TOKEN})),
    )
        .into_response()
}

async fn logout(State(state): State<Shared>) -> Response {
    if state.lock().fail_logout {
        return reject(StatusCode::INTERNAL_SERVER_ERROR, json!({"detail": "boom"}));
    }
    StatusCode::RESET_CONTENT.into_response()
}

async fn refresh(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let delay = state.lock().refresh_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if body["refresh"] != "refresh-1" {
        return reject(StatusCode::UNAUTHORIZED, json!({"detail": "Token is invalid or expired"}));
    }
    Json(json!({"access": MockBackend::REFRESHED_TOKEN})).into_response()
}

async fn profile(headers: HeaderMap, State(state): State<Shared>) -> Response {
    if let Err(r) = authorize(&headers) {
        return r;
    }
    let mut user = user_json(false);
    user["bio"] = json!(state.lock().profile_bio.clone());
    Json(user).into_response()
}

async fn update_profile(
    headers: HeaderMap,
    State(state): State<Shared>,
    mut multipart: Multipart,
) -> Response {
    if let Err(r) = authorize(&headers) {
        return r;
    }
    let mut echoed = serde_json::Map::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let text = field.text().await.unwrap_or_default();
        echoed.insert(name, Value::String(text));
    }
    // an empty bio clears it, and the echo says so with null
    if echoed.get("bio") == Some(&Value::String(String::new())) {
        echoed.insert("bio".to_string(), Value::Null);
    }
    match echoed.get("bio") {
        Some(Value::String(bio)) => state.lock().profile_bio = Some(bio.clone()),
        Some(Value::Null) => state.lock().profile_bio = None,
        _ => {}
    }
    Json(Value::Object(echoed)).into_response()
}

async fn change_password(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&headers) {
        return r;
    }
    if body["old_password"] != "secret" {
        return reject(
            StatusCode::BAD_REQUEST,
            json!({"old_password": ["Wrong password."]}),
        );
    }
    Json(json!({"message": "Password updated"})).into_response()
}

async fn services() -> Response {
    Json(json!([
        {"id": 2, "name": "Mobile App", "description": "", "base_price": "900.00", "is_active": true, "order": 2},
        {"id": 1, "name": "Website", "description": "", "base_price": "500.00", "is_active": true, "order": 1},
        {"id": 3, "name": "Legacy", "description": "", "base_price": 50, "is_active": false, "order": 0},
    ]))
    .into_response()
}

async fn create_request(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock();
    let id = state.next_id;
    state.next_id += 1;
    let mut request = body.clone();
    request["id"] = json!(id);
    request["ticket_number"] = json!(format!("HR-2026-{:04}", id));
    request["status"] = json!("pending");
    request["quoted_price"] = Value::Null;
    request["created_at"] = json!("2026-10-19T10:00:00Z");
    state.requests.insert(id, request.clone());
    (StatusCode::CREATED, Json(request)).into_response()
}

async fn list_requests(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock();
    let email = params.get("email").cloned();
    let status = params.get("status").cloned();
    state.last_list_email = email.clone();
    state.last_list_status = status.clone();
    let listing: Vec<Value> = state
        .requests
        .values()
        .filter(|r| email.as_deref().map_or(true, |e| r["email"] == e))
        .filter(|r| status.as_deref().map_or(true, |s| r["status"] == s))
        .cloned()
        .collect();
    Json(listing).into_response()
}

async fn get_request(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    match state.lock().requests.get(&id) {
        Some(request) => Json(request.clone()).into_response(),
        None => not_found(),
    }
}

async fn patch_request(
    headers: HeaderMap,
    State(state): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&headers) {
        return r;
    }
    let mut state = state.lock();
    if state.fail_patch {
        return reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"detail": "Database unavailable"}),
        );
    }
    state.patches.push((id, body.clone()));
    let Some(request) = state.requests.get_mut(&id) else {
        return not_found();
    };
    if let (Some(target), Some(fields)) = (request.as_object_mut(), body.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(request.clone()).into_response()
}

async fn delete_request(
    headers: HeaderMap,
    State(state): State<Shared>,
    Path(id): Path<u64>,
) -> Response {
    if let Err(r) = authorize(&headers) {
        return r;
    }
    match state.lock().requests.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(),
    }
}

async fn create_intent(
    headers: HeaderMap,
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&headers) {
        return r;
    }
    let mut state = state.lock();
    let amount = body["amount"].as_i64().unwrap_or_default();
    let request_id = body["request_id"].as_u64().unwrap_or_default();
    state.intents.push((amount, request_id));
    let currency = body["currency"].as_str().unwrap_or_default().to_string();
    state.intent_currencies.push(currency);

    if let Some(error) = state.intent_error.clone() {
        return reject(StatusCode::BAD_REQUEST, json!({"error": error}));
    }
    if state.webhook_marks_paid {
        if let Some(request) = state.requests.get_mut(&request_id) {
            request["status"] = json!("paid");
        }
    }
    if state.omit_client_secret {
        return Json(json!({})).into_response();
    }
    let n = state.intents.len();
    Json(json!({"clientSecret": format!("pi_{}_secret_test", n)})).into_response()
}

async fn confirm_intent(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.lock().confirmations.push((
        id.clone(),
        form.get("key").cloned().unwrap_or_default(),
    ));
    if form.get("payment_method").map(String::as_str) == Some("pm_card_chargeDeclined") {
        return reject(
            StatusCode::PAYMENT_REQUIRED,
            json!({"error": {"type": "card_error", "message": "Your card was declined."}}),
        );
    }
    Json(json!({"id": id, "status": "succeeded"})).into_response()
}

async fn conversations(headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&headers) {
        return r;
    }
    Json(json!([{
        "id": 9,
        "participants": [{"id": 1, "username": "admin", "email": "admin@example.com"}],
        "is_active": true,
        "unread_count": 2
    }]))
    .into_response()
}

async fn conversation(headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if let Err(r) = authorize(&headers) {
        return r;
    }
    if id != 9 {
        return not_found();
    }
    Json(json!({
        "id": 9,
        "participants": [
            {"id": 1, "username": "admin", "email": "admin@example.com"},
            {"id": 2, "username": "user", "email": "user@example.com"}
        ],
        "is_active": true,
        "unread_count": 0
    }))
    .into_response()
}

async fn delete_conversation(
    headers: HeaderMap,
    State(state): State<Shared>,
    Path(id): Path<u64>,
) -> Response {
    if let Err(r) = authorize(&headers) {
        return r;
    }
    if id != 9 {
        return not_found();
    }
    state.lock().deleted_conversations.push(id);
    StatusCode::NO_CONTENT.into_response()
}

async fn messages(headers: HeaderMap, State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    if let Err(r) = authorize(&headers) {
        return r;
    }
    let listing: Vec<Value> = state
        .lock()
        .messages
        .iter()
        .filter(|m| m["conversation"] == id)
        .cloned()
        .collect();
    Json(listing).into_response()
}

async fn send_message(
    headers: HeaderMap,
    State(state): State<Shared>,
    Path(id): Path<u64>,
    mut multipart: Multipart,
) -> Response {
    if let Err(r) = authorize(&headers) {
        return r;
    }
    let mut content = String::new();
    let mut file_name = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name() {
            Some("content") => content = field.text().await.unwrap_or_default(),
            Some("file") => file_name = field.file_name().map(str::to_string),
            _ => {}
        }
    }
    if content == "fail" || state.lock().fail_sends {
        return reject(StatusCode::BAD_REQUEST, json!({"detail": "Message rejected"}));
    }
    let mut state = state.lock();
    let message = json!({
        "id": state.messages.len() as u64 + 100,
        "conversation": id,
        "sender": {"id": 2, "username": "user", "email": "user@example.com"},
        "content": content,
        "file_name": file_name,
        "created_at": "2026-10-19T12:00:00Z",
        "is_read": false
    });
    state.messages.push(message.clone());
    (StatusCode::CREATED, Json(message)).into_response()
}

async fn notifications(headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&headers) {
        return r;
    }
    Json(json!({"count": 1, "results": [{
        "id": 5,
        "type": "hiring",
        "title": "Your request was priced",
        "content": "HR-2026-0001 is ready for payment",
        "created_at": "2026-10-19T08:00:00Z",
        "is_read": false
    }]}))
    .into_response()
}

async fn admin_stats(headers: HeaderMap, State(state): State<Shared>) -> Response {
    if let Err(r) = authorize(&headers) {
        return r;
    }
    let state = state.lock();
    let count = |status: &str| state.requests.values().filter(|r| r["status"] == status).count();
    Json(json!({
        "total_requests": state.requests.len(),
        "pending_requests": count("pending"),
        "completed_requests": count("completed"),
        "total_revenue": "1500.00",
        "recent_requests": state.requests.values().cloned().collect::<Vec<_>>(),
        "requests_by_status": [{"status": "pending", "count": count("pending")}],
        "requests_by_service": []
    }))
    .into_response()
}

async fn analytics(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if let Err(r) = authorize(&headers) {
        return r;
    }
    if params.get("group_by").map(String::as_str) != Some("day") || !params.contains_key("start_date") {
        return reject(StatusCode::BAD_REQUEST, json!({"detail": "Invalid range"}));
    }
    Json(json!([
        {"date": "2026-10-17", "total_requests": 2, "completed_requests": 1, "revenue": "200.00", "response_time": 3.5},
        {"date": "2026-10-18", "total_requests": 4, "completed_requests": 2, "revenue": 300, "response_time": 2.0}
    ]))
    .into_response()
}

async fn list_users(headers: HeaderMap, State(state): State<Shared>) -> Response {
    if let Err(r) = authorize_admin(&headers) {
        return r;
    }
    let users: Vec<Value> = state.lock().users.values().cloned().collect();
    Json(users).into_response()
}

async fn get_user(headers: HeaderMap, State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    if let Err(r) = authorize_admin(&headers) {
        return r;
    }
    match state.lock().users.get(&id) {
        Some(user) => Json(user.clone()).into_response(),
        None => not_found(),
    }
}

async fn patch_user(
    headers: HeaderMap,
    State(state): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize_admin(&headers) {
        return r;
    }
    let mut state = state.lock();
    let Some(user) = state.users.get_mut(&id) else {
        return not_found();
    };
    if let Some(staff) = body.get("is_staff") {
        user["is_staff"] = staff.clone();
    }
    let user = user.clone();
    state.staff_updates.push((id, body));
    Json(user).into_response()
}

async fn skills() -> Response {
    Json(json!({"count": 2, "results": [
        {"id": 1, "name": "Rust", "category": "backend", "icon": "rust", "proficiency": 90,
         "years_experience": 4, "is_featured": true, "order": 1},
        {"id": 2, "name": "React", "category": "frontend", "icon": "react", "proficiency": 75,
         "years_experience": 3.5, "is_featured": false, "order": 2}
    ]}))
    .into_response()
}

async fn resume() -> Response {
    Json(json!({
        "education": [{"school": "State University", "degree": "BSc", "field": "Computer Science",
                       "startDate": "2014", "endDate": "2018", "description": ""}],
        "experience": [{"company": "Acme", "position": "Engineer", "startDate": "2018",
                        "endDate": "Present", "description": "Backend services",
                        "achievements": ["Cut p99 latency in half"], "technologies": ["Rust"]}],
        "projects": [{"name": "hireflow", "description": "Hiring portal", "technologies": ["Rust"]}],
        "skills": [{"category": "Languages", "items": ["Rust", "Go"]}]
    }))
    .into_response()
}

async fn download_resume(State(state): State<Shared>) -> Response {
    if state.lock().resume_missing {
        return reject(StatusCode::NOT_FOUND, json!({"detail": "Resume not available"}));
    }
    (
        [(header::CONTENT_TYPE, "application/pdf")],
        MockBackend::RESUME_PDF.to_vec(),
    )
        .into_response()
}

/// Processor double with a fixed answer and an optional delay.
pub struct ScriptedProcessor {
    result: Result<PaymentIntentStatus, String>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedProcessor {
    pub fn succeeding() -> Arc<Self> {
        Self::with_status(PaymentIntentStatus::Succeeded)
    }

    pub fn with_status(status: PaymentIntentStatus) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(status),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(message.to_string()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(PaymentIntentStatus::Succeeded),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentProcessor for ScriptedProcessor {
    async fn confirm(
        &self,
        client_secret: &str,
        _method: &PaymentMethod,
    ) -> ClientResult<ConfirmedIntent> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let id = client_secret
            .split_once("_secret_")
            .map(|(id, _)| id.to_string())
            .unwrap_or_default();
        match &self.result {
            Ok(status) => Ok(ConfirmedIntent { id, status: *status }),
            Err(message) => Err(ClientError::Payment(message.clone())),
        }
    }
}
