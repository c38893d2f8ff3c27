use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use jobportal_api::app::{AppServices, build_router};
use jobportal_infra::{AppConfig, AuthMode, InMemoryEntityStore, Notification, Notifier, NotifyError};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(config: AppConfig) -> Self {
        Self::spawn_with(AppServices::in_memory(&config)).await
    }

    async fn spawn_with(services: AppServices) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = build_router(Arc::new(services));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn session_mode() -> Self {
        Self::spawn(AppConfig::default()).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A client that keeps its session cookie between requests.
fn browser() -> reqwest::Client {
    reqwest::Client::builder().cookie_store(true).build().unwrap()
}

async fn signup(client: &reqwest::Client, server: &TestServer, email: &str, role: &str) -> Value {
    let res = client
        .post(server.url("/signup"))
        .json(&json!({
            "username": email.split('@').next().unwrap(),
            "email": email,
            "password": "correct horse battery staple",
            "role": role,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED, "signup of {email} failed");
    res.json().await.unwrap()
}

async fn create_profile(client: &reqwest::Client, server: &TestServer, path: &str, body: Value) -> Value {
    let res = client.post(server.url(path)).json(&body).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED, "creating {path} failed");
    res.json().await.unwrap()
}

async fn pay(client: &reqwest::Client, server: &TestServer, body: Value) -> reqwest::Response {
    client.post(server.url("/payments")).json(&body).send().await.unwrap()
}

fn id_of(value: &Value) -> &str {
    value["id"].as_str().expect("record has an id")
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::session_mode().await;

    let res = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let server = TestServer::session_mode().await;
    let client = browser();
    let some_id = "0190d7a0-0000-7000-8000-000000000000";

    let mut routes = vec![
        (reqwest::Method::GET, "/check_session".to_string()),
        (reqwest::Method::DELETE, "/logout".to_string()),
        (reqwest::Method::GET, "/payments".to_string()),
        (reqwest::Method::POST, "/payments".to_string()),
        (reqwest::Method::GET, "/job_categories".to_string()),
        (reqwest::Method::POST, "/job_categories".to_string()),
        (reqwest::Method::GET, "/users".to_string()),
    ];
    for collection in ["/jobseekers", "/employers", "/contact_requests", "/fileuploads"] {
        routes.push((reqwest::Method::GET, collection.to_string()));
        routes.push((reqwest::Method::POST, collection.to_string()));
    }
    for collection in ["/users", "/jobseekers", "/employers", "/contact_requests", "/fileuploads"] {
        let record = format!("{collection}/{some_id}");
        routes.push((reqwest::Method::GET, record.clone()));
        routes.push((reqwest::Method::DELETE, record.clone()));
        if collection != "/fileuploads" {
            routes.push((reqwest::Method::PATCH, record));
        }
    }

    for (method, path) in routes {
        let res = client
            .request(method.clone(), server.url(&path))
            .json(&json!({}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{method} {path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "unauthorized", "{method} {path}");
    }
}

#[tokio::test]
async fn signup_sets_session_and_hides_password() {
    let server = TestServer::session_mode().await;
    let client = browser();

    let body = signup(&client, &server, "boss@example.com", "admin").await;
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["verified"], true);
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["token"].is_null());

    let me: Value = client.get(server.url("/check_session")).send().await.unwrap().json().await.unwrap();
    assert_eq!(me["email"], "boss@example.com");
}

#[tokio::test]
async fn signup_rejects_missing_fields_and_duplicates() {
    let server = TestServer::session_mode().await;
    let client = browser();

    let res = client
        .post(server.url("/signup"))
        .json(&json!({ "email": "nobody@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "missing_field");

    signup(&client, &server, "dup@example.com", "jobseeker").await;
    let res = browser()
        .post(server.url("/signup"))
        .json(&json!({ "email": "dup@example.com", "password": "pw", "role": "jobseeker" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_checks_password_and_logout_ends_session() {
    let server = TestServer::session_mode().await;
    signup(&browser(), &server, "js@example.com", "jobseeker").await;

    let client = browser();
    let res = client
        .post(server.url("/login"))
        .json(&json!({ "email": "js@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(server.url("/login"))
        .json(&json!({ "email": "JS@example.com", "password": "correct horse battery staple" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(client.get(server.url("/check_session")).send().await.unwrap().status(), StatusCode::OK);

    let res = client.delete(server.url("/logout")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        client.get(server.url("/check_session")).send().await.unwrap().status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn jobseeker_listing_is_behind_the_paywall() {
    let server = TestServer::session_mode().await;

    let jobseeker = browser();
    signup(&jobseeker, &server, "seeker@example.com", "jobseeker").await;
    create_profile(&jobseeker, &server, "/jobseekers", json!({ "bio": "rustacean", "skills": "rust" })).await;

    // Jobseekers never browse other jobseekers.
    let res = jobseeker.get(server.url("/jobseekers")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "You don't have access!");

    let employer = browser();
    signup(&employer, &server, "hr@example.com", "employer").await;
    create_profile(&employer, &server, "/employers", json!({ "company_name": "Acme" })).await;

    let res = employer.get(server.url("/jobseekers")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::PAYMENT_REQUIRED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Pay fee to have access!");

    let res = pay(&employer, &server, json!({ "amount": 49.0 })).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let payment: Value = res.json().await.unwrap();
    assert_eq!(payment["payment_status"], true);

    let res = employer.get(server.url("/jobseekers")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listed: Vec<Value> = res.json().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["bio"], "rustacean");

    // A second payment for the same employer is refused.
    let res = pay(&employer, &server, json!({ "amount": 49.0 })).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn payments_only_for_your_own_employer() {
    let server = TestServer::session_mode().await;

    let employer = browser();
    signup(&employer, &server, "hr@example.com", "employer").await;
    let profile = create_profile(&employer, &server, "/employers", json!({})).await;

    let other = browser();
    signup(&other, &server, "rival@example.com", "employer").await;
    create_profile(&other, &server, "/employers", json!({})).await;

    let res = pay(&other, &server, json!({ "employer_id": id_of(&profile), "amount": 10.0 })).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let jobseeker = browser();
    signup(&jobseeker, &server, "seeker@example.com", "jobseeker").await;
    let res = pay(&jobseeker, &server, json!({ "employer_id": id_of(&profile), "amount": 10.0 })).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = pay(&employer, &server, json!({ "amount": -5.0 })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = pay(&employer, &server, json!({ "employerID": id_of(&profile), "amount": 10.0 })).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Each employer sees only its own payments.
    let mine: Vec<Value> = employer.get(server.url("/payments")).send().await.unwrap().json().await.unwrap();
    assert_eq!(mine.len(), 1);
    let theirs: Vec<Value> = other.get(server.url("/payments")).send().await.unwrap().json().await.unwrap();
    assert!(theirs.is_empty());
}

#[tokio::test]
async fn contact_request_round_trip() {
    let server = TestServer::session_mode().await;

    let jobseeker = browser();
    signup(&jobseeker, &server, "seeker@example.com", "jobseeker").await;
    let seeker_profile = create_profile(&jobseeker, &server, "/jobseekers", json!({})).await;

    let employer = browser();
    signup(&employer, &server, "hr@example.com", "employer").await;
    create_profile(&employer, &server, "/employers", json!({ "company_name": "Acme" })).await;

    let res = employer
        .post(server.url("/contact_requests"))
        .json(&json!({ "jobseekerID": id_of(&seeker_profile), "message": "Interested in an interview?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let request: Value = res.json().await.unwrap();
    assert_eq!(request["status"], "pending");
    assert!(request["created_at"].is_string());

    // The contacted jobseeker may read and answer it.
    let path = format!("/contact_requests/{}", id_of(&request));
    let res = jobseeker.get(server.url(&path)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = jobseeker.patch(server.url(&path)).json(&json!({ "status": "accepted" })).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["status"], "accepted");

    // Strangers may not.
    let stranger = browser();
    signup(&stranger, &server, "other@example.com", "jobseeker").await;
    let res = stranger.get(server.url(&path)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Missing message is a 400.
    let res = employer
        .post(server.url("/contact_requests"))
        .json(&json!({ "jobseeker_id": id_of(&seeker_profile) }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_jobseeker_cascades() {
    let server = TestServer::session_mode().await;

    let admin = browser();
    signup(&admin, &server, "admin@example.com", "admin").await;

    let jobseeker = browser();
    signup(&jobseeker, &server, "seeker@example.com", "jobseeker").await;
    let profile = create_profile(&jobseeker, &server, "/jobseekers", json!({})).await;
    create_profile(
        &jobseeker,
        &server,
        "/fileuploads",
        json!({ "file_path": "/uploads/cv.pdf", "file_type": "PDF" }),
    )
    .await;

    let employer = browser();
    signup(&employer, &server, "hr@example.com", "employer").await;
    create_profile(&employer, &server, "/employers", json!({})).await;
    create_profile(
        &employer,
        &server,
        "/contact_requests",
        json!({ "jobseeker_id": id_of(&profile), "message": "hello" }),
    )
    .await;

    let res = jobseeker
        .delete(server.url(&format!("/jobseekers/{}", id_of(&profile))))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let requests: Vec<Value> = admin.get(server.url("/contact_requests")).send().await.unwrap().json().await.unwrap();
    assert!(requests.is_empty());
    let uploads: Vec<Value> = admin.get(server.url("/fileuploads")).send().await.unwrap().json().await.unwrap();
    assert!(uploads.is_empty());

    let res = admin.get(server.url(&format!("/jobseekers/{}", id_of(&profile)))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn protected_fields_cannot_be_patched() {
    let server = TestServer::session_mode().await;

    let employer = browser();
    let account = signup(&employer, &server, "hr@example.com", "employer").await;
    let profile = create_profile(&employer, &server, "/employers", json!({})).await;

    let res = employer
        .patch(server.url(&format!("/employers/{}", id_of(&profile))))
        .json(&json!({ "pay_to_view": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let user_path = format!("/users/{}", account["user"]["id"].as_str().unwrap());
    let res = employer.patch(server.url(&user_path)).json(&json!({ "role": "admin" })).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Only admins flip verification flags.
    let res = employer.patch(server.url(&user_path)).json(&json!({ "verified": true })).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = employer
        .patch(server.url(&user_path))
        .json(&json!({ "first_name": "Grace" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let user: Value = res.json().await.unwrap();
    assert_eq!(user["first_name"], "Grace");
    assert_eq!(user["role"], "employer");
}

#[tokio::test]
async fn job_categories_are_admin_managed() {
    let server = TestServer::session_mode().await;

    let admin = browser();
    signup(&admin, &server, "admin@example.com", "admin").await;
    let jobseeker = browser();
    signup(&jobseeker, &server, "seeker@example.com", "jobseeker").await;

    let res = jobseeker
        .post(server.url("/job_categories"))
        .json(&json!({ "category_name": "Design" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    create_profile(&admin, &server, "/job_categories", json!({ "category_name": "Engineering" })).await;

    let listed: Vec<Value> = jobseeker.get(server.url("/job_categories")).send().await.unwrap().json().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["category_name"], "Engineering");
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let server = TestServer::session_mode().await;
    let admin = browser();
    signup(&admin, &server, "admin@example.com", "admin").await;

    let res = admin.get(server.url("/jobseekers/not-a-uuid")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn token_mode_issues_bearer_tokens() {
    let config = AppConfig {
        auth_mode: AuthMode::Token,
        jwt_secret: "test-secret".to_string(),
        ..AppConfig::default()
    };
    let server = TestServer::spawn(config).await;
    let client = reqwest::Client::new();

    let body = signup(&client, &server, "seeker@example.com", "jobseeker").await;
    let token = body["token"].as_str().expect("token mode returns a token").to_string();

    let res = client.get(server.url("/check_session")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(server.url("/check_session")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // A token signed with some other key is not accepted.
    let now = Utc::now();
    let forged = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({
            "sub": body["user"]["id"],
            "role": "admin",
            "issued_at": now,
            "expires_at": now + chrono::Duration::minutes(10),
        }),
        &EncodingKey::from_secret(b"not-the-secret"),
    )
    .unwrap();
    let res = client.get(server.url("/check_session")).bearer_auth(forged).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_logout_leaves_token_usable() {
    let config = AppConfig {
        auth_mode: AuthMode::Token,
        jwt_secret: "test-secret".to_string(),
        ..AppConfig::default()
    };
    let server = TestServer::spawn(config).await;
    let client = reqwest::Client::new();

    let body = signup(&client, &server, "seeker@example.com", "jobseeker").await;
    let token = body["token"].as_str().unwrap().to_string();

    let res = client.delete(server.url("/logout")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // Tokens are stateless; they stay valid until they expire.
    let res = client.get(server.url("/check_session")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn deleting_a_user_removes_profile_and_ends_sessions() {
    let server = TestServer::session_mode().await;

    let admin = browser();
    signup(&admin, &server, "admin@example.com", "admin").await;

    let jobseeker = browser();
    let account = signup(&jobseeker, &server, "seeker@example.com", "jobseeker").await;
    let profile = create_profile(&jobseeker, &server, "/jobseekers", json!({ "bio": "leaving" })).await;

    let user_path = format!("/users/{}", account["user"]["id"].as_str().unwrap());
    let res = admin.delete(server.url(&user_path)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = jobseeker.get(server.url("/check_session")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = admin.get(server.url(&user_path)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = admin.get(server.url(&format!("/jobseekers/{}", id_of(&profile)))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_cannot_link_an_unknown_upload() {
    let server = TestServer::session_mode().await;

    let jobseeker = browser();
    signup(&jobseeker, &server, "seeker@example.com", "jobseeker").await;
    let profile = create_profile(&jobseeker, &server, "/jobseekers", json!({})).await;
    let path = format!("/jobseekers/{}", id_of(&profile));

    let res = jobseeker
        .patch(server.url(&path))
        .json(&json!({ "fileupload_id": "0190d7a0-0000-7000-8000-000000000000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let upload = create_profile(
        &jobseeker,
        &server,
        "/fileuploads",
        json!({ "file_path": "/uploads/cv.pdf", "file_type": "pdf" }),
    )
    .await;
    let res = jobseeker
        .patch(server.url(&path))
        .json(&json!({ "fileupload_id": id_of(&upload) }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = jobseeker
        .delete(server.url(&format!("/fileuploads/{}", id_of(&upload))))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let profile: Value = jobseeker.get(server.url(&path)).send().await.unwrap().json().await.unwrap();
    assert!(profile["fileupload_id"].is_null());
}

/// Refuses every message, counting attempts.
#[derive(Default)]
struct FailingNotifier {
    attempts: AtomicUsize,
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _notification: &Notification) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(NotifyError("relay refused the message".to_string()))
    }
}

#[tokio::test]
async fn contact_request_survives_notification_failure() {
    let config = AppConfig::default();
    let notifier = Arc::new(FailingNotifier::default());
    let services = AppServices::new(&config, Arc::new(InMemoryEntityStore::new()), notifier.clone());
    let server = TestServer::spawn_with(services).await;

    let jobseeker = browser();
    signup(&jobseeker, &server, "seeker@example.com", "jobseeker").await;
    let profile = create_profile(&jobseeker, &server, "/jobseekers", json!({})).await;

    let employer = browser();
    signup(&employer, &server, "hr@example.com", "employer").await;
    create_profile(&employer, &server, "/employers", json!({ "company_name": "Acme" })).await;

    let request = create_profile(
        &employer,
        &server,
        "/contact_requests",
        json!({ "jobseeker_id": id_of(&profile), "message": "Let's talk" }),
    )
    .await;
    assert_eq!(request["status"], "pending");
    assert_eq!(notifier.attempts.load(Ordering::SeqCst), 1);

    let res = jobseeker
        .get(server.url(&format!("/contact_requests/{}", id_of(&request))))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
