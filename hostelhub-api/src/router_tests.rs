use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use hostelhub_shared::types::auth::{Claims, Role};

use crate::config::AppConfig;
use crate::services::auth_service::{self, AccountInput};
use crate::store::MemoryStore;
use crate::{build_router, AppState};

const SECRET: &str = "router-test-secret";
const BOUNDARY: &str = "hostelhub-test-boundary";

struct TestApp {
    router: Router,
    state: Arc<AppState>,
}

impl TestApp {
    fn new() -> Self {
        let config = AppConfig {
            database_url: "memory://".into(),
            jwt_secret: SECRET.into(),
            public_dir: std::env::temp_dir().join(format!("hostelhub-test-{}", Uuid::new_v4())),
            max_upload_bytes: 1024,
            ..AppConfig::default()
        };
        let state = Arc::new(AppState::new(config, Arc::new(MemoryStore::new()), None));
        Self { router: build_router(state.clone()), state }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn multipart(&self, uri: &str, token: &str, body: Vec<u8>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::HOST, "hostel.test")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    fn seed_warden(&self, email: &str, password: &str) -> Uuid {
        auth_service::create_staff_account(self.state.store.as_ref(), account(email, "Wen", password), "WARDEN")
            .unwrap()
            .id
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .json(Method::POST, "/api/auth/login", None, json!({ "email": email, "password": password }))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Registers a student through the API and returns `(userId, studentProfileId)`.
    async fn enrol(&self, token: &str, email: &str, first_name: &str, room: &str) -> (String, String) {
        let (status, body) = self
            .json(Method::POST, "/api/auth/register/student", Some(token), student_payload(email, first_name, room))
            .await;
        assert_eq!(status, StatusCode::CREATED, "enrol failed: {body}");
        let data = &body["data"];
        (
            data["id"].as_str().unwrap().to_string(),
            data["studentProfile"]["id"].as_str().unwrap().to_string(),
        )
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.state.config.public_dir);
    }
}

fn account(email: &str, first_name: &str, password: &str) -> AccountInput {
    AccountInput {
        first_name: first_name.into(),
        last_name: "Tester".into(),
        email: email.into(),
        password: password.into(),
    }
}

fn student_payload(email: &str, first_name: &str, room: &str) -> Value {
    json!({
        "firstName": first_name,
        "lastName": "Student",
        "email": email,
        "password": "student-pass",
        "rollNumber": format!("R-{first_name}"),
        "roomNumber": room,
        "department": "CSE",
        "school": "Engineering",
        "studentContactNumber": "9000000000",
        "guardianName": "Guardian",
        "guardianContact": "9111111111",
        "courseStartDate": "2022-08-01",
        "expectedCourseEndDate": "2026-05-31"
    })
}

fn multipart_body(fields: &[(&str, &str)], photo: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = photo {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"profilePhoto\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

const STAFF_FORM: &[(&str, &str)] = &[
    ("staffContactNumber", "8000000000"),
    ("department", "Hostel Office"),
    ("jobTitle", "Chief Warden"),
    ("officeLocation", "Block A"),
];

#[tokio::test]
async fn warden_login_promote_and_profile_flow() {
    let app = TestApp::new();
    app.seed_warden("warden@x.edu", "correct");

    let (status, body) = app
        .json(Method::POST, "/api/auth/login", None, json!({ "email": "warden@x.edu", "password": "correct" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["role"], "WARDEN");
    assert!(body["data"]["user"].get("passwordHash").is_none());
    let warden = body["data"]["token"].as_str().unwrap().to_string();

    let (student_id, _) = app.enrol(&warden, "u1@x.edu", "Uma", "B-204").await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/users/promote",
            Some(&warden),
            json!({ "studentUserId": student_id, "newRole": "HOSTEL_ADMIN", "adminSubRole": "PREFECT" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["user"]["role"], "HOSTEL_ADMIN");

    let student = app.login("u1@x.edu", "student-pass").await;
    let (status, body) = app.get("/api/student/profile", Some(&student)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["adminSubRole"], "PREFECT");
    assert!(body["data"]["adminRoleEndedAt"].is_null());
    assert!(body["data"]["adminRoleAssignedAt"].is_string());

    let (status, body) = app
        .json(Method::POST, "/api/users/demote", Some(&warden), json!({ "studentUserId": student_id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["role"], "STUDENT");
}

#[tokio::test]
async fn access_gate_states() {
    let app = TestApp::new();
    app.seed_warden("warden@x.edu", "correct");
    let warden = app.login("warden@x.edu", "correct").await;
    app.enrol(&warden, "s@x.edu", "Sam", "A-1").await;
    let student = app.login("s@x.edu", "student-pass").await;

    let (status, body) = app.get("/api/users/students", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/api/users/students", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let expired = encode(
        &Header::default(),
        &Claims::new(Uuid::new_v4(), Role::Warden, -120),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    let (status, body) = app.get("/api/users/students", Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "E1003");

    let (status, _) = app.get("/api/users/students", Some(&student)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get("/api/staff/profile", Some(&student)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/users/students", Some(&warden)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_validation_and_deactivation() {
    let app = TestApp::new();
    app.seed_warden("warden@x.edu", "correct");
    let warden = app.login("warden@x.edu", "correct").await;
    let (student_id, _) = app.enrol(&warden, "s@x.edu", "Sam", "A-1").await;

    let (status, _) = app.json(Method::POST, "/api/auth/login", None, json!({ "email": "s@x.edu" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .json(Method::POST, "/api/auth/login", None, json!({ "email": "s@x.edu", "password": "nope" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "E1001");

    let (status, _) = app
        .json(Method::PATCH, &format!("/api/users/{student_id}/status"), Some(&warden), json!({ "isActive": false }))
        .await;
    assert_eq!(status, StatusCode::OK);

    for password in ["student-pass", "nope"] {
        let (status, body) = app
            .json(Method::POST, "/api/auth/login", None, json!({ "email": "s@x.edu", "password": password }))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "E1005");
    }
}

#[tokio::test]
async fn duplicate_email_conflicts_and_keeps_first_record() {
    let app = TestApp::new();
    app.seed_warden("warden@x.edu", "correct");
    let warden = app.login("warden@x.edu", "correct").await;

    let payload = json!({ "firstName": "Ada", "lastName": "One", "email": "dup@x.edu", "password": "pw-one" });
    let (status, body) = app.json(Method::POST, "/api/users/create-student", Some(&warden), payload).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "STUDENT");

    let payload = json!({ "firstName": "Bob", "lastName": "Two", "email": "DUP@x.edu", "password": "pw-two" });
    let (status, body) = app.json(Method::POST, "/api/users/create-student", Some(&warden), payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "E1002");

    app.login("dup@x.edu", "pw-one").await;

    let payload = json!({ "firstName": "Eve", "lastName": "Bad", "email": "not-an-email", "password": "pw" });
    let (status, body) = app.json(Method::POST, "/api/users/create-student", Some(&warden), payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E0002");

    let payload = json!({
        "firstName": "Cy", "lastName": "Three", "email": "cy@x.edu", "password": "pw", "role": "HOSTEL_ADMIN"
    });
    let (status, body) = app.json(Method::POST, "/api/users/create-staff", Some(&warden), payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E1006");

    let payload = json!({
        "firstName": "Cara", "lastName": "Four", "email": "cara@x.edu", "password": "pw", "role": "caretaker"
    });
    let (status, body) = app.json(Method::POST, "/api/users/create-staff", Some(&warden), payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E1006");
}

#[tokio::test]
async fn student_search_filters_by_room() {
    let app = TestApp::new();
    app.seed_warden("warden@x.edu", "correct");
    let warden = app.login("warden@x.edu", "correct").await;
    app.enrol(&warden, "a@x.edu", "Asha", "B-204").await;
    app.enrol(&warden, "b@x.edu", "Bilal", "C-310").await;
    app.enrol(&warden, "c@x.edu", "Chen", "b-204").await;

    let (status, body) = app.get("/api/users/students?search=", Some(&warden)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (_, body) = app.get("/api/users/students?search=B-204", Some(&warden)).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["firstName"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Asha", "Chen"]);
    assert_eq!(body["data"][0]["studentProfile"]["disciplinaryActionCount"], 0);
}

#[tokio::test]
async fn promotion_with_foreign_sub_role_is_rejected() {
    let app = TestApp::new();
    app.seed_warden("warden@x.edu", "correct");
    let warden = app.login("warden@x.edu", "correct").await;
    let (student_id, _) = app.enrol(&warden, "s@x.edu", "Sam", "A-1").await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/users/promote",
            Some(&warden),
            json!({ "studentUserId": student_id, "newRole": "MESS_ADMIN", "adminSubRole": "PREFECT" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E3001");

    for (role, sub_role) in [("hostel_admin", "prefect"), ("HOSTEL_ADMIN", "prefect"), ("Hostel_Admin", "PREFECT")] {
        let (status, body) = app
            .json(
                Method::POST,
                "/api/users/promote",
                Some(&warden),
                json!({ "studentUserId": student_id, "newRole": role, "adminSubRole": sub_role }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{role}/{sub_role}");
        assert_eq!(body["error"]["code"], "E3001");
    }

    let student = app.login("s@x.edu", "student-pass").await;
    let (_, body) = app.get("/api/student/profile", Some(&student)).await;
    assert!(body["data"]["adminSubRole"].is_null());
    assert!(body["data"]["adminRoleAssignedAt"].is_null());
}

#[tokio::test]
async fn non_image_upload_is_rejected_before_any_write() {
    let app = TestApp::new();
    app.seed_warden("warden@x.edu", "correct");
    let warden = app.login("warden@x.edu", "correct").await;

    let body = multipart_body(STAFF_FORM, Some(("notes.txt", "text/plain", b"not an image")));
    let (status, response) = app.multipart("/api/staff/profile", &warden, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], "E2004");

    let (status, _) = app.get("/api/staff/profile", Some(&warden)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!app.state.photos.dir().exists());
}

#[tokio::test]
async fn oversized_photo_is_rejected() {
    let app = TestApp::new();
    app.seed_warden("warden@x.edu", "correct");
    let warden = app.login("warden@x.edu", "correct").await;

    let big = vec![0u8; 2048];
    let body = multipart_body(STAFF_FORM, Some(("big.png", "image/png", &big)));
    let (status, response) = app.multipart("/api/staff/profile", &warden, body).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response["error"]["code"], "E0007");
}

#[tokio::test]
async fn staff_profile_upsert_with_photo_is_served() {
    let app = TestApp::new();
    app.seed_warden("warden@x.edu", "correct");
    let warden = app.login("warden@x.edu", "correct").await;

    let (status, body) = app.multipart("/api/staff/profile", &warden, multipart_body(&STAFF_FORM[..2], None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E2003");

    let png = b"\x89PNG\r\n\x1a\nfake";
    let body = multipart_body(STAFF_FORM, Some(("me.png", "image/png", png)));
    let (status, body) = app.multipart("/api/staff/profile", &warden, body).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let url = body["data"]["profilePhotoUrl"].as_str().unwrap().to_string();
    assert!(url.starts_with("http://hostel.test/public/uploads/profilePhoto-"));
    assert!(url.ends_with(".png"));

    let path = url.trim_start_matches("http://hostel.test");
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&served[..], &png[..]);

    let form = [("staffContactNumber", "8111111111"), ("department", "Hostel Office"), ("jobTitle", "Warden"), ("officeLocation", "Block B")];
    let (status, body) = app.multipart("/api/staff/profile", &warden, multipart_body(&form, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["staffContactNumber"], "8111111111");
    assert_eq!(body["data"]["profilePhotoUrl"], url.as_str());
}

#[tokio::test]
async fn blank_description_clears_the_stored_one() {
    let app = TestApp::new();
    app.seed_warden("warden@x.edu", "correct");
    let warden = app.login("warden@x.edu", "correct").await;

    let mut form = STAFF_FORM.to_vec();
    form.push(("description", "Night duty"));
    let (status, body) = app.multipart("/api/staff/profile", &warden, multipart_body(&form, None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["description"], "Night duty");

    let (status, body) = app.multipart("/api/staff/profile", &warden, multipart_body(STAFF_FORM, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "Night duty");

    form.pop();
    form.push(("description", ""));
    let (status, body) = app.multipart("/api/staff/profile", &warden, multipart_body(&form, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["description"].is_null(), "{body}");

    let (_, body) = app.get("/api/staff/profile", Some(&warden)).await;
    assert!(body["data"]["description"].is_null());
    assert_eq!(body["data"]["officeLocation"], "Block A");
}

#[tokio::test]
async fn disciplinary_ledger_lifecycle() {
    let app = TestApp::new();
    app.seed_warden("warden@x.edu", "correct");
    let warden = app.login("warden@x.edu", "correct").await;
    let (_, profile_id) = app.enrol(&warden, "s@x.edu", "Sam", "A-1").await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/staff/action",
            Some(&warden),
            json!({ "studentProfileId": profile_id, "actionType": "WARNING", "reason": "noise after curfew" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "ACTIVE");
    let action_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .json(Method::POST, "/api/staff/action", Some(&warden), json!({ "studentProfileId": profile_id }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .json(
            Method::POST,
            "/api/staff/action",
            Some(&warden),
            json!({ "studentProfileId": Uuid::new_v4(), "actionType": "FINE", "reason": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "E2002");

    let uri = format!("/api/staff/action/{action_id}");
    let (status, _) = app.json(Method::PATCH, &uri, Some(&warden), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.json(Method::PATCH, &uri, Some(&warden), json!({ "status": "APPEALED" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "APPEALED");
    assert_eq!(body["data"]["reason"], "noise after curfew");

    let missing = format!("/api/staff/action/{}", Uuid::new_v4());
    let (status, body) = app.json(Method::PATCH, &missing, Some(&warden), json!({ "status": "RESOLVED" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "E4001");

    let (status, body) = app.get(&format!("/api/staff/{profile_id}/details"), Some(&warden)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "s@x.edu");
    let actions = body["data"]["disciplinaryActions"].as_array().unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0]["issuedBy"]["firstName"], "Wen");

    let (status, body) = app.get(&format!("/api/staff/{profile_id}/actions"), Some(&warden)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn committee_is_public_and_tagged() {
    let app = TestApp::new();
    app.seed_warden("warden@x.edu", "correct");
    let warden = app.login("warden@x.edu", "correct").await;
    let (student_id, _) = app.enrol(&warden, "s@x.edu", "Sam", "A-1").await;
    app.enrol(&warden, "p@x.edu", "Pia", "A-2").await;
    app.json(
        Method::POST,
        "/api/users/promote",
        Some(&warden),
        json!({ "studentUserId": student_id, "newRole": "MESS_ADMIN", "adminSubRole": "MESS_MANAGER" }),
    )
    .await;

    let (status, body) = app.get("/public/committee", None).await;
    assert_eq!(status, StatusCode::OK);
    let members = body["data"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0]["kind"], "STAFF");
    assert_eq!(members[0]["role"], "WARDEN");
    assert_eq!(members[1]["kind"], "STUDENT_ADMIN");
    assert_eq!(members[1]["studentProfile"]["adminSubRole"], "MESS_MANAGER");
}

#[tokio::test]
async fn health_and_banner() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "hostelhub-api");

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/api").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
