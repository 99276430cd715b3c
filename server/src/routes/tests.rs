use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::TimeDelta;
use mileage_tracker_data_management::DataManager;
use mileage_tracker_lib::{DistanceTable, ReimbursementRate};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::create_router;
use crate::{
    auth::{password::Passwords, token::TokenSigner},
    server_state::ServerState,
};

struct TestApp {
    router: Router,
    _dir: tempfile::TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let data_manager = DataManager::start(&dir.path().join("mileage.db"), DistanceTable::bundled().unwrap(), ReimbursementRate::default())
            .await
            .unwrap();

        let server_state = Arc::new(ServerState {
            data_manager,
            passwords: Passwords::new(4),
            tokens: TokenSigner::new(b"test-secret", TimeDelta::days(7)).unwrap(),
        });

        Self {
            router: create_router(server_state),
            _dir: dir,
        }
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Registers and logs in, returning the bearer token.
    async fn login(&self, email: &str) -> String {
        let credentials = json!({ "email": email, "password": "pa55word" });

        let response = self.send(Method::POST, "/register", None, Some(credentials.clone())).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = self.send(Method::POST, "/login", None, Some(credentials)).await;
        assert_eq!(response.status(), StatusCode::OK);

        json_body(response).await["token"].as_str().unwrap().to_string()
    }

    async fn add_trip(&self, token: &str, from: &str, to: &str) -> Response {
        self.send(Method::POST, "/trips", Some(token), Some(json!({ "from_school": from, "to_school": to }))).await
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health() {
    let app = TestApp::new().await;

    let response = app.send(Method::GET, "/", None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "message": "Mileage Tracker API is running" }));
}

#[tokio::test]
async fn register_validation() {
    let app = TestApp::new().await;

    let response = app.send(Method::POST, "/register", None, Some(json!({ "email": "a@school.org" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "Email and password required.");

    app.login("a@school.org").await;

    let response = app
        .send(Method::POST, "/register", None, Some(json!({ "email": "A@school.org", "password": "x" })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "Email already registered.");
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = TestApp::new().await;
    app.login("a@school.org").await;

    for body in [
        json!({ "email": "a@school.org", "password": "wrong" }),
        json!({ "email": "nobody@school.org", "password": "pa55word" }),
    ] {
        let response = app.send(Method::POST, "/login", None, Some(body)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["message"], "Invalid credentials.");
    }
}

#[tokio::test]
async fn trips_require_a_valid_token() {
    let app = TestApp::new().await;

    let response = app.send(Method::GET, "/trips", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["message"], "No token provided.");

    let response = app.send(Method::GET, "/trips", Some("not-a-token"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["message"], "Invalid or expired token.");
}

#[tokio::test]
async fn locations_and_distance() {
    let app = TestApp::new().await;

    let locations = json_body(app.send(Method::GET, "/locations", None, None).await).await;
    assert_eq!(locations["origins"][0], "Central Office");
    assert!(!locations["origins"].as_array().unwrap().contains(&json!("Adams Elementary")));
    assert!(!locations["destinations"].as_array().unwrap().contains(&json!("Central Office")));

    let response = app
        .send(Method::GET, "/distance?from=Jefferson%20High%20School&to=Lincoln%20Elementary", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["miles"], 12.0);

    let response = app
        .send(Method::GET, "/distance?from=Roosevelt%20Elementary&to=Adams%20Elementary", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_list_and_summarize_trips() {
    let app = TestApp::new().await;
    let token = app.login("a@school.org").await;

    let response = app.add_trip(&token, "Lincoln Elementary", "Jefferson High School").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let trip = json_body(response).await;
    assert_eq!(trip["from_school"], "Lincoln Elementary");
    assert_eq!(trip["to_school"], "Jefferson High School");
    assert_eq!(trip["miles"], 12.0);

    // Client-supplied miles are ignored.
    let response = app
        .send(
            Method::POST,
            "/trips",
            Some(&token),
            Some(json!({ "from_school": "Adams Elementary", "to_school": "Lincoln Elementary", "miles": 500 })),
        )
        .await;
    assert_eq!(json_body(response).await["miles"], 8.5);
    app.add_trip(&token, "Washington Middle School", "Jefferson High School").await;

    let trips = json_body(app.send(Method::GET, "/trips", Some(&token), None).await).await;
    assert_eq!(trips["trips"].as_array().unwrap().len(), 3);
    assert_eq!(trips["trips"][0]["id"], trip["id"]);
    assert_eq!(trips["total_miles"], 23.5);
    assert_eq!(trips["total_reimbursement"], 16.45);
    assert_eq!(trips["rate_per_mile"], 0.7);

    let summary = json_body(app.send(Method::GET, "/summary", Some(&token), None).await).await;
    assert_eq!(summary["trip_count"], 3);
    assert_eq!(summary["total_reimbursement"], 16.45);
}

#[tokio::test]
async fn invalid_trips_are_rejected() {
    let app = TestApp::new().await;
    let token = app.login("a@school.org").await;

    let cases = [
        (json!({ "from_school": "Lincoln Elementary" }), "Please select both schools."),
        (
            json!({ "from_school": "Lincoln Elementary", "to_school": "Lincoln Elementary" }),
            "You cannot select the same school for both (Lincoln Elementary).",
        ),
        (
            json!({ "from_school": "Roosevelt Elementary", "to_school": "Adams Elementary" }),
            "No mileage data found for the route Roosevelt Elementary -> Adams Elementary.",
        ),
    ];

    for (body, message) in cases {
        let response = app.send(Method::POST, "/trips", Some(&token), Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], message);
    }

    let trips = json_body(app.send(Method::GET, "/trips", Some(&token), None).await).await;
    assert_eq!(trips["trips"], json!([]));
    assert_eq!(trips["total_miles"], 0.0);
}

#[tokio::test]
async fn ledgers_are_private() {
    let app = TestApp::new().await;
    let alice = app.login("alice@school.org").await;
    let bob = app.login("bob@school.org").await;

    let trip = json_body(app.add_trip(&alice, "Central Office", "Lincoln Elementary").await).await;
    let trip_id = trip["id"].as_i64().unwrap();

    let trips = json_body(app.send(Method::GET, "/trips", Some(&bob), None).await).await;
    assert_eq!(trips["trips"], json!([]));

    let response = app.send(Method::DELETE, &format!("/trips/{trip_id}"), Some(&bob), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.send(Method::DELETE, &format!("/trips/{trip_id}"), Some(&alice), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn clearing_needs_confirmation() {
    let app = TestApp::new().await;
    let token = app.login("a@school.org").await;
    app.add_trip(&token, "Central Office", "Lincoln Elementary").await;
    app.add_trip(&token, "Central Office", "Adams Elementary").await;

    let response = app.send(Method::DELETE, "/trips", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.send(Method::DELETE, "/trips?confirm=true", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "removed": 2 }));

    let response = app.send(Method::GET, "/export?format=csv", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "No trips to export.");
}

#[tokio::test]
async fn export_downloads() {
    let app = TestApp::new().await;
    let token = app.login("a@school.org").await;
    app.add_trip(&token, "Lincoln Elementary", "Jefferson High School").await;
    app.add_trip(&token, "Adams Elementary", "Lincoln Elementary").await;

    let response = app.send(Method::GET, "/export?format=csv", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=mileage_report_"));
    assert!(disposition.ends_with(".csv"));
    let csv = text_body(response).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "Date,From,To,Miles");
    assert!(lines[1].ends_with(",Lincoln Elementary,Jefferson High School,12"));
    assert_eq!(lines[3], ",,,");
    assert_eq!(lines[4], "Total Miles,,,20.5");
    assert_eq!(lines[5], "Total Reimbursement,,,14.35");

    let response = app.send(Method::GET, "/export", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(response.headers()[header::CONTENT_DISPOSITION], "attachment; filename=MileageClaim.xlsx");
    assert!(to_bytes(response.into_body(), usize::MAX).await.unwrap().starts_with(b"PK"));

    let response = app.send(Method::GET, "/export?format=pdf", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
