mod common;

use axum::{
    body::{Body, Bytes},
    extract::{Multipart, Path as UrlPath, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use common::{client_for, config_for, serve, Recorder};
use pretty_assertions::assert_eq;
use quizcraft::dto::auth_dto::{LoginPayload, SignupPayload};
use quizcraft::dto::generation_dto::GenerationSource;
use quizcraft::dto::order_dto::ValidateOrderPayload;
use quizcraft::error::Error;
use quizcraft::models::order::Plan;
use quizcraft::models::quiz::Difficulty;
use quizcraft::models::session::SessionStatus;
use quizcraft::store::SessionStore;
use quizcraft::wizard::{CreationMode, QuizWizard};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::str::FromStr;

fn user() -> Value {
    json!({"_id": "u-1", "name": "Ana", "email": "ana@example.com"})
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == "correct-horse" {
        (StatusCode::OK, Json(json!({"token": "tok-ana", "user": user()})))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid email or password"})),
        )
    }
}

async fn me(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer tok-ana") => (StatusCode::OK, Json(json!({"user": user()}))),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({"message": "No token"}))),
    }
}

fn auth_api(rec: Recorder) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route(
            "/api/auth/signup",
            post(|State(rec): State<Recorder>, headers: HeaderMap, Json(body): Json<Value>| async move {
                rec.record("/api/auth/signup", &headers, body);
                Json(json!({"token": "tok-new", "user": user()}))
            }),
        )
        .route(
            "/api/auth/logout",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route("/api/auth/me", get(me))
        .with_state(rec)
}

#[tokio::test]
async fn login_sets_the_token_used_by_later_calls() {
    let base = serve(auth_api(Recorder::default())).await;
    let client = client_for(config_for(&base));

    let err = client.auth_service.me().await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));

    let session = client
        .auth_service
        .login(&LoginPayload {
            email: "ana@example.com".into(),
            password: "correct-horse".into(),
        })
        .await
        .unwrap();
    assert_eq!(session.user.id, "u-1");
    assert_eq!(client.api.token().as_deref(), Some("tok-ana"));

    let me = client.auth_service.me().await.unwrap();
    assert_eq!(me.email, "ana@example.com");

    // The local token goes away even when the server fails to log out.
    assert!(client.auth_service.logout().await.is_err());
    assert!(client.api.token().is_none());
}

#[tokio::test]
async fn wrong_password_surfaces_server_message() {
    let base = serve(auth_api(Recorder::default())).await;
    let client = client_for(config_for(&base));

    let err = client
        .auth_service
        .login(&LoginPayload {
            email: "ana@example.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(ref m) if m == "Invalid email or password"));
    assert!(client.api.token().is_none());
}

#[tokio::test]
async fn invalid_signup_is_rejected_locally() {
    let rec = Recorder::default();
    let base = serve(auth_api(rec.clone())).await;
    let client = client_for(config_for(&base));

    let err = client
        .auth_service
        .signup(&SignupPayload {
            name: "Ana".into(),
            email: "not-an-email".into(),
            password: "short".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(rec.len(), 0);

    tokio_test::assert_ok!(
        client
            .auth_service
            .signup(&SignupPayload {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                password: "long-enough".into(),
            })
            .await
    );
    assert_eq!(rec.all()[0].body["email"], "ana@example.com");
}

#[tokio::test]
async fn session_survives_between_runs() {
    let base = serve(auth_api(Recorder::default())).await;
    let client = client_for(config_for(&base));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let session = client
        .auth_service
        .login(&LoginPayload {
            email: "ana@example.com".into(),
            password: "correct-horse".into(),
        })
        .await
        .unwrap();
    let mut store = SessionStore::load(&path).await.unwrap();
    store.save(session).await.unwrap();

    // The opaque test token has no readable expiry, so it stays active.
    let reloaded = SessionStore::load(&path).await.unwrap();
    assert_eq!(reloaded.active_token(), Some("tok-ana"));

    let next_run = client_for(config_for(&base));
    next_run.set_token(reloaded.active_token().map(str::to_string));
    assert_eq!(next_run.auth_service.me().await.unwrap().name, "Ana");
}

fn notification(id: &str, read: bool) -> Value {
    json!({"_id": id, "title": "Quiz finished", "message": "Capitals ended", "read": read, "createdAt": "2026-01-05T10:00:00Z"})
}

fn notification_api(rec: Recorder) -> Router {
    Router::new()
        .route(
            "/api/notifications",
            get(|| async {
                Json(json!({"notifications": [notification("n-1", false), notification("n-2", true)]}))
            }),
        )
        .route(
            "/api/notifications/read-all",
            patch(|State(rec): State<Recorder>, headers: HeaderMap| async move {
                rec.record("/api/notifications/read-all", &headers, Value::Null);
                StatusCode::NO_CONTENT
            }),
        )
        .route(
            "/api/notifications/:id/read",
            patch(
                |State(rec): State<Recorder>, headers: HeaderMap, UrlPath(id): UrlPath<String>| async move {
                    rec.record(&format!("/api/notifications/{id}/read"), &headers, Value::Null);
                    Json(json!({"success": true}))
                },
            ),
        )
        .route(
            "/api/notifications/push-token",
            post(|State(rec): State<Recorder>, headers: HeaderMap, Json(body): Json<Value>| async move {
                rec.record("/api/notifications/push-token", &headers, body);
                StatusCode::CREATED
            }),
        )
        .route(
            "/api/notifications/:id",
            delete(|UrlPath(id): UrlPath<String>| async move {
                if id == "n-1" {
                    StatusCode::NO_CONTENT
                } else {
                    StatusCode::NOT_FOUND
                }
            }),
        )
        .with_state(rec)
}

#[tokio::test]
async fn notifications_inbox_round_trip() {
    let rec = Recorder::default();
    let base = serve(notification_api(rec.clone())).await;
    let client = client_for(config_for(&base));
    client.set_token(Some("tok-ana".into()));
    let inbox = &client.notification_service;

    let items = inbox.list().await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(inbox.unread_count().await.unwrap(), 1);

    inbox.mark_read("n-1").await.unwrap();
    inbox.mark_all_read().await.unwrap();
    inbox.delete("n-1").await.unwrap();
    let err = inbox.delete("n-9").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(ref m) if m == "Not Found"));

    inbox.register_push_token("fcm-abc", "android").await.unwrap();

    let sent = rec.all();
    let paths: Vec<&str> = sent.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/api/notifications/n-1/read",
            "/api/notifications/read-all",
            "/api/notifications/push-token"
        ]
    );
    assert_eq!(sent[2].body, json!({"token": "fcm-abc", "platform": "android"}));
    assert!(rec.all().iter().all(|r| r.auth.as_deref() == Some("Bearer tok-ana")));
}

fn generated() -> Value {
    json!({
        "title": "Cell biology",
        "subject": "Biology",
        "questions": [
            {"type": "true-false", "question": "Cells divide by mitosis", "correctAnswer": true},
            {"type": "short-answer", "question": "Powerhouse of the cell?", "correctAnswer": "Mitochondria"}
        ]
    })
}

async fn generate_from_pdf(State(rec): State<Recorder>, mut form: Multipart) -> Json<Value> {
    let mut fields = serde_json::Map::new();
    while let Some(field) = form.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let value = if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let mime = field.content_type().unwrap_or_default().to_string();
            let len = field.bytes().await.unwrap().len();
            json!({"fileName": file_name, "contentType": mime, "len": len})
        } else {
            json!(field.text().await.unwrap())
        };
        fields.insert(name, value);
    }
    rec.record("/api/generate/pdf", &HeaderMap::new(), Value::Object(fields));
    Json(generated())
}

fn generation_api(rec: Recorder) -> Router {
    Router::new()
        .route(
            "/api/generate/text",
            post(|State(rec): State<Recorder>, headers: HeaderMap, Json(body): Json<Value>| async move {
                rec.record("/api/generate/text", &headers, body);
                Json(generated())
            }),
        )
        .route("/api/generate/pdf", post(generate_from_pdf))
        .with_state(rec)
}

#[tokio::test]
async fn generated_questions_fill_a_blank_draft() {
    let rec = Recorder::default();
    let base = serve(generation_api(rec.clone())).await;
    let client = client_for(config_for(&base));

    let source = GenerationSource::Text("Mitosis is the process by which a cell divides.".into());
    let response = client
        .generation_service
        .generate(&source, 2, Difficulty::Hard)
        .await
        .unwrap();

    let body = &rec.all()[0].body;
    assert_eq!(body["questionCount"], 2);
    assert_eq!(body["difficulty"], "hard");

    let mut wizard = QuizWizard::new(CreationMode::Ai(source));
    wizard.draft_mut().title = "My own title".into();
    wizard.apply_generated(response);
    assert_eq!(wizard.draft().title, "My own title");
    assert_eq!(wizard.draft().subject, "Biology");
    assert_eq!(wizard.draft().questions.len(), 2);
    wizard.ensure_ready().unwrap();
}

#[tokio::test]
async fn short_text_is_not_sent_for_generation() {
    let rec = Recorder::default();
    let base = serve(generation_api(rec.clone())).await;
    let client = client_for(config_for(&base));

    let err = client
        .generation_service
        .generate(&GenerationSource::Text("too short".into()), 5, Difficulty::Easy)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(rec.len(), 0);
}

#[tokio::test]
async fn pdf_is_uploaded_as_multipart() {
    let rec = Recorder::default();
    let base = serve(generation_api(rec.clone())).await;
    let client = client_for(config_for(&base));

    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("notes.pdf");
    tokio::fs::write(&pdf, b"%PDF-1.4 fake").await.unwrap();

    let response = client
        .generation_service
        .generate(&GenerationSource::Pdf(pdf), 3, Difficulty::Medium)
        .await
        .unwrap();
    assert_eq!(response.questions.len(), 2);

    let body = &rec.all()[0].body;
    assert_eq!(body["questionCount"], "3");
    assert_eq!(body["difficulty"], "medium");
    assert_eq!(
        body["file"],
        json!({"fileName": "notes.pdf", "contentType": "application/pdf", "len": 13})
    );

    let png = dir.path().join("scan.png");
    tokio::fs::write(&png, b"png").await.unwrap();
    let err = client
        .generation_service
        .generate(&GenerationSource::Pdf(png), 3, Difficulty::Medium)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
    assert_eq!(rec.len(), 1);
}

fn order_api(rec: Recorder) -> Router {
    Router::new()
        .route(
            "/api/orders",
            post(|State(rec): State<Recorder>, headers: HeaderMap, Json(body): Json<Value>| async move {
                let receipt = body["receipt"].clone();
                rec.record("/api/orders", &headers, body);
                Json(json!({"id": "order_1", "amount": 499.5, "currency": "INR", "status": "created", "receipt": receipt}))
            }),
        )
        .route(
            "/api/orders/validate",
            post(|Json(body): Json<Value>| async move {
                if body["signature"] == "good" {
                    Json(json!({"success": true, "message": "Payment verified"}))
                } else {
                    Json(json!({"success": false, "message": "Signature mismatch"}))
                }
            }),
        )
        .with_state(rec)
}

#[tokio::test]
async fn orders_are_created_and_validated() {
    let rec = Recorder::default();
    let base = serve(order_api(rec.clone())).await;
    let client = client_for(config_for(&base));

    let order = client.order_service.create_order(Plan::Pro).await.unwrap();
    assert_eq!(order.amount, Decimal::from_str("499.5").unwrap());
    let sent = &rec.all()[0].body;
    assert_eq!(sent["plan"], "pro");
    assert!(sent["receipt"].as_str().unwrap().starts_with("rcpt_"));

    let payload = |signature: &str| ValidateOrderPayload {
        order_id: order.id.clone(),
        payment_id: "pay_1".into(),
        signature: signature.into(),
    };
    let ok = client.order_service.validate_payment(&payload("good")).await.unwrap();
    assert!(ok.success);

    let err = client
        .order_service
        .validate_payment(&payload("forged"))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Signature mismatch");
}

#[tokio::test]
async fn image_search_uses_configured_provider() {
    let app = Router::new().route(
        "/pixabay",
        get(|Query(q): Query<HashMap<String, String>>| async move {
            if q.get("key").map(String::as_str) != Some("pix-key") {
                return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad key"})));
            }
            (
                StatusCode::OK,
                Json(json!({"hits": [
                    {"webformatURL": "https://img/1.jpg", "previewURL": "https://img/1s.jpg", "tags": "cat"},
                    {"webformatURL": "https://img/2.jpg", "previewURL": "https://img/2s.jpg", "tags": "dog"},
                    {"webformatURL": "https://img/3.jpg", "previewURL": "https://img/3s.jpg"}
                ]})),
            )
        }),
    );
    let base = serve(app).await;

    let mut config = config_for(&base);
    config.pixabay_base_url = format!("{base}/pixabay");
    config.pixabay_api_key = Some("pix-key".into());
    let client = client_for(config);

    let hits = client.media_service.search_images("pets", 2).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].url, "https://img/1.jpg");
    assert_eq!(hits[1].title, "dog");
    assert!(client.media_service.search_images("   ", 5).await.unwrap().is_empty());

    let err = client.media_service.search_gifs("pets", 5).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn server_errors_keep_their_status() {
    let app = Router::new()
        .route(
            "/api/dashboard",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        )
        .route(
            "/api/users/activity",
            get(|| async { (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"message": "Bad range"}))) }),
        );
    let base = serve(app).await;
    let client = client_for(config_for(&base));

    let err = client.dashboard_service.load().await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 502, ref message } if message == "upstream down"));

    let err = client.user_service.activity().await.unwrap_err();
    assert!(matches!(err, Error::BadRequest(ref m) if m == "Bad range"));
}

fn cut_off_body() -> Response {
    let chunks = futures_util::stream::iter(vec![
        Ok(Bytes::from_static(b"{\"hits\": [")),
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "cut off")),
    ]);
    (StatusCode::OK, Body::from_stream(chunks)).into_response()
}

#[tokio::test]
async fn broken_success_body_is_a_transport_error() {
    let app = Router::new()
        .route("/api/dashboard", get(|| async { cut_off_body() }))
        .route("/pixabay", get(|| async { cut_off_body() }));
    let base = serve(app).await;

    let mut config = config_for(&base);
    config.pixabay_base_url = format!("{base}/pixabay");
    config.pixabay_api_key = Some("pix-key".into());
    let client = client_for(config);

    let err = client.dashboard_service.load().await.unwrap_err();
    assert!(matches!(err, Error::Reqwest(_)), "got {err:?}");

    let err = client.media_service.search_images("pets", 2).await.unwrap_err();
    assert!(!matches!(err, Error::Json(_)), "got {err:?}");
}

#[tokio::test]
async fn session_lookup_and_rest_join() {
    let app = Router::new()
        .route(
            "/api/quiz-sessions/join",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"_id": "p-7", "name": body["name"], "joinedAt": "2026-01-05T10:00:00Z"}))
            }),
        )
        .route(
            "/api/quiz-sessions/:code",
            get(|UrlPath(code): UrlPath<String>| async move {
                Json(json!({"code": code, "status": "in-progress", "participants": [{"id": "p-7", "name": "Ana"}]}))
            }),
        );
    let base = serve(app).await;
    let client = client_for(config_for(&base));

    let participant = client.session_service.join("QZ42", "Ana").await.unwrap();
    assert_eq!(participant.id, "p-7");
    assert_eq!(participant.name, "Ana");

    let view = client.session_service.get_session("QZ42").await.unwrap();
    assert_eq!(view.status, SessionStatus::InProgress);
    assert_eq!(view.participants.len(), 1);
}
