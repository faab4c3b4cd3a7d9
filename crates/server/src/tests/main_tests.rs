use super::*;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use shared::{
    domain::{Gender, NewStudent, Student},
    error::ApiError,
};
use storage::InsertOutcome;
use tower::ServiceExt;

async fn test_app() -> (Router, Storage) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let app = build_router(Arc::new(AppState {
        api: ApiContext {
            storage: storage.clone(),
        },
    }));
    (app, storage)
}

fn post_student(body: String) -> Request<Body> {
    Request::post(STUDENTS_ROUTE)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .expect("request")
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _storage) = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn create_then_list_round_trips_through_routes() {
    let (app, _storage) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_student(
            serde_json::json!({
                "name": "Jamila",
                "email": "jamila@amigoscode.com",
                "gender": "FEMALE"
            })
            .to_string(),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Student = read_json(response).await;
    assert_eq!(created.name, "Jamila");

    let list = Request::get(STUDENTS_ROUTE)
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(list).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let students: Vec<Student> = read_json(response).await;
    assert_eq!(students, vec![created]);
}

#[tokio::test]
async fn taken_email_returns_structured_bad_request() {
    let (app, storage) = test_app().await;
    let seeded = storage
        .insert_student(&NewStudent {
            name: "Tom".to_string(),
            email: "tom@example.com".to_string(),
            gender: Gender::Male,
        })
        .await
        .expect("seed");
    assert!(matches!(seeded, InsertOutcome::Inserted(_)));

    let response = app
        .oneshot(post_student(
            serde_json::json!({
                "name": "Tommy",
                "email": "tom@example.com",
                "gender": "MALE"
            })
            .to_string(),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.status, 400);
    assert_eq!(err.error, "Bad Request");
    assert_eq!(err.message, "Email tom@example.com taken");
    assert_eq!(err.path.as_deref(), Some(STUDENTS_ROUTE));
}

#[tokio::test]
async fn malformed_json_returns_structured_bad_request() {
    let (app, _storage) = test_app().await;
    let response = app
        .oneshot(post_student(r#"{"name":"Tom","gender":"ROBOT"}"#.to_string()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.status, 400);
    assert!(!err.message.is_empty());
}

#[tokio::test]
async fn delete_removes_student_and_second_delete_is_not_found() {
    let (app, storage) = test_app().await;
    let InsertOutcome::Inserted(id) = storage
        .insert_student(&NewStudent {
            name: "Tom".to_string(),
            email: "tom@example.com".to_string(),
            gender: Gender::Male,
        })
        .await
        .expect("seed")
    else {
        panic!("fresh database rejected the seed email");
    };

    let delete_request = || {
        Request::delete(format!("{STUDENTS_ROUTE}/{}", id.0))
            .body(Body::empty())
            .expect("request")
    };

    let response = app.clone().oneshot(delete_request()).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(storage.list_students().await.expect("list").is_empty());

    let response = app.oneshot(delete_request()).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.message, format!("Student with id {} does not exists", id.0));
}

#[tokio::test]
async fn non_numeric_id_is_a_bad_request() {
    let (app, _storage) = test_app().await;
    let request = Request::delete(format!("{STUDENTS_ROUTE}/abc"))
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.error, "Bad Request");
}
