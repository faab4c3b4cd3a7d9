//! HTTP handlers for the student resource.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use shared::{
    domain::{NewStudent, Student, StudentId},
    error::{ApiError, ErrorCode},
    protocol::{student_route, HEALTHZ_ROUTE, STUDENTS_ROUTE},
};
use tracing::{debug, warn};

use crate::app_state::AppState;

pub(crate) type HttpError = (StatusCode, Json<ApiError>);

pub(crate) async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, HttpError> {
    state.api.storage.health_check().await.map_err(|e| {
        into_http_error(
            ApiError {
                status: StatusCode::SERVICE_UNAVAILABLE.as_u16(),
                error: "Service Unavailable".to_string(),
                ..ApiError::new(ErrorCode::Internal, e.to_string())
            },
            HEALTHZ_ROUTE,
        )
    })?;
    Ok("ok")
}

pub(crate) async fn http_list_students(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Student>>, HttpError> {
    let students = server_api::list_students(&state.api)
        .await
        .map_err(|e| into_http_error(e, STUDENTS_ROUTE))?;
    debug!(count = students.len(), "listed students");
    Ok(Json(students))
}

pub(crate) async fn http_add_student(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewStudent>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), HttpError> {
    let Json(student) = body.map_err(|rejection| {
        into_http_error(
            ApiError::new(ErrorCode::BadRequest, rejection.body_text()),
            STUDENTS_ROUTE,
        )
    })?;

    let created = server_api::add_student(&state.api, student)
        .await
        .map_err(|e| into_http_error(e, STUDENTS_ROUTE))?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(crate) async fn http_delete_student(
    State(state): State<Arc<AppState>>,
    student_id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, HttpError> {
    let Path(student_id) = student_id.map_err(|rejection| {
        into_http_error(
            ApiError::new(ErrorCode::BadRequest, rejection.body_text()),
            STUDENTS_ROUTE,
        )
    })?;
    let student_id = StudentId(student_id);

    server_api::delete_student(&state.api, student_id)
        .await
        .map_err(|e| into_http_error(e, &student_route(student_id)))?;
    Ok(StatusCode::OK)
}

pub(crate) fn into_http_error(err: ApiError, path: &str) -> HttpError {
    let status = StatusCode::from_u16(err.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        warn!(%status, message = %err.message, path, "student request failed");
    } else {
        debug!(%status, message = %err.message, path, "student request rejected");
    }
    (status, Json(err.with_path(path)))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
