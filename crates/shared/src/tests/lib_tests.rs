use crate::{
    domain::{Gender, Student, StudentId},
    error::{ApiError, ErrorCode},
    protocol::student_route,
};

#[test]
fn gender_uses_uppercase_wire_names() {
    let json = serde_json::to_string(&Gender::Female).expect("json");
    assert_eq!(json, "\"FEMALE\"");
    let parsed: Gender = serde_json::from_str("\"OTHER\"").expect("gender");
    assert_eq!(parsed, Gender::Other);
}

#[test]
fn gender_parses_case_insensitively_from_text() {
    assert_eq!("male".parse::<Gender>().expect("gender"), Gender::Male);
    assert_eq!(" Female ".parse::<Gender>().expect("gender"), Gender::Female);
    assert!("robot".parse::<Gender>().is_err());
}

#[test]
fn student_id_serializes_as_plain_number() {
    let student = Student {
        id: StudentId(7),
        name: "Jamila".to_string(),
        email: "jamila@amigoscode.com".to_string(),
        gender: Gender::Female,
    };
    let value = serde_json::to_value(&student).expect("json");
    assert_eq!(value["id"], 7);
    assert_eq!(value["gender"], "FEMALE");
}

#[test]
fn api_error_tolerates_missing_optional_fields() {
    let parsed: ApiError =
        serde_json::from_str(r#"{"message":"boom","status":500,"error":"Internal"}"#)
            .expect("api error");
    assert_eq!(parsed.message, "boom");
    assert_eq!(parsed.status, 500);
    assert_eq!(parsed.error, "Internal");
    assert!(parsed.timestamp.is_none());
    assert!(parsed.path.is_none());
}

#[test]
fn error_code_sets_status_and_reason() {
    let err = ApiError::new(ErrorCode::NotFound, "missing");
    assert_eq!(err.status, 404);
    assert_eq!(err.error, "Not Found");
    assert_eq!(err.message, "missing");
}

#[test]
fn student_route_appends_id() {
    assert_eq!(student_route(StudentId(42)), "/api/v1/students/42");
}
