use crate::domain::StudentId;

pub const HEALTHZ_ROUTE: &str = "/healthz";
pub const STUDENTS_ROUTE: &str = "/api/v1/students";

pub fn student_route(student_id: StudentId) -> String {
    format!("{STUDENTS_ROUTE}/{}", student_id.0)
}
