use email_address::EmailAddress;
use shared::{
    domain::{NewStudent, Student, StudentId},
    error::{ApiError, ErrorCode},
};
use storage::{InsertOutcome, Storage};
use tracing::info;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_students(ctx: &ApiContext) -> Result<Vec<Student>, ApiError> {
    ctx.storage.list_students().await.map_err(internal)
}

/// Validates and stores a new student. Emails are unique across the roster.
pub async fn add_student(ctx: &ApiContext, student: NewStudent) -> Result<Student, ApiError> {
    validate_new_student(&student)?;

    if ctx
        .storage
        .email_exists(&student.email)
        .await
        .map_err(internal)?
    {
        return Err(email_taken(&student.email));
    }

    // A concurrent insert can claim the email between the check and here.
    let student_id = match ctx
        .storage
        .insert_student(&student)
        .await
        .map_err(internal)?
    {
        InsertOutcome::Inserted(student_id) => student_id,
        InsertOutcome::EmailTaken => return Err(email_taken(&student.email)),
    };
    info!(student_id = student_id.0, "student added");

    Ok(Student {
        id: student_id,
        name: student.name,
        email: student.email,
        gender: student.gender,
    })
}

pub async fn delete_student(ctx: &ApiContext, student_id: StudentId) -> Result<(), ApiError> {
    let exists = ctx
        .storage
        .student_exists(student_id)
        .await
        .map_err(internal)?;
    if !exists {
        return Err(not_found(student_id));
    }

    // A concurrent delete can win between the existence check and here.
    if !ctx
        .storage
        .delete_student(student_id)
        .await
        .map_err(internal)?
    {
        return Err(not_found(student_id));
    }
    info!(student_id = student_id.0, "student deleted");
    Ok(())
}

pub fn validate_new_student(student: &NewStudent) -> Result<(), ApiError> {
    if student.name.trim().is_empty() {
        return Err(ApiError::new(
            ErrorCode::BadRequest,
            "name must not be blank",
        ));
    }
    if !EmailAddress::is_valid(&student.email) {
        return Err(ApiError::new(
            ErrorCode::BadRequest,
            format!("email '{}' is not a valid address", student.email),
        ));
    }
    Ok(())
}

fn email_taken(email: &str) -> ApiError {
    ApiError::new(ErrorCode::BadRequest, format!("Email {email} taken"))
}

fn not_found(student_id: StudentId) -> ApiError {
    ApiError::new(
        ErrorCode::NotFound,
        format!("Student with id {student_id} does not exists"),
    )
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
