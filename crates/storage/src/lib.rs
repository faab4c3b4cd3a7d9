use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{Gender, NewStudent, Student, StudentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(StudentId),
    EmailTaken,
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!(%database_url, "student storage ready");
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// All students in insertion order.
    pub async fn list_students(&self) -> Result<Vec<Student>> {
        let rows = sqlx::query("SELECT id, name, email, gender FROM students ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .context("failed to list students")?;
        rows.iter().map(student_from_row).collect()
    }

    /// Inserts a student, reporting a clash on the unique email column as
    /// [`InsertOutcome::EmailTaken`] rather than an error.
    pub async fn insert_student(&self, student: &NewStudent) -> Result<InsertOutcome> {
        let inserted = sqlx::query(
            "INSERT INTO students (name, email, gender) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(&student.name)
        .bind(&student.email)
        .bind(student.gender.as_str())
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(row) => Ok(InsertOutcome::Inserted(StudentId(row.try_get::<i64, _>(0)?))),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                Ok(InsertOutcome::EmailTaken)
            }
            Err(err) => Err(err).with_context(|| {
                format!("failed to insert student with email '{}'", student.email)
            }),
        }
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE email = ?)")
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .context("failed to check student email")?;
        Ok(exists)
    }

    pub async fn student_exists(&self, student_id: StudentId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE id = ?)")
            .bind(student_id.0)
            .fetch_one(&self.pool)
            .await
            .context("failed to check student id")?;
        Ok(exists)
    }

    /// Returns `false` when no row matched.
    pub async fn delete_student(&self, student_id: StudentId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(student_id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete student {student_id}"))?;
        Ok(result.rows_affected() > 0)
    }
}

fn student_from_row(row: &SqliteRow) -> Result<Student> {
    let raw_gender: String = row.try_get("gender")?;
    let gender = Gender::from_str(&raw_gender)
        .with_context(|| format!("corrupt gender column value '{raw_gender}'"))?;
    Ok(Student {
        id: StudentId(row.try_get::<i64, _>("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        gender,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
