use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{NewStudent, Student, StudentId},
    error::ApiError,
    protocol::{student_route, STUDENTS_ROUTE},
};
use url::Url;

use crate::error::RemoteError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Remote source of truth for the student roster.
#[async_trait]
pub trait StudentService: Send + Sync {
    async fn list(&self) -> Result<Vec<Student>, RemoteError>;
    async fn create(&self, student: &NewStudent) -> Result<Student, RemoteError>;
    async fn delete(&self, student_id: StudentId) -> Result<(), RemoteError>;
}

/// [`StudentService`] over the HTTP API served by the `server` crate.
pub struct HttpStudentService {
    http: Client,
    server_url: Url,
}

impl HttpStudentService {
    pub fn new(server_url: &str) -> anyhow::Result<Self> {
        Self::with_timeout(server_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(server_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let server_url = Url::parse(server_url.trim())
            .with_context(|| format!("invalid student service url '{server_url}'"))?;
        if server_url.cannot_be_a_base() {
            anyhow::bail!("student service url '{server_url}' cannot be used as a base url");
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self { http, server_url })
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    fn endpoint(&self, route: &str) -> Result<Url, RemoteError> {
        self.server_url.join(route).map_err(RemoteError::transport)
    }
}

#[async_trait]
impl StudentService for HttpStudentService {
    async fn list(&self) -> Result<Vec<Student>, RemoteError> {
        let response = self
            .http
            .get(self.endpoint(STUDENTS_ROUTE)?)
            .send()
            .await
            .map_err(RemoteError::transport)?;
        let response = ensure_success(response).await?;
        let status = response.status();
        response
            .json()
            .await
            .map_err(|err| RemoteError::decode(status, err))
    }

    async fn create(&self, student: &NewStudent) -> Result<Student, RemoteError> {
        let response = self
            .http
            .post(self.endpoint(STUDENTS_ROUTE)?)
            .json(student)
            .send()
            .await
            .map_err(RemoteError::transport)?;
        let response = ensure_success(response).await?;
        let status = response.status();
        response
            .json()
            .await
            .map_err(|err| RemoteError::decode(status, err))
    }

    async fn delete(&self, student_id: StudentId) -> Result<(), RemoteError> {
        let response = self
            .http
            .delete(self.endpoint(&student_route(student_id))?)
            .send()
            .await
            .map_err(RemoteError::transport)?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Passes success responses through; anything else is read as an [`ApiError`]
/// body, falling back to a generic error when the body does not match.
async fn ensure_success(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match response.json::<ApiError>().await {
        Ok(body) => Err(body.into()),
        Err(err) => {
            tracing::debug!(%status, %err, "error body did not match the api error contract");
            Err(RemoteError::unexpected(status))
        }
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
