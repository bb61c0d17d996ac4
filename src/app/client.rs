// Blocking HTTP client for the task API, used by the terminal UI
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use thiserror::Error;

use crate::app::api::ErrorBody;
use crate::app::models::{DeletedTask, ListQuery, Task, TaskPayload, TaskStatus};

#[derive(Debug, Error)]
pub enum ClientError {
    // The server answered with an error status; message is its `error` field when present
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    // `base_url` points at the API root, e.g. http://127.0.0.1:3000/api
    pub fn new(base_url: impl Into<String>) -> ApiClient {
        ApiClient {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn list_tasks(&self, query: &ListQuery) -> Result<Vec<Task>, ClientError> {
        let response = self
            .http
            .get(self.url("/tasks"))
            .query(&query.to_params())
            .send()?;
        parse(response)
    }

    pub fn get_task(&self, id: i64) -> Result<Task, ClientError> {
        let response = self.http.get(self.url(&format!("/tasks/{id}"))).send()?;
        parse(response)
    }

    pub fn create_task(&self, payload: &TaskPayload) -> Result<Task, ClientError> {
        let response = self.http.post(self.url("/tasks")).json(payload).send()?;
        parse(response)
    }

    pub fn update_task(&self, id: i64, payload: &TaskPayload) -> Result<Task, ClientError> {
        let response = self
            .http
            .put(self.url(&format!("/tasks/{id}")))
            .json(payload)
            .send()?;
        parse(response)
    }

    pub fn update_status(&self, id: i64, status: TaskStatus) -> Result<Task, ClientError> {
        let response = self
            .http
            .patch(self.url(&format!("/tasks/{id}/status")))
            .json(&serde_json::json!({ "status": status }))
            .send()?;
        parse(response)
    }

    pub fn delete_task(&self, id: i64) -> Result<DeletedTask, ClientError> {
        let response = self.http.delete(self.url(&format!("/tasks/{id}"))).send()?;
        parse(response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json()?);
    }

    let message = response
        .json::<ErrorBody>()
        .map(|body| body.error)
        .unwrap_or_else(|_| format!("Request failed with status {status}"));
    Err(ClientError::Api { status, message })
}
