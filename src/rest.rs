//! REST implementation of [`BoardApi`] over `reqwest`.
//!
//! DESIGN
//! ======
//! Thin HTTP wrapper around the board backend's JSON routes. Each method
//! builds one request, sends it, and runs the response through a shared
//! status-mapping step; no retries or caching live here — that policy
//! belongs to the callers.
//!
//! ERROR HANDLING
//! ==============
//! Network and decode failures become `Transport`. Status mapping: 404 is
//! `NotFound` for the entity the route addressed, 409 is `Constraint`
//! (canonical ordering rejected the write), anything else non-2xx is
//! `Status`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::api::BoardApi;
use crate::error::ApiError;
use crate::model::{BoardSnapshot, Column, Member, MemberRole, NewColumn, NewTask, Tag, Task, TaskPatch};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// CLIENT
// =============================================================================

/// Authenticated HTTP client for one board backend.
pub struct RestBoardApi {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl RestBoardApi {
    /// Build a client for `base_url` (no trailing slash) with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { http, base_url: base_url.into(), token: token.into() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: reqwest::RequestBuilder, entity_id: Uuid) -> Result<reqwest::Response, ApiError> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        debug!(status = status.as_u16(), %entity_id, "board api rejected request");
        match status.as_u16() {
            404 => Err(ApiError::NotFound(entity_id)),
            409 => Err(ApiError::Constraint { entity_id }),
            other => Err(ApiError::Status { status: other }),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, entity_id: Uuid) -> Result<T, ApiError> {
        let response = self.send(self.http.get(self.url(path)), entity_id).await?;
        decode(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B, entity_id: Uuid) -> Result<T, ApiError> {
        let response = self.send(self.http.post(self.url(path)).json(body), entity_id).await?;
        decode(response).await
    }

    async fn patch_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B, entity_id: Uuid) -> Result<T, ApiError> {
        let response = self.send(self.http.patch(self.url(path)).json(body), entity_id).await?;
        decode(response).await
    }

    async fn patch_no_content<B: Serialize>(&self, path: &str, body: &B, entity_id: Uuid) -> Result<(), ApiError> {
        self.send(self.http.patch(self.url(path)).json(body), entity_id).await?;
        Ok(())
    }

    async fn delete(&self, path: &str, entity_id: Uuid) -> Result<(), ApiError> {
        self.send(self.http.delete(self.url(path)), entity_id).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    response.json::<T>().await.map_err(|e| ApiError::Transport(e.to_string()))
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskPositionPatch {
    column_id: Uuid,
    position: usize,
}

#[derive(Serialize)]
struct ColumnPositionPatch {
    position: usize,
}

#[derive(Serialize)]
struct ColumnPatch {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
}

#[derive(Serialize)]
struct NewTag {
    name: String,
    color: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberPayload {
    user_id: Uuid,
    role: MemberRole,
}

#[derive(Serialize)]
struct RolePatch {
    role: MemberRole,
}

// =============================================================================
// TRAIT IMPLEMENTATION
// =============================================================================

#[async_trait]
impl BoardApi for RestBoardApi {
    async fn update_task_position(&self, task_id: Uuid, column_id: Uuid, position: usize) -> Result<(), ApiError> {
        let body = TaskPositionPatch { column_id, position };
        self.patch_no_content(&format!("/tasks/{task_id}"), &body, task_id).await
    }

    async fn update_column_position(&self, column_id: Uuid, position: usize) -> Result<(), ApiError> {
        let body = ColumnPositionPatch { position };
        self.patch_no_content(&format!("/columns/{column_id}"), &body, column_id).await
    }

    async fn fetch_board(&self, project_id: Uuid) -> Result<BoardSnapshot, ApiError> {
        self.get_json(&format!("/projects/{project_id}/board"), project_id).await
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, ApiError> {
        self.post_json("/tasks", &task, task.column_id).await
    }

    async fn update_task(&self, task_id: Uuid, patch: TaskPatch) -> Result<Task, ApiError> {
        self.patch_json(&format!("/tasks/{task_id}"), &patch, task_id).await
    }

    async fn delete_task(&self, task_id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("/tasks/{task_id}"), task_id).await
    }

    async fn create_column(&self, column: NewColumn) -> Result<Column, ApiError> {
        self.post_json("/columns", &column, column.project_id).await
    }

    async fn update_column(&self, column_id: Uuid, name: String, color: Option<String>) -> Result<Column, ApiError> {
        let body = ColumnPatch { name, color };
        self.patch_json(&format!("/columns/{column_id}"), &body, column_id).await
    }

    async fn delete_column(&self, column_id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("/columns/{column_id}"), column_id).await
    }

    async fn create_tag(&self, name: String, color: String) -> Result<Tag, ApiError> {
        let body = NewTag { name, color };
        self.post_json("/tags", &body, Uuid::nil()).await
    }

    async fn add_member(&self, project_id: Uuid, user_id: Uuid, role: MemberRole) -> Result<Member, ApiError> {
        let body = MemberPayload { user_id, role };
        self.post_json(&format!("/projects/{project_id}/members"), &body, user_id).await
    }

    async fn update_member(&self, project_id: Uuid, user_id: Uuid, role: MemberRole) -> Result<(), ApiError> {
        let body = RolePatch { role };
        self.patch_no_content(&format!("/projects/{project_id}/members/{user_id}"), &body, user_id).await
    }

    async fn remove_member(&self, project_id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("/projects/{project_id}/members/{user_id}"), user_id).await
    }
}

impl std::fmt::Debug for RestBoardApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBoardApi").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "rest_test.rs"]
mod tests;
