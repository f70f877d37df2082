use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    alert::Alert,
    sync::SyncState,
    types::{Task, TaskId},
    utils::{format_reward, shorten_address, shorten_text, DESCRIPTION_PREVIEW},
};

/// One task as shown to a front-end.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub index: u64,
    pub href: String,
    pub title: String,
    pub description: String,
    pub summary: String,
    /// Reward in wei, decimal.
    pub reward: String,
    pub reward_display: String,
    pub poster: Address,
    pub poster_short: String,
    pub active: bool,
}

impl TaskView {
    /// `currency` is the symbol of the active network's native token.
    pub fn new(id: TaskId, task: &Task, currency: &str) -> Self {
        TaskView {
            index: id.as_u64(),
            href: id.detail_path(),
            title: task.title.clone(),
            description: task.description.clone(),
            summary: shorten_text(&task.description, DESCRIPTION_PREVIEW),
            reward: task.reward.to_string(),
            reward_display: format_reward(task.reward, currency),
            poster: task.poster,
            poster_short: shorten_address(&task.poster),
            active: task.active,
        }
    }

    pub fn list(tasks: &[Task], currency: &str) -> Vec<TaskView> {
        tasks
            .iter()
            .enumerate()
            .map(|(position, task)| TaskView::new(TaskId::from_position(position), task, currency))
            .collect()
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct TaskListView {
    pub state: SyncState,
    pub tasks: Vec<TaskView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
}

// restful api

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RestfulResponse<T> {
    pub code: i32,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> RestfulResponse<T> {
    pub fn success(data: T) -> Self {
        RestfulResponse {
            code: 200,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: String, code: i32) -> Self {
        RestfulResponse {
            code,
            data: None,
            message: Some(message),
        }
    }
}

#[derive(Debug, Error)]
pub enum RestfulError {
    #[error("task not found")]
    TaskNotFound,
    #[error("sync failed: {0}")]
    SyncFailed(String),
    #[error("contract read failed: {0}")]
    ReadFailed(String),
    #[error("Internal Server Error")]
    InternalServerError,
}

impl RestfulError {
    fn get_code(&self) -> i32 {
        match self {
            RestfulError::TaskNotFound => -10001,
            RestfulError::SyncFailed(_) => -20001,
            RestfulError::ReadFailed(_) => -20002,
            RestfulError::InternalServerError => -30000,
        }
    }
}

impl ResponseError for RestfulError {
    fn status_code(&self) -> StatusCode {
        match self {
            RestfulError::TaskNotFound => StatusCode::NOT_FOUND,
            RestfulError::SyncFailed(_) | RestfulError::ReadFailed(_) => StatusCode::BAD_GATEWAY,
            RestfulError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(RestfulResponse::<()>::error(self.to_string(), self.get_code()))
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;

    use super::*;

    #[test]
    fn views_are_one_based() {
        let task = Task {
            poster: Address::repeat_byte(0xcd),
            reward: U256::from(500_000_000_000_000_000u128),
            title: "Title2".into(),
            description: "x".repeat(80),
            active: false,
        };
        let views = TaskView::list(&[task.clone(), task.clone()], "ETH");

        assert_eq!(views[1].index, 2);
        assert_eq!(views[1].href, "/task/2");
        assert_eq!(views[1].reward, "500000000000000000");
        assert_eq!(views[1].reward_display, "0.5 ETH");
        assert_eq!(views[1].summary.len(), 63);
        assert_eq!(views[1].description.len(), 80);

        let view = TaskView::new(TaskId(1), &task, "MATIC");
        assert_eq!(view.reward_display, "0.5 MATIC");
    }

    #[test]
    fn error_envelope() {
        let err = RestfulError::TaskNotFound;
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        let resp = RestfulResponse::<()>::error(err.to_string(), err.get_code());
        assert_eq!(resp.code, -10001);
        assert_eq!(resp.message.as_deref(), Some("task not found"));
    }
}
