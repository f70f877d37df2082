use std::sync::Arc;

use shared::{
    alert::Alert,
    contract::find_task,
    interaction::{RestfulError, TaskListView, TaskView},
    sync::{SyncState, TaskListSynchronizer},
    types::TaskId,
};
use tracing::*;

pub struct RESTful {
    pub synchronizer: Arc<TaskListSynchronizer>,
    /// Native token symbol of the active network.
    pub currency: String,
}

impl RESTful {
    /// The last published list, with an error alert when the last pass failed.
    pub fn list_tasks(&self) -> TaskListView {
        trace!("list tasks");
        let state = self.synchronizer.state();
        let tasks = TaskView::list(&self.synchronizer.tasks(), &self.currency);
        let alert = match &state {
            SyncState::Failed { index, reason, .. } => {
                Some(Alert::error(format!("Failed to load task {index}: {reason}")))
            }
            _ => None,
        };
        TaskListView { state, tasks, alert }
    }

    /// Reads a task straight from the contract.
    pub async fn task_detail(&self, index: u64) -> anyhow::Result<TaskView, RestfulError> {
        trace!("task detail {index}");
        let id = TaskId(index);
        match find_task(self.synchronizer.reader().as_ref(), id).await {
            Ok(Some(task)) => Ok(TaskView::new(id, &task, &self.currency)),
            Ok(None) => Err(RestfulError::TaskNotFound),
            Err(err) => {
                error!("read task {index} error: {err}");
                Err(RestfulError::ReadFailed(err.to_string()))
            }
        }
    }

    /// Manual retry: rebuild the list from the current count.
    pub async fn resync(&self) -> anyhow::Result<TaskListView, RestfulError> {
        trace!("resync");
        if let Err(err) = self.synchronizer.refresh().await {
            error!("resync error: {err}");
            return Err(RestfulError::SyncFailed(err.to_string()));
        }
        Ok(self.list_tasks())
    }
}
