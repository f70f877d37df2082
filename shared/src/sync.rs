//! Task-list synchronization.
//!
//! A pass reads `tasks(1..=N)` for a known count `N` and replaces the published
//! list with the result. Passes are started by count changes (see [`follow`]) or
//! by hand (see [`TaskListSynchronizer::refresh`]).
//!
//! [`follow`]: TaskListSynchronizer::follow

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use futures_util::{stream, StreamExt, TryStreamExt};
use serde::Serialize;
use tokio::{sync::watch, task::JoinHandle, time};
use tracing::{debug, error, info, warn};

use crate::{
    contract::ContractReader,
    error::SyncError,
    timestamp,
    types::{Task, TaskId},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncState {
    Uninitialized,
    WaitingForCount,
    Fetching { count: u64 },
    Ready { count: u64, synced_at: i64 },
    Failed { count: u64, index: u64, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Count unknown, nothing was read.
    Waiting,
    /// The list was replaced with this many tasks.
    Published(usize),
    /// A newer pass started meanwhile; the result was discarded.
    Superseded,
}

pub type TaskList = Arc<Vec<Task>>;

pub struct TaskListSynchronizer {
    reader: Arc<dyn ContractReader>,
    concurrency: usize,
    generation: AtomicU64,
    tasks: watch::Sender<TaskList>,
    state: watch::Sender<SyncState>,
}

impl TaskListSynchronizer {
    pub fn new(reader: Arc<dyn ContractReader>) -> Self {
        let (tasks, _) = watch::channel(Arc::new(Vec::new()));
        let (state, _) = watch::channel(SyncState::Uninitialized);
        Self {
            reader,
            concurrency: 1,
            generation: AtomicU64::new(0),
            tasks,
            state,
        }
    }

    /// Reads up to `concurrency` records at once. Values below 2 keep reads sequential.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn reader(&self) -> &Arc<dyn ContractReader> {
        &self.reader
    }

    pub fn tasks(&self) -> TaskList {
        self.tasks.borrow().clone()
    }

    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    pub fn subscribe_tasks(&self) -> watch::Receiver<TaskList> {
        self.tasks.subscribe()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Runs one pass for `count`. `None` means the count is not known yet.
    pub async fn sync(&self, count: Option<u64>) -> Result<SyncOutcome, SyncError> {
        let Some(count) = count else {
            self.state.send_if_modified(|state| {
                if *state == SyncState::Uninitialized {
                    *state = SyncState::WaitingForCount;
                    return true;
                }
                false
            });
            return Ok(SyncOutcome::Waiting);
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(SyncState::Fetching { count });
        debug!("pass #{generation}: fetching {count} tasks");

        let result = self.fetch(count).await;

        if !self.is_current(generation) {
            debug!("pass #{generation} superseded");
            return Ok(SyncOutcome::Superseded);
        }

        match result {
            Ok(tasks) => {
                let len = tasks.len();
                self.tasks.send_replace(Arc::new(tasks));
                self.state.send_replace(SyncState::Ready {
                    count,
                    synced_at: timestamp(),
                });
                info!("published {len} tasks");
                Ok(SyncOutcome::Published(len))
            }
            Err(err) => {
                if let SyncError::Task { index, source } = &err {
                    self.state.send_replace(SyncState::Failed {
                        count,
                        index: *index,
                        reason: source.to_string(),
                    });
                }
                Err(err)
            }
        }
    }

    /// Reads the current count and runs a pass for it. A failed count read
    /// leaves list and state untouched.
    pub async fn refresh(&self) -> Result<SyncOutcome, SyncError> {
        let count = self.reader.read_task_counter().await.map_err(SyncError::Count)?;
        self.sync(Some(count)).await
    }

    /// Starts a pass for the current count and for every later change of it.
    ///
    /// At most one pass runs at a time: a count change drops the running pass,
    /// with its outstanding reads, before the next one starts.
    pub fn follow(self: &Arc<Self>, mut counts: watch::Receiver<Option<u64>>) -> SyncHandle {
        let this = self.clone();
        let driver = tokio::spawn(async move {
            loop {
                let count = *counts.borrow_and_update();
                let pass = this.sync(count);
                tokio::pin!(pass);

                let source_open = tokio::select! {
                    result = &mut pass => {
                        log_failure(result);
                        counts.changed().await.is_ok()
                    }
                    changed = counts.changed() => {
                        if changed.is_err() {
                            // no newer count will come, let the last pass finish
                            log_failure(pass.as_mut().await);
                        }
                        changed.is_ok()
                    }
                };
                if !source_open {
                    debug!("count source closed");
                    break;
                }
            }
        });

        SyncHandle {
            driver,
            synchronizer: self.clone(),
        }
    }

    /// Makes every in-flight pass discard its result.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn fetch(&self, count: u64) -> Result<Vec<Task>, SyncError> {
        if self.concurrency <= 1 {
            let mut tasks = Vec::with_capacity(count.min(1024) as usize);
            for index in 1..=count {
                let raw = self
                    .reader
                    .read_task(TaskId(index))
                    .await
                    .map_err(|source| SyncError::Task { index, source })?;
                tasks.push(Task::from(raw));
            }
            return Ok(tasks);
        }

        // `buffered` yields in input order, so the list stays sorted by index.
        stream::iter(1..=count)
            .map(|index| {
                async move {
                    self.reader
                        .read_task(TaskId(index))
                        .await
                        .map(Task::from)
                        .map_err(|source| SyncError::Task { index, source })
                }
            })
            .buffered(self.concurrency)
            .try_collect()
            .await
    }
}

/// Keeps a [`TaskListSynchronizer`] following a count source. Dropping it stops
/// the driver together with the pass it is running.
pub struct SyncHandle {
    driver: JoinHandle<()>,
    synchronizer: Arc<TaskListSynchronizer>,
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.driver.abort();
        self.synchronizer.invalidate();
    }
}

fn log_failure(result: Result<SyncOutcome, SyncError>) {
    if let Err(err) = result {
        error!("task sync failed: {err}");
    }
}

/// Polls `taskCounter` every `interval` and publishes it when it changes.
pub fn spawn_count_watcher(
    reader: Arc<dyn ContractReader>,
    interval: Duration,
) -> (watch::Receiver<Option<u64>>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(None);
    let handle = tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match reader.read_task_counter().await {
                Ok(count) => {
                    let changed = tx.send_if_modified(|current| {
                        if *current == Some(count) {
                            return false;
                        }
                        *current = Some(count);
                        true
                    });
                    if changed {
                        info!("task counter: {count}");
                    }
                }
                Err(err) => warn!("failed to read task counter: {err}"),
            }
            if tx.is_closed() {
                break;
            }
        }
    });
    (rx, handle)
}
