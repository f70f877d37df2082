use alloy_primitives::Address;
use async_trait::async_trait;
use tracing::debug;

use crate::{
    abi,
    error::ReadError,
    rpc::RpcClient,
    types::{RawTask, Task, TaskId},
};

/// Read side of the task contract.
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Number of tasks ever created (`taskCounter`).
    async fn read_task_counter(&self) -> Result<u64, ReadError>;

    /// Raw record at a 1-based index (`tasks(index)`).
    async fn read_task(&self, id: TaskId) -> Result<RawTask, ReadError>;
}

pub struct TaskContract {
    rpc: RpcClient,
    address: Address,
}

impl TaskContract {
    pub fn new(rpc: RpcClient, address: Address) -> Self {
        Self { rpc, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }
}

#[async_trait]
impl ContractReader for TaskContract {
    async fn read_task_counter(&self) -> Result<u64, ReadError> {
        let data = self.rpc.eth_call(self.address, abi::task_counter_calldata()).await?;
        abi::decode_task_counter(&data)
    }

    async fn read_task(&self, id: TaskId) -> Result<RawTask, ReadError> {
        debug!("read task {id}");
        let data = self.rpc.eth_call(self.address, abi::task_calldata(id)).await?;
        abi::decode_task(&data)
    }
}

/// Detail lookup. Indices outside `1..=taskCounter` have no task.
pub async fn find_task(reader: &dyn ContractReader, id: TaskId) -> Result<Option<Task>, ReadError> {
    if id.as_u64() == 0 {
        return Ok(None);
    }
    let count = reader.read_task_counter().await?;
    if id.as_u64() > count {
        return Ok(None);
    }
    reader.read_task(id).await.map(|raw| Some(Task::from(raw)))
}

#[cfg(any(test, feature = "testing"))]
pub mod memory {
    use std::sync::Mutex;

    use super::*;

    /// In-memory contract. Records every `read_task` index; `fail_at` makes that index fail.
    #[derive(Default)]
    pub struct MemoryContract {
        tasks: Mutex<Vec<RawTask>>,
        fail_at: Mutex<Option<u64>>,
        counter_fails: Mutex<bool>,
        requested: Mutex<Vec<u64>>,
    }

    impl MemoryContract {
        pub fn new(tasks: Vec<RawTask>) -> Self {
            Self {
                tasks: Mutex::new(tasks),
                ..Default::default()
            }
        }

        pub fn push(&self, task: RawTask) {
            self.tasks.lock().unwrap().push(task);
        }

        pub fn fail_at(&self, index: Option<u64>) {
            *self.fail_at.lock().unwrap() = index;
        }

        pub fn fail_counter(&self, fails: bool) {
            *self.counter_fails.lock().unwrap() = fails;
        }

        pub fn requested(&self) -> Vec<u64> {
            self.requested.lock().unwrap().clone()
        }

        pub fn clear_requested(&self) {
            self.requested.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl ContractReader for MemoryContract {
        async fn read_task_counter(&self) -> Result<u64, ReadError> {
            if *self.counter_fails.lock().unwrap() {
                return Err(ReadError::Rpc {
                    code: -32000,
                    message: "read of taskCounter failed".to_string(),
                });
            }
            Ok(self.tasks.lock().unwrap().len() as u64)
        }

        async fn read_task(&self, id: TaskId) -> Result<RawTask, ReadError> {
            self.requested.lock().unwrap().push(id.as_u64());
            if *self.fail_at.lock().unwrap() == Some(id.as_u64()) {
                return Err(ReadError::Rpc {
                    code: -32000,
                    message: format!("read of task {id} failed"),
                });
            }
            let tasks = self.tasks.lock().unwrap();
            let index = id.as_u64().checked_sub(1).map(|i| i as usize);
            match index.and_then(|i| tasks.get(i)) {
                Some(task) => Ok(task.clone()),
                None => Ok((Address::ZERO, Default::default(), String::new(), String::new(), false)),
            }
        }
    }
}
