use std::fmt::{Display, Formatter};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// `(poster, reward, title, description, active)` as returned by `tasks(uint256)`.
pub type RawTask = (Address, U256, String, String, bool);

/// 1-based position of a task in the contract's counter.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl TaskId {
    /// Id of the task published at zero-based `position` of a synchronized list.
    pub fn from_position(position: usize) -> Self {
        TaskId(position as u64 + 1)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Navigation target of the task's detail view.
    pub fn detail_path(&self) -> String {
        format!("/task/{}", self.0)
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub poster: Address,
    pub reward: U256,
    pub title: String,
    pub description: String,
    pub active: bool,
}

impl From<RawTask> for Task {
    fn from((poster, reward, title, description, active): RawTask) -> Self {
        Task {
            poster,
            reward,
            title,
            description,
            active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_tuple_keeps_field_order() {
        let poster = Address::repeat_byte(0x11);
        let raw: RawTask = (poster, U256::from(42u64), "t".into(), "d".into(), true);
        let task = Task::from(raw);
        assert_eq!(task.poster, poster);
        assert_eq!(task.reward, U256::from(42u64));
        assert_eq!(task.title, "t");
        assert_eq!(task.description, "d");
        assert!(task.active);
    }

    #[test]
    fn ids_are_one_based() {
        assert_eq!(TaskId::from_position(0), TaskId(1));
        assert_eq!(TaskId::from_position(4).detail_path(), "/task/5");
    }
}
