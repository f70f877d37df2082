//! Calldata and return decoding for the task contract.

use alloy_primitives::{Bytes, U256};
use alloy_sol_types::{sol, SolCall};

use crate::{
    error::ReadError,
    types::{RawTask, TaskId},
};

sol! {
    function taskCounter() external view returns (uint256);

    function tasks(uint256 index)
        external
        view
        returns (address poster, uint256 reward, string title, string description, bool active);
}

pub fn task_counter_calldata() -> Bytes {
    taskCounterCall {}.abi_encode().into()
}

pub fn decode_task_counter(data: &[u8]) -> Result<u64, ReadError> {
    let count = taskCounterCall::abi_decode_returns(data)?;
    u64::try_from(count).map_err(|_| ReadError::Overflow(format!("taskCounter = {count}")))
}

pub fn task_calldata(id: TaskId) -> Bytes {
    tasksCall { index: U256::from(id.as_u64()) }.abi_encode().into()
}

pub fn decode_task(data: &[u8]) -> Result<RawTask, ReadError> {
    let ret = tasksCall::abi_decode_returns(data)?;
    Ok((ret.poster, ret.reward, ret.title, ret.description, ret.active))
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;
    use alloy_sol_types::SolValue;

    use super::*;

    #[test]
    fn calldata_starts_with_selector() {
        assert_eq!(&task_counter_calldata()[..], &taskCounterCall::SELECTOR[..]);

        let data = task_calldata(TaskId(3));
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], &tasksCall::SELECTOR[..]);
        assert_eq!(data[35], 3);
    }

    #[test]
    fn decodes_task_tuple() {
        let poster = Address::repeat_byte(0xab);
        let reward = U256::from(1_000_000_000_000_000_000u128);
        let encoded =
            (poster, reward, "Title1".to_string(), "Desc1".to_string(), true).abi_encode_params();

        let (p, r, title, description, active) = decode_task(&encoded).unwrap();
        assert_eq!(p, poster);
        assert_eq!(r, reward);
        assert_eq!(title, "Title1");
        assert_eq!(description, "Desc1");
        assert!(active);
    }

    #[test]
    fn counter_out_of_range() {
        let encoded = (U256::from(u64::MAX) + U256::from(1u8)).abi_encode();
        assert!(matches!(decode_task_counter(&encoded), Err(ReadError::Overflow(_))));

        let encoded = U256::from(12u8).abi_encode();
        assert_eq!(decode_task_counter(&encoded).unwrap(), 12);
    }

    #[test]
    fn short_return_data_is_an_error() {
        assert!(matches!(decode_task(&[0u8; 8]), Err(ReadError::Decode(_))));
    }
}
