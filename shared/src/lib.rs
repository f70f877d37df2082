pub mod abi;
pub mod alert;
pub mod config;
pub mod contract;
pub mod error;
pub mod interaction;
pub mod log;
pub mod rpc;
pub mod sync;
pub mod types;
pub mod utils;
pub mod wallet;

pub fn timestamp() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
