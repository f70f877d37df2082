//! Mock JSON-RPC node for contract read tests.

use std::time::Duration;

use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::SolValue;
use serde_json::json;
use shared::{abi, contract::TaskContract, rpc::RpcClient, types::TaskId};
use wiremock::{
    matchers::method,
    Match,
    Mock,
    MockServer,
    Request,
    ResponseTemplate,
};

pub const CONTRACT: Address = address!("c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0");

/// Matches JSON-RPC requests whose first param carries `data`.
pub struct CallData(pub Bytes);

impl Match for CallData {
    fn matches(&self, request: &Request) -> bool {
        let Ok(body) = serde_json::from_slice::<serde_json::Value>(&request.body) else {
            return false;
        };
        let expected = self.0.to_string();
        body["method"] == "eth_call" &&
            body["params"][0]["data"].as_str().map(str::to_lowercase) == Some(expected)
    }
}

pub fn rpc_result(result: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result.into(),
    }))
}

pub fn rpc_error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": { "code": code, "message": message },
    }))
}

pub fn encoded(data: Vec<u8>) -> String {
    Bytes::from(data).to_string()
}

pub async fn mount_counter(server: &MockServer, count: u64) {
    Mock::given(method("POST"))
        .and(CallData(abi::task_counter_calldata()))
        .respond_with(rpc_result(encoded(U256::from(count).abi_encode())))
        .mount(server)
        .await;
}

pub async fn mount_task(
    server: &MockServer,
    index: u64,
    task: (Address, U256, &str, &str, bool),
) {
    let (poster, reward, title, description, active) = task;
    let data = (poster, reward, title.to_string(), description.to_string(), active)
        .abi_encode_params();
    Mock::given(method("POST"))
        .and(CallData(abi::task_calldata(TaskId(index))))
        .respond_with(rpc_result(encoded(data)))
        .mount(server)
        .await;
}

pub fn contract_for(server: &MockServer) -> TaskContract {
    let rpc = RpcClient::new(&server.uri(), Duration::from_secs(5))
        .expect("mock server uri is valid")
        .with_retry(2, 10);
    TaskContract::new(rpc, CONTRACT)
}
