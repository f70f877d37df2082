mod common;

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use common::{contract_for, mount_counter, mount_task, rpc_error, rpc_result, CallData};
use serde_json::json;
use shared::{
    abi,
    contract::{find_task, ContractReader},
    error::ReadError,
    sync::{SyncOutcome, SyncState, TaskListSynchronizer},
    types::TaskId,
};
use tokio_test::assert_ok;
use wiremock::{
    matchers::{body_partial_json, method},
    Mock,
    MockServer,
    ResponseTemplate,
};

const ONE_ETH: u128 = 1_000_000_000_000_000_000;
const HALF_ETH: u128 = 500_000_000_000_000_000;

#[tokio::test]
async fn reads_counter_and_tasks() {
    let server = MockServer::start().await;
    let poster = Address::repeat_byte(0xa);
    mount_counter(&server, 2).await;
    mount_task(&server, 1, (poster, U256::from(ONE_ETH), "Title1", "Desc1", true)).await;

    let contract = contract_for(&server);
    assert_eq!(assert_ok!(contract.read_task_counter().await), 2);

    let (p, reward, title, description, active) =
        assert_ok!(contract.read_task(TaskId(1)).await);
    assert_eq!(p, poster);
    assert_eq!(reward, U256::from(ONE_ETH));
    assert_eq!(title, "Title1");
    assert_eq!(description, "Desc1");
    assert!(active);
}

#[tokio::test]
async fn synchronizes_over_json_rpc() {
    let server = MockServer::start().await;
    let addr_a = Address::repeat_byte(0xa);
    let addr_b = Address::repeat_byte(0xb);
    mount_counter(&server, 2).await;
    mount_task(&server, 1, (addr_a, U256::from(ONE_ETH), "Title1", "Desc1", true)).await;
    mount_task(&server, 2, (addr_b, U256::from(HALF_ETH), "Title2", "Desc2", false)).await;

    let sync = TaskListSynchronizer::new(Arc::new(contract_for(&server)));
    assert_eq!(assert_ok!(sync.refresh().await), SyncOutcome::Published(2));

    let tasks = sync.tasks();
    assert_eq!(tasks[0].poster, addr_a);
    assert_eq!(tasks[0].title, "Title1");
    assert!(tasks[0].active);
    assert_eq!(tasks[1].poster, addr_b);
    assert_eq!(tasks[1].reward, U256::from(HALF_ETH));
    assert!(!tasks[1].active);
}

#[tokio::test]
async fn reverted_read_fails_the_pass() {
    let server = MockServer::start().await;
    mount_counter(&server, 2).await;
    mount_task(&server, 1, (Address::ZERO, U256::ZERO, "a", "b", true)).await;
    Mock::given(method("POST"))
        .and(CallData(abi::task_calldata(TaskId(2))))
        .respond_with(rpc_error(3, "execution reverted"))
        .expect(1)
        .mount(&server)
        .await;

    let sync = TaskListSynchronizer::new(Arc::new(contract_for(&server)));
    let err = sync.sync(Some(2)).await.unwrap_err();

    assert_eq!(err.index(), Some(2));
    assert!(matches!(err.read_error(), ReadError::Rpc { code: 3, .. }));
    assert!(sync.tasks().is_empty());
    assert!(matches!(sync.state(), SyncState::Failed { index: 2, .. }));
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(CallData(abi::task_counter_calldata()))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_counter(&server, 7).await;

    let contract = contract_for(&server);
    assert_eq!(assert_ok!(contract.read_task_counter().await), 7);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let contract = contract_for(&server);
    let err = contract.read_task_counter().await.unwrap_err();
    assert!(matches!(err, ReadError::Status { status: 400, .. }));
}

#[tokio::test]
async fn detail_lookup_checks_the_counter() {
    let server = MockServer::start().await;
    mount_counter(&server, 1).await;
    mount_task(&server, 1, (Address::repeat_byte(1), U256::from(5u8), "Only", "One", true)).await;

    let contract = contract_for(&server);
    let task = assert_ok!(find_task(&contract, TaskId(1)).await).expect("task 1 exists");
    assert_eq!(task.title, "Only");
    assert!(assert_ok!(find_task(&contract, TaskId(2)).await).is_none());
}

#[tokio::test]
async fn reads_chain_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_chainId" })))
        .respond_with(rpc_result("0xafa"))
        .mount(&server)
        .await;

    let contract = contract_for(&server);
    assert_eq!(assert_ok!(contract.rpc().chain_id().await), 2810);
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let contract = contract_for(&server);
    let err = contract.read_task_counter().await.unwrap_err();
    assert!(matches!(err, ReadError::InvalidResponse(_)));
}
