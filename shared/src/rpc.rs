//! Minimal JSON-RPC 2.0 client for read-only EVM calls.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use alloy_primitives::{Address, Bytes, U64};
use reqwest::Url;
use serde::{de, ser, Deserialize, Serialize};
use serde_json::json;
use tracing::trace;

use crate::{error::ReadError, utils::retry};

#[derive(Serialize, Debug)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize, Debug)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize, Debug)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

pub struct RpcClient {
    url: Url,
    http: reqwest::Client,
    retry_times: u32,
    retry_delay: u64,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ReadError> {
        let url = Url::parse(url)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url,
            http,
            retry_times: 0,
            retry_delay: 0,
            next_id: AtomicU64::new(1),
        })
    }

    /// Retries retryable failures `times` more times, `delay_ms` apart.
    pub fn with_retry(mut self, times: u32, delay_ms: u64) -> Self {
        self.retry_times = times;
        self.retry_delay = delay_ms;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R, ReadError>
    where
        P: ser::Serialize,
        R: de::DeserializeOwned, {
        let params = serde_json::to_value(params)
            .map_err(|err| ReadError::InvalidResponse(format!("unserializable params: {err}")))?;
        let func = || self.request(method, &params);
        retry(func, self.retry_times, self.retry_delay, ReadError::is_retryable).await
    }

    /// `eth_call` against the latest block.
    pub async fn eth_call(&self, to: Address, data: Bytes) -> Result<Bytes, ReadError> {
        self.call("eth_call", json!([{ "to": to, "data": data }, "latest"])).await
    }

    pub async fn chain_id(&self) -> Result<u64, ReadError> {
        let id: U64 = self.call("eth_chainId", json!([])).await?;
        u64::try_from(id).map_err(|_| ReadError::Overflow(format!("chain id = {id}")))
    }

    async fn request<R>(&self, method: &str, params: &serde_json::Value) -> Result<R, ReadError>
    where
        R: de::DeserializeOwned, {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        trace!("rpc #{id} {method}");

        let payload = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let response = self
            .http
            .post(self.url.clone())
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ReadError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let response: RpcResponse<R> = serde_json::from_str(&text).map_err(|err| {
            ReadError::InvalidResponse(format!("{err:#}, response: {text}"))
        })?;

        if let Some(err) = response.error {
            return Err(ReadError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        response
            .result
            .ok_or_else(|| ReadError::InvalidResponse(format!("missing result, response: {text}")))
    }
}
