use alloy_primitives::{Address, Bytes, U64};
use alloy_sol_types::SolCall;
use reqwest::{Client as ReqwestClient, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::trace;

use super::ChainError;

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Serialize)]
struct CallParams {
    to: Address,
    data: Bytes,
}

/// Client for an Ethereum JSON-RPC endpoint
#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    /// Endpoint URL
    remote: Url,
    /// The reqwest client
    reqwest_client: ReqwestClient,
    /// Request id counter, shared by clones
    next_id: Arc<AtomicU64>,
}

impl JsonRpcClient {
    /// Create a client for the given endpoint
    pub fn new(remote: &str) -> Result<Self, ChainError> {
        Ok(Self {
            remote: Url::parse(remote)?,
            reqwest_client: ReqwestClient::builder().build()?,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Endpoint URL
    pub fn remote(&self) -> &Url {
        &self.remote
    }

    /// Send a JSON-RPC request and deserialize its `result`
    pub async fn request<P, R>(&self, method: &str, params: P) -> Result<R, ChainError>
    where
        P: Serialize + Send + Sync,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        trace!("rpc #{id} {method}");
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let response = self
            .reqwest_client
            .post(self.remote.clone())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<RpcResponse>()
            .await?;

        if let Some(err) = response.error {
            return Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        let result = response
            .result
            .ok_or_else(|| ChainError::MissingResult(method.to_string()))?;
        Ok(serde_json::from_value(result)?)
    }

    /// `eth_chainId`
    pub async fn chain_id(&self) -> Result<u64, ChainError> {
        let id: U64 = self.request("eth_chainId", [(); 0]).await?;
        Ok(id.to::<u64>())
    }

    /// `eth_call` against the latest block
    pub async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
        self.request("eth_call", (CallParams { to, data }, "latest"))
            .await
    }

    /// ABI-encode `call`, run it with `eth_call` and decode the return values
    pub async fn call_contract<C>(&self, to: Address, call: C) -> Result<C::Return, ChainError>
    where
        C: SolCall + Send + Sync,
    {
        let output = self.call(to, Bytes::from(call.abi_encode())).await?;
        Ok(C::abi_decode_returns(&output, true)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use wiremock::{
        matchers::{body_partial_json, method},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn chain_id_is_hex() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"method": "eth_chainId"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"jsonrpc": "2.0", "id": 1, "result": "0x64"}),
            ))
            .mount(&server)
            .await;

        let client = JsonRpcClient::new(&server.uri()).unwrap();
        assert_eq!(client.chain_id().await.unwrap(), 100);
    }

    #[tokio::test]
    async fn rpc_errors_keep_their_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0", "id": 1,
                "error": {"code": 4001, "message": "User rejected the request."}
            })))
            .mount(&server)
            .await;

        let client = JsonRpcClient::new(&server.uri()).unwrap();
        let err = client.chain_id().await.unwrap_err();
        assert!(err.is_user_rejection());
        assert!(!err.is_revert());
    }

    #[tokio::test]
    async fn missing_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"jsonrpc": "2.0", "id": 1})),
            )
            .mount(&server)
            .await;

        let client = JsonRpcClient::new(&server.uri()).unwrap();
        assert!(matches!(
            client.chain_id().await,
            Err(ChainError::MissingResult(_))
        ));
    }
}
