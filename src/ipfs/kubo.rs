use async_trait::async_trait;
use libipld::Cid;
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, Url};
use tracing::{debug, warn};

use super::{
    requests::{
        AddRequest, BlockGetRequest, DagPutRequest, KuboRequest, LsRequest, RawKuboRequest,
    },
    AddedObject, ContentStore, DagNode, DagPutOptions, DirectoryEntry, IpfsError,
    KuboErrorResponse,
};
use crate::cid::parse_cid;

/// Client for the HTTP RPC API of a Kubo (go-ipfs) node
#[derive(Debug, Clone)]
pub struct KuboClient {
    /// API root, always ending in `/`
    remote: Url,
    /// The reqwest client
    reqwest_client: ReqwestClient,
}

impl KuboClient {
    /// Create a client for the API rooted at `remote`, e.g. `http://127.0.0.1:5001`
    pub fn new(remote: &str) -> Result<Self, IpfsError> {
        let reqwest_client = ReqwestClient::builder().build().map_err(IpfsError::http)?;
        Self::with_client(remote, reqwest_client)
    }

    /// Reuse an existing reqwest client
    pub fn with_client(remote: &str, reqwest_client: ReqwestClient) -> Result<Self, IpfsError> {
        let mut remote = remote.trim().to_string();
        if !remote.ends_with('/') {
            remote.push('/');
        }
        Ok(Self {
            remote: Url::parse(&remote).map_err(|err| IpfsError::url(err).at(&remote))?,
            reqwest_client,
        })
    }

    /// Call a method that answers with JSON
    async fn call<T: KuboRequest>(&self, request: T) -> Result<T::ResponseType, IpfsError> {
        let builder = request
            .build_request(&self.remote, &self.reqwest_client)
            .map_err(|err| err.at(self.remote.as_str()))?;
        let response = self.send(builder).await?;
        response
            .json::<T::ResponseType>()
            .await
            .map_err(|err| IpfsError::format(err).at(self.remote.as_str()))
    }

    /// Call a method that answers with raw bytes
    async fn call_bytes<T: RawKuboRequest>(&self, request: T) -> Result<Vec<u8>, IpfsError> {
        let builder = request
            .build_request(&self.remote, &self.reqwest_client)
            .map_err(|err| err.at(self.remote.as_str()))?;
        let response = self.send(builder).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| IpfsError::http(err).at(self.remote.as_str()))?;
        Ok(bytes.to_vec())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, IpfsError> {
        let response = builder
            .send()
            .await
            .map_err(|err| IpfsError::http(err).at(self.remote.as_str()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        // Kubo answers RPC failures with a JSON error document
        let status = response.status();
        match response.json::<KuboErrorResponse>().await {
            Ok(err) => {
                warn!("{} answered {status}: {err}", self.remote);
                Err(IpfsError::node(err).at(self.remote.as_str()))
            }
            Err(_) => Err(IpfsError::http_response(status).at(self.remote.as_str())),
        }
    }
}

#[async_trait]
impl ContentStore for KuboClient {
    fn endpoint(&self) -> String {
        self.remote.to_string()
    }

    async fn list(&self, cid: &Cid) -> Result<Vec<DirectoryEntry>, IpfsError> {
        let response = self.call(LsRequest { cid: *cid }).await?;
        let mut entries = Vec::new();
        for object in response.objects {
            for link in object.links {
                let cid = parse_cid(&link.hash).map_err(|err| IpfsError::cid(err).at(self.remote.as_str()))?;
                entries.push(DirectoryEntry {
                    name: link.name,
                    cid,
                    size: link.size,
                });
            }
        }
        debug!("listed {} entries of {cid} on {}", entries.len(), self.remote);
        Ok(entries)
    }

    async fn add(&self, bytes: Vec<u8>) -> Result<AddedObject, IpfsError> {
        let response = self.call(AddRequest { bytes }).await?;
        let cid = parse_cid(&response.hash).map_err(|err| IpfsError::cid(err).at(self.remote.as_str()))?;
        let size = response.size.parse::<u64>().map_err(|_| {
            IpfsError::dag_codec(format!("unexpected add size {:?}", response.size))
                .at(self.remote.as_str())
        })?;
        Ok(AddedObject { cid, size })
    }

    async fn dag_get(&self, cid: &Cid) -> Result<DagNode, IpfsError> {
        let block = self.call_bytes(BlockGetRequest { cid: *cid }).await?;
        DagNode::decode(&block).map_err(|err| err.at(self.remote.as_str()))
    }

    async fn dag_put(&self, node: &DagNode, options: DagPutOptions) -> Result<Cid, IpfsError> {
        let request = DagPutRequest {
            block: node.encode(),
            options,
        };
        let response = self.call(request).await?;
        parse_cid(&response.cid.link).map_err(|err| IpfsError::cid(err).at(self.remote.as_str()))
    }
}
