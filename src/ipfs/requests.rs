use libipld::Cid;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder, Url,
};
use serde::{de::DeserializeOwned, Deserialize};

use super::{DagPutOptions, IpfsError};

/// A Kubo RPC call answered with a JSON document
pub trait KuboRequest {
    /// Has a response type
    type ResponseType: DeserializeOwned;

    /// Builds a Reqwest request against the API root
    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, IpfsError>;
}

/// A Kubo RPC call answered with raw bytes
pub trait RawKuboRequest {
    /// Builds a Reqwest request against the API root
    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, IpfsError>;
}

/// `POST /api/v0/ls?arg=<cid>`
#[derive(Debug)]
pub struct LsRequest {
    pub cid: Cid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LsResponse {
    pub objects: Vec<LsObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LsObject {
    #[allow(dead_code)]
    pub hash: String,
    #[serde(default)]
    pub links: Vec<LsLink>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LsLink {
    pub name: String,
    pub hash: String,
    #[serde(default)]
    pub size: u64,
}

impl KuboRequest for LsRequest {
    type ResponseType = LsResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, IpfsError> {
        let full_url = base_url.join("api/v0/ls")?;
        let arg = self.cid.to_string();
        Ok(client
            .post(full_url)
            .query(&[("arg", arg.as_str()), ("resolve-type", "false")]))
    }
}

/// `POST /api/v0/add` with a single file part
#[derive(Debug)]
pub struct AddRequest {
    pub bytes: Vec<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddResponse {
    pub hash: String,
    /// Kubo reports the cumulative size as a decimal string
    pub size: String,
}

impl KuboRequest for AddRequest {
    type ResponseType = AddResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, IpfsError> {
        let full_url = base_url.join("api/v0/add")?;
        let form = Form::new().part("file", Part::bytes(self.bytes).file_name("file"));
        Ok(client
            .post(full_url)
            .query(&[("cid-version", "0"), ("pin", "true")])
            .multipart(form))
    }
}

/// `POST /api/v0/block/get?arg=<cid>`
#[derive(Debug)]
pub struct BlockGetRequest {
    pub cid: Cid,
}

impl RawKuboRequest for BlockGetRequest {
    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, IpfsError> {
        let full_url = base_url.join("api/v0/block/get")?;
        Ok(client
            .post(full_url)
            .query(&[("arg", self.cid.to_string())]))
    }
}

/// `POST /api/v0/dag/put` with an already encoded block
#[derive(Debug)]
pub struct DagPutRequest {
    pub block: Vec<u8>,
    pub options: DagPutOptions,
}

#[derive(Debug, Deserialize)]
pub struct DagPutResponse {
    #[serde(rename = "Cid")]
    pub cid: CidLink,
}

/// dag-json link form `{"/": "<cid>"}`
#[derive(Debug, Deserialize)]
pub struct CidLink {
    #[serde(rename = "/")]
    pub link: String,
}

impl KuboRequest for DagPutRequest {
    type ResponseType = DagPutResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, IpfsError> {
        let full_url = base_url.join("api/v0/dag/put")?;
        let codec = self.options.format.as_str();
        let form = Form::new().part("file", Part::bytes(self.block).file_name("node"));
        Ok(client
            .post(full_url)
            .query(&[
                ("store-codec", codec),
                ("input-codec", codec),
                ("hash", self.options.hash_alg.as_str()),
                ("pin", "true"),
            ])
            .multipart(form))
    }
}
