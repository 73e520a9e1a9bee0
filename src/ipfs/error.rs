use serde::Deserialize;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use crate::cid::CidError;

/// Errors that can occur while talking to a content-addressed store
#[derive(Debug)]
#[non_exhaustive]
pub struct IpfsError {
    endpoint: Option<String>,
    kind: IpfsErrorKind,
}

impl IpfsError {
    /// Transport level failure
    pub fn http(err: reqwest::Error) -> Self {
        Self {
            endpoint: None,
            kind: IpfsErrorKind::HttpClient(err),
        }
    }

    /// Response body did not match the expected format
    pub fn format(err: reqwest::Error) -> Self {
        Self {
            endpoint: None,
            kind: IpfsErrorKind::ResponseFormat(err),
        }
    }

    /// The node answered with an error document
    pub fn node(err: KuboErrorResponse) -> Self {
        Self {
            endpoint: None,
            kind: IpfsErrorKind::Node(err),
        }
    }

    /// Non-success status without a readable body
    pub fn http_response(status: reqwest::StatusCode) -> Self {
        Self {
            endpoint: None,
            kind: IpfsErrorKind::HttpResponse(status),
        }
    }

    /// Endpoint URL could not be parsed or joined
    pub fn url(err: url::ParseError) -> Self {
        Self {
            endpoint: None,
            kind: IpfsErrorKind::Url(err),
        }
    }

    /// Block could not be decoded as dag-pb
    pub fn dag_codec(message: String) -> Self {
        Self {
            endpoint: None,
            kind: IpfsErrorKind::DagCodec(message),
        }
    }

    /// CID parsing or re-encoding failed
    pub fn cid(err: CidError) -> Self {
        Self {
            endpoint: None,
            kind: IpfsErrorKind::Cid(err),
        }
    }

    /// The store does not hold the requested CID
    pub fn not_found(cid: &libipld::Cid) -> Self {
        Self {
            endpoint: None,
            kind: IpfsErrorKind::NotFound(cid.to_string()),
        }
    }

    /// The store is deliberately refusing requests
    pub fn unavailable() -> Self {
        Self {
            endpoint: None,
            kind: IpfsErrorKind::Unavailable,
        }
    }

    /// Attach the endpoint that produced the error
    pub fn at(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    /// Endpoint that produced the error, if known
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Whether this is a "no such object" failure
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, IpfsErrorKind::NotFound(_))
    }
}

impl Display for IpfsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let prefix = match &self.kind {
            IpfsErrorKind::HttpClient(_) => "HTTP Client Error".to_string(),
            IpfsErrorKind::HttpResponse(status) => format!("HTTP Response Error: {status:?}"),
            IpfsErrorKind::ResponseFormat(_) => "Response Format Error".to_string(),
            IpfsErrorKind::Node(err) => format!("IPFS node error: {err}"),
            IpfsErrorKind::Url(_) => "Invalid IPFS API URL".to_string(),
            IpfsErrorKind::DagCodec(message) => format!("Invalid dag-pb block: {message}"),
            IpfsErrorKind::Cid(_) => "CID Error".to_string(),
            IpfsErrorKind::NotFound(cid) => format!("Object {cid} not found"),
            IpfsErrorKind::Unavailable => "Endpoint unavailable".to_string(),
        };

        if let Some(endpoint) = &self.endpoint {
            write!(f, "[{endpoint}] ")?;
        }
        write!(f, "{prefix}")?;

        let mut next_err = self.source();
        while let Some(err) = next_err {
            write!(f, ": {err}")?;
            next_err = err.source();
        }

        Ok(())
    }
}

impl Error for IpfsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            IpfsErrorKind::HttpClient(err) => Some(err),
            IpfsErrorKind::ResponseFormat(err) => Some(err),
            IpfsErrorKind::Url(err) => Some(err),
            IpfsErrorKind::Cid(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug)]
enum IpfsErrorKind {
    /// Transport level failure
    HttpClient(reqwest::Error),
    /// Non-success status without a readable body
    HttpResponse(reqwest::StatusCode),
    /// Response format was invalid
    ResponseFormat(reqwest::Error),
    /// Error document returned by the node
    Node(KuboErrorResponse),
    /// Bad endpoint URL
    Url(url::ParseError),
    /// Bad dag-pb block
    DagCodec(String),
    /// Bad CID
    Cid(CidError),
    /// Missing object
    NotFound(String),
    /// Refusing requests
    Unavailable,
}

impl From<reqwest::Error> for IpfsError {
    fn from(value: reqwest::Error) -> Self {
        Self::http(value)
    }
}

impl From<url::ParseError> for IpfsError {
    fn from(value: url::ParseError) -> Self {
        Self::url(value)
    }
}

impl From<CidError> for IpfsError {
    fn from(value: CidError) -> Self {
        Self::cid(value)
    }
}

/// Error document of the Kubo RPC API
#[derive(Debug, Deserialize)]
pub struct KuboErrorResponse {
    /// Human readable message
    #[serde(rename = "Message")]
    pub message: String,
    /// Numeric code
    #[serde(rename = "Code", default)]
    pub code: i64,
}

impl Display for KuboErrorResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl Error for KuboErrorResponse {}
