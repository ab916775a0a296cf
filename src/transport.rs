//! The seam between this crate and the HTTP layer.
//!
//! Operations build [`TableRequest`]s ready for the wire and hand them to a
//! [`TableTransport`], which owns connections, signing and retries.

use crate::{
    common,
    error::{Error, Result, ServiceError, TransportError},
};

use async_trait::async_trait;
use serde_json::Value;

const ACCEPT: &str = "Accept";
const CONTENT_TYPE: &str = "Content-Type";
const DATA_SERVICE_VERSION: &str = "DataServiceVersion";
const JSON: &str = "application/json";
pub(crate) const ETAG: &str = "ETag";
pub(crate) const IF_MATCH: &str = "If-Match";
pub(crate) const PREFER: &str = "Prefer";
pub(crate) const RETURN_NO_CONTENT: &str = "return-no-content";

/// HTTP method of a request.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    /// `DELETE`
    Delete,
    /// `GET`
    Get,
    /// `PATCH`, used to merge entities.
    Patch,
    /// `POST`
    Post,
    /// `PUT`, used to replace entities.
    Put,
}

impl Method {
    /// The method name as written on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Get => "GET",
            Self::Patch => "PATCH",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

/// A request ready for transmission.
///
/// The path is relative to the account endpoint and is not percent-encoded; query
/// parameters are raw name/value pairs.
#[derive(Clone, Debug, PartialEq)]
pub struct TableRequest {
    /// The HTTP method.
    pub method: Method,
    /// Resource path, e.g. `/users(PartitionKey='a',RowKey='b')`.
    pub path: String,
    /// Query parameters, in order.
    pub query: Vec<(String, String)>,
    /// Request headers, in order.
    pub headers: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl TableRequest {
    pub(crate) fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }
}

/// A response as received from the service.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// JSON body, if the response had one.
    pub body: Option<Value>,
}

impl TableResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        common::find_header(&self.headers, name)
    }
}

/// Sends requests to the service.
///
/// Implementations return `Ok` for every response received, whatever its status;
/// `Err` is reserved for failures to exchange the request at all.
#[async_trait]
pub trait TableTransport: Send + Sync {
    /// Send one request and wait for its response.
    async fn send(&self, request: TableRequest) -> std::result::Result<TableResponse, TransportError>;
}

#[async_trait]
impl<T: TableTransport + ?Sized> TableTransport for std::sync::Arc<T> {
    async fn send(&self, request: TableRequest) -> std::result::Result<TableResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Amount of OData metadata requested in JSON responses.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum MetadataFormat {
    /// Every property comes with its type annotation.
    Full,
    /// Only type annotations the JSON value cannot express (the service default).
    #[default]
    Minimal,
    /// No annotations at all.
    None,
}

impl MetadataFormat {
    fn accept(self) -> &'static str {
        match self {
            Self::Full => "application/json;odata=fullmetadata",
            Self::Minimal => "application/json;odata=minimalmetadata",
            Self::None => "application/json;odata=nometadata",
        }
    }
}

/// Client-wide settings applied to every request.
///
/// ```rust
/// use tables_crud::transport;
///
/// let options = transport::ClientOptions {
///     metadata: transport::MetadataFormat::Full,
///     ..Default::default()
/// };
/// assert_eq!(options.data_service_version, "3.0");
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ClientOptions {
    /// Value of the `DataServiceVersion` header.
    pub data_service_version: String,
    /// Metadata level requested through the `Accept` header.
    pub metadata: MetadataFormat,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            data_service_version: "3.0".to_string(),
            metadata: MetadataFormat::default(),
        }
    }
}

impl ClientOptions {
    fn apply(&self, request: &mut TableRequest) {
        request
            .headers
            .push((ACCEPT.to_string(), self.metadata.accept().to_string()));
        request.headers.push((
            DATA_SERVICE_VERSION.to_string(),
            self.data_service_version.clone(),
        ));
        if request.body.is_some() {
            request
                .headers
                .push((CONTENT_TYPE.to_string(), JSON.to_string()));
        }
    }
}

/// Send a request with the client-wide headers, turning non-2xx responses into
/// [`Error::Service`].
pub(crate) async fn execute<T: TableTransport + ?Sized>(
    transport: &T,
    options: &ClientOptions,
    mut request: TableRequest,
) -> Result<TableResponse> {
    options.apply(&mut request);
    #[cfg(feature = "tracing")]
    tracing::debug!(method = request.method.as_str(), path = %request.path, "sending request");
    let response = transport.send(request).await.map_err(Error::Transport)?;
    if response.is_success() {
        Ok(response)
    } else {
        Err(ServiceError::from_body(response.status, response.body.as_ref()).into())
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    use std::{collections, sync};

    /// Replays canned responses in order and records every request it receives.
    #[derive(Default)]
    pub(crate) struct MockTransport {
        requests: sync::Mutex<Vec<TableRequest>>,
        responses: sync::Mutex<collections::VecDeque<std::result::Result<TableResponse, String>>>,
    }

    impl MockTransport {
        pub(crate) fn new(
            responses: impl IntoIterator<Item = std::result::Result<TableResponse, String>>,
        ) -> Self {
            Self {
                requests: sync::Mutex::default(),
                responses: sync::Mutex::new(responses.into_iter().collect()),
            }
        }

        pub(crate) fn ok(responses: impl IntoIterator<Item = TableResponse>) -> Self {
            Self::new(responses.into_iter().map(Ok))
        }

        pub(crate) fn requests(&self) -> Vec<TableRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TableTransport for MockTransport {
        async fn send(
            &self,
            request: TableRequest,
        ) -> std::result::Result<TableResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(response)) => Ok(response),
                Some(Err(message)) => Err(message.into()),
                None => Err("no response left".into()),
            }
        }
    }

    pub(crate) fn response(status: u16, headers: &[(&str, &str)], body: Option<Value>) -> TableResponse {
        TableResponse {
            status,
            headers: headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            body,
        }
    }
}
