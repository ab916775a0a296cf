use crate::transport::{self, TableRequest, TableResponse};

/// `If-Match` value matching any entity tag.
pub(crate) const ANY_ETAG: &str = "*";

/// How an update combines with the stored entity.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum UpdateMode {
    /// Set the given properties and keep the others (`PATCH`).
    #[default]
    Merge,
    /// Replace the stored entity with the given one (`PUT`).
    Replace,
}

/// Outcome of a write operation.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct WriteOutput {
    /// The new entity tag, when the service reported one.
    pub etag: Option<String>,
}

impl From<&TableResponse> for WriteOutput {
    fn from(response: &TableResponse) -> Self {
        Self {
            etag: response.header(transport::ETAG).map(str::to_string),
        }
    }
}

/// Ask the service not to echo the written resource back.
pub(crate) fn prefer_no_content(request: &mut TableRequest) {
    request.headers.push((
        transport::PREFER.to_string(),
        transport::RETURN_NO_CONTENT.to_string(),
    ));
}

/// Make the request conditional on the given entity tag.
pub(crate) fn if_match(request: &mut TableRequest, etag: impl Into<String>) {
    request
        .headers
        .push((transport::IF_MATCH.to_string(), etag.into()));
}
