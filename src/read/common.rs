use crate::{
    common::continuation::{
        ContinuationToken, NEXT_PARTITION_KEY_HEADER, NEXT_ROW_KEY_HEADER, NEXT_TABLE_NAME_HEADER,
        TableContinuationToken,
    },
    error::{Error, Result},
    transport::TableResponse,
};

use serde::{Deserialize, de::DeserializeOwned};

#[derive(Deserialize)]
struct QueryResponseBody<T> {
    value: Vec<T>,
}

/// Table description returned by table listings.
#[derive(Deserialize)]
pub(crate) struct TableProperties {
    #[serde(rename = "TableName")]
    pub(crate) table_name: String,
}

pub(crate) fn take_body<T: DeserializeOwned>(response: &mut TableResponse) -> Result<T> {
    let body = response
        .body
        .take()
        .ok_or_else(|| Error::InvalidResponse("missing response body".to_string()))?;
    serde_json::from_value(body).map_err(|error| Error::InvalidResponse(error.to_string()))
}

pub(crate) fn take_records<T: DeserializeOwned>(response: &mut TableResponse) -> Result<Vec<T>> {
    let body: QueryResponseBody<T> = take_body(response)?;
    Ok(body.value)
}

impl From<&TableResponse> for ContinuationToken {
    fn from(response: &TableResponse) -> Self {
        Self {
            next_partition_key: response.header(NEXT_PARTITION_KEY_HEADER).map(str::to_string),
            next_row_key: response.header(NEXT_ROW_KEY_HEADER).map(str::to_string),
        }
    }
}

impl From<&TableResponse> for TableContinuationToken {
    fn from(response: &TableResponse) -> Self {
        Self {
            next_table_name: response.header(NEXT_TABLE_NAME_HEADER).map(str::to_string),
        }
    }
}
