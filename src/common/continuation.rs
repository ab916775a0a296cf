use crate::error::{Error, Result};

pub(crate) const NEXT_PARTITION_KEY: &str = "NextPartitionKey";
pub(crate) const NEXT_ROW_KEY: &str = "NextRowKey";
pub(crate) const NEXT_TABLE_NAME: &str = "NextTableName";
pub(crate) const NEXT_PARTITION_KEY_HEADER: &str = "x-ms-continuation-NextPartitionKey";
pub(crate) const NEXT_ROW_KEY_HEADER: &str = "x-ms-continuation-NextRowKey";
pub(crate) const NEXT_TABLE_NAME_HEADER: &str = "x-ms-continuation-NextTableName";

/// Cursor returned alongside a page, telling whether and where a listing continues.
pub trait Continuation: Clone + Default {
    /// Whether no further page exists.
    fn is_exhausted(&self) -> bool;
}

/// Continuation of an entity query: the keys of the first entity of the next page.
///
/// Both fields are supplied together, or neither to start a fresh query.
///
/// ```rust
/// use tables_crud::common::continuation::{Continuation, ContinuationToken};
///
/// let token = ContinuationToken {
///     next_partition_key: Some("A".to_string()),
///     next_row_key: Some("1".to_string()),
/// };
/// assert!(!token.is_exhausted());
/// assert!(ContinuationToken::default().is_exhausted());
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ContinuationToken {
    /// Partition key to resume from.
    pub next_partition_key: Option<String>,
    /// Row key to resume from.
    pub next_row_key: Option<String>,
}

impl ContinuationToken {
    /// The `(partition key, row key)` pair to forward, `None` for a fresh query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContinuation`] when only one of the two fields is set.
    pub fn validate(&self) -> Result<Option<(&str, &str)>> {
        match (&self.next_partition_key, &self.next_row_key) {
            (Some(partition_key), Some(row_key)) => {
                Ok(Some((partition_key.as_str(), row_key.as_str())))
            }
            (None, None) => Ok(None),
            (next_partition_key, next_row_key) => Err(Error::InvalidContinuation {
                next_partition_key: next_partition_key.clone(),
                next_row_key: next_row_key.clone(),
            }),
        }
    }
}

impl Continuation for ContinuationToken {
    fn is_exhausted(&self) -> bool {
        self.next_partition_key.is_none() && self.next_row_key.is_none()
    }
}

/// Continuation of a table listing.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct TableContinuationToken {
    /// Table name to resume from.
    pub next_table_name: Option<String>,
}

impl Continuation for TableContinuationToken {
    fn is_exhausted(&self) -> bool {
        self.next_table_name.is_none()
    }
}
