use crate::{
    common::entity::{self, Entity},
    error::{Error, Result},
};

/// Primary key of an entity (partition key and row key).
///
/// ```rust
/// use tables_crud::common::key;
///
/// let keys = key::Keys {
///     partition_key: "users".to_string(),
///     row_key: "1".to_string(),
/// };
/// assert_eq!(keys.to_path_segment(), "(PartitionKey='users',RowKey='1')");
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Keys {
    /// The partition key.
    pub partition_key: String,
    /// The row key.
    pub row_key: String,
}

impl Keys {
    /// The OData key predicate addressing the entity, e.g. `(PartitionKey='p',RowKey='r')`.
    pub fn to_path_segment(&self) -> String {
        format!(
            "({}={},{}={})",
            entity::PARTITION_KEY,
            quote(&self.partition_key),
            entity::ROW_KEY,
            quote(&self.row_key)
        )
    }
}

impl TryFrom<&Entity> for Keys {
    type Error = Error;

    fn try_from(entity: &Entity) -> Result<Self> {
        let partition_key = entity.partition_key().ok_or(Error::MissingKey {
            property: entity::PARTITION_KEY,
        })?;
        let row_key = entity.row_key().ok_or(Error::MissingKey {
            property: entity::ROW_KEY,
        })?;
        Ok(Self {
            partition_key: partition_key.to_string(),
            row_key: row_key.to_string(),
        })
    }
}

/// Quote a string as an OData literal, doubling embedded single quotes.
pub(crate) fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
