use crate::{
    common::key::Keys,
    error::Result,
    transport::{self, ClientOptions, Method, TableRequest, TableTransport},
    write,
};

/// Delete entity operation.
///
/// ```rust,no_run
/// use tables_crud::{common, transport, write};
///
/// # async fn example(client: &impl transport::TableTransport) -> tables_crud::Result<()> {
/// let delete_entity = write::delete_entity::DeleteEntity {
///     keys: common::key::Keys {
///         partition_key: "users".to_string(),
///         row_key: "1".to_string(),
///     },
///     table_name: "users".to_string(),
///     ..Default::default()
/// };
/// delete_entity
///     .send(client, &transport::ClientOptions::default())
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct DeleteEntity {
    /// Entity tag the stored entity must match; any entity when `None`.
    pub if_match: Option<String>,
    /// The primary key of the entity to delete.
    pub keys: Keys,
    /// The name of the table holding the entity.
    pub table_name: String,
}

impl From<DeleteEntity> for TableRequest {
    fn from(delete_entity: DeleteEntity) -> Self {
        let mut request = TableRequest::new(
            Method::Delete,
            format!(
                "/{}{}",
                delete_entity.table_name,
                delete_entity.keys.to_path_segment()
            ),
        );
        write::common::if_match(
            &mut request,
            delete_entity
                .if_match
                .unwrap_or_else(|| write::common::ANY_ETAG.to_string()),
        );
        request
    }
}

impl DeleteEntity {
    /// Execute the delete entity operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tables_crud.delete_entity",
            skip_all,
            fields(table = %self.table_name),
            err
        )
    )]
    pub async fn send<T: TableTransport + ?Sized>(
        self,
        transport: &T,
        options: &ClientOptions,
    ) -> Result<()> {
        transport::execute(transport, options, self.into()).await?;
        Ok(())
    }
}
