use crate::{
    common::{
        entity::{self, Entity, WireRecord},
        key::Keys,
        query,
    },
    error::Result,
    read,
    transport::{self, ClientOptions, Method, TableRequest, TableTransport},
};

/// Get entity operation.
///
/// ```rust,no_run
/// use tables_crud::{common, read, transport};
///
/// # async fn example(client: &impl transport::TableTransport) -> tables_crud::Result<()> {
/// let get_entity = read::get_entity::GetEntity {
///     keys: common::key::Keys {
///         partition_key: "users".to_string(),
///         row_key: "1".to_string(),
///     },
///     table_name: "users".to_string(),
///     ..Default::default()
/// };
/// let user = get_entity
///     .send(client, &transport::ClientOptions::default())
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct GetEntity {
    /// The primary key of the entity to retrieve.
    pub keys: Keys,
    /// Properties to return; all of them when `None`.
    pub select: Option<Vec<String>>,
    /// The name of the table holding the entity.
    pub table_name: String,
}

impl From<GetEntity> for TableRequest {
    fn from(get_entity: GetEntity) -> Self {
        let mut request = TableRequest::new(
            Method::Get,
            format!(
                "/{}{}",
                get_entity.table_name,
                get_entity.keys.to_path_segment()
            ),
        );
        if let Some(select) = query::selection(get_entity.select.as_deref()) {
            request.query.push(("$select".to_string(), select));
        }
        request
    }
}

impl GetEntity {
    /// Execute the get entity operation.
    ///
    /// The entity tag comes from the body annotation, or from the `ETag` header when the
    /// body carries none.
    ///
    /// # Errors
    ///
    /// A missing entity surfaces as [`crate::Error::Service`] with status 404.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tables_crud.get_entity",
            skip_all,
            fields(table = %self.table_name),
            err
        )
    )]
    pub async fn send<T: TableTransport + ?Sized>(
        self,
        transport: &T,
        options: &ClientOptions,
    ) -> Result<Entity> {
        let mut response = transport::execute(transport, options, self.into()).await?;
        let record: WireRecord = read::common::take_body(&mut response)?;
        let mut entity = entity::deserialize(&record)?;
        if entity.etag.is_none() {
            entity.etag = response.header(transport::ETAG).map(str::to_string);
        }
        Ok(entity)
    }
}
