use crate::{
    common::{
        continuation::{self, ContinuationToken},
        entity::{self, Entity, WireRecord},
        query::QueryOptions,
    },
    error::{Error, Result},
    pager::Page,
    read,
    transport::{self, ClientOptions, Method, TableRequest, TableTransport},
};

/// Query entities operation: fetch a single page of a table's entities.
///
/// Use [`crate::client::TableClient::list_entities`] to walk every page.
///
/// ```rust,no_run
/// use tables_crud::{common, read, transport};
///
/// # async fn example(client: &impl transport::TableTransport) -> tables_crud::Result<()> {
/// let query_entities = read::query_entities::QueryEntities {
///     query_options: common::query::QueryOptions {
///         filter: Some("PartitionKey eq 'users'".to_string()),
///         top: Some(100),
///         ..Default::default()
///     },
///     table_name: "users".to_string(),
///     ..Default::default()
/// };
/// let page = query_entities
///     .send(client, &transport::ClientOptions::default())
///     .await?;
/// for user in &page.items {
///     println!("{:?}", user.row_key());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct QueryEntities {
    /// Where to resume; the default starts from the first page.
    pub continuation: ContinuationToken,
    /// Filter, selection and page size.
    pub query_options: QueryOptions,
    /// The name of the table to query.
    pub table_name: String,
}

impl TryFrom<QueryEntities> for TableRequest {
    type Error = Error;

    fn try_from(query_entities: QueryEntities) -> Result<Self> {
        let mut request = TableRequest::new(
            Method::Get,
            format!("/{}()", query_entities.table_name),
        );
        request.query = query_entities.query_options.to_query_parameters();
        if let Some((partition_key, row_key)) = query_entities.continuation.validate()? {
            request.query.push((
                continuation::NEXT_PARTITION_KEY.to_string(),
                partition_key.to_string(),
            ));
            request
                .query
                .push((continuation::NEXT_ROW_KEY.to_string(), row_key.to_string()));
        }
        Ok(request)
    }
}

impl QueryEntities {
    /// Execute the query entities operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContinuation`] before any request is sent when the
    /// continuation carries only one of its two keys.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tables_crud.query_entities",
            skip_all,
            fields(table = %self.table_name),
            err
        )
    )]
    pub async fn send<T: TableTransport + ?Sized>(
        self,
        transport: &T,
        options: &ClientOptions,
    ) -> Result<Page<Entity, ContinuationToken>> {
        let request: TableRequest = self.try_into()?;
        let mut response = transport::execute(transport, options, request).await?;
        let continuation = ContinuationToken::from(&response);
        let records: Vec<WireRecord> = read::common::take_records(&mut response)?;
        let items = entity::deserialize_many(&records)?;
        Ok(Page {
            items,
            continuation,
        })
    }
}
