use crate::{
    common::{
        continuation::{self, TableContinuationToken},
        query::QueryOptions,
    },
    error::Result,
    pager::Page,
    read::{self, common::TableProperties},
    transport::{self, ClientOptions, Method, TableRequest, TableTransport},
};

/// Query tables operation: fetch a single page of the account's table names.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct QueryTables {
    /// Where to resume; the default starts from the first page.
    pub continuation: TableContinuationToken,
    /// Filter on table names and page size.
    pub query_options: QueryOptions,
}

impl From<QueryTables> for TableRequest {
    fn from(query_tables: QueryTables) -> Self {
        let mut request = TableRequest::new(Method::Get, "/Tables");
        request.query = query_tables.query_options.to_query_parameters();
        if let Some(next_table_name) = query_tables.continuation.next_table_name {
            request
                .query
                .push((continuation::NEXT_TABLE_NAME.to_string(), next_table_name));
        }
        request
    }
}

impl QueryTables {
    /// Execute the query tables operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "tables_crud.query_tables", skip_all, err)
    )]
    pub async fn send<T: TableTransport + ?Sized>(
        self,
        transport: &T,
        options: &ClientOptions,
    ) -> Result<Page<String, TableContinuationToken>> {
        let mut response = transport::execute(transport, options, self.into()).await?;
        let continuation = TableContinuationToken::from(&response);
        let tables: Vec<TableProperties> = read::common::take_records(&mut response)?;
        Ok(Page {
            items: tables.into_iter().map(|table| table.table_name).collect(),
            continuation,
        })
    }
}
