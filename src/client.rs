//! Clients bundling a transport with the client-wide options.
//!
//! [`TableServiceClient`] works at the account level; [`TableClient`] is bound to one
//! table. Both are thin wrappers over the operations in [`crate::read`] and
//! [`crate::write`].

use crate::{
    common::{
        continuation::{ContinuationToken, TableContinuationToken},
        entity::Entity,
        key::Keys,
        query::QueryOptions,
    },
    error::Result,
    pager::{ItemsPager, Page, PagesPager},
    read::{get_entity::GetEntity, query_entities::QueryEntities, query_tables::QueryTables},
    transport::{ClientOptions, TableTransport},
    write::{
        common::{ANY_ETAG, UpdateMode, WriteOutput},
        create_table::CreateTable,
        delete_entity::DeleteEntity,
        delete_table::DeleteTable,
        insert_entity::InsertEntity,
        update_entity::UpdateEntity,
    },
};

use futures_core::Stream;

/// Account-level client: manages tables and reaches entities by table name.
///
/// ```rust,no_run
/// use futures_util::TryStreamExt;
/// use tables_crud::{client, common, transport};
///
/// # async fn example(transport: impl transport::TableTransport) -> tables_crud::Result<()> {
/// let service = client::TableServiceClient::new(transport);
/// service.create_table("users").await?;
/// let users: Vec<common::entity::Entity> = service
///     .list_entities("users", common::query::QueryOptions::default())
///     .try_collect()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct TableServiceClient<T> {
    transport: T,
    options: ClientOptions,
}

impl<T: TableTransport> TableServiceClient<T> {
    /// Create a client with default options.
    pub fn new(transport: T) -> Self {
        Self::with_options(transport, ClientOptions::default())
    }

    /// Create a client with the given options.
    pub fn with_options(transport: T, options: ClientOptions) -> Self {
        Self { transport, options }
    }

    /// A client bound to one table, sharing this client's transport and options.
    pub fn table_client(&self, table_name: impl Into<String>) -> TableClient<T>
    where
        T: Clone,
    {
        TableClient {
            table_name: table_name.into(),
            transport: self.transport.clone(),
            options: self.options.clone(),
        }
    }

    /// Create a table.
    pub async fn create_table(&self, table_name: &str) -> Result<()> {
        CreateTable {
            table_name: table_name.to_string(),
        }
        .send(&self.transport, &self.options)
        .await
    }

    /// Delete a table and every entity in it.
    pub async fn delete_table(&self, table_name: &str) -> Result<()> {
        DeleteTable {
            table_name: table_name.to_string(),
        }
        .send(&self.transport, &self.options)
        .await
    }

    /// Lazily list the pages of table names.
    pub fn list_tables_pages<'a>(
        &'a self,
        query_options: QueryOptions,
    ) -> impl Stream<Item = Result<Page<String, TableContinuationToken>>> + use<'a, T> {
        PagesPager::new(move |continuation| {
            QueryTables {
                continuation,
                query_options: query_options.clone(),
            }
            .send(&self.transport, &self.options)
        })
    }

    /// Lazily list table names across every page.
    pub fn list_tables<'a>(
        &'a self,
        query_options: QueryOptions,
    ) -> impl Stream<Item = Result<String>> + use<'a, T> {
        ItemsPager::<String, _, _, _>::from_pages(PagesPager::new(move |continuation| {
            QueryTables {
                continuation,
                query_options: query_options.clone(),
            }
            .send(&self.transport, &self.options)
        }))
    }

    /// Fetch a single page of entities from a table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidContinuation`] without contacting the service
    /// when the continuation carries only one of its two keys.
    pub async fn query_page(
        &self,
        table_name: &str,
        query_options: QueryOptions,
        continuation: ContinuationToken,
    ) -> Result<Page<Entity, ContinuationToken>> {
        QueryEntities {
            continuation,
            query_options,
            table_name: table_name.to_string(),
        }
        .send(&self.transport, &self.options)
        .await
    }

    /// Lazily list the pages of entities matching the query.
    ///
    /// Nothing is fetched until the stream is first polled, and each further page only
    /// when the consumer asks for it. The stream ends after the last page or after the
    /// first error; call again to start over.
    pub fn list_pages<'a>(
        &'a self,
        table_name: &str,
        query_options: QueryOptions,
    ) -> impl Stream<Item = Result<Page<Entity, ContinuationToken>>> + use<'a, T> {
        self.list_pages_from(table_name, query_options, ContinuationToken::default())
    }

    /// Lazily list the pages of entities, resuming from a continuation obtained from an
    /// earlier page.
    ///
    /// A continuation carrying only one of its two keys makes the first item
    /// [`crate::Error::InvalidContinuation`].
    pub fn list_pages_from<'a>(
        &'a self,
        table_name: &str,
        query_options: QueryOptions,
        continuation: ContinuationToken,
    ) -> impl Stream<Item = Result<Page<Entity, ContinuationToken>>> + use<'a, T> {
        let table_name = table_name.to_string();
        PagesPager::with_continuation(continuation, move |continuation| {
            QueryEntities {
                continuation,
                query_options: query_options.clone(),
                table_name: table_name.clone(),
            }
            .send(&self.transport, &self.options)
        })
    }

    /// Lazily list the entities matching the query, across every page.
    ///
    /// Every entity of a page is yielded before the next page is requested.
    pub fn list_entities<'a>(
        &'a self,
        table_name: &str,
        query_options: QueryOptions,
    ) -> impl Stream<Item = Result<Entity>> + use<'a, T> {
        let table_name = table_name.to_string();
        ItemsPager::<Entity, _, _, _>::new(move |continuation| {
            QueryEntities {
                continuation,
                query_options: query_options.clone(),
                table_name: table_name.clone(),
            }
            .send(&self.transport, &self.options)
        })
    }
}

/// Client bound to a single table.
#[derive(Clone, Debug)]
pub struct TableClient<T> {
    table_name: String,
    transport: T,
    options: ClientOptions,
}

impl<T: TableTransport> TableClient<T> {
    /// Create a client for one table with default options.
    pub fn new(transport: T, table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            transport,
            options: ClientOptions::default(),
        }
    }

    /// The name of the table this client is bound to.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Fetch one entity, optionally restricted to some properties.
    pub async fn get_entity(
        &self,
        partition_key: &str,
        row_key: &str,
        select: Option<Vec<String>>,
    ) -> Result<Entity> {
        GetEntity {
            keys: Keys {
                partition_key: partition_key.to_string(),
                row_key: row_key.to_string(),
            },
            select,
            table_name: self.table_name.clone(),
        }
        .send(&self.transport, &self.options)
        .await
    }

    /// Insert a new entity.
    pub async fn create_entity(&self, entity: Entity) -> Result<WriteOutput> {
        InsertEntity {
            entity,
            table_name: self.table_name.clone(),
        }
        .send(&self.transport, &self.options)
        .await
    }

    /// Update an existing entity.
    ///
    /// With `if_match` the update only applies to that entity tag; without it the entity
    /// only has to exist.
    pub async fn update_entity(
        &self,
        entity: Entity,
        mode: UpdateMode,
        if_match: Option<&str>,
    ) -> Result<WriteOutput> {
        UpdateEntity {
            entity,
            if_match: Some(if_match.unwrap_or(ANY_ETAG).to_string()),
            mode,
            table_name: self.table_name.clone(),
        }
        .send(&self.transport, &self.options)
        .await
    }

    /// Update an entity, creating it when it does not exist.
    pub async fn upsert_entity(&self, entity: Entity, mode: UpdateMode) -> Result<WriteOutput> {
        UpdateEntity {
            entity,
            if_match: None,
            mode,
            table_name: self.table_name.clone(),
        }
        .send(&self.transport, &self.options)
        .await
    }

    /// Delete an entity, unconditionally unless `if_match` is given.
    pub async fn delete_entity(
        &self,
        partition_key: &str,
        row_key: &str,
        if_match: Option<&str>,
    ) -> Result<()> {
        DeleteEntity {
            if_match: if_match.map(str::to_string),
            keys: Keys {
                partition_key: partition_key.to_string(),
                row_key: row_key.to_string(),
            },
            table_name: self.table_name.clone(),
        }
        .send(&self.transport, &self.options)
        .await
    }

    /// Fetch a single page of entities.
    pub async fn query_page(
        &self,
        query_options: QueryOptions,
        continuation: ContinuationToken,
    ) -> Result<Page<Entity, ContinuationToken>> {
        QueryEntities {
            continuation,
            query_options,
            table_name: self.table_name.clone(),
        }
        .send(&self.transport, &self.options)
        .await
    }

    /// Lazily list the pages of entities matching the query.
    pub fn list_pages(
        &self,
        query_options: QueryOptions,
    ) -> impl Stream<Item = Result<Page<Entity, ContinuationToken>>> + use<'_, T> {
        self.list_pages_from(query_options, ContinuationToken::default())
    }

    /// Lazily list the pages of entities, resuming from an earlier page's continuation.
    pub fn list_pages_from(
        &self,
        query_options: QueryOptions,
        continuation: ContinuationToken,
    ) -> impl Stream<Item = Result<Page<Entity, ContinuationToken>>> + use<'_, T> {
        PagesPager::with_continuation(continuation, move |continuation| {
            QueryEntities {
                continuation,
                query_options: query_options.clone(),
                table_name: self.table_name.clone(),
            }
            .send(&self.transport, &self.options)
        })
    }

    /// Lazily list the entities matching the query, across every page.
    pub fn list_entities(
        &self,
        query_options: QueryOptions,
    ) -> impl Stream<Item = Result<Entity>> + use<'_, T> {
        ItemsPager::<Entity, _, _, _>::new(move |continuation| {
            QueryEntities {
                continuation,
                query_options: query_options.clone(),
                table_name: self.table_name.clone(),
            }
            .send(&self.transport, &self.options)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Error,
        transport::{
            Method,
            mock::{MockTransport, response},
        },
    };

    use futures_util::{StreamExt, TryStreamExt};
    use serde_json::{Value, json};
    use std::{pin::pin, sync::Arc};

    fn entities_response(rows: &[&str], continuation: Option<(&str, &str)>) -> crate::transport::TableResponse {
        let value: Vec<Value> = rows
            .iter()
            .map(|row| json!({"PartitionKey": "A", "RowKey": row}))
            .collect();
        let headers: Vec<(&str, &str)> = match continuation {
            Some((partition_key, row_key)) => vec![
                ("x-ms-continuation-NextPartitionKey", partition_key),
                ("x-ms-continuation-NextRowKey", row_key),
            ],
            None => vec![],
        };
        response(200, &headers, Some(json!({ "value": value })))
    }

    fn query_parameter<'a>(query: &'a [(String, String)], name: &str) -> Option<&'a str> {
        query
            .iter()
            .find(|(parameter, _)| parameter == name)
            .map(|(_, value)| value.as_str())
    }

    #[tokio::test]
    async fn test_list_entities_follows_continuation() {
        let transport = MockTransport::ok([
            entities_response(&["0", "1"], Some(("A", "1"))),
            entities_response(&["2"], None),
        ]);
        let service = TableServiceClient::new(transport);
        let entities: Vec<Entity> = service
            .list_entities("users", QueryOptions::default())
            .try_collect()
            .await
            .unwrap();
        let rows: Vec<_> = entities.iter().map(|entity| entity.row_key()).collect();
        assert_eq!(rows, vec![Some("0"), Some("1"), Some("2")]);
        let requests = service.transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(query_parameter(&requests[0].query, "NextPartitionKey"), None);
        assert_eq!(query_parameter(&requests[0].query, "NextRowKey"), None);
        assert_eq!(query_parameter(&requests[1].query, "NextPartitionKey"), Some("A"));
        assert_eq!(query_parameter(&requests[1].query, "NextRowKey"), Some("1"));
    }

    #[tokio::test]
    async fn test_list_pages_is_lazy() {
        let transport = MockTransport::ok([
            entities_response(&["0"], Some(("A", "1"))),
            entities_response(&["1"], None),
        ]);
        let service = TableServiceClient::new(transport);
        let mut pages = pin!(service.list_pages("users", QueryOptions::default()));
        assert!(service.transport.requests().is_empty());
        let first = pages.next().await.unwrap().unwrap();
        assert_eq!(first.items.len(), 1);
        assert_eq!(service.transport.requests().len(), 1);
        let second = pages.next().await.unwrap().unwrap();
        assert_eq!(second.continuation, ContinuationToken::default());
        assert!(pages.next().await.is_none());
        assert_eq!(service.transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_list_pages_from_resumes_at_continuation() {
        let transport = MockTransport::ok([entities_response(&["1", "2"], None)]);
        let users = TableClient::new(transport, "users");
        let pages: Vec<_> = users
            .list_pages_from(
                QueryOptions::default(),
                ContinuationToken {
                    next_partition_key: Some("A".to_string()),
                    next_row_key: Some("1".to_string()),
                },
            )
            .try_collect()
            .await
            .unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].items.len(), 2);
        let requests = users.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(query_parameter(&requests[0].query, "NextPartitionKey"), Some("A"));
        assert_eq!(query_parameter(&requests[0].query, "NextRowKey"), Some("1"));
    }

    #[tokio::test]
    async fn test_list_pages_from_partial_continuation() {
        let service = TableServiceClient::new(MockTransport::ok([]));
        let mut pages = pin!(service.list_pages_from(
            "users",
            QueryOptions::default(),
            ContinuationToken {
                next_partition_key: Some("A".to_string()),
                next_row_key: None,
            },
        ));
        assert!(matches!(
            pages.next().await,
            Some(Err(Error::InvalidContinuation { .. }))
        ));
        assert!(pages.next().await.is_none());
        assert!(service.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_list_entities_stops_after_error() {
        let transport = MockTransport::new([
            Ok(entities_response(&["0"], Some(("A", "1")))),
            Ok(response(500, &[], None)),
        ]);
        let service = TableServiceClient::new(transport);
        let mut entities = pin!(service.list_entities("users", QueryOptions::default()));
        assert!(entities.next().await.unwrap().is_ok());
        assert!(matches!(
            entities.next().await,
            Some(Err(Error::Service(error))) if error.status == 500
        ));
        assert!(entities.next().await.is_none());
        assert_eq!(service.transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_query_page_rejects_partial_continuation() {
        let service = TableServiceClient::new(MockTransport::ok([]));
        let actual = service
            .query_page(
                "users",
                QueryOptions::default(),
                ContinuationToken {
                    next_partition_key: None,
                    next_row_key: Some("1".to_string()),
                },
            )
            .await;
        assert!(matches!(actual, Err(Error::InvalidContinuation { .. })));
        assert!(service.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_list_tables() {
        let transport = MockTransport::ok([
            response(
                200,
                &[("x-ms-continuation-NextTableName", "b")],
                Some(json!({"value": [{"TableName": "a"}]})),
            ),
            response(200, &[], Some(json!({"value": [{"TableName": "b"}]}))),
        ]);
        let service = TableServiceClient::new(transport);
        let tables: Vec<String> = service
            .list_tables(QueryOptions::default())
            .try_collect()
            .await
            .unwrap();
        assert_eq!(tables, vec!["a".to_string(), "b".to_string()]);
        let requests = service.transport.requests();
        assert_eq!(query_parameter(&requests[1].query, "NextTableName"), Some("b"));
    }

    #[tokio::test]
    async fn test_table_client_write_operations() {
        let transport = Arc::new(MockTransport::ok([
            response(204, &[("ETag", "W/\"1\"")], None),
            response(204, &[("ETag", "W/\"2\"")], None),
            response(204, &[("ETag", "W/\"3\"")], None),
            response(204, &[], None),
        ]));
        let service = TableServiceClient::new(transport.clone());
        let users = service.table_client("users");
        assert_eq!(users.table_name(), "users");
        let created = users.create_entity(Entity::new("a", "b")).await.unwrap();
        assert_eq!(created.etag.as_deref(), Some("W/\"1\""));
        users
            .update_entity(Entity::new("a", "b"), UpdateMode::Replace, None)
            .await
            .unwrap();
        users
            .upsert_entity(Entity::new("a", "b"), UpdateMode::Merge)
            .await
            .unwrap();
        users.delete_entity("a", "b", Some("W/\"3\"")).await.unwrap();
        let requests = transport.requests();
        let summary: Vec<_> = requests
            .iter()
            .map(|request| {
                (
                    request.method,
                    crate::common::find_header(&request.headers, "If-Match").map(str::to_string),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                (Method::Post, None),
                (Method::Put, Some("*".to_string())),
                (Method::Patch, None),
                (Method::Delete, Some("W/\"3\"".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_table_client_get_entity() {
        let transport = MockTransport::ok([response(
            200,
            &[],
            Some(json!({
                "PartitionKey": "a",
                "RowKey": "b",
                "id": "123e4567-e89b-12d3-a456-426614174000",
                "id@odata.type": "Edm.Guid",
            })),
        )]);
        let users = TableClient::new(transport, "users");
        let entity = users
            .get_entity("a", "b", Some(vec!["id".to_string()]))
            .await
            .unwrap();
        assert_eq!(
            entity.get("id"),
            Some(&crate::common::edm::EdmValue::guid("123e4567-e89b-12d3-a456-426614174000").into())
        );
        let request = &users.transport.requests()[0];
        assert_eq!(request.path, "/users(PartitionKey='a',RowKey='b')");
        assert_eq!(query_parameter(&request.query, "$select"), Some("id"));
    }
}
