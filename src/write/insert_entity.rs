use crate::{
    common::{
        entity::{self, Entity},
        key::Keys,
    },
    error::{Error, Result},
    transport::{self, ClientOptions, Method, TableRequest, TableTransport},
    write,
};

use serde_json::Value;

/// Insert entity operation.
///
/// Fails with a conflict when an entity with the same keys already exists.
///
/// ```rust,no_run
/// use tables_crud::{common, transport, write};
///
/// # async fn example(client: &impl transport::TableTransport) -> tables_crud::Result<()> {
/// let mut user = common::entity::Entity::new("users", "1");
/// user.insert("name", "John");
/// user.insert("age", common::edm::EdmValue::new(common::edm::EdmType::Int32, 42));
/// let insert_entity = write::insert_entity::InsertEntity {
///     entity: user,
///     table_name: "users".to_string(),
/// };
/// let output = insert_entity
///     .send(client, &transport::ClientOptions::default())
///     .await?;
/// println!("{:?}", output.etag);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InsertEntity {
    /// The entity to insert, keys included.
    pub entity: Entity,
    /// The name of the table to insert into.
    pub table_name: String,
}

impl TryFrom<InsertEntity> for TableRequest {
    type Error = Error;

    fn try_from(insert_entity: InsertEntity) -> Result<Self> {
        Keys::try_from(&insert_entity.entity)?;
        let record = entity::serialize(&insert_entity.entity)?;
        let mut request = TableRequest::new(Method::Post, format!("/{}", insert_entity.table_name));
        write::common::prefer_no_content(&mut request);
        request.body = Some(Value::Object(record.into_iter().collect()));
        Ok(request)
    }
}

impl InsertEntity {
    /// Execute the insert entity operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingKey`] or [`Error::TypeMismatch`] before any request is
    /// sent when a key is missing or a tagged value does not fit its EDM type.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tables_crud.insert_entity",
            skip_all,
            fields(table = %self.table_name),
            err
        )
    )]
    pub async fn send<T: TableTransport + ?Sized>(
        self,
        transport: &T,
        options: &ClientOptions,
    ) -> Result<write::common::WriteOutput> {
        let request: TableRequest = self.try_into()?;
        let response = transport::execute(transport, options, request).await?;
        Ok((&response).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::edm::{EdmType, EdmValue},
        transport::mock::{MockTransport, response},
    };

    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_insert_entity_into_request() {
        let mut entity = Entity::new("a", "b");
        entity.insert("c", EdmValue::int64("12345678910"));
        entity.insert("d", true);
        let insert_entity = InsertEntity {
            entity,
            table_name: "e".to_string(),
        };
        let actual = TableRequest::try_from(insert_entity).unwrap();
        assert_eq!(
            actual,
            TableRequest {
                method: Method::Post,
                path: "/e".to_string(),
                query: vec![],
                headers: vec![("Prefer".to_string(), "return-no-content".to_string())],
                body: Some(json!({
                    "PartitionKey": "a",
                    "RowKey": "b",
                    "c": "12345678910",
                    "c@odata.type": "Edm.Int64",
                    "d": true,
                })),
            }
        );
    }

    #[tokio::test]
    async fn test_insert_entity_send_type_mismatch_sends_nothing() {
        let transport = MockTransport::ok([]);
        let mut entity = Entity::new("a", "b");
        entity.insert("n", EdmValue::new(EdmType::Int32, "not a number"));
        let insert_entity = InsertEntity {
            entity,
            table_name: "t".to_string(),
        };
        let actual = insert_entity
            .send(&transport, &ClientOptions::default())
            .await;
        assert!(matches!(actual, Err(Error::TypeMismatch { .. })));
        assert!(transport.requests().is_empty());
    }

    #[rstest]
    #[case::no_keys(Entity::from_iter([("name", "x")]), "PartitionKey")]
    #[case::no_row_key(Entity::from_iter([("PartitionKey", "a")]), "RowKey")]
    #[tokio::test]
    async fn test_insert_entity_missing_key(#[case] entity: Entity, #[case] expected: &str) {
        let transport = MockTransport::ok([]);
        let insert_entity = InsertEntity {
            entity,
            table_name: "t".to_string(),
        };
        let actual = insert_entity
            .send(&transport, &ClientOptions::default())
            .await;
        assert!(matches!(actual, Err(Error::MissingKey { property }) if property == expected));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_insert_entity_send_returns_etag() {
        let transport = MockTransport::ok([response(204, &[("ETag", "W/\"1\"")], None)]);
        let insert_entity = InsertEntity {
            entity: Entity::new("a", "b"),
            table_name: "t".to_string(),
        };
        let output = insert_entity
            .send(&transport, &ClientOptions::default())
            .await
            .unwrap();
        assert_eq!(output.etag.as_deref(), Some("W/\"1\""));
    }

    #[tokio::test]
    async fn test_insert_entity_send_conflict() {
        let body = json!({
            "odata.error": {
                "code": "EntityAlreadyExists",
                "message": {"value": "The specified entity already exists."}
            }
        });
        let transport = MockTransport::ok([response(409, &[], Some(body))]);
        let insert_entity = InsertEntity {
            entity: Entity::new("a", "b"),
            table_name: "t".to_string(),
        };
        let actual = insert_entity
            .send(&transport, &ClientOptions::default())
            .await;
        assert!(matches!(
            actual,
            Err(Error::Service(error)) if error.code.as_deref() == Some("EntityAlreadyExists")
        ));
    }
}
