use crate::{
    common::{
        entity::{self, Entity},
        key::Keys,
    },
    error::{Error, Result},
    transport::{self, ClientOptions, Method, TableRequest, TableTransport},
    write::{self, common::UpdateMode},
};

use serde_json::Value;

/// Update entity operation: merge into or replace an entity addressed by its own keys.
///
/// Without `if_match` the write is unconditional and creates the entity when it does
/// not exist (an upsert). With `if_match` it only succeeds against that entity tag;
/// pass `"*"` to require that the entity exists.
///
/// ```rust,no_run
/// use tables_crud::{common, transport, write};
///
/// # async fn example(client: &impl transport::TableTransport) -> tables_crud::Result<()> {
/// let mut user = common::entity::Entity::new("users", "1");
/// user.insert("name", "Jane");
/// let update_entity = write::update_entity::UpdateEntity {
///     entity: user,
///     if_match: Some("*".to_string()),
///     mode: write::common::UpdateMode::Merge,
///     table_name: "users".to_string(),
/// };
/// update_entity
///     .send(client, &transport::ClientOptions::default())
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateEntity {
    /// The new entity state, keys included.
    pub entity: Entity,
    /// Entity tag the stored entity must match.
    pub if_match: Option<String>,
    /// Whether to merge into or replace the stored entity.
    pub mode: UpdateMode,
    /// The name of the table holding the entity.
    pub table_name: String,
}

impl TryFrom<UpdateEntity> for TableRequest {
    type Error = Error;

    fn try_from(update_entity: UpdateEntity) -> Result<Self> {
        let keys = Keys::try_from(&update_entity.entity)?;
        let record = entity::serialize(&update_entity.entity)?;
        let method = match update_entity.mode {
            UpdateMode::Merge => Method::Patch,
            UpdateMode::Replace => Method::Put,
        };
        let mut request = TableRequest::new(
            method,
            format!("/{}{}", update_entity.table_name, keys.to_path_segment()),
        );
        if let Some(etag) = update_entity.if_match {
            write::common::if_match(&mut request, etag);
        }
        request.body = Some(Value::Object(record.into_iter().collect()));
        Ok(request)
    }
}

impl UpdateEntity {
    /// Execute the update entity operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingKey`] or [`Error::TypeMismatch`] before any request is
    /// sent; a stale entity tag surfaces as [`Error::Service`] with status 412.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tables_crud.update_entity",
            skip_all,
            fields(table = %self.table_name, mode = ?self.mode),
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
