use crate::{
    error::Result,
    transport::{self, ClientOptions, Method, TableRequest, TableTransport},
    write,
};

use serde_json::json;

/// Create table operation.
///
/// Fails with a conflict when the table already exists.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct CreateTable {
    /// The name of the table to create.
    pub table_name: String,
}

impl From<CreateTable> for TableRequest {
    fn from(create_table: CreateTable) -> Self {
        let mut request = TableRequest::new(Method::Post, "/Tables");
        write::common::prefer_no_content(&mut request);
        request.body = Some(json!({"TableName": create_table.table_name}));
        request
    }
}

impl CreateTable {
    /// Execute the create table operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tables_crud.create_table",
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
