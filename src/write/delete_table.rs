use crate::{
    common::key,
    error::Result,
    transport::{self, ClientOptions, Method, TableRequest, TableTransport},
};

/// Delete table operation.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct DeleteTable {
    /// The name of the table to delete.
    pub table_name: String,
}

impl From<DeleteTable> for TableRequest {
    fn from(delete_table: DeleteTable) -> Self {
        TableRequest::new(
            Method::Delete,
            format!("/Tables({})", key::quote(&delete_table.table_name)),
        )
    }
}

impl DeleteTable {
    /// Execute the delete table operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tables_crud.delete_table",
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
