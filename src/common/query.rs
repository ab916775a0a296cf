/// OData query options for listing entities or tables.
///
/// The filter is passed through to the service verbatim.
///
/// ```rust
/// use tables_crud::common::query;
///
/// let options = query::QueryOptions {
///     filter: Some("PartitionKey eq 'users'".to_string()),
///     select: Some(vec!["name".to_string(), "age".to_string()]),
///     top: Some(100),
/// };
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct QueryOptions {
    /// OData `$filter` expression.
    pub filter: Option<String>,
    /// Properties to return; all of them when `None`.
    pub select: Option<Vec<String>>,
    /// Maximum number of items per page.
    pub top: Option<u32>,
}

impl QueryOptions {
    /// The `$filter`, `$select` and `$top` query parameters for these options.
    pub(crate) fn to_query_parameters(&self) -> Vec<(String, String)> {
        let mut parameters = Vec::with_capacity(3);
        if let Some(filter) = &self.filter {
            parameters.push(("$filter".to_string(), filter.clone()));
        }
        if let Some(select) = selection(self.select.as_deref()) {
            parameters.push(("$select".to_string(), select));
        }
        if let Some(top) = self.top {
            parameters.push(("$top".to_string(), top.to_string()));
        }
        parameters
    }
}

/// Comma-separated `$select` value; `None` when nothing is selected.
pub(crate) fn selection(select: Option<&[String]>) -> Option<String> {
    select
        .filter(|select| !select.is_empty())
        .map(|select| select.join(","))
}
