//! Common building blocks shared by read and write operations.
//!
//! This module provides the entity model and its wire codec, EDM value types,
//! key addressing, query options and continuation cursors.

/// Continuation cursors for paged listings.
pub mod continuation;

/// EDM type tags and property values.
pub mod edm;

/// Entities and the wire codec.
pub mod entity;

/// Key types for addressing entities.
pub mod key;

/// OData query options.
pub mod query;

/// Look up a header by name, ignoring ASCII case.
pub(crate) fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(header, _)| header.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
