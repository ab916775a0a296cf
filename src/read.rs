//! Read operations for retrieving entities and tables.
//!
//! This module provides operations for reading from the table service:
//! - Getting individual entities by primary key
//! - Querying one page of entities, resumable through a continuation
//! - Listing one page of table names

/// Common response parsing for read operations.
pub(crate) mod common;

/// Get entity operation for retrieving a single entity by primary key.
pub mod get_entity;

/// Query entities operation for retrieving one page of entities.
pub mod query_entities;

/// Query tables operation for retrieving one page of table names.
pub mod query_tables;
