#![deny(missing_docs)]
#![deny(warnings)]

//! # Tables CRUD
//!
//! A typed client for cloud table stores speaking the OData JSON protocol.
//!
//! ## Overview
//!
//! This library sits between application code and an HTTP transport, and:
//! - Encodes entities into wire records, adding `@odata.type` hints for typed values
//!   (64-bit integers, GUIDs, binary, dates) and decoding them back
//! - Builds the request for every entity and table operation
//! - Pages through listings by following continuation tokens, as lazy streams
//! - Maps service error payloads into a single [`Error`] type
//!
//! Connections, signing and retries are left to the [`transport::TableTransport`]
//! implementation supplied by the caller.
//!
//! ## Quick Example
//!
//! ```no_run
//! use futures_util::TryStreamExt;
//! use tables_crud::{client, common, transport, write};
//!
//! # async fn example(transport: impl transport::TableTransport + Clone) -> tables_crud::Result<()> {
//! let service = client::TableServiceClient::new(transport);
//! let users = service.table_client("users");
//!
//! let mut user = common::entity::Entity::new("users", "1");
//! user.insert("name", "John");
//! // Without the tag the value would be written as a plain string.
//! user.insert("visits", common::edm::EdmValue::int64("12345678910"));
//! users.create_entity(user).await?;
//!
//! let query_options = common::query::QueryOptions {
//!     filter: Some("PartitionKey eq 'users'".to_string()),
//!     ..Default::default()
//! };
//! let all: Vec<common::entity::Entity> = users.list_entities(query_options).try_collect().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@common`] - Entities, the wire codec, EDM values, keys, query options and continuations
//! - [`mod@read`] - Read operations (GetEntity, QueryEntities, QueryTables)
//! - [`mod@write`] - Write operations (InsertEntity, UpdateEntity, DeleteEntity, CreateTable, DeleteTable)
//! - [`mod@pager`] - Continuation-driven streams of pages and items
//! - [`mod@client`] - Service and table clients
//! - [`mod@transport`] - Requests, responses and the transport trait

/// Service and table clients wrapping the operations.
pub mod client;

/// Common building blocks: entities and their codec, EDM values, keys, query options
/// and continuation cursors.
pub mod common;

/// Error types.
pub mod error;

/// Lazy pagination over continuation tokens.
pub mod pager;

/// Read operations for retrieving entities and tables.
///
/// This module provides operations for:
/// - Getting individual entities by key
/// - Querying a page of entities
/// - Listing a page of tables
pub mod read;

/// Requests, responses and the transport seam.
pub mod transport;

/// Write operations for modifying entities and tables.
///
/// This module provides operations for:
/// - Inserting entities
/// - Merging into or replacing entities
/// - Deleting entities by key
/// - Creating and deleting tables
pub mod write;

pub use error::{Error, Result};
