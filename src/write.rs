//! Write operations for modifying entities and tables.
//!
//! This module provides operations for writing to the table service:
//! - Inserting new entities
//! - Merging into or replacing entities, optionally guarded by an entity tag
//! - Deleting entities by primary key
//! - Creating and deleting tables

/// Common types for write operations.
pub mod common;

/// Create table operation.
pub mod create_table;

/// Delete entity operation for removing entities from tables.
pub mod delete_entity;

/// Delete table operation.
pub mod delete_table;

/// Insert entity operation for creating new entities.
pub mod insert_entity;

/// Update entity operation for merging into or replacing entities.
pub mod update_entity;
