//! Comment-preserving document model for procsync.
//!
//! YAML sources of truth carry hand-written comments that must survive
//! automated edits. This crate models a document as ordered mappings and
//! sequences ([`Node`]) that each keep a side-table of opaque comment
//! bundles keyed by child key or index, and provides the primitive edits
//! (update, insert, delete) that keep those bundles attached to the right
//! child when positions shift.
//!
//! # Key Types
//!
//! - [`Node`] / [`CommentedMap`] / [`CommentedSeq`] -- The document model
//! - [`CommentBundle`] / [`CommentTable`] -- Opaque comments and their side-table
//! - [`Container`] -- Key/index abstraction the primitives are generic over
//! - [`ops`] -- `update_value`, `insert_item`, `delete_item`, comment get/set/copy
//! - [`navigate`] -- Resolve element/container paths inside a config document

pub mod comment;
pub mod emit;
pub mod error;
pub mod navigate;
pub mod node;
pub mod ops;

pub use comment::{CommentBundle, CommentPosition, CommentTable};
pub use emit::emit;
pub use error::{Result, YamlError};
pub use navigate::{resolve_container_mut, resolve_element};
pub use node::{CommentedMap, CommentedSeq, Container, Node};
pub use ops::{
    copy_comments, delete_item, get_comment, has_comment, insert_item, set_comment, update_value,
};
