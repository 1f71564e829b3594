//! Foundation types for procsync.
//!
//! This crate provides the identity and change-record types shared by the
//! BSL, form-tree, and entity-handler diff engines. Every other procsync
//! crate depends on `procsync-types`.
//!
//! # Key Types
//!
//! - [`ElementPath`] -- Dotted selector `forms[F].elements[i](.child_items[j])*`
//! - [`ContainerPath`] -- The sequence an element lives in (an insertion target)
//! - [`ElementChange`] / [`ChangeKind`] -- Typed property-level diff events
//! - [`MultilangText`] / [`Lang`] -- Language-keyed text bags (synonyms, tooltips)
//! - [`namespace`] -- The metadata XML namespace table

pub mod change;
pub mod error;
pub mod multilang;
pub mod namespace;
pub mod path;

pub use change::{ChangeKind, ElementChange};
pub use error::PathError;
pub use multilang::{Lang, MultilangText};
pub use path::{ContainerPath, ElementPath, Segment};
