//! Form-element trees for procsync.
//!
//! Reconstructs the nested tree of form elements (groups, pages, fields)
//! from form XML, addresses every node with a stable [`ElementPath`], diffs
//! two trees structurally, and resolves symbolic insertion points into a
//! concrete container path and index.
//!
//! # Key Types
//!
//! - [`ElementTree`] / [`ElementNode`] -- Arena-backed element tree
//! - [`FormExtractor`] -- Builds a tree from form XML
//! - [`FormTreeDiff`] -- Added / deleted / moved / modified buckets
//! - [`Position`] / [`InsertionPoint`] -- Insertion planning
//!
//! [`ElementPath`]: procsync_types::ElementPath

pub mod config;
pub mod error;
pub mod extractor;
pub mod planner;
pub mod render;
pub mod tree;
pub mod tree_diff;

pub use config::ExtractorConfig;
pub use error::{FormError, FormResult};
pub use extractor::{extract_form_tree, FormExtractor};
pub use planner::{plan_insertion, InsertionPoint, Position};
pub use render::print_tree;
pub use tree::{ElementNode, ElementTree, NodeId};
pub use tree_diff::{compare_trees, FormTreeDiff, NodeMove, NodeSummary, NodeTypeChange};
