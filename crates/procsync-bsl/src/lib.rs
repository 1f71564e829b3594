//! BSL module segmentation and procedure-level diffing.
//!
//! A BSL module is split into procedures, functions, and named regions
//! (tolerant of bilingual keywords and `&Annotation` lines). Two
//! segmentations are then compared by name, with procedure bodies
//! normalized so that comment and whitespace edits are not reported.
//!
//! # Key Types
//!
//! - [`Segmenter`] / [`ModuleSegments`] -- Split module text into keyed units
//! - [`BslProcedure`] / [`BslRegion`] -- The parsed units
//! - [`BslDiff`] / [`BslChange`] -- Typed add/delete/modify events
//! - [`decode_module`] / [`read_module`] -- UTF-8-BOM, UTF-8, windows-1251 fallback

pub mod config;
pub mod differ;
pub mod error;
pub mod keywords;
pub mod segmenter;
pub mod source;

pub use config::SegmenterConfig;
pub use differ::{diff_modules, diff_segments, BslChange, BslChangeKind, BslDiff};
pub use error::{BslError, BslResult};
pub use segmenter::{
    normalize_body, segment, BslProcedure, BslRegion, ModuleSegments, ProcedureKind, Segmenter,
};
pub use source::{decode_module, extract_module_from_xml, read_module, DecodedModule, SourceEncoding};
