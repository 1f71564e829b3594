//! Per-entity handlers for processor metadata.
//!
//! Each entity kind (object attributes, tabular sections, forms, templates,
//! and the commands, elements, attributes, value tables and parameters of a
//! form) gets an [`EntityHandler`] that knows how to find its
//! entities in metadata XML, turn one into a typed record, diff two
//! versions at property level, and add or remove it in the YAML source of
//! truth without disturbing comments.
//!
//! # Key Types
//!
//! - [`EntityHandler`] -- The capability set every handler implements
//! - [`EntityRecord`] -- Typed semantic records with normalized YAML rendering
//! - [`HandlerRegistry`] -- Handlers keyed by entity kind
//! - [`diff_entities`] / [`diff_documents`] -- Entity-level XML diff

pub mod attribute;
pub mod command;
pub mod entity_diff;
pub mod error;
pub mod form;
pub mod form_attribute;
pub mod form_element;
pub mod form_parameter;
pub mod handler;
pub mod record;
pub mod registry;
pub mod tabular_section;
pub mod template;
pub mod value_table;
pub mod xml;

pub use attribute::AttributeHandler;
pub use command::CommandHandler;
pub use entity_diff::{diff_documents, diff_entities};
pub use error::{HandlerError, HandlerResult};
pub use form::FormHandler;
pub use form_attribute::FormAttributeHandler;
pub use form_element::FormElementHandler;
pub use form_parameter::FormParameterHandler;
pub use handler::{DeleteOutcome, EntityHandler, Placement};
pub use record::{
    AttributeRecord, ColumnRecord, CommandRecord, DataType, ElementProperty, EntityRecord, FontRecord,
    FormAttributeRecord, FormElementRecord, FormParameterRecord, FormRecord, PropertyKind, PropertyValue,
    TabularSectionRecord, TemplateRecord, ValueTableRecord, ELEMENT_PROPERTIES,
};
pub use registry::HandlerRegistry;
pub use tabular_section::TabularSectionHandler;
pub use template::TemplateHandler;
pub use value_table::ValueTableHandler;
