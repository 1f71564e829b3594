//! Typed semantic records extracted from metadata XML.
//!
//! Every record renders to a YAML mapping with a fixed key order:
//! `name`, `type`, then the per-language text keys (`synonym_ru`, ...),
//! numeric qualifiers and layout properties, and finally nested lists such
//! as `columns`.

use std::collections::BTreeMap;
use std::fmt;

use procsync_types::MultilangText;
use procsync_yaml::{CommentedMap, CommentedSeq, Node};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A normalized data type name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Date,
    ValueStorage,
    /// Anything else, kept as written (without a namespace prefix).
    Other(String),
}

impl DataType {
    /// Normalize a raw type name such as `xs:string` or `cfg:CatalogRef.Items`.
    pub fn normalize(raw: &str) -> Self {
        let name = raw.trim();
        let name = name.rsplit_once(':').map_or(name, |(_, local)| local);
        match name {
            "String" | "string" => Self::String,
            "Number" | "number" | "decimal" => Self::Number,
            "Boolean" | "boolean" => Self::Boolean,
            "Date" | "date" | "dateTime" => Self::Date,
            "ValueStorage" | "value_storage" => Self::ValueStorage,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::ValueStorage => "value_storage",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for DataType {
    fn from(raw: String) -> Self {
        Self::normalize(&raw)
    }
}

impl From<DataType> for String {
    fn from(data_type: DataType) -> Self {
        data_type.as_str().to_string()
    }
}

/// An object attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    #[serde(default, skip_serializing_if = "MultilangText::is_empty")]
    pub synonym: MultilangText,
    #[serde(default, skip_serializing_if = "MultilangText::is_empty")]
    pub tooltip: MultilangText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
}

/// One column of a tabular section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRecord {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
}

/// A tabular section and its columns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularSectionRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "MultilangText::is_empty")]
    pub synonym: MultilangText,
    #[serde(default, skip_serializing_if = "MultilangText::is_empty")]
    pub tooltip: MultilangText,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnRecord>,
}

/// A form command.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "MultilangText::is_empty")]
    pub title: MultilangText,
    #[serde(default, skip_serializing_if = "MultilangText::is_empty")]
    pub tooltip: MultilangText,
    /// Name of the handler procedure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// How the text of a layout property is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    Int,
    Bool,
    /// Free text or an enumeration member, kept as written.
    Text,
}

impl PropertyKind {
    /// Typed value of `text`. Integers that do not parse and empty text read
    /// as absent; booleans are `true` only for a case-insensitive `true`.
    pub fn parse(self, text: &str) -> Option<PropertyValue> {
        let text = text.trim();
        match self {
            Self::Int => text.parse().ok().map(PropertyValue::Int),
            Self::Bool => Some(PropertyValue::Bool(text.eq_ignore_ascii_case("true"))),
            Self::Text => (!text.is_empty()).then(|| PropertyValue::Text(text.to_string())),
        }
    }
}

/// A layout property of form elements: the XML tag, the YAML key and how the
/// value reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementProperty {
    pub tag: &'static str,
    pub key: &'static str,
    pub kind: PropertyKind,
}

const fn property(tag: &'static str, key: &'static str, kind: PropertyKind) -> ElementProperty {
    ElementProperty { tag, key, kind }
}

/// Layout properties carried by form element records, in YAML key order.
///
/// `Grouping` and `Group` both fill `group_direction`; the first one present
/// wins.
pub const ELEMENT_PROPERTIES: &[ElementProperty] = &[
    property("Width", "width", PropertyKind::Int),
    property("Height", "height", PropertyKind::Int),
    property("ReadOnly", "read_only", PropertyKind::Bool),
    property("HorizontalStretch", "horizontal_stretch", PropertyKind::Bool),
    property("VerticalStretch", "vertical_stretch", PropertyKind::Bool),
    property("HorizontalAlign", "horizontal_align", PropertyKind::Text),
    property("VerticalAlign", "vertical_align", PropertyKind::Text),
    property("TitleLocation", "title_location", PropertyKind::Text),
    property("Hyperlink", "hyperlink", PropertyKind::Bool),
    property("ChoiceMode", "choice_mode", PropertyKind::Text),
    property("QuickChoice", "quick_choice", PropertyKind::Text),
    property("ChoiceHistoryOnInput", "choice_history_on_input", PropertyKind::Text),
    property("MultiLine", "multiline", PropertyKind::Bool),
    property("PasswordMode", "password_mode", PropertyKind::Bool),
    property("TextEdit", "text_edit", PropertyKind::Bool),
    property("AutoMaxWidth", "auto_max_width", PropertyKind::Int),
    property("AutoMaxHeight", "auto_max_height", PropertyKind::Int),
    property("Grouping", "group_direction", PropertyKind::Text),
    property("Group", "group_direction", PropertyKind::Text),
    property("Representation", "representation", PropertyKind::Text),
    property("ShowTitle", "show_title", PropertyKind::Bool),
    property("Behavior", "behavior", PropertyKind::Text),
    property("RowPictureDataPath", "row_picture_data_path", PropertyKind::Text),
    property("Picture", "picture", PropertyKind::Text),
    property("PictureSize", "picture_size", PropertyKind::Text),
    property("Zoomable", "zoomable", PropertyKind::Bool),
    property("ShowInHeader", "show_in_header", PropertyKind::Bool),
];

/// Value of a layout property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<PropertyValue> for Value {
    fn from(value: PropertyValue) -> Self {
        match value {
            PropertyValue::Bool(b) => Value::Bool(b),
            PropertyValue::Int(n) => Value::from(n),
            PropertyValue::Text(s) => Value::String(s),
        }
    }
}

impl From<&PropertyValue> for Node {
    fn from(value: &PropertyValue) -> Self {
        match value {
            PropertyValue::Bool(b) => Node::from(*b),
            PropertyValue::Int(n) => Node::from(*n),
            PropertyValue::Text(s) => Node::from(s.as_str()),
        }
    }
}

/// Font override of a form element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontRecord {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    /// Point size, from the `height` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<i64>,
}

impl FontRecord {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn to_node(&self) -> CommentedMap {
        let mut map = CommentedMap::new();
        if self.bold {
            map.insert("bold", true);
        }
        if self.italic {
            map.insert("italic", true);
        }
        if let Some(size) = self.size {
            map.insert("size", size);
        }
        if let Some(face_name) = &self.face_name {
            map.insert("face_name", face_name.as_str());
        }
        if let Some(scale) = self.scale {
            map.insert("scale", scale);
        }
        map
    }
}

/// A form element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormElementRecord {
    pub name: String,
    /// Local XML tag, e.g. `InputField`.
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "MultilangText::is_empty")]
    pub title: MultilangText,
    #[serde(default, skip_serializing_if = "MultilangText::is_empty")]
    pub tooltip: MultilangText,
    #[serde(default, skip_serializing_if = "MultilangText::is_empty")]
    pub input_hint: MultilangText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<String>,
    /// Layout properties keyed by their YAML key, see [`ELEMENT_PROPERTIES`].
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontRecord>,
}

impl FormElementRecord {
    /// The bound attribute: the last segment of a dotted data path.
    pub fn attribute(&self) -> Option<&str> {
        let path = self.data_path.as_deref()?;
        path.rsplit_once('.').map(|(_, last)| last)
    }
}

/// A value table declared among the form attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueTableRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnRecord>,
}

/// A plain form attribute (anything but the main object and value tables).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormAttributeRecord {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
}

/// A form of the processor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "MultilangText::is_empty")]
    pub synonym: MultilangText,
}

/// A processor template (spreadsheet, text, binary data and so on).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub name: String,
    /// Template type as written, e.g. `SpreadsheetDocument`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,
    #[serde(default, skip_serializing_if = "MultilangText::is_empty")]
    pub synonym: MultilangText,
}

/// A form parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormParameterRecord {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub key_parameter: bool,
    #[serde(default, skip_serializing_if = "MultilangText::is_empty")]
    pub synonym: MultilangText,
}

/// The semantic record of any entity kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityRecord {
    Attribute(AttributeRecord),
    TabularSection(TabularSectionRecord),
    Command(CommandRecord),
    FormElement(FormElementRecord),
    ValueTable(ValueTableRecord),
    FormAttribute(FormAttributeRecord),
    Form(FormRecord),
    Template(TemplateRecord),
    FormParameter(FormParameterRecord),
}

impl EntityRecord {
    pub fn name(&self) -> &str {
        match self {
            Self::Attribute(r) => &r.name,
            Self::TabularSection(r) => &r.name,
            Self::Command(r) => &r.name,
            Self::FormElement(r) => &r.name,
            Self::ValueTable(r) => &r.name,
            Self::FormAttribute(r) => &r.name,
            Self::Form(r) => &r.name,
            Self::Template(r) => &r.name,
            Self::FormParameter(r) => &r.name,
        }
    }

    /// The entity kind, matching the owning handler's `element_type_name`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Attribute(_) => "attribute",
            Self::TabularSection(_) => "tabular_section",
            Self::Command(_) => "command",
            Self::FormElement(_) => "form_element",
            Self::ValueTable(_) => "value_table",
            Self::FormAttribute(_) => "form_attribute",
            Self::Form(_) => "form",
            Self::Template(_) => "template",
            Self::FormParameter(_) => "form_parameter",
        }
    }

    /// Render as a YAML mapping in normalized key order.
    pub fn to_node(&self) -> CommentedMap {
        let mut map = CommentedMap::new();
        map.insert("name", self.name());
        match self {
            Self::Attribute(r) => {
                put_type(&mut map, r.data_type.as_ref());
                put_multilang(&mut map, "synonym", &r.synonym);
                put_multilang(&mut map, "tooltip", &r.tooltip);
                for (key, value) in [("length", r.length), ("precision", r.precision), ("scale", r.scale)] {
                    if let Some(value) = value {
                        map.insert(key, value);
                    }
                }
            }
            Self::TabularSection(r) => {
                put_multilang(&mut map, "synonym", &r.synonym);
                put_multilang(&mut map, "tooltip", &r.tooltip);
                put_columns(&mut map, &r.columns);
            }
            Self::Command(r) => {
                put_multilang(&mut map, "title", &r.title);
                put_multilang(&mut map, "tooltip", &r.tooltip);
                if let Some(action) = &r.action {
                    map.insert("action", action.as_str());
                }
            }
            Self::FormElement(r) => {
                map.insert("type", r.element_type.as_str());
                put_multilang(&mut map, "title", &r.title);
                put_multilang(&mut map, "tooltip", &r.tooltip);
                put_multilang(&mut map, "input_hint", &r.input_hint);
                if let Some(attribute) = r.attribute() {
                    map.insert("attribute", attribute);
                }
                let mut seen = Vec::new();
                for property in ELEMENT_PROPERTIES {
                    if seen.contains(&property.key) {
                        continue;
                    }
                    seen.push(property.key);
                    if let Some(value) = r.properties.get(property.key) {
                        map.insert(property.key, Node::from(value));
                    }
                }
                if let Some(font) = r.font.as_ref().filter(|font| !font.is_empty()) {
                    map.insert("font", font.to_node());
                }
            }
            Self::ValueTable(r) => put_columns(&mut map, &r.columns),
            Self::FormAttribute(r) => put_type(&mut map, r.data_type.as_ref()),
            Self::Form(r) => put_multilang(&mut map, "synonym", &r.synonym),
            Self::Template(r) => {
                if let Some(template_type) = &r.template_type {
                    map.insert("type", template_type.as_str());
                }
                put_multilang(&mut map, "synonym", &r.synonym);
            }
            Self::FormParameter(r) => {
                put_type(&mut map, r.data_type.as_ref());
                if r.key_parameter {
                    map.insert("key_parameter", true);
                }
                // Parameters keep the synonym as one nested mapping.
                if !r.synonym.is_empty() {
                    let synonym: CommentedMap = r
                        .synonym
                        .iter()
                        .map(|(lang, value)| (lang.code(), value))
                        .collect();
                    map.insert("synonym", synonym);
                }
            }
        }
        map
    }
}

fn put_columns(map: &mut CommentedMap, columns: &[ColumnRecord]) {
    if columns.is_empty() {
        return;
    }
    let columns: CommentedSeq = columns
        .iter()
        .map(|column| {
            let mut entry = CommentedMap::new();
            entry.insert("name", column.name.as_str());
            put_type(&mut entry, column.data_type.as_ref());
            entry
        })
        .collect();
    map.insert("columns", columns);
}

fn put_type(map: &mut CommentedMap, data_type: Option<&DataType>) {
    if let Some(data_type) = data_type {
        map.insert("type", data_type.as_str());
    }
}

fn put_multilang(map: &mut CommentedMap, prefix: &str, text: &MultilangText) {
    for (lang, value) in text.iter() {
        map.insert(format!("{prefix}_{lang}"), value);
    }
}
