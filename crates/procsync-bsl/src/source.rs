//! Loading module text: byte decoding and extraction from XML wrappers.

use std::fmt;
use std::path::Path;

use encoding_rs::WINDOWS_1251;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BslError, BslResult};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Element names that may carry module text inside a metadata XML file.
const MODULE_TAGS: [&str; 3] = ["FormModule", "ObjectModule", "Module"];

/// The encoding a module was successfully decoded with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceEncoding {
    Utf8Bom,
    Utf8,
    Windows1251,
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8Bom => write!(f, "utf-8-sig"),
            Self::Utf8 => write!(f, "utf-8"),
            Self::Windows1251 => write!(f, "windows-1251"),
        }
    }
}

/// Decoded module text together with the encoding that worked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedModule {
    pub text: String,
    pub encoding: SourceEncoding,
}

/// Decode module bytes, trying UTF-8 with BOM, plain UTF-8, then windows-1251.
pub fn decode_module(bytes: &[u8]) -> BslResult<DecodedModule> {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        if let Ok(text) = std::str::from_utf8(rest) {
            return Ok(DecodedModule {
                text: text.to_string(),
                encoding: SourceEncoding::Utf8Bom,
            });
        }
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(DecodedModule {
            text: text.to_string(),
            encoding: SourceEncoding::Utf8,
        });
    }

    debug!(len = bytes.len(), "module is not UTF-8, trying windows-1251");
    match WINDOWS_1251.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => Ok(DecodedModule {
            text: text.into_owned(),
            encoding: SourceEncoding::Windows1251,
        }),
        None => Err(BslError::Undecodable { len: bytes.len() }),
    }
}

/// Read and decode a module file.
pub fn read_module(path: &Path) -> BslResult<DecodedModule> {
    let bytes = std::fs::read(path).map_err(|source| BslError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = decode_module(&bytes)?;
    debug!(path = %path.display(), encoding = %decoded.encoding, "read module");
    Ok(decoded)
}

/// Text of the first non-empty `FormModule`, `ObjectModule` or `Module`
/// element, searched in that order.
///
/// Malformed XML yields `None`.
pub fn extract_module_from_xml(xml: &str) -> Option<String> {
    let doc = match roxmltree::Document::parse(xml) {
        Ok(doc) => doc,
        Err(err) => {
            debug!(error = %err, "cannot parse XML for module extraction");
            return None;
        }
    };

    for tag in MODULE_TAGS {
        let text = doc
            .descendants()
            .filter(|node| node.is_element() && node.tag_name().name() == tag)
            .filter_map(|node| node.text())
            .map(str::trim)
            .find(|text| !text.is_empty());
        if let Some(text) = text {
            debug!(tag, "found module text in XML");
            return Some(text.to_string());
        }
    }

    warn!("no module element found in XML");
    None
}
