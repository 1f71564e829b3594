//! XML namespaces recognized in processor metadata.
//!
//! Element lookups in the extractor are namespace-agnostic (local names
//! only); the entity handlers match on these URIs.

/// Core data types: `v8:Type`, `v8:item`, `v8:lang`, `v8:content`.
pub const CORE: &str = "http://v8.1c.ru/8.1/data/core";

/// Metadata classes: `Attribute`, `TabularSection`, `Properties`, `Name`.
pub const META: &str = "http://v8.1c.ru/8.3/MDClasses";

/// Logical forms: `Form`, `ChildItems`, `Commands`, `Command`.
pub const FORM: &str = "http://v8.1c.ru/8.3/xcf/logform";

/// XML Schema instance (`xsi:type`).
pub const SCHEMA_INSTANCE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Conventional prefix for each recognized namespace.
pub const NAMESPACES: [(&str, &str); 4] = [
    ("core", CORE),
    ("meta", META),
    ("form", FORM),
    ("xsi", SCHEMA_INSTANCE),
];

/// The conventional prefix for `uri`, if it is a recognized namespace.
pub fn prefix_for(uri: &str) -> Option<&'static str> {
    NAMESPACES
        .iter()
        .find(|(_, known)| *known == uri)
        .map(|(prefix, _)| *prefix)
}

/// Strip a `prefix:` or `{uri}` qualifier from a tag or type name.
pub fn local_name(qualified: &str) -> &str {
    let after_uri = qualified.rsplit('}').next().unwrap_or(qualified);
    after_uri.rsplit(':').next().unwrap_or(after_uri)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_resolve() {
        assert_eq!(prefix_for(META), Some("meta"));
        assert_eq!(prefix_for(FORM), Some("form"));
        assert_eq!(prefix_for("urn:unknown"), None);
    }

    #[test]
    fn local_name_strips_qualifiers() {
        assert_eq!(local_name("xs:string"), "string");
        assert_eq!(local_name("{http://v8.1c.ru/8.3/xcf/logform}UsualGroup"), "UsualGroup");
        assert_eq!(local_name("Number"), "Number");
    }
}
