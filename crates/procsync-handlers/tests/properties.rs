//! Invariants of the registry-driven entity differ.

use procsync_handlers::{diff_entities, AttributeHandler, DataType};
use procsync_types::ChangeKind;
use proptest::prelude::*;
use roxmltree::Document;

const TYPES: [&str; 4] = ["xs:string", "xs:decimal", "xs:boolean", "xs:dateTime"];

fn processor(attributes: &[(usize, usize)]) -> String {
    let body: String = attributes
        .iter()
        .map(|(name, ty)| {
            format!(
                "<Attribute><Properties><Name>Attr{name}</Name><Type><v8:Type>{}</v8:Type></Type></Properties></Attribute>",
                TYPES[*ty]
            )
        })
        .collect();
    format!(
        r#"<MetaDataObject xmlns="http://v8.1c.ru/8.3/MDClasses" xmlns:v8="http://v8.1c.ru/8.1/data/core"><DataProcessor><ChildObjects>{body}</ChildObjects></DataProcessor></MetaDataObject>"#
    )
}

fn attributes() -> impl Strategy<Value = Vec<(usize, usize)>> {
    proptest::collection::btree_map(0usize..8, 0usize..TYPES.len(), 0..6)
        .prop_map(|map| map.into_iter().collect())
}

fn names(changes: &[procsync_types::ElementChange], kind: ChangeKind) -> Vec<String> {
    changes
        .iter()
        .filter(|c| c.change_type == kind)
        .map(|c| c.element_name.clone())
        .collect()
}

proptest! {
    #[test]
    fn swapping_sides_swaps_added_and_deleted(a in attributes(), b in attributes()) {
        let (xa, xb) = (processor(&a), processor(&b));
        let (da, db) = (Document::parse(&xa).unwrap(), Document::parse(&xb).unwrap());

        let forward = diff_entities(&AttributeHandler, da.root(), db.root());
        let backward = diff_entities(&AttributeHandler, db.root(), da.root());

        prop_assert_eq!(names(&forward, ChangeKind::Added), names(&backward, ChangeKind::Deleted));
        prop_assert_eq!(names(&forward, ChangeKind::Deleted), names(&backward, ChangeKind::Added));
        prop_assert_eq!(names(&forward, ChangeKind::TypeChange), names(&backward, ChangeKind::TypeChange));
    }

    #[test]
    fn diff_against_itself_is_empty(a in attributes()) {
        let xml = processor(&a);
        let doc = Document::parse(&xml).unwrap();
        prop_assert!(diff_entities(&AttributeHandler, doc.root(), doc.root()).is_empty());
    }

    #[test]
    fn type_normalization_is_idempotent(raw in "(xs:|cfg:)?[A-Za-z][A-Za-z.]{0,12}") {
        let once = DataType::normalize(&raw);
        prop_assert_eq!(DataType::normalize(once.as_str()), once);
    }
}
