//! Resolve element and container paths inside a processor config.
//!
//! A config keeps its forms under `forms`, each form's top-level elements
//! under `elements`, and a container's children under `child_items`; the
//! path grammar mirrors that layout one-to-one.

use procsync_types::{ContainerPath, ElementPath, Segment};
use tracing::debug;

use crate::node::{CommentedMap, CommentedSeq, Node};

fn segment_key(segment: &Segment) -> (&'static str, usize) {
    match segment {
        Segment::Elements(i) => ("elements", *i),
        Segment::ChildItems(i) => ("child_items", *i),
    }
}

/// The form mapping at `forms[form]`.
fn form_mut(config: &mut CommentedMap, form: usize) -> Option<&mut CommentedMap> {
    config
        .get_mut("forms")?
        .as_seq_mut()?
        .get_mut(form)?
        .as_map_mut()
}

/// Walk `segments` down from a form mapping to the addressed element mapping.
fn walk_mut<'a>(mut current: &'a mut CommentedMap, segments: &[Segment]) -> Option<&'a mut CommentedMap> {
    for segment in segments {
        let (key, index) = segment_key(segment);
        current = current
            .get_mut(key)?
            .as_seq_mut()?
            .get_mut(index)?
            .as_map_mut()?;
    }
    Some(current)
}

/// The sequence addressed by `path`, creating an empty `elements` or
/// `child_items` entry on its owner if the owner exists but has none yet.
pub fn resolve_container_mut<'a>(
    config: &'a mut CommentedMap,
    path: &ContainerPath,
) -> Option<&'a mut CommentedSeq> {
    let Some(form) = form_mut(config, path.form_index()) else {
        debug!(%path, "form not present in config");
        return None;
    };

    match path.owner() {
        None => form.seq_entry("elements"),
        Some(owner) => {
            let Some(element) = walk_mut(form, owner.segments()) else {
                debug!(%path, "owner element not present in config");
                return None;
            };
            element.seq_entry("child_items")
        }
    }
}

/// The element node addressed by `path`.
pub fn resolve_element<'a>(config: &'a CommentedMap, path: &ElementPath) -> Option<&'a Node> {
    let mut current: &Node = config
        .get("forms")?
        .as_seq()?
        .get(path.form_index())?;
    for segment in path.segments() {
        let (key, index) = segment_key(segment);
        current = current.as_map()?.get(key)?.as_seq()?.get(index)?;
    }
    Some(current)
}
