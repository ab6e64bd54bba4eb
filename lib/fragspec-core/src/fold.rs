//! Folding of embedded fragment copies into `$ref` markers.
//!
//! A fragment added to a bucket is the canonical definition of its logical name.
//! Authors usually embed the same fragment by value elsewhere: in a path item, in
//! another fragment, in an array. Those copies carry the logical name but not the
//! instance tag of the bucket entry, which is how they are told apart.
//!
//! For each bucket, in [`ComponentKind::ALL`] order, the engine takes the first entry
//! not yet folded, replaces every copy of it in the whole document with
//! `{ "$ref": "#/components/<kind>/<name>" }`, and repeats until every entry of the
//! bucket has been folded.
//!
//! Objects holding a `$ref` are never looked into, and bucket entries themselves are
//! never replaced.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::component::is_reference;
use crate::document::{INSTANCE_TAG_KEY, LOGICAL_NAME_KEY, Slot};
use crate::{ComponentKind, Document};

/// Number of `$ref` markers written per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldReport {
    folded: IndexMap<ComponentKind, usize>,
}

impl FoldReport {
    /// Markers written for a category.
    #[must_use]
    pub fn folded(&self, kind: ComponentKind) -> usize {
        self.folded.get(&kind).copied().unwrap_or_default()
    }

    /// Markers written across all categories.
    #[must_use]
    pub fn total(&self) -> usize {
        self.folded.values().sum()
    }
}

/// Folds the embedded copies of every bucket, in fold order.
pub fn fold_references(document: &mut Document) -> FoldReport {
    let mut report = FoldReport::default();
    for kind in ComponentKind::ALL {
        let folded = fold_category(document, kind);
        if folded > 0 {
            report.folded.insert(kind, folded);
        }
    }

    debug!(total = report.total(), "references folded");
    report
}

/// Folds the embedded copies of one bucket's fragments.
///
/// Returns the number of markers written. A missing or empty bucket is a no-op.
pub fn fold_category(document: &mut Document, kind: ComponentKind) -> usize {
    let mut done = HashSet::new();
    let mut total = 0;

    while let Some(target) = next_target(document, kind, &done) {
        let mut folder = Folder::new(kind, &target);
        document.visit_values_mut(|slot, value| folder.visit(slot, value));

        trace!(%kind, name = %target.name, replaced = folder.replaced, "fragment folded");
        total += folder.replaced;
        done.insert(target.tag);
    }

    total
}

/// A bucket entry whose copies are being folded.
#[derive(Debug)]
struct FoldTarget {
    name: String,
    tag: String,
}

/// First entry of the bucket, in insertion order, whose tag was not folded yet.
fn next_target(
    document: &Document,
    kind: ComponentKind,
    done: &HashSet<String>,
) -> Option<FoldTarget> {
    document.bucket(kind)?.iter().find_map(|(name, fragment)| {
        let tag = fragment.get(INSTANCE_TAG_KEY)?.as_str()?;
        (!done.contains(tag)).then(|| FoldTarget {
            name: name.clone(),
            tag: tag.to_string(),
        })
    })
}

struct Folder<'a> {
    target: &'a FoldTarget,
    marker: Value,
    replaced: usize,
}

impl<'a> Folder<'a> {
    fn new(kind: ComponentKind, target: &'a FoldTarget) -> Self {
        Self {
            target,
            marker: kind.reference(&target.name),
            replaced: 0,
        }
    }

    fn visit(&mut self, slot: Slot, value: &mut Value) {
        match slot {
            Slot::Canonical if !is_reference(value) => self.fold_children(value),
            Slot::Canonical => {}
            Slot::Embedded => self.fold(value),
        }
    }

    fn fold(&mut self, value: &mut Value) {
        if is_reference(value) {
            return;
        }
        if self.is_copy(value) {
            *value = self.marker.clone();
            self.replaced += 1;
            return;
        }
        self.fold_children(value);
    }

    fn fold_children(&mut self, value: &mut Value) {
        match value {
            Value::Object(object) => {
                for child in object.values_mut() {
                    self.fold(child);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.fold(item);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
        }
    }

    /// Same logical name, other (or no) instance tag.
    fn is_copy(&self, value: &Value) -> bool {
        let Some(object) = value.as_object() else {
            return false;
        };
        let name = object.get(LOGICAL_NAME_KEY).and_then(Value::as_str);
        let tag = object.get(INSTANCE_TAG_KEY).and_then(Value::as_str);

        name == Some(self.target.name.as_str()) && tag != Some(self.target.tag.as_str())
    }
}
