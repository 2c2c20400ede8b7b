//! Tree diffing against the original parse.
//!
//! Correspondence between the two trees is keyed on the stable id attribute
//! assigned at parse time, which survives edits unless a node is genuinely
//! new. Annotations are computed fresh per serialization request and
//! discarded after; nothing here mutates either document.

use std::collections::HashMap;

use crate::dom::{self, Document, NodeData, NodeId, meta};

/// How a node relates to its original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffMark {
    /// Identical to the original node: markup and descendants untouched.
    #[default]
    Unmodified,
    /// The node's own markup changed, or it has no original at all.
    Modified,
    /// Some descendant changed, but this node's own opening/closing markup
    /// did not.
    ChildrenModified,
}

/// Diff marks for one edited document, keyed by its node ids.
///
/// Unmarked nodes are unmodified. The marks are monotonic up the ancestor
/// chain: a `Modified` descendant forces at least `ChildrenModified` on every
/// ancestor.
#[derive(Debug, Default)]
pub struct DiffAnnotations {
    marks: HashMap<NodeId, DiffMark>,
    all_modified: bool,
}

impl DiffAnnotations {
    /// The conservative annotation used when no original document is
    /// available: every node reports `Modified`, forcing full re-emission.
    pub fn all_modified() -> Self {
        Self {
            marks: HashMap::new(),
            all_modified: true,
        }
    }

    pub fn mark(&self, id: NodeId) -> DiffMark {
        if self.all_modified {
            return DiffMark::Modified;
        }
        self.marks.get(&id).copied().unwrap_or_default()
    }

    fn set(&mut self, id: NodeId, mark: DiffMark) {
        self.marks.insert(id, mark);
    }
}

/// Attributes excluded from modification checks: identity and metadata
/// bookkeeping that the pipeline regenerates without author intent.
const IGNORED_ATTRS: &[&str] = &[dom::ID_ATTR, meta::META_ATTR];

/// Compares `edited` against `original` and marks every edited node.
pub fn diff(original: &Document, edited: &Document) -> DiffAnnotations {
    let mut ann = DiffAnnotations::default();
    let index = index_by_stable_id(original);
    diff_node(
        original,
        edited,
        original.root(),
        edited.root(),
        &index,
        &mut ann,
    );
    ann
}

fn index_by_stable_id(doc: &Document) -> HashMap<&str, NodeId> {
    let mut index = HashMap::new();
    for id in doc.descendants(doc.root()) {
        if let Some(sid) = doc.stable_id(id) {
            index.insert(sid, id);
        }
    }
    index
}

/// Diffs a corresponded element pair. Returns true if anything in the
/// subtree differs, so callers can escalate their own mark.
fn diff_node(
    original: &Document,
    edited: &Document,
    o: NodeId,
    e: NodeId,
    index: &HashMap<&str, NodeId>,
    ann: &mut DiffAnnotations,
) -> bool {
    if element_changed(original, edited, o, e) {
        ann.set(e, DiffMark::Modified);
        return true;
    }
    let changed = diff_children(original, edited, o, e, index, ann);
    if changed {
        ann.set(e, DiffMark::ChildrenModified);
    }
    changed
}

fn element_changed(original: &Document, edited: &Document, o: NodeId, e: NodeId) -> bool {
    match (&original.node(o).data, &edited.node(e).data) {
        (
            NodeData::Element {
                name: on,
                attrs: oa,
            },
            NodeData::Element {
                name: en,
                attrs: ea,
            },
        ) => on != en || significant_attrs(oa) != significant_attrs(ea),
        _ => true,
    }
}

fn significant_attrs(attrs: &[(String, String)]) -> Vec<(&str, &str)> {
    let mut out: Vec<(&str, &str)> = attrs
        .iter()
        .filter(|(k, _)| !IGNORED_ATTRS.contains(&k.as_str()))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    out.sort_unstable();
    out
}

/// Walks the edited children against the original child list with a cursor.
/// Skipped originals are deletions; edited elements with no usable
/// correspondence are insertions; a correspondence found behind the cursor
/// is a reorder. All three make the parent's children "changed".
fn diff_children(
    original: &Document,
    edited: &Document,
    o: NodeId,
    e: NodeId,
    index: &HashMap<&str, NodeId>,
    ann: &mut DiffAnnotations,
) -> bool {
    let oc = original.children(o);
    let ec = edited.children(e);
    let mut changed = false;
    let mut oi = 0;

    for &ecid in ec {
        match &edited.node(ecid).data {
            NodeData::Element { .. } => {
                let corr = edited
                    .stable_id(ecid)
                    .and_then(|sid| index.get(sid).copied())
                    .filter(|&ocid| original.parent(ocid) == Some(o));
                match corr {
                    Some(ocid) => {
                        if let Some(off) = oc[oi..].iter().position(|&c| c == ocid) {
                            if off > 0 {
                                // Originals were skipped: deleted or moved away.
                                changed = true;
                            }
                            oi += off + 1;
                            if diff_node(original, edited, ocid, ecid, index, ann) {
                                changed = true;
                            }
                        } else {
                            // Correspondence exists but sits behind the
                            // cursor: the node moved. Re-serialize it.
                            ann.set(ecid, DiffMark::Modified);
                            changed = true;
                        }
                    }
                    None => {
                        ann.set(ecid, DiffMark::Modified);
                        changed = true;
                    }
                }
            }
            NodeData::Text(t) => {
                if oi < oc.len()
                    && let NodeData::Text(ot) = &original.node(oc[oi]).data
                {
                    if ot != t {
                        ann.set(ecid, DiffMark::Modified);
                        changed = true;
                    }
                    oi += 1;
                } else {
                    ann.set(ecid, DiffMark::Modified);
                    changed = true;
                }
            }
            NodeData::Comment(t) => {
                if oi < oc.len()
                    && let NodeData::Comment(ot) = &original.node(oc[oi]).data
                {
                    if ot != t {
                        ann.set(ecid, DiffMark::Modified);
                        changed = true;
                    }
                    oi += 1;
                } else {
                    ann.set(ecid, DiffMark::Modified);
                    changed = true;
                }
            }
        }
    }

    if oi < oc.len() {
        // Trailing originals with no edited counterpart: deletions.
        changed = true;
    }
    changed
}
