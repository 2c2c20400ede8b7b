//! Arena-backed DOM for serialization.
//!
//! Tree construction from HTML is a collaborator concern; documents enter
//! either through the builder methods here or through the JSON tree form.
//! Nodes carry decoded [`meta::NodeMeta`] directly, so the attribute encoding
//! of the metadata bag never leaks past this module.

pub mod meta;

use serde::{Deserialize, Serialize};

use meta::NodeMeta;

/// Attribute holding a node's stable identity, assigned once at parse time
/// and preserved across edits unless the node is genuinely new. The differ
/// keys correspondence on it.
pub const ID_ATTR: &str = "data-selser-id";

/// Index into [`Document::nodes`]. Ids are only meaningful within the
/// document that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Element {
        name: String,
        /// Attributes in document order. Order is preserved so the HTML
        /// fallback emitter reproduces what it was given.
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub data: NodeData,
    pub meta: NodeMeta,
}

/// A document tree. Detached nodes stay in the arena but are unreachable
/// from the root; traversal never visits them.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Creates a document with an empty `body` root.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.create_element("body");
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push_node(NodeData::Element {
            name: name.to_string(),
            attrs: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeData::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push_node(NodeData::Comment(text.to_string()))
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
            meta: NodeMeta::default(),
        });
        id
    }

    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Removes `id` from its parent's child list. The node itself stays in
    /// the arena.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(p) = self.nodes[id.0].parent.take() {
            self.nodes[p.0].children.retain(|&c| c != id);
        }
    }

    /// Replaces `id` with its own children, in place. Used by the normalizer
    /// to unwrap redundant wrapper elements.
    pub fn replace_with_children(&mut self, id: NodeId) {
        let Some(parent) = self.nodes[id.0].parent else {
            return;
        };
        let children = std::mem::take(&mut self.nodes[id.0].children);
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == id)
            .unwrap_or(self.nodes[parent.0].children.len());
        self.nodes[parent.0].children.remove(pos);
        for (i, &c) in children.iter().enumerate() {
            self.nodes[c.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(pos + i, c);
        }
        self.nodes[id.0].parent = None;
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            if let Some(slot) = attrs.iter_mut().find(|(k, _)| k == name) {
                slot.1 = value.to_string();
            } else {
                attrs.push((name.to_string(), value.to_string()));
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            attrs.retain(|(k, _)| k != name);
        }
    }

    pub fn meta(&self, id: NodeId) -> &NodeMeta {
        &self.nodes[id.0].meta
    }

    pub fn set_meta(&mut self, id: NodeId, meta: NodeMeta) {
        self.nodes[id.0].meta = meta;
    }

    /// Concatenated text of all text descendants, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].data {
            NodeData::Text(t) => out.push_str(t),
            NodeData::Comment(_) => {}
            NodeData::Element { .. } => {
                for &c in &self.nodes[id.0].children {
                    self.collect_text(c, out);
                }
            }
        }
    }

    /// The stable identity of an element, if one has been assigned.
    pub fn stable_id(&self, id: NodeId) -> Option<&str> {
        self.attr(id, ID_ATTR)
    }

    /// Assigns a fresh stable id to every element that lacks one. Idempotent:
    /// existing ids are never touched.
    pub fn assign_stable_ids(&mut self) {
        for id in self.descendants(self.root) {
            if matches!(self.nodes[id.0].data, NodeData::Element { .. })
                && self.stable_id(id).is_none()
            {
                let fresh = uuid::Uuid::new_v4().to_string();
                self.set_attr(id, ID_ATTR, &fresh);
            }
        }
    }

    /// All reachable nodes under (and including) `id`, preorder.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            for &c in self.nodes[n.0].children.iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    /// Builds a document from the JSON tree form. Metadata bags found in
    /// `data-selser-meta` attributes are decoded onto the nodes; a bag that
    /// fails to decode is logged and dropped rather than failing the load.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tree: JsonNode = serde_json::from_str(json)?;
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.build_json_node(&tree);
        Ok(doc)
    }

    fn build_json_node(&mut self, node: &JsonNode) -> NodeId {
        match node {
            JsonNode::Text { value } => self.create_text(value),
            JsonNode::Comment { value } => self.create_comment(value),
            JsonNode::Element {
                name,
                attrs,
                children,
            } => {
                let id = self.create_element(name);
                for (k, v) in attrs {
                    if k == meta::META_ATTR {
                        match meta::decode(v) {
                            Ok(m) => self.nodes[id.0].meta = m,
                            Err(e) => log::warn!("ignoring undecodable metadata bag: {e}"),
                        }
                    } else {
                        self.set_attr(id, k, v);
                    }
                }
                for child in children {
                    let c = self.build_json_node(child);
                    self.append(id, c);
                }
                id
            }
        }
    }

    /// Serializes the tree to the JSON form, re-encoding metadata bags into
    /// their attribute representation.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let tree = self.to_json_node(self.root)?;
        serde_json::to_string(&tree)
    }

    fn to_json_node(&self, id: NodeId) -> Result<JsonNode, serde_json::Error> {
        let node = &self.nodes[id.0];
        Ok(match &node.data {
            NodeData::Text(t) => JsonNode::Text { value: t.clone() },
            NodeData::Comment(t) => JsonNode::Comment { value: t.clone() },
            NodeData::Element { name, attrs } => {
                let mut attrs = attrs.clone();
                if node.meta != NodeMeta::default() {
                    attrs.push((meta::META_ATTR.to_string(), meta::encode(&node.meta)?));
                }
                let mut children = Vec::with_capacity(node.children.len());
                for &c in &node.children {
                    children.push(self.to_json_node(c)?);
                }
                JsonNode::Element {
                    name: name.clone(),
                    attrs,
                    children,
                }
            }
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Interchange form of a node, used by the CLI and by collaborators that
/// already have a parsed tree.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum JsonNode {
    Element {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        attrs: Vec<(String, String)>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<JsonNode>,
    },
    Text {
        value: String,
    },
    Comment {
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::meta::{NodeMeta, SourceRange};
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> (Document, NodeId) {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let t = doc.create_text("hello ");
        let a = doc.create_element("a");
        let label = doc.create_text("world");
        doc.append(doc.root(), p);
        doc.append(p, t);
        doc.append(p, a);
        doc.append(a, label);
        (doc, p)
    }

    #[test]
    fn append_builds_expected_shape() {
        let (doc, p) = sample();
        assert_eq!(doc.children(doc.root()), &[p]);
        assert_eq!(doc.children(p).len(), 2);
        assert_eq!(doc.parent(p), Some(doc.root()));
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let (doc, p) = sample();
        assert_eq!(doc.text_content(p), "hello world");
    }

    #[test]
    fn set_attr_overwrites_in_place() {
        let (mut doc, p) = sample();
        doc.set_attr(p, "class", "x");
        doc.set_attr(p, "class", "y");
        assert_eq!(doc.attr(p, "class"), Some("y"));
    }

    #[test]
    fn replace_with_children_splices_in_order() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let before = doc.create_text("a");
        let span = doc.create_element("span");
        let inner = doc.create_text("b");
        let after = doc.create_text("c");
        doc.append(doc.root(), p);
        doc.append(p, before);
        doc.append(p, span);
        doc.append(span, inner);
        doc.append(p, after);

        doc.replace_with_children(span);
        assert_eq!(doc.children(p), &[before, inner, after]);
        assert_eq!(doc.parent(inner), Some(p));
    }

    #[test]
    fn assign_stable_ids_is_idempotent() {
        let (mut doc, p) = sample();
        doc.assign_stable_ids();
        let first = doc.stable_id(p).unwrap().to_string();
        doc.assign_stable_ids();
        assert_eq!(doc.stable_id(p), Some(first.as_str()));
    }

    #[test]
    fn json_round_trip_preserves_tree_and_meta() {
        let (mut doc, p) = sample();
        doc.set_meta(
            p,
            NodeMeta {
                dsr: Some(SourceRange::new(0, 11, 0, 0)),
                ..Default::default()
            },
        );
        let json = doc.to_json().unwrap();
        let doc2 = Document::from_json(&json).unwrap();
        let p2 = doc2.children(doc2.root())[0];
        assert_eq!(doc2.meta(p2).dsr, Some(SourceRange::new(0, 11, 0, 0)));
        assert_eq!(doc2.text_content(p2), "hello world");
        assert_eq!(doc2.to_json().unwrap(), json);
    }

    #[test]
    fn from_json_tolerates_bad_meta_bag() {
        let json = r#"{"kind":"element","name":"body","attrs":[["data-selser-meta","nope"]]}"#;
        let doc = Document::from_json(json).unwrap();
        assert_eq!(*doc.meta(doc.root()), NodeMeta::default());
    }
}
