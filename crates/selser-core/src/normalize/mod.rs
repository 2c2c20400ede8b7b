//! DOM canonicalization, run in place before diffing.
//!
//! Editors introduce DOM churn the author never asked for: wrapper spans,
//! split text nodes, reshuffled attribute whitespace. Collapsing those
//! variants first means the differ reflects author intent, so unmodified
//! regions keep their source text. The pass is idempotent.

use crate::dom::meta::NodeMeta;
use crate::dom::{Document, NodeData, NodeId};

/// Containers where whitespace-only text between children carries no
/// rendering meaning.
const STRUCTURAL_CONTAINERS: &[&str] = &["body", "ul", "ol", "dl", "table", "tbody", "tr"];

/// Canonicalizes the whole tree under the document root.
pub fn normalize(doc: &mut Document) {
    normalize_node(doc, doc.root());
}

fn normalize_node(doc: &mut Document, id: NodeId) {
    // Children first, so unwrapping below never re-exposes an unnormalized
    // subtree.
    for c in doc.children(id).to_vec() {
        if matches!(doc.node(c).data, NodeData::Element { .. }) {
            normalize_node(doc, c);
        }
    }

    for c in doc.children(id).to_vec() {
        if is_bare_wrapper(doc, c) {
            doc.replace_with_children(c);
        }
    }

    clean_text_children(doc, id);
    collapse_class_whitespace(doc, id);
}

/// A `span` with no attributes and no parse metadata contributes nothing; it
/// is the classic wrapper a rich-text editor leaves behind. Spans that carry
/// a stable id or a source range came from the parse and stay.
fn is_bare_wrapper(doc: &Document, id: NodeId) -> bool {
    match &doc.node(id).data {
        NodeData::Element { name, attrs } => {
            name == "span" && attrs.is_empty() && *doc.meta(id) == NodeMeta::default()
        }
        _ => false,
    }
}

fn clean_text_children(doc: &mut Document, id: NodeId) {
    let drop_whitespace = doc
        .element_name(id)
        .is_some_and(|n| STRUCTURAL_CONTAINERS.contains(&n));

    for c in doc.children(id).to_vec() {
        if let NodeData::Text(t) = &doc.node(c).data
            && (t.is_empty() || (drop_whitespace && t.trim().is_empty()))
        {
            doc.detach(c);
        }
    }

    // Merge adjacent text siblings pairwise until stable.
    loop {
        let children = doc.children(id).to_vec();
        let pair = children.windows(2).find_map(|w| {
            let both_text = matches!(doc.node(w[0]).data, NodeData::Text(_))
                && matches!(doc.node(w[1]).data, NodeData::Text(_));
            both_text.then(|| (w[0], w[1]))
        });
        let Some((a, b)) = pair else {
            break;
        };
        let NodeData::Text(tb) = doc.node(b).data.clone() else {
            unreachable!()
        };
        if let NodeData::Text(ta) = &mut doc.node_mut(a).data {
            ta.push_str(&tb);
        }
        doc.detach(b);
    }
}

fn collapse_class_whitespace(doc: &mut Document, id: NodeId) {
    let Some(v) = doc.attr(id, "class") else {
        return;
    };
    let collapsed = v.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        doc.remove_attr(id, "class");
    } else if collapsed != v {
        doc.set_attr(id, "class", &collapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shape(doc: &Document) -> String {
        doc.to_json().unwrap()
    }

    #[test]
    fn unwraps_bare_span_wrapper() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let span = doc.create_element("span");
        let t = doc.create_text("hi");
        doc.append(doc.root(), p);
        doc.append(p, span);
        doc.append(span, t);

        normalize(&mut doc);
        assert_eq!(doc.children(p), &[t]);
    }

    #[test]
    fn keeps_span_with_attributes_or_meta() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let span = doc.create_element("span");
        doc.set_attr(span, "typeof", "mw:LanguageVariant");
        doc.append(doc.root(), p);
        doc.append(p, span);

        normalize(&mut doc);
        assert_eq!(doc.children(p), &[span]);
    }

    #[test]
    fn merges_adjacent_and_drops_empty_text() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.append(doc.root(), p);
        for t in ["he", "", "llo", " world"] {
            let n = doc.create_text(t);
            doc.append(p, n);
        }

        normalize(&mut doc);
        assert_eq!(doc.children(p).len(), 1);
        assert_eq!(doc.text_content(p), "hello world");
    }

    #[test]
    fn drops_whitespace_between_list_items() {
        let mut doc = Document::new();
        let ul = doc.create_element("ul");
        let li1 = doc.create_element("li");
        let ws = doc.create_text("\n  ");
        let li2 = doc.create_element("li");
        doc.append(doc.root(), ul);
        doc.append(ul, li1);
        doc.append(ul, ws);
        doc.append(ul, li2);

        normalize(&mut doc);
        assert_eq!(doc.children(ul), &[li1, li2]);
    }

    #[test]
    fn keeps_whitespace_inside_paragraphs() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let a = doc.create_text("a");
        let ws = doc.create_text(" ");
        let b = doc.create_text("b");
        doc.append(doc.root(), p);
        doc.append(p, a);
        doc.append(p, ws);
        doc.append(p, b);

        normalize(&mut doc);
        assert_eq!(doc.text_content(p), "a b");
    }

    #[test]
    fn collapses_class_attribute_whitespace() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.set_attr(p, "class", "  a   b ");
        doc.append(doc.root(), p);

        normalize(&mut doc);
        assert_eq!(doc.attr(p, "class"), Some("a b"));
    }

    #[test]
    fn is_idempotent() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.set_attr(p, "class", " x  y ");
        let span = doc.create_element("span");
        let t1 = doc.create_text("a");
        let t2 = doc.create_text("b");
        doc.append(doc.root(), p);
        doc.append(p, span);
        doc.append(span, t1);
        doc.append(p, t2);

        normalize(&mut doc);
        let once = shape(&doc);
        normalize(&mut doc);
        assert_eq!(shape(&doc), once);
    }
}
