//! Escaping behavior at chunk boundaries, exercised through the full
//! serializer with freshly emitted content.

use pretty_assertions::assert_eq;
use rstest::rstest;
use selser_core::dom::meta::{NodeMeta, Syntax};
use selser_core::{Document, NodeId, Serializer, SiteConfig};

fn fresh(doc: &Document) -> String {
    let site = SiteConfig::default();
    Serializer::new(&site).serialize(doc, None, None).unwrap()
}

fn paragraph(doc: &mut Document) -> NodeId {
    let p = doc.create_element("p");
    let root = doc.root();
    doc.append(root, p);
    p
}

fn text(doc: &mut Document, parent: NodeId, s: &str) {
    let t = doc.create_text(s);
    doc.append(parent, t);
}

fn wikilink(doc: &mut Document, parent: NodeId, target: &str, label: &str) {
    let a = doc.create_element("a");
    doc.set_attr(a, "rel", "mw:WikiLink");
    doc.set_attr(a, "href", &format!("./{target}"));
    doc.append(parent, a);
    text(doc, a, label);
}

fn autourl(doc: &mut Document, parent: NodeId, url: &str) {
    let a = doc.create_element("a");
    doc.set_attr(a, "rel", "mw:ExtLink");
    doc.set_attr(a, "href", url);
    doc.set_meta(
        a,
        NodeMeta {
            syntax: Some(Syntax::Url),
            ..Default::default()
        },
    );
    doc.append(parent, a);
    text(doc, a, url);
}

fn magiclink(doc: &mut Document, parent: NodeId, content: &str) {
    let a = doc.create_element("a");
    doc.set_attr(a, "rel", "mw:ExtLink");
    doc.set_meta(
        a,
        NodeMeta {
            syntax: Some(Syntax::Magiclink),
            ..Default::default()
        },
    );
    doc.append(parent, a);
    text(doc, a, content);
}

fn langvariant(doc: &mut Document, parent: NodeId, content: &str) {
    let span = doc.create_element("span");
    doc.set_attr(span, "typeof", "mw:LanguageVariant");
    doc.append(parent, span);
    text(doc, span, content);
}

fn extlink(doc: &mut Document, parent: NodeId, href: &str, label: &str) {
    let a = doc.create_element("a");
    doc.set_attr(a, "rel", "mw:ExtLink");
    doc.set_attr(a, "href", href);
    doc.append(parent, a);
    text(doc, a, label);
}

#[test]
fn trail_letter_after_wikilink_is_escaped() {
    let mut doc = Document::new();
    let p = paragraph(&mut doc);
    wikilink(&mut doc, p, "Foo", "Foo");
    text(&mut doc, p, "s");
    assert_eq!(fresh(&doc), "[[Foo]]<nowiki/>s");
}

#[test]
fn apostrophe_after_wikilink_is_safe() {
    let mut doc = Document::new();
    let p = paragraph(&mut doc);
    wikilink(&mut doc, p, "Foo", "Foo");
    text(&mut doc, p, "'s");
    assert_eq!(fresh(&doc), "[[Foo]]'s");
}

#[test]
fn literal_bracket_before_wikilink_is_escaped() {
    let mut doc = Document::new();
    let p = paragraph(&mut doc);
    text(&mut doc, p, "[");
    wikilink(&mut doc, p, "Foo", "Foo");
    assert_eq!(fresh(&doc), "[<nowiki/>[[Foo]]");
}

#[test]
fn word_character_before_url_is_escaped() {
    let mut doc = Document::new();
    let p = paragraph(&mut doc);
    text(&mut doc, p, "foo");
    autourl(&mut doc, p, "https://example.com");
    assert_eq!(fresh(&doc), "foo<nowiki/>https://example.com");
}

#[test]
fn space_before_url_is_safe() {
    let mut doc = Document::new();
    let p = paragraph(&mut doc);
    text(&mut doc, p, "see ");
    autourl(&mut doc, p, "https://example.com");
    assert_eq!(fresh(&doc), "see https://example.com");
}

#[rstest]
#[case(".")]
#[case(",")]
#[case(";")]
#[case(":")]
#[case("!")]
#[case("?")]
#[case(")")]
fn strippable_punctuation_after_url_is_safe(#[case] punct: &str) {
    let mut doc = Document::new();
    let p = paragraph(&mut doc);
    autourl(&mut doc, p, "https://example.com");
    text(&mut doc, p, punct);
    assert_eq!(fresh(&doc), format!("https://example.com{punct}"));
}

#[test]
fn word_character_after_url_is_escaped() {
    let mut doc = Document::new();
    let p = paragraph(&mut doc);
    autourl(&mut doc, p, "https://example.com");
    text(&mut doc, p, "bar");
    assert_eq!(fresh(&doc), "https://example.com<nowiki/>bar");
}

#[test]
fn close_paren_after_parenthesized_url_is_escaped() {
    let mut doc = Document::new();
    let p = paragraph(&mut doc);
    autourl(&mut doc, p, "https://example.com/foo(bar");
    text(&mut doc, p, ")");
    assert_eq!(fresh(&doc), "https://example.com/foo(bar<nowiki/>)");
}

#[test]
fn magic_link_flanked_by_word_characters() {
    let mut doc = Document::new();
    let p = paragraph(&mut doc);
    text(&mut doc, p, "see");
    magiclink(&mut doc, p, "ISBN 1234567890");
    text(&mut doc, p, "1");
    assert_eq!(fresh(&doc), "see<nowiki/>ISBN 1234567890<nowiki/>1");
}

#[test]
fn dash_before_language_variant_is_escaped() {
    let mut doc = Document::new();
    let p = paragraph(&mut doc);
    text(&mut doc, p, "x-");
    langvariant(&mut doc, p, "zh:a");
    assert_eq!(fresh(&doc), "x-<nowiki/>-{zh:a}-");
}

#[test]
fn plain_text_before_language_variant_is_safe() {
    let mut doc = Document::new();
    let p = paragraph(&mut doc);
    text(&mut doc, p, "x");
    langvariant(&mut doc, p, "zh:a");
    assert_eq!(fresh(&doc), "x-{zh:a}-");
}

#[test]
fn external_link_brackets_double_up() {
    // The doubled-bracket output is the accepted fixed point for this
    // construct; it re-parses to the same rendering.
    let mut doc = Document::new();
    let p = paragraph(&mut doc);
    text(&mut doc, p, "[");
    extlink(&mut doc, p, "https://example.com", "label");
    text(&mut doc, p, "]");
    assert_eq!(fresh(&doc), "[[https://example.com label]]");
}
