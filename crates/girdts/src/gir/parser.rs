//! XML to raw tree conversion
//!
//! The parser does not interpret GIR semantics; it only preserves element
//! structure, prefixed tag and attribute names, and document order.

use anyhow::{Context, Result, anyhow};
use roxmltree::{Document, Node, ParsingOptions};

use super::raw::{NodeIdGen, RawNode};

/// Parse a GIR document and return its root (`repository`) element
pub fn parse_gir(source: &str, ids: &mut NodeIdGen) -> Result<RawNode> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = Document::parse_with_options(source, options)
        .context("Failed to parse GIR document as XML")?;

    let root = document.root_element();
    if root.tag_name().name() != "repository" {
        return Err(anyhow!(
            "Expected <repository> as document root, found <{}>",
            root.tag_name().name()
        ));
    }

    Ok(convert(root, ids))
}

fn convert(node: Node<'_, '_>, ids: &mut NodeIdGen) -> RawNode {
    let tag = prefixed_name(node, node.tag_name().namespace(), node.tag_name().name());
    let mut raw = RawNode::new(ids.next_id(), tag);

    for attribute in node.attributes() {
        let name = prefixed_name(node, attribute.namespace(), attribute.name());
        raw.attrs.insert(name, attribute.value().to_owned());
    }

    for child in node.children().filter(Node::is_element) {
        raw.push_child(convert(child, ids));
    }

    raw
}

/// `c:type`, `glib:signal`, ... ; names in the default namespace stay bare
fn prefixed_name(node: Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    match namespace.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_owned(),
    }
}
