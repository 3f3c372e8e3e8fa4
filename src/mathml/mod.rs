//! The MathML element model and the XML front-end.
//!
//! Elements form a sum type over the supported tag set; children are a
//! uniform sequence and attributes a small keyed list. Unknown elements are
//! kept in the tree as [`Tag::Unknown`] and later laid out as if they were
//! `<mrow>` over their children, with a warning.

mod entities;

use log::warn;

use crate::error::{ParseError, ParseResult};

/// The supported MathML element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Math,
    Mrow,
    Mi,
    Mn,
    Mo,
    Mtext,
    Ms,
    Mspace,
    Msup,
    Msub,
    Msubsup,
    Mover,
    Munder,
    Munderover,
    Mfrac,
    Msqrt,
    Mroot,
    Mfenced,
    Menclose,
    Mtable,
    Mtr,
    Mtd,
    Mmultiscripts,
    Mprescripts,
    None_,
    Mstyle,
    Mpadded,
    Mphantom,
    /// Anything else; rendered as `<mrow>` over its children.
    Unknown,
}

impl Tag {
    fn from_name(name: &str) -> Tag {
        match name {
            "math" => Tag::Math,
            "mrow" => Tag::Mrow,
            "mi" => Tag::Mi,
            "mn" => Tag::Mn,
            "mo" => Tag::Mo,
            "mtext" => Tag::Mtext,
            "ms" => Tag::Ms,
            "mspace" => Tag::Mspace,
            "msup" => Tag::Msup,
            "msub" => Tag::Msub,
            "msubsup" => Tag::Msubsup,
            "mover" => Tag::Mover,
            "munder" => Tag::Munder,
            "munderover" => Tag::Munderover,
            "mfrac" => Tag::Mfrac,
            "msqrt" => Tag::Msqrt,
            "mroot" => Tag::Mroot,
            "mfenced" => Tag::Mfenced,
            "menclose" => Tag::Menclose,
            "mtable" => Tag::Mtable,
            "mtr" => Tag::Mtr,
            "mtd" => Tag::Mtd,
            "mmultiscripts" => Tag::Mmultiscripts,
            "mprescripts" => Tag::Mprescripts,
            "none" => Tag::None_,
            "mstyle" => Tag::Mstyle,
            "mpadded" => Tag::Mpadded,
            "mphantom" => Tag::Mphantom,
            _ => Tag::Unknown,
        }
    }

    /// Leaf elements whose character payload is typeset directly.
    pub fn is_token(self) -> bool {
        matches!(self, Tag::Mi | Tag::Mn | Tag::Mo | Tag::Mtext | Tag::Ms)
    }
}

/// A parsed MathML element.
#[derive(Debug, Clone)]
pub struct MathNode {
    pub tag: Tag,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<MathNode>,
    /// Character payload for token elements.
    pub text: String,
}

impl MathNode {
    pub fn new(tag: Tag) -> MathNode {
        MathNode { tag, attrs: Vec::new(), children: Vec::new(), text: String::new() }
    }

    pub fn with_text(tag: Tag, text: impl Into<String>) -> MathNode {
        MathNode { text: text.into(), ..MathNode::new(tag) }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attrs.push((name.to_string(), value.into()));
    }

    /// `"true"`/`"false"` attributes.
    pub fn bool_attr(&self, name: &str) -> Option<bool> {
        match self.attr(name) {
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(other) => {
                warn!("attribute {}=\"{}\" is not a boolean; ignored", name, other);
                None
            }
            None => None,
        }
    }

    /// Whether this node contributes no visible content (used when deciding
    /// operator forms in a row).
    pub fn is_space_like(&self) -> bool {
        match self.tag {
            Tag::Mspace => true,
            Tag::Mtext | Tag::Ms => self.text.trim().is_empty(),
            _ => false,
        }
    }
}

/// Parses a MathML document into an element tree.
///
/// The root may be `<math>` or any single supported element. MathML named
/// entities are resolved before the XML parser runs.
pub fn parse_mathml(source: &str) -> ParseResult<MathNode> {
    let resolved = resolve_entities(source);
    let doc = roxmltree::Document::parse(&resolved)
        .map_err(|e| ParseError::Xml(e.to_string()))?;
    let root = doc.root_element();
    Ok(convert(root))
}

fn convert(element: roxmltree::Node) -> MathNode {
    let tag = Tag::from_name(element.tag_name().name());
    if tag == Tag::Unknown {
        warn!(
            "unknown element <{}>; rendering as <mrow>",
            element.tag_name().name()
        );
    }

    let mut node = MathNode::new(tag);
    for attr in element.attributes() {
        node.attrs.push((attr.name().to_string(), attr.value().to_string()));
    }

    for child in element.children() {
        if child.is_element() {
            node.children.push(convert(child));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                node.text.push_str(text);
            }
        }
    }

    node.text = collapse_whitespace(&node.text);
    node
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = true; // leading whitespace is dropped
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

// XML predefines these five; everything else goes through the entity table.
const XML_ENTITIES: &[&str] = &["amp", "apos", "gt", "lt", "quot"];

fn resolve_entities(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail[1..].find(';') {
            Some(end) => {
                let name = &tail[1..end + 1];
                if name.starts_with('#') || XML_ENTITIES.contains(&name) {
                    out.push_str(&tail[..end + 2]);
                } else if let Some(c) = entities::lookup(name) {
                    out.push(c);
                } else {
                    warn!("unknown entity &{};", name);
                    out.push_str(&tail[..end + 2]);
                }
                rest = &tail[end + 2..];
            }
            None => {
                out.push_str(tail);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let node = parse_mathml("<math><mi>x</mi><mo>+</mo><mn>1</mn></math>").unwrap();
        assert_eq!(node.tag, Tag::Math);
        assert_eq!(node.children.len(), 3);
        assert_eq!(node.children[0].tag, Tag::Mi);
        assert_eq!(node.children[0].text, "x");
        assert_eq!(node.children[1].text, "+");
        assert_eq!(node.children[2].tag, Tag::Mn);
    }

    #[test]
    fn entities_resolve() {
        let node = parse_mathml("<mi>&alpha;</mi>").unwrap();
        assert_eq!(node.text, "α");
        // numeric and predefined references are left to the XML parser
        let node = parse_mathml("<mo>&#x222B;</mo>").unwrap();
        assert_eq!(node.text, "∫");
        let node = parse_mathml("<mo>&lt;</mo>").unwrap();
        assert_eq!(node.text, "<");
    }

    #[test]
    fn unknown_tag_is_kept() {
        let node = parse_mathml("<math><semantics><mi>x</mi></semantics></math>").unwrap();
        assert_eq!(node.children[0].tag, Tag::Unknown);
        assert_eq!(node.children[0].children[0].text, "x");
    }

    #[test]
    fn attributes_and_whitespace() {
        let node =
            parse_mathml("<mi mathvariant=\"bold\">  a\n b </mi>").unwrap();
        assert_eq!(node.attr("mathvariant"), Some("bold"));
        assert_eq!(node.text, "a b");
    }

    #[test]
    fn malformed_is_rejected() {
        assert!(parse_mathml("<math><mi>x</math>").is_err());
    }
}
