use quick_xml::escape::escape;
use std::fmt;

use crate::utils::DocumentError;

/// A node in a markup tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// A markup element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing an existing value with the same name
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    /// Append character data, merging with a preceding text node
    ///
    /// Empty text is dropped so that a rendered tree parses back to an equal
    /// tree.
    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(&text);
        } else {
            self.children.push(Node::Text(text));
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Check that the tree is in the form `parse` produces
    ///
    /// Names must be markup names, attribute names unique per element, and
    /// text children non-empty and never adjacent. Only such trees render to
    /// markup that parses back to an equal tree.
    pub fn check_canonical(&self) -> Result<(), DocumentError> {
        if !is_name(&self.name) {
            return Err(DocumentError::InvalidName(self.name.clone()));
        }
        for (i, (name, _)) in self.attributes.iter().enumerate() {
            if !is_name(name) {
                return Err(DocumentError::InvalidName(name.clone()));
            }
            if self.attributes[..i].iter().any(|(seen, _)| seen == name) {
                return Err(DocumentError::DuplicateAttribute {
                    element: self.name.clone(),
                    attribute: name.clone(),
                });
            }
        }
        let mut after_text = false;
        for child in &self.children {
            match child {
                Node::Text(text) if text.is_empty() || after_text => {
                    return Err(DocumentError::UnmergedText(self.name.clone()));
                }
                Node::Text(_) => after_text = true,
                Node::Element(e) => {
                    e.check_canonical()?;
                    after_text = false;
                }
            }
        }
        Ok(())
    }

    /// Concatenated direct text content
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start(first) => {
            chars.all(|c| is_name_start(c) || c.is_numeric() || c == '-' || c == '.')
        }
        _ => false,
    }
}

/// Canonical textual form: attributes in insertion order, no added
/// whitespace, childless elements self-closed.
impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (name, value) in &self.attributes {
            write!(f, " {}=\"{}\"", name, escape(value.as_str()))?;
        }
        if self.children.is_empty() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        for child in &self.children {
            match child {
                Node::Element(e) => write!(f, "{}", e)?,
                Node::Text(t) => f.write_str(&escape(t.as_str()))?,
            }
        }
        write!(f, "</{}>", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_canonical_form() {
        let doc = Element::new("definitions")
            .with_attribute("name", "Stock & \"Quote\"")
            .with_child(Element::new("types"))
            .with_child(Element::new("message").with_text("a < b"));

        assert_eq!(
            doc.to_string(),
            "<definitions name=\"Stock &amp; &quot;Quote&quot;\">\
             <types/><message>a &lt; b</message></definitions>"
        );
    }

    #[test]
    fn test_text_merging_and_accessors() {
        let mut el = Element::new("a");
        el.push_text("foo");
        el.push_text("");
        el.push_text("bar");
        el.set_attribute("k", "1");
        el.set_attribute("k", "2");

        assert_eq!(el.children, vec![Node::Text("foobar".to_string())]);
        assert_eq!(el.attribute("k"), Some("2"));
        assert_eq!(el.attributes.len(), 1);
        assert_eq!(el.text(), "foobar");
        assert!(el.child("b").is_none());
    }

    #[test]
    fn test_builder_output_is_canonical() {
        let doc = Element::new("ns:definitions")
            .with_attribute("xml:lang", "en")
            .with_text("a")
            .with_child(Element::new("_part-1.x"))
            .with_text("b");
        assert!(doc.check_canonical().is_ok());
    }

    #[test]
    fn test_adjacent_and_empty_text_are_not_canonical() {
        let mut adjacent = Element::new("a");
        adjacent.children = vec![Node::Text("x".into()), Node::Text("y".into())];
        assert!(matches!(
            adjacent.check_canonical(),
            Err(DocumentError::UnmergedText(_))
        ));

        let mut empty = Element::new("a");
        empty.children = vec![Node::Text(String::new())];
        assert!(matches!(
            empty.check_canonical(),
            Err(DocumentError::UnmergedText(_))
        ));

        let mut nested = Element::new("root").with_child(Element::new("a"));
        if let Some(Node::Element(inner)) = nested.children.first_mut() {
            inner.children = vec![Node::Text("x".into()), Node::Text("y".into())];
        }
        assert!(nested.check_canonical().is_err());
    }

    #[test]
    fn test_duplicate_attributes_are_not_canonical() {
        let mut el = Element::new("a");
        el.attributes = vec![("k".into(), "1".into()), ("k".into(), "2".into())];
        assert!(matches!(
            el.check_canonical(),
            Err(DocumentError::DuplicateAttribute { .. })
        ));
    }

    #[test]
    fn test_invalid_names_are_not_canonical() {
        for name in ["has space", "", "1abc", "-x", "a<b", "a=b"] {
            assert!(matches!(
                Element::new(name).check_canonical(),
                Err(DocumentError::InvalidName(_))
            ));
        }
        let bad_attr = Element::new("a").with_attribute("two words", "v");
        assert!(matches!(
            bad_attr.check_canonical(),
            Err(DocumentError::InvalidName(_))
        ));
    }
}
