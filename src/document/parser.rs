use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt::Display;

use super::element::{Element, Node};
use crate::utils::DocumentError;

fn malformed(err: impl Display) -> DocumentError {
    DocumentError::Malformed(err.to_string())
}

fn utf8(bytes: &[u8]) -> Result<String, DocumentError> {
    Ok(std::str::from_utf8(bytes)?.to_string())
}

fn open_element(start: &BytesStart<'_>) -> Result<Element, DocumentError> {
    let mut element = Element::new(utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(malformed)?;
        let value = attr.unescape_value().map_err(malformed)?;
        element.set_attribute(utf8(attr.key.as_ref())?, value.into_owned());
    }
    Ok(element)
}

/// Close an element into its parent, or make it the root
fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), DocumentError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(DocumentError::TrailingContent),
    }
    Ok(())
}

/// Parse markup bytes into an element tree
///
/// Declarations, comments, processing instructions and doctypes are skipped.
/// Exactly one root element is required; only whitespace may surround it.
pub fn parse(bytes: &[u8]) -> Result<Element, DocumentError> {
    let source = std::str::from_utf8(bytes)?;
    let mut reader = Reader::from_str(source);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(DocumentError::TrailingContent);
                }
                stack.push(open_element(&start)?);
            }
            Event::Empty(start) => {
                let element = open_element(&start)?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                // quick-xml has already matched the end name against the start
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed("unexpected closing tag"))?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(malformed)?;
                match stack.last_mut() {
                    Some(parent) => parent.push_text(text.into_owned()),
                    None if text.trim().is_empty() => {}
                    None if root.is_some() => return Err(DocumentError::TrailingContent),
                    None => return Err(malformed("text before the root element")),
                }
            }
            Event::CData(data) => {
                let text = utf8(&data.into_inner())?;
                match stack.last_mut() {
                    Some(parent) => parent.push_text(text),
                    None => return Err(malformed("character data outside the root element")),
                }
            }
            Event::Eof => break,
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(DocumentError::Unclosed(open.name));
    }
    root.ok_or(DocumentError::Empty)
}
