//! Serializing a [`Document`] back to UTF-8

use super::tree::{Document, Element, Node};
use crate::error::XmlError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

impl Document {
    /// Serialize as UTF-8 with an XML declaration
    ///
    /// Any encoding declared by the source is replaced: the output is always UTF-8.
    pub fn to_bytes(&self) -> Result<Vec<u8>, XmlError> {
        let mut writer = Writer::new(Vec::new());

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        if !self.had_declaration {
            writer.get_mut().write_all(b"\n")?;
        }

        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }

        Ok(writer.into_inner())
    }

    /// Serialize to a UTF-8 string
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        let bytes = self.to_bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name());
    for (key, value) in element.attributes() {
        start.push_attribute((key, value));
    }

    if element.children().is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in element.children() {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name())))?;
    Ok(())
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> Result<(), XmlError> {
    match node {
        Node::Element(el) => write_element(writer, el)?,
        Node::Text(raw) => writer.write_event(Event::Text(BytesText::from_escaped(raw.as_str())))?,
        Node::CData(data) => write_raw(writer, &["<![CDATA[", data, "]]>"])?,
        Node::Comment(comment) => write_raw(writer, &["<!--", comment, "-->"])?,
        Node::ProcessingInstruction(pi) => write_raw(writer, &["<?", pi, "?>"])?,
        Node::DocType(doctype) => write_raw(writer, &["<!DOCTYPE ", doctype.trim_start(), ">"])?,
    }
    Ok(())
}

fn write_raw<W: Write>(writer: &mut Writer<W>, parts: &[&str]) -> Result<(), XmlError> {
    let inner = writer.get_mut();
    for part in parts {
        inner.write_all(part.as_bytes())?;
    }
    Ok(())
}
