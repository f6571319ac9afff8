//! Building a [`Document`] from quick-xml events

use super::tree::{Document, Element, Node, XML_NS};
use crate::error::XmlError;
use encoding_rs::{Encoding, UTF_8};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Input accepted by [`Document::parse`]
#[derive(Debug, Clone, Copy)]
pub enum XmlInput<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl<'a> From<&'a str> for XmlInput<'a> {
    fn from(text: &'a str) -> Self {
        XmlInput::Text(text)
    }
}

impl<'a> From<&'a String> for XmlInput<'a> {
    fn from(text: &'a String) -> Self {
        XmlInput::Text(text)
    }
}

impl<'a> From<&'a [u8]> for XmlInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        XmlInput::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for XmlInput<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        XmlInput::Bytes(bytes)
    }
}

impl Document {
    /// Parse decoded text or raw bytes
    ///
    /// Text is parsed as-is first. If that fails, or the input is bytes that
    /// are not UTF-8, the bytes are decoded using the BOM or the encoding named
    /// in the XML declaration and parsed again.
    pub fn parse<'a>(input: impl Into<XmlInput<'a>>) -> Result<Self, XmlError> {
        let bytes = match input.into() {
            XmlInput::Text(text) => match parse_str(text) {
                Ok(doc) => return Ok(doc),
                Err(err) => {
                    tracing::debug!("Text parse failed ({}), retrying from bytes", err);
                    text.as_bytes()
                }
            },
            XmlInput::Bytes(bytes) => bytes,
        };

        let utf8 = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        if let Ok(text) = std::str::from_utf8(utf8) {
            if !declares_foreign_encoding(utf8) {
                return parse_str(text);
            }
        }

        let decoded = decode(bytes)?;
        parse_str(&decoded)
    }
}

/// Encoding label from `<?xml ... encoding="..."?>`, if any
fn declared_encoding(bytes: &[u8]) -> Option<&str> {
    let head = bytes.strip_prefix(b"<?xml")?;
    let end = head.windows(2).position(|w| w == b"?>")?;
    let decl = std::str::from_utf8(&head[..end]).ok()?;
    let rest = &decl[decl.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    value.find(quote).map(|close| &value[..close])
}

fn declares_foreign_encoding(bytes: &[u8]) -> bool {
    declared_encoding(bytes)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .is_some_and(|encoding| encoding != UTF_8)
}

fn decode(bytes: &[u8]) -> Result<String, XmlError> {
    let encoding = match Encoding::for_bom(bytes) {
        Some((encoding, _)) => encoding,
        None => declared_encoding(bytes)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8),
    };
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(XmlError::Encoding(used.name()));
    }
    Ok(text.into_owned())
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Look up the namespace bound to `prefix` (None = default namespace)
fn resolve_namespace(
    prefix: Option<&str>,
    own: &[(String, String)],
    open: &[Element],
) -> Option<String> {
    if prefix == Some("xml") {
        return Some(XML_NS.to_string());
    }
    let key = match prefix {
        Some(prefix) => format!("xmlns:{prefix}"),
        None => "xmlns".to_string(),
    };
    let declared = own
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, uri)| uri.as_str())
        .or_else(|| open.iter().rev().find_map(|el| el.attr(&key)));

    match declared {
        // xmlns="" undeclares the default namespace
        Some("") => None,
        Some(uri) => Some(uri.to_string()),
        None => None,
    }
}

fn open_element(start: &BytesStart, open: &[Element]) -> Result<Element, XmlError> {
    let name = lossy(start.name().as_ref());

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = lossy(attr.key.as_ref());
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    let prefix = name.split_once(':').map(|(prefix, _)| prefix);
    let namespace = resolve_namespace(prefix, &attributes, open);
    Ok(Element::from_parts(name, namespace, attributes))
}

struct TreeBuilder {
    open: Vec<Element>,
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
}

impl TreeBuilder {
    fn attach(&mut self, node: Node) -> Result<(), XmlError> {
        if let Some(parent) = self.open.last_mut() {
            parent.push_node(node);
            return Ok(());
        }
        match node {
            Node::Element(el) => {
                if self.root.is_some() {
                    return Err(XmlError::Unbalanced("more than one root element"));
                }
                self.root = Some(el);
            }
            other if self.root.is_none() => self.prolog.push(other),
            other => self.epilog.push(other),
        }
        Ok(())
    }
}

fn parse_str(text: &str) -> Result<Document, XmlError> {
    let mut reader = Reader::from_str(text);
    let mut builder = TreeBuilder {
        open: Vec::new(),
        prolog: Vec::new(),
        root: None,
        epilog: Vec::new(),
    };
    let mut had_declaration = false;

    loop {
        match reader.read_event()? {
            Event::Decl(_) => had_declaration = true,
            Event::Start(start) => {
                let el = open_element(&start, &builder.open)?;
                builder.open.push(el);
            }
            Event::Empty(start) => {
                let el = open_element(&start, &builder.open)?;
                builder.attach(Node::Element(el))?;
            }
            Event::End(_) => {
                let el = builder
                    .open
                    .pop()
                    .ok_or(XmlError::Unbalanced("closing tag without opening tag"))?;
                builder.attach(Node::Element(el))?;
            }
            Event::Text(t) => builder.attach(Node::Text(lossy(&t)))?,
            Event::CData(c) => builder.attach(Node::CData(lossy(&c)))?,
            Event::Comment(c) => builder.attach(Node::Comment(lossy(&c)))?,
            Event::PI(pi) => builder.attach(Node::ProcessingInstruction(lossy(&pi)))?,
            Event::DocType(d) => builder.attach(Node::DocType(lossy(&d)))?,
            Event::Eof => break,
        }
    }

    if !builder.open.is_empty() {
        return Err(XmlError::Unbalanced("unclosed element at end of document"));
    }
    let root = builder
        .root
        .ok_or(XmlError::Unbalanced("document has no root element"))?;

    Ok(Document {
        prolog: builder.prolog,
        root,
        epilog: builder.epilog,
        had_declaration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTAINER: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

    #[test]
    fn test_parse_resolves_default_namespace() {
        let doc = Document::parse(CONTAINER).unwrap();
        let root = doc.root();
        assert_eq!(root.local_name(), "container");
        assert_eq!(
            root.namespace(),
            Some("urn:oasis:names:tc:opendocument:xmlns:container")
        );

        let rootfile = root.descendants(&|el: &Element| el.local_name() == "rootfile");
        assert_eq!(rootfile.len(), 1);
        assert_eq!(
            rootfile[0].namespace(),
            Some("urn:oasis:names:tc:opendocument:xmlns:container")
        );
        assert_eq!(rootfile[0].attr("full-path"), Some("OEBPS/content.opf"));
    }

    #[test]
    fn test_parse_resolves_prefixed_namespace() {
        let doc = Document::parse(
            r#"<opf:package xmlns:opf="http://www.idpf.org/2007/opf"><opf:manifest/><spine/></opf:package>"#,
        )
        .unwrap();
        let children: Vec<_> = doc.root().elements().collect();
        assert_eq!(children[0].namespace(), Some("http://www.idpf.org/2007/opf"));
        assert_eq!(children[1].namespace(), None);
    }

    #[test]
    fn test_parse_bytes_with_bom() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(CONTAINER.as_bytes());
        let doc = Document::parse(&bytes).unwrap();
        assert_eq!(doc.root().local_name(), "container");
    }

    #[test]
    fn test_parse_bytes_in_declared_legacy_encoding() {
        let mut bytes =
            br#"<?xml version="1.0" encoding="ISO-8859-2"?><title>"#.to_vec();
        // "Zażółć" in ISO-8859-2
        bytes.extend_from_slice(b"Za\xBF\xF3\xB3\xE6");
        bytes.extend_from_slice(b"</title>");

        let doc = Document::parse(&bytes).unwrap();
        assert_eq!(doc.root().text(), "Zażółć");
    }

    #[test]
    fn test_declared_encoding() {
        assert_eq!(
            declared_encoding(br#"<?xml version="1.0" encoding='utf-16'?><a/>"#),
            Some("utf-16")
        );
        assert_eq!(declared_encoding(b"<?xml version=\"1.0\"?><a/>"), None);
        assert_eq!(declared_encoding(b"<a/>"), None);
    }

    #[test]
    fn test_parse_rejects_unclosed_element() {
        assert!(Document::parse("<package><manifest></package>").is_err());
    }

    #[test]
    fn test_parse_keeps_comments_in_prolog() {
        let doc = Document::parse("<?xml version=\"1.0\"?>\n<!-- generated -->\n<a/>").unwrap();
        assert!(doc.had_declaration);
        assert!(doc
            .prolog
            .iter()
            .any(|node| matches!(node, Node::Comment(c) if c == " generated ")));
    }
}
