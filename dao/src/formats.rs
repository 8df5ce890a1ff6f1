//! Response body parsing.
//!
//! Each [`ResponseFormat`] has a dedicated parser producing a [`Payload`].
//! XML and HTML-as-XML share one element-tree builder over `quick-xml`; the
//! HTML variant relaxes end-tag checking to tolerate markup that is not
//! well-formed XML.

use crate::errors::DaoError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Json,
    Xml,
    HtmlAsXml,
    Raw,
}

impl ResponseFormat {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Xml => "xml",
            ResponseFormat::HtmlAsXml => "html",
            ResponseFormat::Raw => "raw",
        }
    }
}

/// Parsed response payload. Cached values are clones of this.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Xml(XmlElement),
    Raw(String),
}

/// Owned XML element tree. Text of all child text nodes is concatenated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// First direct child with the given element name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

pub fn parse(format: ResponseFormat, body: &str) -> Result<Payload, DaoError> {
    match format {
        ResponseFormat::Json => {
            let value = serde_json::from_str(body).map_err(|e| DaoError::ParseFailed {
                format: format.as_str(),
                message: e.to_string(),
            })?;
            Ok(Payload::Json(value))
        }
        ResponseFormat::Xml => Ok(Payload::Xml(parse_xml(format, body, false)?)),
        ResponseFormat::HtmlAsXml => Ok(Payload::Xml(parse_xml(format, body, true)?)),
        ResponseFormat::Raw => Ok(Payload::Raw(body.to_string())),
    }
}

fn parse_xml(format: ResponseFormat, body: &str, lenient: bool) -> Result<XmlElement, DaoError> {
    let parse_failed = |message: String| DaoError::ParseFailed {
        format: format.as_str(),
        message,
    };

    let mut reader = Reader::from_str(body);
    let config = reader.config_mut();
    config.trim_text_start = true;
    config.trim_text_end = true;
    if lenient {
        config.check_end_names = false;
    }

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                stack.push(element_from(&start).map_err(&parse_failed)?);
            }
            Ok(Event::Empty(start)) => {
                let element = element_from(&start).map_err(&parse_failed)?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Text(text)) => {
                if let Some(open) = stack.last_mut() {
                    let unescaped = text.unescape().map_err(|e| parse_failed(e.to_string()))?;
                    open.text.push_str(&unescaped);
                }
            }
            Ok(Event::End(_)) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions, CDATA markers
            Ok(_) => {}
            Err(e) => return Err(parse_failed(e.to_string())),
        }
    }

    // In lenient mode unclosed elements may remain open at EOF; fold them in
    while let Some(element) = stack.pop() {
        attach(&mut stack, &mut root, element);
    }

    root.ok_or_else(|| parse_failed("no root element".to_string()))
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlElement, String> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(stack: &mut Vec<XmlElement>, root: &mut Option<XmlElement>, element: XmlElement) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    }
}
