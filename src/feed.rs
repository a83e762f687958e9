//! NVD CPE dictionary XML parser.
//!
//! Reads the `cpe-list` document into [`FeedItem`]s. Only structure is
//! checked here; the CPE names themselves are validated when they are
//! unbound by [`crate::naming`].
//!
//! Namespace prefixes are ignored, so `cpe-23:cpe23-item` is matched by
//! its local name.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ParseError;

/// A localized title of a dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    pub lang: String,
    pub text: String,
}

/// One `cpe-item` of the dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// CPE 2.3 formatted string from the `cpe23-item` element.
    pub name: String,
    /// Legacy URI from the `cpe-item` `name` attribute.
    pub legacy_name: String,
    /// Titles in document order.
    pub titles: Vec<Title>,
}

struct PendingItem {
    legacy_name: String,
    name: Option<String>,
    titles: Vec<Title>,
}

#[derive(Default)]
struct FeedReader {
    open: Vec<String>,
    root_seen: bool,
    item: Option<PendingItem>,
    title: Option<Title>,
    items: Vec<FeedItem>,
}

/// Parse a decompressed dictionary document.
pub fn parse_feed(xml: &[u8]) -> Result<Vec<FeedItem>, ParseError> {
    // Title text is kept byte for byte, surrounding whitespace included.
    let mut reader = Reader::from_reader(xml);

    let mut state = FeedReader::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let local = local_name(&e);
                state.open_element(&e, &local)?;
                state.open.push(local);
            }
            Event::Empty(e) => {
                let local = local_name(&e);
                state.open_element(&e, &local)?;
                state.close_element(&local)?;
            }
            Event::End(_) => {
                if let Some(local) = state.open.pop() {
                    state.close_element(&local)?;
                }
            }
            Event::Text(t) => {
                if let Some(title) = state.title.as_mut() {
                    title.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(title) = state.title.as_mut() {
                    title.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !state.root_seen {
        return Err(ParseError::Empty);
    }
    if let Some(open) = state.open.last() {
        return Err(ParseError::Truncated(open.clone()));
    }
    Ok(state.items)
}

impl FeedReader {
    fn open_element(&mut self, e: &BytesStart, local: &str) -> Result<(), ParseError> {
        if self.open.is_empty() {
            if self.root_seen {
                return Err(ParseError::Xml(format!(
                    "second root element <{}>",
                    local
                )));
            }
            if local != "cpe-list" {
                return Err(ParseError::UnexpectedRoot(local.to_string()));
            }
            self.root_seen = true;
            return Ok(());
        }

        let parent = self.open.last().map(String::as_str);
        match (parent, local) {
            (Some("cpe-list"), "cpe-item") => {
                let legacy_name =
                    attribute(e, "name")?.ok_or(ParseError::MissingAttribute {
                        element: "cpe-item",
                        attribute: "name",
                    })?;
                self.item = Some(PendingItem {
                    legacy_name,
                    name: None,
                    titles: Vec::new(),
                });
            }
            (Some("cpe-item"), "title") => {
                let lang = attribute(e, "xml:lang")?.ok_or(ParseError::MissingAttribute {
                    element: "title",
                    attribute: "xml:lang",
                })?;
                self.title = Some(Title {
                    lang,
                    text: String::new(),
                });
            }
            (Some("cpe-item"), "cpe23-item") => {
                let name = attribute(e, "name")?.ok_or(ParseError::MissingAttribute {
                    element: "cpe23-item",
                    attribute: "name",
                })?;
                if let Some(item) = self.item.as_mut() {
                    item.name = Some(name);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close_element(&mut self, local: &str) -> Result<(), ParseError> {
        let parent = self.open.last().map(String::as_str);
        match (parent, local) {
            (Some("cpe-item"), "title") => {
                if let (Some(title), Some(item)) = (self.title.take(), self.item.as_mut()) {
                    item.titles.push(title);
                }
            }
            (Some("cpe-list"), "cpe-item") => {
                if let Some(item) = self.item.take() {
                    let name = item.name.ok_or_else(|| ParseError::MissingCpe23 {
                        item: item.legacy_name.clone(),
                    })?;
                    self.items.push(FeedItem {
                        name,
                        legacy_name: item.legacy_name,
                        titles: item.titles,
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart, key: &str) -> Result<Option<String>, ParseError> {
    match e.try_get_attribute(key)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}
