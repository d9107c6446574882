//! Raw feed entry model and RSS parsing.
//!
//! ACM-style RSS feeds scatter publication metadata across a mix of
//! plain RSS elements and `prism:`/`dc:` extension elements, with
//! inconsistent capitalization between feeds. The parser below keeps
//! every date-ish field it sees on the raw entry and leaves choosing
//! between them to the normalizer, which probes them in priority
//! order.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use recensio_common::{RecensioError, Result};
use tracing::warn;

/// One upstream feed entry, fields verbatim as the feed supplied them.
/// Any subset may be present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub dc_creator: Option<String>,
    /// Collected when the feed repeats creator/author elements.
    pub authors: Vec<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub prism_coverdate: Option<String>,
    pub prism_publicationdate: Option<String>,
    pub dc_date: Option<String>,
    pub pub_date: Option<String>,
    pub prism_publicationname: Option<String>,
}

/// Which `RawEntry` field a feed element maps onto.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Title,
    Link,
    Summary,
    Author,
    DcCreator,
    Published,
    Updated,
    PrismCoverDate,
    PrismPublicationDate,
    DcDate,
    PubDate,
    PrismPublicationName,
}

fn field_for(name: &[u8]) -> Option<Field> {
    // Feeds disagree on capitalization (prism:coverDate vs
    // prism:coverdate), so match case-insensitively.
    let lower = name.to_ascii_lowercase();
    match lower.as_slice() {
        b"title" => Some(Field::Title),
        b"link" => Some(Field::Link),
        b"description" | b"summary" => Some(Field::Summary),
        b"author" => Some(Field::Author),
        b"dc:creator" => Some(Field::DcCreator),
        b"published" => Some(Field::Published),
        b"updated" => Some(Field::Updated),
        b"prism:coverdate" => Some(Field::PrismCoverDate),
        b"prism:publicationdate" => Some(Field::PrismPublicationDate),
        b"dc:date" => Some(Field::DcDate),
        b"pubdate" => Some(Field::PubDate),
        b"prism:publicationname" => Some(Field::PrismPublicationName),
        _ => None,
    }
}

impl RawEntry {
    fn set(&mut self, field: Field, text: String) {
        if text.is_empty() {
            return;
        }
        match field {
            Field::Title => fill(&mut self.title, text),
            Field::Link => fill(&mut self.link, text),
            Field::Summary => fill(&mut self.summary, text),
            Field::Author => {
                self.authors.push(text.clone());
                fill(&mut self.author, text);
            }
            Field::DcCreator => {
                self.authors.push(text.clone());
                fill(&mut self.dc_creator, text);
            }
            Field::Published => fill(&mut self.published, text),
            Field::Updated => fill(&mut self.updated, text),
            Field::PrismCoverDate => fill(&mut self.prism_coverdate, text),
            Field::PrismPublicationDate => fill(&mut self.prism_publicationdate, text),
            Field::DcDate => fill(&mut self.dc_date, text),
            Field::PubDate => fill(&mut self.pub_date, text),
            Field::PrismPublicationName => fill(&mut self.prism_publicationname, text),
        }
    }
}

/// First occurrence wins; repeated elements don't overwrite.
fn fill(slot: &mut Option<String>, text: String) {
    if slot.is_none() {
        *slot = Some(text);
    }
}

/// Non-empty attribute value on an element, unescaped.
fn attr_value(e: &BytesStart, name: &[u8]) -> Option<String> {
    let attr = e.try_get_attribute(name).ok().flatten()?;
    let value = attr.unescape_value().ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse an RSS/Atom document into raw entries.
///
/// Handles `<item>` (RSS 2.0) and `<entry>` (Atom) containers. A
/// low-level XML error mid-document is logged and terminates the scan,
/// returning whatever entries were complete by then; a document that
/// fails before the first entry yields an `Xml` error so the caller
/// can report the source as failed.
pub fn parse_feed_entries(xml: &str) -> Result<Vec<RawEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<RawEntry> = None;
    let mut current_field: Option<Field> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"item" | b"entry" => {
                    current = Some(RawEntry::default());
                    current_field = None;
                }
                name if current.is_some() => {
                    current_field = field_for(name);
                    // Atom carries the entry URL in an attribute:
                    // <link href="..."/>. RSS puts it in element text,
                    // which the Text handler picks up instead.
                    if current_field == Some(Field::Link) {
                        if let (Some(entry), Some(href)) =
                            (current.as_mut(), attr_value(e, b"href"))
                        {
                            entry.set(Field::Link, href);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if let Some(entry) = current.as_mut() {
                    if field_for(e.name().as_ref()) == Some(Field::Link) {
                        if let Some(href) = attr_value(e, b"href") {
                            entry.set(Field::Link, href);
                        }
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), current_field) {
                    let text = e.unescape().unwrap_or_default().trim().to_string();
                    entry.set(field, text);
                }
            }
            Ok(Event::CData(ref e)) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), current_field) {
                    let text = String::from_utf8_lossy(e).trim().to_string();
                    entry.set(field, text);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"item" | b"entry" => {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                    current_field = None;
                }
                _ => current_field = None,
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                if entries.is_empty() && current.is_none() {
                    return Err(RecensioError::Xml(e.to_string()));
                }
                warn!(error = %e, parsed = entries.len(), "feed XML error mid-document, keeping parsed entries");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/"
     xmlns:prism="http://prismstandard.org/namespaces/basic/2.0/">
  <channel>
    <title>ACM: Gameplay search results</title>
    <item>
      <title><![CDATA[Using fNIRS to Assess Cognitive Activity During Gameplay]]></title>
      <link>https://dl.acm.org/doi/10.1145/3549519?download=true</link>
      <description><![CDATA[This study employs fNIRS to measure workload.]]></description>
      <dc:creator>Madison Klarkowski</dc:creator>
      <dc:creator>Daniel Johnson</dc:creator>
      <prism:coverDate>2024-10-01</prism:coverDate>
      <prism:publicationName>CHI PLAY</prism:publicationName>
      <pubDate>Tue, 01 Oct 2024 00:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Entry without dates</title>
      <link>https://dl.acm.org/doi/10.1145/1111111</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_rss_items() {
        let entries = parse_feed_entries(SAMPLE_RSS).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(
            first.title.as_deref(),
            Some("Using fNIRS to Assess Cognitive Activity During Gameplay")
        );
        assert_eq!(first.prism_coverdate.as_deref(), Some("2024-10-01"));
        assert_eq!(first.prism_publicationname.as_deref(), Some("CHI PLAY"));
        assert_eq!(first.dc_creator.as_deref(), Some("Madison Klarkowski"));
        assert_eq!(first.authors.len(), 2);
        assert!(first.pub_date.is_some());

        let second = &entries[1];
        assert!(second.prism_coverdate.is_none());
        assert!(second.pub_date.is_none());
    }

    #[test]
    fn test_parse_atom_entries() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
          <entry>
            <title>An Atom entry</title>
            <link rel="alternate" href="https://dl.acm.org/doi/10.1145/777"/>
            <updated>2024-05-02T10:00:00Z</updated>
            <summary>Abstract text.</summary>
          </entry>
        </feed>"#;
        let entries = parse_feed_entries(xml).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].link.as_deref(),
            Some("https://dl.acm.org/doi/10.1145/777")
        );
        assert_eq!(entries[0].updated.as_deref(), Some("2024-05-02T10:00:00Z"));
        assert_eq!(entries[0].summary.as_deref(), Some("Abstract text."));
    }

    #[test]
    fn test_atom_link_href_on_non_self_closing_element() {
        let xml = r#"<feed><entry>
            <title>T</title>
            <link href="https://dl.acm.org/doi/10.1145/888"></link>
        </entry></feed>"#;
        let entries = parse_feed_entries(xml).unwrap();
        assert_eq!(
            entries[0].link.as_deref(),
            Some("https://dl.acm.org/doi/10.1145/888")
        );
    }

    #[test]
    fn test_repeated_author_elements_accumulate() {
        let xml = r#"<rss><channel><item>
            <title>T</title>
            <author>First Author</author>
            <author>Second Author</author>
        </item></channel></rss>"#;
        let entries = parse_feed_entries(xml).unwrap();
        assert_eq!(entries[0].author.as_deref(), Some("First Author"));
        assert_eq!(
            entries[0].authors,
            vec!["First Author".to_string(), "Second Author".to_string()]
        );
    }

    #[test]
    fn test_garbage_before_first_entry_is_an_error() {
        let res = parse_feed_entries("<rss><channel><item></rss>");
        assert!(res.is_err() || res.unwrap().is_empty());
    }

    #[test]
    fn test_repeated_elements_keep_first_value() {
        let xml = r#"<rss><channel><item>
            <title>First</title>
            <title>Second</title>
        </item></channel></rss>"#;
        let entries = parse_feed_entries(xml).unwrap();
        assert_eq!(entries[0].title.as_deref(), Some("First"));
    }
}
