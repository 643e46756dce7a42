//! RSS item extraction.
//!
//! [`parse`] walks the document with [`quick_xml`] in a lenient
//! configuration and turns the first [`ITEMS_PER_FEED`] `<item>` elements
//! into [`NewsItem`]s.  It never returns an error:
//!
//! * an item without `<title>` or `<link>` is dropped, its siblings are kept;
//! * unknown entities fall back to HTML entity decoding;
//! * a hard syntax error ends the walk, keeping the items completed so far.
//!
//! Child elements are matched by name anywhere inside the item and in any
//! order; the first occurrence of each wins.

use quick_xml::events::{BytesText, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use super::NewsItem;
use crate::text;

/// How many `<item>` elements are read from each feed.
pub const ITEMS_PER_FEED: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    PubDate,
    Category,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"link" => Some(Self::Link),
            b"description" => Some(Self::Description),
            b"pubDate" => Some(Self::PubDate),
            b"category" => Some(Self::Category),
            _ => None,
        }
    }
}

/// Text gathered for one `<item>` while it is open.
#[derive(Default)]
struct PendingItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    pub_date: Option<String>,
    category: Option<String>,
    /// Every text node inside the item, in document order.
    all_text: Vec<String>,
    /// Fields currently being captured, with the depth they were opened at.
    capturing: Vec<(Field, usize)>,
}

impl PendingItem {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Description => &mut self.description,
            Field::PubDate => &mut self.pub_date,
            Field::Category => &mut self.category,
        }
    }

    /// An element named `field` opened at `depth`.  Only its first
    /// occurrence is captured.
    fn open(&mut self, field: Field, depth: usize) {
        let slot = self.slot(field);
        if slot.is_none() {
            *slot = Some(String::new());
            self.capturing.push((field, depth));
        }
    }

    fn close(&mut self, depth: usize) {
        self.capturing.retain(|&(_, d)| d != depth);
    }

    fn push_text(&mut self, chunk: &str) {
        for (field, _) in self.capturing.clone() {
            if let Some(value) = self.slot(field) {
                value.push_str(chunk);
            }
        }
        self.all_text.push(chunk.to_string());
    }

    fn finish(self) -> Option<NewsItem> {
        let title = self.title?;
        let link = squash(&self.link?);
        if link.is_empty() {
            return None;
        }

        Some(NewsItem {
            title: text::normalize(&title),
            link,
            description: self.description.map(|d| text::normalize(&d)).unwrap_or_default(),
            pub_date: self.pub_date.map(|d| squash(&d)).unwrap_or_default(),
            summary: text::normalize(&self.all_text.join(" ")),
            category: self.category.map(|c| squash(&c)).unwrap_or_default(),
        })
    }
}

/// Collapse whitespace without touching markup or entities.
fn squash(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Unescape XML text, falling back to HTML entity rules for things like
/// `&nbsp;` that strict XML rejects.
fn decode_text(e: &BytesText<'_>) -> String {
    match e.unescape() {
        Ok(text) => text.into_owned(),
        Err(_) => {
            let raw = String::from_utf8_lossy(e);
            html_escape::decode_html_entities(&raw).into_owned()
        }
    }
}

/// Parse feed XML into at most [`ITEMS_PER_FEED`] items.
pub fn parse(content: &str) -> Vec<NewsItem> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().check_end_names = false;

    let mut items = Vec::new();
    let mut seen_elements = 0;
    let mut depth = 0usize;
    // The open item and the depth of its `<item>` tag.
    let mut current: Option<(PendingItem, usize)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                let name = e.name();
                match current.as_mut() {
                    Some((item, _)) => {
                        if let Some(field) = Field::from_name(name.as_ref()) {
                            item.open(field, depth);
                        }
                    }
                    None if name.as_ref() == b"item" => {
                        current = Some((PendingItem::default(), depth));
                    }
                    None => {}
                }
            }
            Ok(Event::Empty(e)) => match current.as_mut() {
                Some((item, _)) => {
                    if let Some(field) = Field::from_name(e.name().as_ref()) {
                        item.open(field, depth + 1);
                        item.close(depth + 1);
                    }
                }
                None if e.name().as_ref() == b"item" => {
                    // `<item/>` has neither title nor link.
                    seen_elements += 1;
                    debug!("dropping empty <item/>");
                    if seen_elements >= ITEMS_PER_FEED {
                        break;
                    }
                }
                None => {}
            },
            Ok(Event::End(_)) => {
                let closes_item = matches!(current, Some((_, d)) if d == depth);
                if closes_item {
                    if let Some((item, _)) = current.take() {
                        seen_elements += 1;
                        match item.finish() {
                            Some(item) => items.push(item),
                            None => debug!("dropping <item> without title or link"),
                        }
                    }
                } else if let Some((item, _)) = current.as_mut() {
                    item.close(depth);
                }
                depth = depth.saturating_sub(1);
                if seen_elements >= ITEMS_PER_FEED {
                    break;
                }
            }
            Ok(Event::Text(e)) => {
                if let Some((item, _)) = current.as_mut() {
                    item.push_text(&decode_text(&e));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some((item, _)) = current.as_mut() {
                    item.push_text(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::Eof) => {
                // An item left open by a truncated document still counts.
                if let Some((item, _)) = current.take() {
                    items.extend(item.finish());
                }
                break;
            }
            Err(e) => {
                warn!(
                    position = reader.error_position(),
                    error = %e,
                    kept = items.len(),
                    "malformed feed XML, keeping items parsed so far"
                );
                break;
            }
            _ => {}
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use rss::{CategoryBuilder, ChannelBuilder, ItemBuilder};

    fn feed_with(items: Vec<rss::Item>) -> String {
        ChannelBuilder::default()
            .title("Test Feed")
            .link("https://example.com")
            .description("fixture")
            .items(items)
            .build()
            .to_string()
    }

    fn numbered_item(n: usize) -> rss::Item {
        ItemBuilder::default()
            .title(format!("Item {n}"))
            .link(format!("https://example.com/{n}"))
            .pub_date("Tue, 10 Mar 2026 12:00:00 +0900".to_string())
            .build()
    }

    #[test]
    fn extracts_all_fields() {
        let item = ItemBuilder::default()
            .title("Markets &amp; <b>AI</b>".to_string())
            .link("https://example.com/a".to_string())
            .description("<p>Robots\nare <i>here</i></p>".to_string())
            .pub_date("Tue, 10 Mar 2026 12:00:00 +0900".to_string())
            .categories(vec![CategoryBuilder::default().name("Tech").build()])
            .build();

        let items = parse(&feed_with(vec![item]));
        assert_eq!(items.len(), 1);

        let item = &items[0];
        assert_eq!(item.title, "Markets & AI");
        assert_eq!(item.link, "https://example.com/a");
        assert_eq!(item.description, "Robots are here");
        assert_eq!(item.pub_date, "Tue, 10 Mar 2026 12:00:00 +0900");
        assert_eq!(item.category, "Tech");
    }

    #[test]
    fn caps_at_three_items_in_document_order() {
        let items = parse(&feed_with((1..=5).map(numbered_item).collect()));
        let links: Vec<_> = items.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(
            links,
            ["https://example.com/1", "https://example.com/2", "https://example.com/3"]
        );
    }

    #[test]
    fn item_without_link_is_dropped_and_siblings_survive() {
        let xml = r#"<rss><channel>
            <item><title>One</title><link>https://example.com/1</link></item>
            <item><title>No link</title></item>
            <item><title>Three</title><link>https://example.com/3</link></item>
        </channel></rss>"#;

        let items = parse(xml);
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["One", "Three"]);
    }

    #[test]
    fn dropped_items_still_count_towards_the_cap() {
        let xml = r#"<rss><channel>
            <item><title>No link</title></item>
            <item><link>https://example.com/no-title</link></item>
            <item/>
            <item><title>Fourth</title><link>https://example.com/4</link></item>
        </channel></rss>"#;

        assert!(parse(xml).is_empty());
    }

    #[test]
    fn optional_fields_default_to_empty() {
        let xml = "<rss><channel><item><title>T</title><link>https://x</link></item></channel></rss>";
        let items = parse(xml);
        assert_eq!(items[0].description, "");
        assert_eq!(items[0].pub_date, "");
        assert_eq!(items[0].category, "");
    }

    #[test]
    fn pub_date_is_not_validated() {
        let xml = "<rss><channel><item><title>T</title><link>https://x</link>\
                   <pubDate>sometime</pubDate></item></channel></rss>";
        assert_eq!(parse(xml)[0].pub_date, "sometime");
    }

    #[test]
    fn summary_covers_whole_item_text() {
        let xml = r#"<rss><channel><item>
            <title>Headline</title>
            <link>https://example.com/s</link>
            <description><![CDATA[<p>Body <b>text</b></p>]]></description>
            <pubDate>Tue, 10 Mar 2026 12:00:00 +0900</pubDate>
        </item></channel></rss>"#;

        let item = &parse(xml)[0];
        assert_eq!(item.description, "Body text");
        assert_eq!(
            item.summary,
            "Headline https://example.com/s Body text Tue, 10 Mar 2026 12:00:00 +0900"
        );
    }

    #[test]
    fn children_are_order_independent_and_unknown_ones_ignored() {
        let xml = r#"<rss><channel><item>
            <guid>g</guid>
            <link> https://example.com/o </link>
            <dc:creator>Someone</dc:creator>
            <title>Ordered</title>
        </item></channel></rss>"#;

        let item = &parse(xml)[0];
        assert_eq!(item.title, "Ordered");
        assert_eq!(item.link, "https://example.com/o");
    }

    #[test]
    fn first_occurrence_of_a_field_wins() {
        let xml = "<rss><channel><item><title>T</title><link>https://x</link>\
                   <category>First</category><category>Second</category></item></channel></rss>";
        assert_eq!(parse(xml)[0].category, "First");
    }

    #[test]
    fn html_entities_unknown_to_xml_are_decoded() {
        let xml = "<rss><channel><item><title>A&nbsp;B &amp; C</title>\
                   <link>https://x</link></item></channel></rss>";
        let title = &parse(xml)[0].title;
        assert!(title.starts_with('A') && title.ends_with("B & C"), "{title:?}");
    }

    #[test]
    fn mismatched_end_tags_are_tolerated() {
        let xml = "<rss><channel><item><title>T</titel><link>https://x</link></item></channel></rss>";
        assert_eq!(parse(xml).len(), 1);
    }

    #[test]
    fn truncated_document_keeps_completed_items() {
        let xml = "<rss><channel>\
                   <item><title>Done</title><link>https://example.com/done</link></item>\
                   <item><title>Cut";
        let items = parse(xml);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Done");
    }

    #[test]
    fn garbage_yields_nothing() {
        assert!(parse("").is_empty());
        assert!(parse("this is not xml").is_empty());
        assert!(parse("<html><body>Not a feed</body></html>").is_empty());
    }
}
