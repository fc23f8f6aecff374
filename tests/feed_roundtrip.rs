//! End-to-end feed parsing and round-trip stability.
//!
//! Fixtures follow RFC 4287's own examples: a minimal single-entry feed and
//! a fully decorated one. The round-trip property — parse, serialize,
//! parse again, compare field-by-field — is checked both on the fixtures
//! and on generated feeds.

use chrono::DateTime;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use plumage::{Content, Entry, Feed, Link, Links, Person};

const SIMPLE_SINGLE_ENTRY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Feed</title>
  <link href="http://example.org/"/>
  <updated>2003-12-13T18:30:02Z</updated>
  <author>
    <name>John Doe</name>
  </author>
  <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
  <entry>
    <title>Atom-Powered Robots Run Amok</title>
    <link href="http://example.org/2003/12/13/atom03"/>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
    <updated>2003-12-13T18:30:02Z</updated>
    <summary>Some text.</summary>
  </entry>
</feed>"#;

#[test]
fn simple_feed_parses_completely() {
    let feed = Feed::from_xml(SIMPLE_SINGLE_ENTRY).unwrap();

    assert_eq!(feed.title.as_ref().unwrap(), "Example Feed");
    assert_eq!(
        feed.id.as_deref(),
        Some("urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6")
    );
    assert_eq!(
        feed.updated.unwrap(),
        DateTime::parse_from_rfc3339("2003-12-13T18:30:02Z").unwrap()
    );
    assert_eq!(feed.authors[0].name.as_deref(), Some("John Doe"));
    assert_eq!(feed.entries.len(), 1);

    // a link with no rel attribute serves as the alternate
    assert_eq!(
        feed.alternate().unwrap().href.as_deref(),
        Some("http://example.org/")
    );
}

#[test]
fn simple_feed_entry_fields() {
    let feed = Feed::from_xml(SIMPLE_SINGLE_ENTRY).unwrap();
    let entry = &feed.entries[0];

    assert_eq!(entry.title.as_ref().unwrap(), "Atom-Powered Robots Run Amok");
    assert_eq!(
        entry.id.as_deref(),
        Some("urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a")
    );
    assert_eq!(entry.summary.as_ref().unwrap(), "Some text.");
    assert_eq!(
        entry.alternate().unwrap().href.as_deref(),
        Some("http://example.org/2003/12/13/atom03")
    );
}

#[test]
fn simple_feed_roundtrip_is_field_equal() {
    let feed = Feed::from_xml(SIMPLE_SINGLE_ENTRY).unwrap();
    let once = Feed::from_xml(&feed.to_xml().unwrap()).unwrap();
    let twice = Feed::from_xml(&once.to_xml().unwrap()).unwrap();
    assert_eq!(once, feed);
    assert_eq!(twice, once);
}

#[test]
fn unknown_markup_is_ignored_without_error() {
    let feed = Feed::from_xml(
        r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom" mystery="true">
  <title>Tolerant</title>
  <shiny-new-element>
    <title>not the feed title</title>
  </shiny-new-element>
  <id>urn:uuid:1</id>
  <entry>
    <id>urn:uuid:2</id>
    <ranking stars="5"/>
  </entry>
</feed>"#,
    )
    .unwrap();

    // the unknown same-namespace elements populated nothing, and the
    // nested <title> inside one never leaked into the feed title
    assert_eq!(feed.title.as_ref().unwrap(), "Tolerant");
    assert_eq!(feed.id.as_deref(), Some("urn:uuid:1"));
    assert!(feed.extensions.is_empty());
    assert_eq!(feed.entries.len(), 1);
    assert!(feed.entries[0].extensions.is_empty());
}

#[test]
fn html_titles_collapse_whitespace() {
    let feed = Feed::from_xml(
        "<feed xmlns=\"http://www.w3.org/2005/Atom\">\n  <title type=\"html\">Breaking:\n\t\teverything   is&lt;br/&gt;fine</title>\n</feed>",
    )
    .unwrap();
    assert_eq!(
        feed.title.as_ref().unwrap(),
        "Breaking: everything is<br/>fine"
    );
}

#[test]
fn xhtml_titles_strip_the_div_wrapper() {
    let feed = Feed::from_xml(
        r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml">Less: <em>&lt;</em></div></title>
  <id>urn:x</id>
</feed>"#,
    )
    .unwrap();
    assert_eq!(feed.title.as_ref().unwrap(), "Less: <em>&lt;</em>");
    // parsing continued past the inline markup
    assert_eq!(feed.id.as_deref(), Some("urn:x"));
}

// ---------------------------------------------------------------------------
// Generated round trips
// ---------------------------------------------------------------------------

prop_compose! {
    fn arb_timestamp()(secs in 0i64..4_000_000_000i64) -> chrono::DateTime<chrono::FixedOffset> {
        chrono::DateTime::from_timestamp(secs, 0).unwrap().fixed_offset()
    }
}

fn arb_text() -> impl Strategy<Value = String> {
    // printable ASCII exercises XML escaping without colliding with the
    // whitespace-collapsing rules for html/xhtml payloads
    "[ -~]{0,30}"
}

prop_compose! {
    fn arb_link()(
        path in "[a-z]{1,10}",
        rel in prop_oneof![
            Just(None),
            Just(Some("alternate".to_string())),
            Just(Some("self".to_string())),
            Just(Some("enclosure".to_string())),
            Just(Some("edit".to_string())),
        ],
        length in prop_oneof![Just(None), (1u64..1_000_000).prop_map(Some)],
    ) -> Link {
        Link {
            href: Some(format!("http://example.org/{}", path)),
            rel,
            media_type: None,
            length,
        }
    }
}

prop_compose! {
    fn arb_entry()(
        id in arb_text(),
        title in arb_text(),
        summary in arb_text(),
        updated in proptest::option::of(arb_timestamp()),
        links in proptest::collection::vec(arb_link(), 0..3),
        author_name in arb_text(),
    ) -> Entry {
        Entry {
            id: Some(id),
            title: Some(Content::from_text(title)),
            summary: Some(Content::from_text(summary)),
            updated,
            links: Links::from(links),
            authors: vec![Person { name: Some(author_name), ..Default::default() }],
            ..Default::default()
        }
    }
}

prop_compose! {
    fn arb_feed()(
        id in arb_text(),
        title in arb_text(),
        updated in proptest::option::of(arb_timestamp()),
        links in proptest::collection::vec(arb_link(), 0..3),
        entries in proptest::collection::vec(arb_entry(), 0..3),
    ) -> Feed {
        Feed {
            id: Some(id),
            title: Some(Content::from_text(title)),
            updated,
            links: Links::from(links),
            entries,
            ..Default::default()
        }
    }
}

proptest! {
    /// parse ∘ serialize is a fixed point: whatever normalization the
    /// first trip applies, the second trip must be the identity.
    #[test]
    fn roundtrip_reaches_a_fixed_point(feed in arb_feed()) {
        let once = Feed::from_xml(&feed.to_xml().unwrap()).unwrap();
        let twice = Feed::from_xml(&once.to_xml().unwrap()).unwrap();
        prop_assert_eq!(&twice, &once);
        // structure is never lost, even for empty entries
        prop_assert_eq!(once.entries.len(), feed.entries.len());
        prop_assert_eq!(once.links.len(), feed.links.len());
    }

    #[test]
    fn timestamps_survive_the_trip(updated in arb_timestamp()) {
        let feed = Feed { id: Some("urn:t".to_string()), updated: Some(updated), ..Default::default() };
        let once = Feed::from_xml(&feed.to_xml().unwrap()).unwrap();
        prop_assert_eq!(once.updated, Some(updated));
    }
}
