use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};

use super::{node_id, ContentItem, ItemKind};

const VIDEO_SELECTOR: &str =
    "ytd-rich-item-renderer, ytd-video-renderer, ytd-compact-video-renderer, ytd-grid-video-renderer";
const SHORT_SELECTOR: &str = "ytd-reel-item-renderer, ytm-shorts-lockup-view-model";
const TITLE_SELECTOR: &str = "#video-title";
const CHANNEL_SELECTOR: &str = "ytd-channel-name, #channel-name";
const HEADING_SELECTOR: &str = "h1.ytd-watch-metadata, h1.title";
const LINK_SELECTOR: &str = "a#video-title, a#thumbnail, a";

/// Content cards and watch heading extracted from a rendered page.
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    pub items: Vec<ContentItem>,
    pub heading: Option<String>,
}

/// Parses a rendered page into content cards. Cards without a `data-video-id`
/// or link fall back to a positional id. A video repeated on the page yields one
/// card per occurrence, each with its own node id.
pub fn parse_snapshot(html: &str) -> PageSnapshot {
    let document = Html::parse_document(html);
    let (Some(video), Some(short), Some(title), Some(channel), Some(heading), Some(link)) = (
        selector(VIDEO_SELECTOR),
        selector(SHORT_SELECTOR),
        selector(TITLE_SELECTOR),
        selector(CHANNEL_SELECTOR),
        selector(HEADING_SELECTOR),
        selector(LINK_SELECTOR),
    ) else {
        return PageSnapshot::default();
    };

    let mut items = Vec::new();
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    for (kind, card_selector) in [(ItemKind::Video, &video), (ItemKind::Short, &short)] {
        for card in document.select(card_selector) {
            let position = items.len();
            let title_text = first_text(&card, &title).unwrap_or_else(|| element_text(&card));
            let video_id = card_id(&card, &link).unwrap_or_else(|| format!("item-{position}"));
            let seen = occurrences.entry(video_id.clone()).or_insert(0);
            let id = node_id(&video_id, *seen);
            *seen += 1;
            items.push(ContentItem {
                id,
                video_id,
                kind,
                title: title_text,
                channel: first_text(&card, &channel).unwrap_or_default(),
            });
        }
    }

    let heading = document
        .select(&heading)
        .next()
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty());

    PageSnapshot { items, heading }
}

fn selector(raw: &str) -> Option<Selector> {
    Selector::parse(raw).ok()
}

fn first_text(card: &ElementRef, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
}

fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn card_id(card: &ElementRef, link: &Selector) -> Option<String> {
    if let Some(id) = card.value().attr("data-video-id") {
        return Some(id.to_string());
    }

    let href = card.select(link).find_map(|a| a.value().attr("href"))?;
    video_id_from_href(href)
}

fn video_id_from_href(href: &str) -> Option<String> {
    if let Some(rest) = href.strip_prefix("/shorts/") {
        return rest.split(['?', '/']).next().filter(|id| !id.is_empty()).map(str::to_string);
    }

    let query = href.split_once('?').map(|(_, q)| q)?;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("v="))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME_FEED: &str = r#"
        <html><body>
          <ytd-rich-item-renderer>
            <a id="thumbnail" href="/watch?v=abc123&t=4"></a>
            <a id="video-title" href="/watch?v=abc123">Intro to  Python
               Tutorial</a>
            <ytd-channel-name><a>Code Academy</a></ytd-channel-name>
          </ytd-rich-item-renderer>
          <ytd-video-renderer data-video-id="zzz">
            <span id="video-title">Epic Prank</span>
            <div id="channel-name">Fun Times</div>
          </ytd-video-renderer>
          <ytd-reel-item-renderer>
            <a href="/shorts/short01">Quick clip</a>
          </ytd-reel-item-renderer>
        </body></html>
    "#;

    #[test]
    fn test_parse_home_feed_cards() {
        let snapshot = parse_snapshot(HOME_FEED);

        assert_eq!(snapshot.items.len(), 3);
        assert_eq!(
            snapshot.items[0],
            ContentItem::video("abc123", "Intro to Python Tutorial", "Code Academy")
        );
        assert_eq!(snapshot.items[1].id, "zzz");
        assert_eq!(snapshot.items[1].channel, "Fun Times");
        assert_eq!(snapshot.items[2].kind, ItemKind::Short);
        assert_eq!(snapshot.items[2].id, "short01");
        assert!(snapshot.heading.is_none());
    }

    #[test]
    fn test_parse_watch_heading() {
        let html = r#"<html><body>
            <h1 class="title ytd-watch-metadata"><yt-formatted-string>Learn React in 30 Minutes</yt-formatted-string></h1>
        </body></html>"#;

        let snapshot = parse_snapshot(html);
        assert_eq!(snapshot.heading.as_deref(), Some("Learn React in 30 Minutes"));
    }

    #[test]
    fn test_positional_id_fallback() {
        let html = r#"<ytd-video-renderer><span id="video-title">No link</span></ytd-video-renderer>"#;

        let snapshot = parse_snapshot(html);
        assert_eq!(snapshot.items[0].id, "item-0");
    }

    #[test]
    fn test_repeated_video_gets_one_node_per_card() {
        let html = r#"<html><body>
            <ytd-rich-item-renderer><a id="video-title" href="/watch?v=dup">Epic Prank</a></ytd-rich-item-renderer>
            <ytd-compact-video-renderer><a id="video-title" href="/watch?v=dup">Epic Prank</a></ytd-compact-video-renderer>
        </body></html>"#;

        let snapshot = parse_snapshot(html);
        let ids: Vec<&str> = snapshot.items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["dup", "dup#1"]);
        assert!(snapshot.items.iter().all(|item| item.video_id == "dup"));
    }

    #[test]
    fn test_video_id_from_href() {
        assert_eq!(video_id_from_href("/watch?v=xyz&list=1").as_deref(), Some("xyz"));
        assert_eq!(video_id_from_href("/shorts/s1?feature=share").as_deref(), Some("s1"));
        assert_eq!(video_id_from_href("/channel/abc"), None);
    }
}
