// src/scrape/extract.rs
//! Post extraction from the announcement page.
//!
//! The page structure is not under our control and changes without notice, so
//! extraction is a cascade:
//! - structural selectors, tried in priority order; the first selector that
//!   matches anything is used exclusively (even if it matches a single element)
//! - when no selector matches at all, every text node that contains a date makes
//!   its parent element a post candidate
//!
//! The fallback may yield overlapping candidates; the store dedups them by identity.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use super::date::{parse_date, try_parse_date};
use crate::post::Post;

/// Snippet cap in characters (not bytes); longer text gets `...` appended.
pub const CONTENT_MAX_CHARS: usize = 300;
pub const ELLIPSIS: &str = "...";

/// Priority order matters: first non-empty match wins.
pub const POST_SELECTORS: [&str; 10] = [
    ".post",
    ".article",
    ".news-item",
    ".content-item",
    "[class*=\"post\"]",
    "[class*=\"article\"]",
    "[class*=\"news\"]",
    "article",
    ".entry",
    ".item",
];

const TITLE_SELECTORS: [&str; 7] = ["h1", "h2", "h3", "h4", ".title", "[class*=\"title\"]", "a"];

fn compile(list: &[&'static str]) -> Vec<(&'static str, Selector)> {
    list.iter()
        .map(|s| (*s, Selector::parse(s).expect("static selector")))
        .collect()
}

static POSTS: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| compile(&POST_SELECTORS));
static TITLES: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| compile(&TITLE_SELECTORS));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("link selector"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

#[derive(Debug, Clone)]
pub struct PostExtractor {
    origin: String,
}

impl PostExtractor {
    /// `origin` is prefixed to root-relative links, e.g. `https://erasmus.tuke.sk`.
    pub fn new(origin: impl Into<String>) -> Self {
        let origin: String = origin.into();
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    pub fn extract(&self, markup: &str) -> Vec<Post> {
        let document = Html::parse_document(markup);
        let now = Utc::now();

        for (raw, selector) in POSTS.iter() {
            let elements: Vec<ElementRef> = document.select(selector).collect();
            if elements.is_empty() {
                continue;
            }
            info!("Found {} posts with selector: {}", elements.len(), raw);
            return elements
                .into_iter()
                .filter_map(|el| self.extract_post(el, now))
                .collect();
        }

        debug!("no structural selector matched, scanning text nodes for dates");
        self.extract_by_dates(&document, now)
    }

    fn extract_by_dates(&self, document: &Html, now: DateTime<Utc>) -> Vec<Post> {
        let mut posts = Vec::new();
        for node in document.root_element().descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let Some(parent) = node.parent().and_then(ElementRef::wrap) else {
                continue;
            };
            if is_hidden(parent) || try_parse_date(text).is_none() {
                continue;
            }
            if let Some(post) = self.extract_post(parent, now) {
                posts.push(post);
            }
        }
        info!(count = posts.len(), "date scan fallback finished");
        posts
    }

    fn extract_post(&self, el: ElementRef, now: DateTime<Utc>) -> Option<Post> {
        // 1) Title: first selector whose first match has non-empty text
        let (title, title_el) = TITLES.iter().find_map(|(_, sel)| {
            let found = el.select(sel).next()?;
            let text = collapse_ws(&found.text().collect::<String>());
            (!text.is_empty()).then_some((text, found))
        })?;

        // 2) URL: the title link itself, otherwise the first link in the element
        let href = if title_el.value().name() == "a" {
            title_el.value().attr("href")
        } else {
            el.select(&LINK).next().and_then(|a| a.value().attr("href"))
        };
        let url = href
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(|h| self.resolve(h));

        // 3) Date + snippet from the whole visible text
        let text = visible_text(el);
        let date = parse_date(&text);

        Some(Post {
            title,
            url,
            date,
            content: snippet(&text),
            scraped_at: now,
        })
    }

    /// Only root-relative paths are resolved; `page.html`, `../x` or `//host/x`
    /// are returned unchanged.
    fn resolve(&self, href: &str) -> String {
        if href.starts_with('/') && !href.starts_with("//") {
            format!("{}{}", self.origin, href)
        } else {
            href.to_string()
        }
    }
}

fn is_hidden(el: ElementRef) -> bool {
    matches!(el.value().name(), "script" | "style" | "noscript" | "template")
}

/// Text of all descendants except script/style content, one space between
/// text nodes, whitespace collapsed.
fn visible_text(el: ElementRef) -> String {
    let mut raw = String::new();
    for node in el.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(is_hidden);
        if !hidden {
            raw.push_str(text);
            raw.push(' ');
        }
    }
    collapse_ws(&raw)
}

fn collapse_ws(s: &str) -> String {
    RE_WS.replace_all(s, " ").trim().to_string()
}

/// Cap at [`CONTENT_MAX_CHARS`] characters, marking the cut with [`ELLIPSIS`].
pub fn snippet(text: &str) -> String {
    if text.chars().count() <= CONTENT_MAX_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(CONTENT_MAX_CHARS).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn extractor() -> PostExtractor {
        PostExtractor::new("https://erasmus.tuke.sk/")
    }

    #[test]
    fn first_matching_selector_wins_even_with_one_element() {
        let html = r#"
            <div class="post"><h2>Only post</h2><p>12.6.2024</p></div>
            <article><h2>Ignored article</h2></article>
            <article><h2>Ignored article 2</h2></article>
        "#;
        let posts = extractor().extract(html);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Only post");
        assert_eq!(posts[0].date, NaiveDate::from_ymd_opt(2024, 6, 12));
    }

    #[test]
    fn elements_without_title_are_dropped() {
        let html = r#"
            <article><p>   </p></article>
            <article><h3> Výzva na mobilitu </h3></article>
        "#;
        let posts = extractor().extract(html);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Výzva na mobilitu");
        assert_eq!(posts[0].url, None);
        assert_eq!(posts[0].date, None);
    }

    #[test]
    fn heading_beats_link_and_first_link_gives_url() {
        let html = r#"
            <div class="entry">
              <a href="/vyzva-1">Read more</a>
              <h3>Heading title</h3>
            </div>
        "#;
        let posts = extractor().extract(html);
        assert_eq!(posts[0].title, "Heading title");
        assert_eq!(posts[0].url.as_deref(), Some("https://erasmus.tuke.sk/vyzva-1"));
    }

    #[test]
    fn link_title_uses_its_own_href() {
        let html = r#"
            <div class="item">
              <span>Oznam</span>
              <a href="relative/page.html">Link title</a>
            </div>
            <div class="item"><a href="/x"> </a></div>
        "#;
        let posts = extractor().extract(html);
        // the second item only has an empty link, so it has no title
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Link title");
        assert_eq!(posts[0].url.as_deref(), Some("relative/page.html"));
    }

    #[test]
    fn protocol_relative_links_pass_through() {
        let e = extractor();
        assert_eq!(e.resolve("//cdn.example/x"), "//cdn.example/x");
        assert_eq!(e.resolve("/x"), "https://erasmus.tuke.sk/x");
        assert_eq!(e.resolve("https://a.b/c"), "https://a.b/c");
    }

    #[test]
    fn script_text_is_not_visible() {
        let html = r#"
            <article>
              <h2>Title</h2>
              <script>var d = "01.01.2020";</script>
              <p>Body   text</p>
            </article>
        "#;
        let posts = extractor().extract(html);
        assert_eq!(posts[0].content, "Title Body text");
        assert_eq!(posts[0].date, None);
    }

    #[test]
    fn snippet_counts_characters_not_bytes() {
        let text = "č".repeat(301);
        let s = snippet(&text);
        assert_eq!(s.chars().count(), CONTENT_MAX_CHARS + ELLIPSIS.len());
        assert!(s.ends_with(ELLIPSIS));
        assert_eq!(snippet("short"), "short");
        assert_eq!(snippet(&"x".repeat(300)), "x".repeat(300));
    }

    #[test]
    fn fallback_scans_text_nodes_when_nothing_matches() {
        let html = r#"
            <html><body>
              <div id="main">
                <div><h3>Výzva pre študentov</h3> Zverejnené 15.3.2024 <a href="/v1">detail</a></div>
                <p>Bez dátumu</p>
              </div>
            </body></html>
        "#;
        let posts = extractor().extract(html);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Výzva pre študentov");
        assert_eq!(posts[0].url.as_deref(), Some("https://erasmus.tuke.sk/v1"));
        assert_eq!(posts[0].date, NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn fallback_with_no_dates_yields_nothing() {
        let html = "<html><body><div><h3>Nothing dated</h3></div></body></html>";
        assert!(extractor().extract(html).is_empty());
    }
}
