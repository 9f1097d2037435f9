//! Structural extraction of event and contribution metadata from a rendered
//! Indico agenda page.
//!
//! Extraction is best-effort: each field has its own selector and degrades to
//! an empty string when the element is missing, so a layout change in one
//! spot never takes down the whole event. Only a page with no recognizable
//! event identity at all is an error.

use chrono::NaiveDateTime;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{Error, Result};
use crate::fetch::RenderedPage;
use crate::record::{Contribution, EventRecord};

/// Separator between multiple speakers or institutions of one contribution.
const MULTI_VALUE_SEPARATOR: &str = "; ";

/// Indico display formats for the event start date.
const DATE_FORMATS: &[&str] = &[
    // "Thursday Sep 26, 2024, 2:00 PM"
    "%A %b %d, %Y, %I:%M %p",
    // "Sep 19, 2024, 10:30 AM"
    "%b %d, %Y, %I:%M %p",
];

/// Everything extracted from one agenda page.
#[derive(Debug)]
pub struct ParsedEvent {
    pub event: EventRecord,
    pub contributions: Vec<Contribution>,
    /// Absolute URL of the chronologically previous event, if the page
    /// links one. `None` is the normal end-of-chain signal.
    pub next_url: Option<Url>,
}

struct Selectors {
    event_title: Selector,
    event_date: Selector,
    contribution: Selector,
    contribution_title: Selector,
    speaker_list: Selector,
    affiliation: Selector,
    attachment_link: Selector,
    older_event: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            event_title: Selector::parse(r#"h1[itemprop="name"]"#).unwrap(),
            event_date: Selector::parse(r#"time[itemprop="startDate"]"#).unwrap(),
            contribution: Selector::parse("li.timetable-item.timetable-contrib").unwrap(),
            contribution_title: Selector::parse("span.timetable-title").unwrap(),
            speaker_list: Selector::parse("div.speaker-list").unwrap(),
            affiliation: Selector::parse("span.affiliation").unwrap(),
            attachment_link: Selector::parse("div.js-attachment-container a[href]").unwrap(),
            older_event: Selector::parse("a.icon-prev[href]").unwrap(),
        }
    }
}

/// Parses rendered Indico agenda markup into records.
pub struct EventParser {
    sel: Selectors,
    parens: Regex,
}

impl EventParser {
    pub fn new() -> Self {
        Self {
            sel: Selectors::new(),
            parens: Regex::new(r"\(.*?\)").unwrap(),
        }
    }

    /// Extract the event record, its contributions, and the older-event link.
    pub fn parse(&self, page: &RenderedPage) -> Result<ParsedEvent> {
        let doc = Html::parse_document(&page.html);

        let title = self.event_title(&doc);
        let date = self.event_date(&doc);
        let blocks: Vec<ElementRef> = doc.select(&self.sel.contribution).collect();

        // Wrong site, login wall, error page: nothing event-shaped at all.
        if title.is_empty() && date.is_empty() && blocks.is_empty() {
            return Err(Error::Parse {
                url: page.url.to_string(),
                reason: "no event title, date, or timetable entries found".into(),
            });
        }

        let contributions = blocks
            .into_iter()
            .filter_map(|block| self.contribution(block, &page.url))
            .collect();

        Ok(ParsedEvent {
            event: EventRecord {
                title,
                agenda_url: page.url.clone(),
                date,
            },
            contributions,
            next_url: self.older_event_url(&doc, &page.url),
        })
    }

    fn event_title(&self, doc: &Html) -> String {
        doc.select(&self.sel.event_title)
            .next()
            .map(text_of)
            .unwrap_or_default()
    }

    fn event_date(&self, doc: &Html) -> String {
        doc.select(&self.sel.event_date)
            .next()
            .map(|el| normalize_date(&text_of(el)))
            .unwrap_or_default()
    }

    /// A block without an extractable title is dropped; every other missing
    /// field degrades to an empty value.
    fn contribution(&self, block: ElementRef<'_>, base: &Url) -> Option<Contribution> {
        let title = block
            .select(&self.sel.contribution_title)
            .next()
            .map(text_of)
            .unwrap_or_default()
            // Indico appends a pilcrow anchor to timetable titles.
            .replace('¶', "")
            .trim()
            .to_string();
        if title.is_empty() {
            return None;
        }

        let (speaker, institution) = self.speakers(block);

        Some(Contribution {
            title,
            speaker,
            institution,
            pdf_link: self.attachment(block, base),
        })
    }

    /// Join speaker names and affiliations listed for one contribution.
    ///
    /// The speaker list renders as a label span ("Speaker:"/"Speakers:")
    /// followed by one span per person, with the affiliation nested inside
    /// in parentheses. Names are the non-affiliation child spans with the
    /// parenthesized text stripped.
    fn speakers(&self, block: ElementRef<'_>) -> (String, String) {
        let Some(list) = block.select(&self.sel.speaker_list).next() else {
            return (String::new(), String::new());
        };

        let mut names = Vec::new();
        for span in child_spans(list) {
            if has_class(span, "affiliation") {
                continue;
            }
            let text = text_of(span);
            if text.ends_with(':') {
                continue;
            }
            let name = self
                .parens
                .replace_all(&text, "")
                .trim()
                .to_string();
            if !name.is_empty() {
                names.push(name);
            }
        }

        let mut institutions = Vec::new();
        for aff in list.select(&self.sel.affiliation) {
            let inst = text_of(aff).replace(['(', ')'], "").trim().to_string();
            if !inst.is_empty() {
                institutions.push(inst);
            }
        }

        (
            names.join(MULTI_VALUE_SEPARATOR),
            institutions.join(MULTI_VALUE_SEPARATOR),
        )
    }

    /// First attachment link pointing at a PDF, made absolute.
    fn attachment(&self, block: ElementRef<'_>, base: &Url) -> Option<String> {
        for anchor in block.select(&self.sel.attachment_link) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !href.to_ascii_lowercase().ends_with(".pdf") {
                continue;
            }
            if let Ok(absolute) = base.join(href) {
                return Some(absolute.to_string());
            }
        }
        None
    }

    /// The "older event" navigation arrow, absent or disabled meaning end of
    /// chain.
    fn older_event_url(&self, doc: &Html, base: &Url) -> Option<Url> {
        let anchor = doc.select(&self.sel.older_event).next()?;
        if has_class(anchor, "disabled") {
            return None;
        }
        let href = anchor.value().attr("href")?;
        base.join(href).ok()
    }
}

impl Default for EventParser {
    fn default() -> Self {
        Self::new()
    }
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

fn child_spans(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "span")
}

/// Collapse whitespace and, when the text matches a known Indico display
/// format, re-render it as `YYYY-MM-DD HH:MM`. Unparseable dates are kept
/// verbatim (cleaned) rather than dropped.
pub fn normalize_date(raw: &str) -> String {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    for fmt in DATE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&cleaned, fmt) {
            return dt.format("%Y-%m-%d %H:%M").to_string();
        }
    }
    cleaned
}
