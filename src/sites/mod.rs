//! Per-site strategies. Each supported site is one [`Site`] variant backed by
//! a [`SiteAdapter`] that knows where the search bar lives, how the site spells
//! a date range in its URL, and how the picker should look.

pub mod detect;
mod google;
mod twitter;
mod youtube;

pub use detect::{detect, lookup};
pub use google::GoogleAdapter;
pub use twitter::TwitterAdapter;
pub use youtube::YouTubeAdapter;

use crate::dates::{DateRange, NormalizedDate};
use crate::dom::{Dom, NodeId};
use crate::errors::WeekSearchError;
use crate::theme::Palette;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Google,
    Twitter,
    YouTube,
}

impl Site {
    pub const ALL: [Site; 3] = [Site::Google, Site::Twitter, Site::YouTube];

    pub fn adapter(self) -> &'static dyn SiteAdapter {
        match self {
            Site::Google => &GoogleAdapter,
            Site::Twitter => &TwitterAdapter,
            Site::YouTube => &YouTubeAdapter,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Site::Google => "google",
            Site::Twitter => "twitter",
            Site::YouTube => "youtube",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorRule {
    /// Insert before the submit control inside the located form, or append to
    /// the form when it has none.
    BeforeSubmit,
    /// Float the icon over the ancestor `container_depth` levels above the
    /// located element.
    Overlay {
        container_depth: u8,
        right: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Before { parent: NodeId, reference: NodeId },
    Append { parent: NodeId },
    Overlay { container: NodeId, right: &'static str },
}

#[derive(Debug)]
pub struct Descriptor {
    pub site: Site,
    pub display_name: &'static str,
    pub search_form_selector: &'static str,
    pub search_button_selector: &'static str,
    pub accent_color: &'static str,
    pub icon_size: &'static str,
    pub settle_delay_ms: u64,
    pub anchor_rule: AnchorRule,
}

pub trait SiteAdapter: Sync {
    fn descriptor(&self) -> &'static Descriptor;

    fn matches(&self, host: &str, path: &str) -> bool;

    fn format_for_wire(&self, date: NormalizedDate) -> String;

    fn parse_from_wire(&self, value: &str) -> Result<NormalizedDate, WeekSearchError>;

    /// The range already encoded in `url`, if any. `Err` means a range is
    /// present but unreadable; callers treat that as no range.
    fn read_existing_range(
        &self,
        url: &Url,
        page: &dyn Dom,
        today: NormalizedDate,
    ) -> Result<Option<DateRange>, WeekSearchError>;

    fn write_range(&self, url: &Url, range: DateRange) -> Url;

    fn palette(&self, _page: &dyn Dom) -> Palette {
        Palette::default()
    }

    fn locate_anchor(&self, page: &dyn Dom) -> Option<Anchor> {
        let descriptor = self.descriptor();
        let found = page.query_one(descriptor.search_form_selector)?;
        match descriptor.anchor_rule {
            AnchorRule::BeforeSubmit => {
                let button = page.query_within(found, descriptor.search_button_selector);
                match button.and_then(|b| page.parent(b).map(|parent| (parent, b))) {
                    Some((parent, reference)) => Some(Anchor::Before { parent, reference }),
                    None => Some(Anchor::Append { parent: found }),
                }
            }
            AnchorRule::Overlay {
                container_depth,
                right,
            } => {
                let mut container = found;
                for _ in 0..container_depth {
                    container = page.parent(container)?;
                }
                Some(Anchor::Overlay { container, right })
            }
        }
    }
}

fn replace_query_tokens(query: &str, strip: &Regex, tokens: &str) -> String {
    let stripped = strip.replace_all(query, " ");
    let mut words: Vec<&str> = stripped.split_whitespace().collect();
    words.push(tokens);
    words.join(" ")
}

fn read_query_tokens(
    query: &str,
    start: &Regex,
    end: &Regex,
    param: &'static str,
) -> Result<Option<DateRange>, WeekSearchError> {
    let (Some(since), Some(until)) = (start.captures(query), end.captures(query)) else {
        return Ok(None);
    };
    let parse = |raw: &str| {
        raw.parse::<NormalizedDate>()
            .map_err(|_| WeekSearchError::malformed(param, query))
    };
    Ok(Some(DateRange::new(parse(&since[1])?, parse(&until[1])?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    #[test]
    fn every_site_resolves_to_its_own_descriptor() {
        for site in Site::ALL {
            assert_eq!(site.adapter().descriptor().site, site);
        }
    }

    #[test]
    fn wire_grammar_round_trips_for_every_adapter() {
        let dates = [
            NormalizedDate::from_ymd(2024, 1, 5).unwrap(),
            NormalizedDate::from_ymd(2024, 12, 31).unwrap(),
            NormalizedDate::from_ymd(1999, 2, 28).unwrap(),
            NormalizedDate::from_ymd(2024, 2, 29).unwrap(),
            NormalizedDate::from_ymd(999, 1, 5).unwrap(),
        ];
        for site in Site::ALL {
            let adapter = site.adapter();
            for date in dates {
                let wire = adapter.format_for_wire(date);
                assert_eq!(adapter.parse_from_wire(&wire).unwrap(), date, "{site}: {wire}");
            }
        }
    }

    #[test]
    fn written_range_reads_back_for_every_adapter() {
        let ranges = [
            DateRange::new(
                NormalizedDate::from_ymd(2024, 1, 7).unwrap(),
                NormalizedDate::from_ymd(2024, 1, 13).unwrap(),
            ),
            DateRange::new(
                NormalizedDate::from_ymd(999, 1, 5).unwrap(),
                NormalizedDate::from_ymd(999, 1, 11).unwrap(),
            ),
        ];
        let today = NormalizedDate::from_ymd(2030, 6, 1).unwrap();
        let urls = [
            (Site::Google, "https://www.google.com/search?q=rust"),
            (Site::Twitter, "https://x.com/search?q=rust&src=typed_query"),
            (Site::YouTube, "https://www.youtube.com/results?search_query=rust&sp=EgIIAw%3D%3D"),
        ];
        for (site, raw) in urls {
            let url = Url::parse(raw).unwrap();
            let page = MemoryDom::new(url.clone());
            let adapter = site.adapter();
            for range in ranges {
                let written = adapter.write_range(&url, range);
                let read = adapter.read_existing_range(&written, &page, today).unwrap();
                assert_eq!(read, Some(range), "{site}: {written}");
            }
        }
    }

    #[test]
    fn token_replacement_collapses_whitespace() {
        let strip = Regex::new(r"\s*(?:since|until):\d{4}-\d{2}-\d{2}").unwrap();
        let out = replace_query_tokens("  a   since:2024-01-01 b ", &strip, "since:x until:y");
        assert_eq!(out, "a b since:x until:y");
        assert_eq!(replace_query_tokens("", &strip, "since:x"), "since:x");
    }
}
