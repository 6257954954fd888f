use super::{read_query_tokens, replace_query_tokens, AnchorRule, Descriptor, Site, SiteAdapter};
use crate::dates::{current_week, DateRange, NormalizedDate};
use crate::dom::Dom;
use crate::errors::WeekSearchError;
use crate::query::{delete_param, get_param, set_param};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

const QUERY_PARAM: &str = "search_query";
const FILTER_PARAM: &str = "sp";
const FILTER_TOKEN_PREFIX: &str = "CAI";
const ACTIVE_FILTER_CHIPS: [&str; 2] = ["Last hour", "Today"];

static DESCRIPTOR: Descriptor = Descriptor {
    site: Site::YouTube,
    display_name: "YouTube",
    search_form_selector: "ytd-searchbox form, form#search-form",
    search_button_selector: r#"button#search-icon-legacy, button[aria-label="Search"]"#,
    accent_color: "#ff0000",
    icon_size: "24px",
    settle_delay_ms: 2000,
    anchor_rule: AnchorRule::BeforeSubmit,
};

static DATE_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(?:after|before):\d{4}-\d{2}-\d{2}").expect("date token regex should compile")
});
static AFTER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"after:(\d{4}-\d{2}-\d{2})").expect("after token regex should compile")
});
static BEFORE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"before:(\d{4}-\d{2}-\d{2})").expect("before token regex should compile")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct YouTubeAdapter;

impl YouTubeAdapter {
    /// Best effort: may miss an active native filter, never decodes its dates.
    fn native_filter_active(&self, url: &Url, page: &dyn Dom) -> bool {
        let token_hint = get_param(url, FILTER_PARAM)
            .is_some_and(|sp| sp.contains(FILTER_TOKEN_PREFIX));
        if token_hint {
            return true;
        }
        page.query_all("ytd-search-filter-renderer yt-formatted-string")
            .into_iter()
            .any(|chip| ACTIVE_FILTER_CHIPS.contains(&page.text_content(chip).trim()))
    }
}

impl SiteAdapter for YouTubeAdapter {
    fn descriptor(&self) -> &'static Descriptor {
        &DESCRIPTOR
    }

    fn matches(&self, host: &str, path: &str) -> bool {
        host.contains("youtube") && path == "/results"
    }

    fn format_for_wire(&self, date: NormalizedDate) -> String {
        date.to_string()
    }

    fn parse_from_wire(&self, value: &str) -> Result<NormalizedDate, WeekSearchError> {
        value.parse()
    }

    fn read_existing_range(
        &self,
        url: &Url,
        page: &dyn Dom,
        today: NormalizedDate,
    ) -> Result<Option<DateRange>, WeekSearchError> {
        if let Some(query) = get_param(url, QUERY_PARAM) {
            if let Some(range) = read_query_tokens(&query, &AFTER_TOKEN, &BEFORE_TOKEN, QUERY_PARAM)? {
                return Ok(Some(range));
            }
        }
        if self.native_filter_active(url, page) {
            debug!("youtube date filter looks active; assuming the current week");
            return Ok(Some(current_week(today)));
        }
        Ok(None)
    }

    fn write_range(&self, url: &Url, range: DateRange) -> Url {
        let query = get_param(url, QUERY_PARAM).unwrap_or_default();
        let tokens = format!(
            "after:{} before:{}",
            self.format_for_wire(range.start),
            self.format_for_wire(range.end)
        );
        let rewritten = replace_query_tokens(&query, &DATE_TOKENS, &tokens);
        set_param(&delete_param(url, FILTER_PARAM), QUERY_PARAM, &rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    fn date(y: i32, m: u32, d: u32) -> NormalizedDate {
        NormalizedDate::from_ymd(y, m, d).unwrap()
    }

    fn read(url: &Url, page: &MemoryDom) -> Option<DateRange> {
        YouTubeAdapter
            .read_existing_range(url, page, date(2024, 1, 10))
            .unwrap()
    }

    #[test]
    fn write_appends_operators_and_drops_native_filter() {
        let url = Url::parse(
            "https://www.youtube.com/results?search_query=rust+after:2023-01-01&sp=EgIIAw%3D%3D",
        )
        .unwrap();
        let written =
            YouTubeAdapter.write_range(&url, DateRange::new(date(2024, 1, 7), date(2024, 1, 13)));
        assert_eq!(
            get_param(&written, "search_query").as_deref(),
            Some("rust after:2024-01-07 before:2024-01-13")
        );
        assert_eq!(get_param(&written, "sp"), None);
    }

    #[test]
    fn native_token_prefix_guesses_current_week() {
        let url = Url::parse("https://www.youtube.com/results?search_query=rust&sp=CAISBAgCEAE%3D").unwrap();
        let page = MemoryDom::new(url.clone());
        assert_eq!(read(&url, &page), Some(current_week(date(2024, 1, 10))));
    }

    #[test]
    fn filter_chip_text_guesses_current_week() {
        let url = Url::parse("https://www.youtube.com/results?search_query=rust").unwrap();
        let mut page = MemoryDom::new(url.clone());
        let body = page.body();
        let renderer = page.element(body, "ytd-search-filter-renderer", &[]);
        let chip = page.element(renderer, "yt-formatted-string", &[]);
        page.set_text(chip, " Today ");
        assert_eq!(read(&url, &page), Some(current_week(date(2024, 1, 10))));
    }

    #[test]
    fn plain_search_has_no_range() {
        let url = Url::parse("https://www.youtube.com/results?search_query=rust&sp=EgIQAQ%3D%3D").unwrap();
        let page = MemoryDom::new(url.clone());
        assert_eq!(read(&url, &page), None);
    }

    #[test]
    fn detects_results_page_only() {
        assert!(YouTubeAdapter.matches("www.youtube.com", "/results"));
        assert!(!YouTubeAdapter.matches("www.youtube.com", "/watch"));
    }
}
