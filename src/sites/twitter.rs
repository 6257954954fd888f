use super::{read_query_tokens, replace_query_tokens, AnchorRule, Descriptor, Site, SiteAdapter};
use crate::dates::{DateRange, NormalizedDate};
use crate::dom::Dom;
use crate::errors::WeekSearchError;
use crate::query::{delete_param, get_param, set_param};
use crate::theme::{detect_scheme, Density, Palette};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

const QUERY_PARAM: &str = "q";

static DESCRIPTOR: Descriptor = Descriptor {
    site: Site::Twitter,
    display_name: "Twitter",
    search_form_selector: r#"button[aria-label="More"]"#,
    search_button_selector: r#"button[aria-label="More"]"#,
    accent_color: "#1DA1F2",
    icon_size: "24px",
    settle_delay_ms: 1500,
    anchor_rule: AnchorRule::Overlay {
        container_depth: 2,
        right: "45px",
    },
};

static DATE_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(?:since|until):\d{4}-\d{2}-\d{2}").expect("date token regex should compile")
});
static SINCE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"since:(\d{4}-\d{2}-\d{2})").expect("since token regex should compile")
});
static UNTIL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"until:(\d{4}-\d{2}-\d{2})").expect("until token regex should compile")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct TwitterAdapter;

impl SiteAdapter for TwitterAdapter {
    fn descriptor(&self) -> &'static Descriptor {
        &DESCRIPTOR
    }

    fn matches(&self, host: &str, _path: &str) -> bool {
        host.contains("twitter") || host == "x.com" || host.ends_with(".x.com")
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
        _page: &dyn Dom,
        _today: NormalizedDate,
    ) -> Result<Option<DateRange>, WeekSearchError> {
        let from_query = match get_param(url, QUERY_PARAM) {
            Some(query) => read_query_tokens(&query, &SINCE_TOKEN, &UNTIL_TOKEN, QUERY_PARAM),
            None => Ok(None),
        };
        let query_err = match from_query {
            Ok(Some(range)) => return Ok(Some(range)),
            Ok(None) => None,
            Err(err) => {
                debug!("{err}; trying the since/until params");
                Some(err)
            }
        };

        let (Some(since), Some(until)) = (get_param(url, "since"), get_param(url, "until")) else {
            return query_err.map_or(Ok(None), Err);
        };
        let start = self
            .parse_from_wire(&since)
            .map_err(|_| WeekSearchError::malformed("since", since.clone()))?;
        let end = self
            .parse_from_wire(&until)
            .map_err(|_| WeekSearchError::malformed("until", until.clone()))?;
        Ok(Some(DateRange::new(start, end)))
    }

    fn write_range(&self, url: &Url, range: DateRange) -> Url {
        let query = get_param(url, QUERY_PARAM).unwrap_or_default();
        let tokens = format!(
            "since:{} until:{}",
            self.format_for_wire(range.start),
            self.format_for_wire(range.end)
        );
        let rewritten = replace_query_tokens(&query, &DATE_TOKENS, &tokens);
        let cleared = delete_param(&delete_param(url, "since"), "until");
        set_param(&cleared, QUERY_PARAM, &rewritten)
    }

    fn palette(&self, page: &dyn Dom) -> Palette {
        Palette::new(detect_scheme(page), Density::Compact)
    }
}
