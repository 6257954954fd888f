use super::{AnchorRule, Descriptor, Site, SiteAdapter};
use crate::dates::{DateRange, NormalizedDate};
use crate::dom::Dom;
use crate::errors::WeekSearchError;
use crate::query::{get_param, set_param};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

const PARAM: &str = "tbs";

static DESCRIPTOR: Descriptor = Descriptor {
    site: Site::Google,
    display_name: "Google",
    search_form_selector: r#"form[role="search"], form#tsf, form.search-form"#,
    search_button_selector: r#"button[type="submit"], button[aria-label="Google Search"]"#,
    accent_color: "#1a73e8",
    icon_size: "20px",
    settle_delay_ms: 100,
    anchor_rule: AnchorRule::BeforeSubmit,
};

static WIRE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("wire date regex should compile")
});

static CUSTOM_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"cd_min:(\d+)/(\d+)/(\d+),cd_max:(\d+)/(\d+)/(\d+)")
        .expect("custom range regex should compile")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleAdapter;

impl SiteAdapter for GoogleAdapter {
    fn descriptor(&self) -> &'static Descriptor {
        &DESCRIPTOR
    }

    fn matches(&self, host: &str, path: &str) -> bool {
        host.contains("google") && matches!(path, "/search" | "/")
    }

    fn format_for_wire(&self, date: NormalizedDate) -> String {
        format!("{}/{}/{:04}", date.month(), date.day(), date.year())
    }

    fn parse_from_wire(&self, value: &str) -> Result<NormalizedDate, WeekSearchError> {
        let caps = WIRE_DATE
            .captures(value.trim())
            .ok_or_else(|| WeekSearchError::invalid_date(value))?;
        padded(&caps[3], &caps[1], &caps[2]).ok_or_else(|| WeekSearchError::invalid_date(value))
    }

    fn read_existing_range(
        &self,
        url: &Url,
        _page: &dyn Dom,
        _today: NormalizedDate,
    ) -> Result<Option<DateRange>, WeekSearchError> {
        let Some(tbs) = get_param(url, PARAM) else {
            return Ok(None);
        };
        let Some(caps) = CUSTOM_RANGE.captures(&tbs) else {
            // Other tools (e.g. `qdr:w`) share the parameter; only a custom
            // range that fails to match is malformed.
            if tbs.contains("cd_min") || tbs.contains("cd_max") {
                return Err(WeekSearchError::malformed(PARAM, tbs));
            }
            return Ok(None);
        };
        let start = padded(&caps[3], &caps[1], &caps[2]);
        let end = padded(&caps[6], &caps[4], &caps[5]);
        match (start, end) {
            (Some(start), Some(end)) => Ok(Some(DateRange::new(start, end))),
            _ => Err(WeekSearchError::malformed(PARAM, tbs)),
        }
    }

    fn write_range(&self, url: &Url, range: DateRange) -> Url {
        let value = format!(
            "cdr:1,cd_min:{},cd_max:{}",
            self.format_for_wire(range.start),
            self.format_for_wire(range.end)
        );
        set_param(url, PARAM, &value)
    }
}

fn padded(year: &str, month: &str, day: &str) -> Option<NormalizedDate> {
    format!("{year}-{month:0>2}-{day:0>2}").parse().ok()
}
