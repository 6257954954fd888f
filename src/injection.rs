use crate::config::Config;
use crate::dom::{set_styles, Dom, NodeId};
use crate::errors::WeekSearchError;
use crate::markup::render_calendar_shapes;
use crate::sites::{Anchor, Site, SiteAdapter};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const ICON_ID: &str = "wbw-calendar-icon";
pub const ICON_SELECTOR: &str = "#wbw-calendar-icon";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionOutcome {
    Injected,
    RetryIn { attempt: u32, delay: Duration },
    GaveUp { attempts: u32 },
}

#[derive(Debug, Clone)]
pub struct InjectionController {
    site: Site,
    attempts: u32,
    max_retries: u32,
    retry_delay: Duration,
    icon_color: String,
}

impl InjectionController {
    pub fn new(site: Site, config: &Config) -> Self {
        Self {
            site,
            attempts: 0,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            icon_color: config.icon_color.clone(),
        }
    }

    pub fn site(&self) -> Site {
        self.site
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn attempt(&mut self, dom: &mut dyn Dom) -> InjectionOutcome {
        if ensure_icon_present(self.site.adapter(), dom, &self.icon_color) {
            let site = self.site;
            info!("calendar icon injected on {site}");
            return InjectionOutcome::Injected;
        }
        if self.attempts < self.max_retries {
            self.attempts += 1;
            let (attempt, site, delay_ms) = (self.attempts, self.site, self.retry_delay.as_millis());
            info!("retry attempt {attempt} for {site} in {delay_ms}ms");
            return InjectionOutcome::RetryIn {
                attempt: self.attempts,
                delay: self.retry_delay,
            };
        }
        let err = WeekSearchError::AnchorNotFound {
            site: self.site,
            attempts: self.attempts,
        };
        warn!("{err}; giving up until next navigation");
        InjectionOutcome::GaveUp {
            attempts: self.attempts,
        }
    }
}

pub fn ensure_icon_present(adapter: &dyn SiteAdapter, dom: &mut dyn Dom, icon_color: &str) -> bool {
    remove_icon(dom);
    let Some(anchor) = adapter.locate_anchor(dom) else {
        let site = adapter.descriptor().site;
        debug!("no anchor for {site} yet");
        return false;
    };

    let icon = build_icon(adapter, dom, icon_color);
    match anchor {
        Anchor::Before { parent, reference } => dom.insert_before(parent, icon, reference),
        Anchor::Append { parent } => dom.append_child(parent, icon),
        Anchor::Overlay { container, right } => {
            set_styles(
                dom,
                icon,
                &[
                    ("position", "absolute"),
                    ("right", right),
                    ("top", "50%"),
                    ("transform", "translateY(-50%)"),
                    ("z-index", "2000"),
                ],
            );
            dom.set_style(container, "position", "relative");
            dom.append_child(container, icon);
        }
    }
    true
}

pub fn remove_icon(dom: &mut dyn Dom) {
    while let Some(existing) = dom.element_by_id(ICON_ID) {
        dom.remove(existing);
    }
}

pub fn set_icon_active(dom: &mut dyn Dom, adapter: &dyn SiteAdapter, icon_color: &str, active: bool) {
    let Some(icon) = dom.element_by_id(ICON_ID) else {
        return;
    };
    let Some(svg) = dom.query_within(icon, "svg") else {
        return;
    };
    let stroke = if active {
        adapter.descriptor().accent_color
    } else {
        icon_color
    };
    dom.set_attribute(svg, "stroke", stroke);
}

fn build_icon(adapter: &dyn SiteAdapter, dom: &mut dyn Dom, icon_color: &str) -> NodeId {
    let size = adapter.descriptor().icon_size;
    let icon = dom.create_element("div");
    dom.set_attribute(icon, "id", ICON_ID);
    dom.set_attribute(icon, "class", ICON_ID);
    dom.set_attribute(icon, "title", "Search by week");
    set_styles(
        dom,
        icon,
        &[
            ("cursor", "pointer"),
            ("width", size),
            ("display", "flex"),
            ("align-items", "center"),
            ("justify-content", "center"),
            ("padding", "4px"),
            ("border-radius", "50%"),
            ("transition", "background-color 0.2s"),
            ("vertical-align", "middle"),
            ("position", "relative"),
            ("z-index", "1000"),
            ("pointer-events", "auto"),
        ],
    );

    let svg = dom.create_element("svg");
    for (name, value) in [
        ("xmlns", "http://www.w3.org/2000/svg"),
        ("width", size),
        ("height", size),
        ("viewBox", "0 0 24 24"),
        ("fill", "none"),
        ("stroke", icon_color),
        ("stroke-width", "2"),
        ("stroke-linecap", "round"),
        ("stroke-linejoin", "round"),
    ] {
        dom.set_attribute(svg, name, value);
    }
    dom.set_inner_html(svg, &render_calendar_shapes());
    dom.append_child(icon, svg);
    icon
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;
    use url::Url;

    fn google_page() -> MemoryDom {
        MemoryDom::search_page(
            Url::parse("https://www.google.com/search?q=a").unwrap(),
            Site::Google,
        )
    }

    #[test]
    fn repeated_injection_leaves_one_icon() {
        let mut dom = google_page();
        let adapter = Site::Google.adapter();
        assert!(ensure_icon_present(adapter, &mut dom, "#5f6368"));
        assert!(ensure_icon_present(adapter, &mut dom, "#5f6368"));
        assert_eq!(dom.count(ICON_SELECTOR), 1);
    }

    #[test]
    fn icon_sits_right_before_the_submit_button() {
        let mut dom = google_page();
        assert!(ensure_icon_present(Site::Google.adapter(), &mut dom, "#5f6368"));
        let icon = dom.element_by_id(ICON_ID).unwrap();
        let button = dom.query_one(r#"button[type="submit"]"#).unwrap();
        let form = dom.query_one("form#tsf").unwrap();
        assert_eq!(dom.parent(icon), Some(form));
        assert_eq!(dom.query_all("form#tsf div, form#tsf button"), vec![icon, button]);
    }

    #[test]
    fn form_without_button_gets_icon_appended() {
        let mut dom = MemoryDom::new(Url::parse("https://www.google.com/").unwrap());
        let body = dom.body();
        let form = dom.element(body, "form", &[("class", "search-form")]);
        assert!(ensure_icon_present(Site::Google.adapter(), &mut dom, "#5f6368"));
        let icon = dom.element_by_id(ICON_ID).unwrap();
        assert_eq!(dom.parent(icon), Some(form));
    }

    #[test]
    fn twitter_icon_floats_over_the_container() {
        let url = Url::parse("https://x.com/search?q=a").unwrap();
        let mut dom = MemoryDom::search_page(url, Site::Twitter);
        assert!(ensure_icon_present(Site::Twitter.adapter(), &mut dom, "#5f6368"));
        let icon = dom.element_by_id(ICON_ID).unwrap();
        let container = dom.query_one("div.search-header").unwrap();
        assert_eq!(dom.parent(icon), Some(container));
        assert_eq!(dom.style(icon, "position").as_deref(), Some("absolute"));
        assert_eq!(dom.style(icon, "right").as_deref(), Some("45px"));
        assert_eq!(dom.style(container, "position").as_deref(), Some("relative"));
    }

    #[test]
    fn missing_anchor_reports_false_and_leaves_nothing() {
        let mut dom = google_page();
        assert!(ensure_icon_present(Site::Google.adapter(), &mut dom, "#5f6368"));
        let form = dom.query_one("form#tsf").unwrap();
        dom.remove(form);
        assert!(!ensure_icon_present(Site::Google.adapter(), &mut dom, "#5f6368"));
        assert_eq!(dom.count(ICON_SELECTOR), 0);
    }

    #[test]
    fn retries_stop_at_the_configured_bound() {
        let mut dom = MemoryDom::new(Url::parse("https://www.google.com/search?q=a").unwrap());
        let mut controller = InjectionController::new(Site::Google, &Config::default());
        let delay = Duration::from_millis(1500);
        assert_eq!(controller.attempt(&mut dom), InjectionOutcome::RetryIn { attempt: 1, delay });
        assert_eq!(controller.attempt(&mut dom), InjectionOutcome::RetryIn { attempt: 2, delay });
        assert_eq!(controller.attempt(&mut dom), InjectionOutcome::RetryIn { attempt: 3, delay });
        assert_eq!(controller.attempt(&mut dom), InjectionOutcome::GaveUp { attempts: 3 });
        assert_eq!(controller.attempts(), 3);
    }

    #[test]
    fn active_state_switches_stroke_color() {
        let mut dom = google_page();
        let adapter = Site::Google.adapter();
        ensure_icon_present(adapter, &mut dom, "#5f6368");
        let svg = dom.query_one("#wbw-calendar-icon svg").unwrap();
        set_icon_active(&mut dom, adapter, "#5f6368", true);
        assert_eq!(dom.attribute(svg, "stroke").as_deref(), Some("#1a73e8"));
        set_icon_active(&mut dom, adapter, "#5f6368", false);
        assert_eq!(dom.attribute(svg, "stroke").as_deref(), Some("#5f6368"));
    }
}
