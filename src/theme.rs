use crate::dom::{has_class, Dom};
use regex::Regex;
use std::sync::LazyLock;

static CHANNEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("channel regex should compile"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Density {
    Regular,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub scheme: Scheme,
    pub background: &'static str,
    pub text: &'static str,
    pub border: &'static str,
    pub secondary_text: &'static str,
    pub button_background: &'static str,
    pub button_text: &'static str,
    pub shadow: &'static str,
    pub font_family: &'static str,
    pub font_size: &'static str,
    pub padding: &'static str,
    pub section_gap: &'static str,
    pub input_height: &'static str,
    pub input_padding: &'static str,
    pub button_height: &'static str,
    pub button_padding: &'static str,
}

impl Palette {
    pub fn new(scheme: Scheme, density: Density) -> Self {
        let dark = scheme == Scheme::Dark;
        let compact = density == Density::Compact;
        Self {
            scheme,
            background: if dark { "#000" } else { "white" },
            text: if dark { "#e7e9ea" } else { "#202124" },
            border: if dark { "#333" } else { "#dfe1e5" },
            secondary_text: if dark { "#8899a6" } else { "#5f6368" },
            button_background: if dark { "#192734" } else { "#f8f9fa" },
            button_text: if dark { "#e7e9ea" } else { "#3c4043" },
            shadow: if dark {
                "0 2px 10px rgba(0, 0, 0, 0.5)"
            } else {
                "0 2px 10px rgba(0, 0, 0, 0.2)"
            },
            font_family: if compact {
                r#"-apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif"#
            } else {
                "Arial, sans-serif"
            },
            font_size: if compact { "13px" } else { "14px" },
            padding: if compact { "12px" } else { "16px" },
            section_gap: if compact { "12px" } else { "16px" },
            input_height: if compact { "32px" } else { "36px" },
            input_padding: if compact { "6px" } else { "8px" },
            button_height: if compact { "30px" } else { "36px" },
            button_padding: if compact { "6px 12px" } else { "8px 16px" },
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(Scheme::Light, Density::Regular)
    }
}

pub fn detect_scheme(dom: &dyn Dom) -> Scheme {
    let body = dom.body();
    if let Some(background) = dom.computed_style(body, "background-color") {
        if brightness(&background).is_some_and(|level| level < 128.0) {
            return Scheme::Dark;
        }
    }

    let flagged = dom.attribute(dom.document_element(), "data-theme").as_deref() == Some("dark")
        || has_class(dom, body, "dark")
        || dom.query_one(r#"[data-nightmode="true"]"#).is_some();
    if flagged { Scheme::Dark } else { Scheme::Light }
}

fn brightness(color: &str) -> Option<f64> {
    let channels: Vec<f64> = CHANNEL_PATTERN
        .find_iter(color)
        .take(3)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    if channels.len() < 3 {
        return None;
    }
    Some(channels.iter().sum::<f64>() / 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;
    use url::Url;

    fn page() -> MemoryDom {
        MemoryDom::new(Url::parse("https://x.com/search?q=a").unwrap())
    }

    #[test]
    fn dim_background_is_dark() {
        let mut dom = page();
        let body = dom.body();
        dom.set_style(body, "background-color", "rgb(21, 32, 43)");
        assert_eq!(detect_scheme(&dom), Scheme::Dark);
    }

    #[test]
    fn bright_background_without_flags_is_light() {
        let mut dom = page();
        let body = dom.body();
        dom.set_style(body, "background-color", "rgb(255, 255, 255)");
        assert_eq!(detect_scheme(&dom), Scheme::Light);
    }

    #[test]
    fn theme_flags_mark_dark() {
        let mut dom = page();
        let root = dom.document_element();
        dom.set_attribute(root, "data-theme", "dark");
        assert_eq!(detect_scheme(&dom), Scheme::Dark);

        let mut dom = page();
        let body = dom.body();
        dom.element(body, "div", &[("data-nightmode", "true")]);
        assert_eq!(detect_scheme(&dom), Scheme::Dark);
    }

    #[test]
    fn compact_density_shrinks_controls() {
        let palette = Palette::new(Scheme::Dark, Density::Compact);
        assert_eq!(palette.font_size, "13px");
        assert_eq!(palette.background, "#000");
        assert_eq!(Palette::default().input_height, "36px");
    }
}
