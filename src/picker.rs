//! The week picker: a Hidden/Visible machine over a [`Selection`], wired to the
//! active site's URL codec.

use crate::config::Config;
use crate::dates::{current_week, NormalizedDate, Selection};
use crate::dom::{set_styles, Dom, NodeId};
use crate::errors::WeekSearchError;
use crate::injection::{set_icon_active, ICON_ID};
use crate::markup::{render_arrow, Direction};
use crate::sites::Site;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const PICKER_ID: &str = "wbw-date-picker";
pub const PICKER_SELECTOR: &str = "#wbw-date-picker";
pub const START_INPUT_ID: &str = "wbw-start-date";
pub const END_INPUT_ID: &str = "wbw-end-date";
pub const PREV_WEEK_ID: &str = "wbw-prev-week";
pub const CURRENT_WEEK_ID: &str = "wbw-quick-week";
pub const NEXT_WEEK_ID: &str = "wbw-next-week";
pub const APPLY_ID: &str = "wbw-apply";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeTicket {
    pub id: u64,
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct PickerController {
    site: Site,
    visibility: Visibility,
    selection: Selection,
    fade: Duration,
    fade_ticket: u64,
    icon_color: String,
    width: String,
    offset_px: f64,
    gap_px: f64,
}

impl PickerController {
    pub fn new(site: Site, config: &Config) -> Self {
        Self {
            site,
            visibility: Visibility::Hidden,
            selection: Selection::default(),
            fade: config.fade(),
            fade_ticket: 0,
            icon_color: config.icon_color.clone(),
            width: config.picker_width.clone(),
            offset_px: config.picker_offset_px,
            gap_px: config.picker_gap_px,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn mount(&mut self, dom: &mut dyn Dom) -> NodeId {
        remove_picker(dom);
        let picker = self.build(dom);
        let body = dom.body();
        dom.append_child(body, picker);
        self.sync_inputs(dom);
        debug!("date picker created (initially hidden)");
        picker
    }

    pub fn load_existing(&mut self, dom: &mut dyn Dom, today: NormalizedDate) {
        let adapter = self.site.adapter();
        let location = dom.location();
        match adapter.read_existing_range(&location, dom, today) {
            Ok(Some(range)) => {
                debug!("existing range {range} found in url");
                self.selection = range.into();
                self.sync_inputs(dom);
                self.refresh_icon(dom);
            }
            Ok(None) => {}
            Err(err) => debug!("{err}; treating as no range"),
        }
    }

    pub fn toggle(&mut self, dom: &mut dyn Dom) -> Option<FadeTicket> {
        match self.visibility {
            Visibility::Hidden => {
                self.show(dom);
                None
            }
            Visibility::Visible => self.hide(dom),
        }
    }

    pub fn show(&mut self, dom: &mut dyn Dom) {
        let (Some(picker), Some(icon)) = (dom.element_by_id(PICKER_ID), dom.element_by_id(ICON_ID))
        else {
            warn!("date picker or calendar icon not found");
            return;
        };
        let rect = dom.bounding_box(icon);
        let scroll = dom.scroll_offset();
        let top = rect.bottom() + scroll.y + self.gap_px;
        let left = rect.left + scroll.x - self.offset_px;
        dom.set_style(picker, "top", &format!("{top}px"));
        dom.set_style(picker, "left", &format!("{left}px"));
        dom.set_style(picker, "display", "block");
        dom.set_style(picker, "opacity", "1");
        dom.set_style(picker, "pointer-events", "auto");

        self.fade_ticket += 1;
        self.visibility = Visibility::Visible;
        self.refresh_icon(dom);
        debug!("picker visible");
    }

    pub fn hide(&mut self, dom: &mut dyn Dom) -> Option<FadeTicket> {
        if self.visibility == Visibility::Hidden {
            return None;
        }
        self.visibility = Visibility::Hidden;
        self.fade_ticket += 1;
        self.refresh_icon(dom);
        let picker = dom.element_by_id(PICKER_ID)?;
        dom.set_style(picker, "opacity", "0");
        dom.set_style(picker, "pointer-events", "none");
        debug!("picker hiding");
        Some(FadeTicket {
            id: self.fade_ticket,
            delay: self.fade,
        })
    }

    pub fn finish_fade(&mut self, dom: &mut dyn Dom, ticket: u64) {
        if ticket != self.fade_ticket || self.visibility != Visibility::Hidden {
            debug!("ignoring superseded fade ticket {ticket}");
            return;
        }
        if let Some(picker) = dom.element_by_id(PICKER_ID) {
            dom.set_style(picker, "display", "none");
        }
    }

    pub fn select_current_week(&mut self, dom: &mut dyn Dom, today: NormalizedDate) {
        self.selection.set_range(current_week(today));
        self.sync_inputs(dom);
    }

    pub fn shift_weeks(&mut self, dom: &mut dyn Dom, weeks: i64, today: NormalizedDate) {
        self.selection.shift_weeks(weeks, today);
        self.sync_inputs(dom);
    }

    pub fn edit(&mut self, field: Field, value: &str) {
        let parsed = if value.trim().is_empty() {
            None
        } else {
            match value.parse::<NormalizedDate>() {
                Ok(date) => Some(date),
                Err(err) => {
                    debug!("{err}; clearing {field:?}");
                    None
                }
            }
        };
        match field {
            Field::Start => self.selection.start = parsed,
            Field::End => self.selection.end = parsed,
        }
    }

    pub fn apply(&self, location: &Url) -> Result<Url, WeekSearchError> {
        let range = self.selection.complete().ok_or(WeekSearchError::MissingSelection)?;
        Ok(self.site.adapter().write_range(location, range))
    }

    pub fn refresh_icon(&self, dom: &mut dyn Dom) {
        let active = self.selection.complete().is_some();
        set_icon_active(dom, self.site.adapter(), &self.icon_color, active);
    }

    fn sync_inputs(&self, dom: &mut dyn Dom) {
        let start = self.selection.start.map(|d| d.to_string()).unwrap_or_default();
        let end = self.selection.end.map(|d| d.to_string()).unwrap_or_default();
        if let Some(input) = dom.element_by_id(START_INPUT_ID) {
            dom.set_value(input, &start);
        }
        if let Some(input) = dom.element_by_id(END_INPUT_ID) {
            dom.set_value(input, &end);
        }
    }

    fn build(&self, dom: &mut dyn Dom) -> NodeId {
        let descriptor = self.site.adapter().descriptor();
        let palette = self.site.adapter().palette(dom);
        let transition = format!("opacity {}s ease-in-out", self.fade.as_secs_f64());
        let border = format!("1px solid {}", palette.border);

        let picker = dom.create_element("div");
        dom.set_attribute(picker, "id", PICKER_ID);
        dom.set_attribute(picker, "class", PICKER_ID);
        set_styles(
            dom,
            picker,
            &[
                ("position", "absolute"),
                ("z-index", "9999"),
                ("background", palette.background),
                ("border-radius", "8px"),
                ("box-shadow", palette.shadow),
                ("padding", palette.padding),
                ("width", self.width.as_str()),
                ("display", "none"),
                ("opacity", "0"),
                ("pointer-events", "none"),
                ("transition", transition.as_str()),
                ("font-family", palette.font_family),
                ("font-size", palette.font_size),
                ("color", palette.text),
                ("border", border.as_str()),
            ],
        );

        let title = dom.create_element("div");
        dom.set_text(title, &format!("Search {} by Week", descriptor.display_name));
        set_styles(
            dom,
            title,
            &[("margin-bottom", palette.section_gap), ("font-weight", "bold"), ("color", palette.text)],
        );
        dom.append_child(picker, title);

        for (label, id) in [("Start Date", START_INPUT_ID), ("End Date", END_INPUT_ID)] {
            let section = dom.create_element("div");
            dom.set_style(section, "margin-bottom", palette.section_gap);
            let caption = dom.create_element("div");
            dom.set_text(caption, label);
            set_styles(
                dom,
                caption,
                &[("margin-bottom", "6px"), ("color", palette.secondary_text), ("font-size", palette.font_size)],
            );
            let input = dom.create_element("input");
            dom.set_attribute(input, "type", "date");
            dom.set_attribute(input, "id", id);
            set_styles(
                dom,
                input,
                &[
                    ("width", "100%"),
                    ("padding", palette.input_padding),
                    ("height", palette.input_height),
                    ("border", border.as_str()),
                    ("border-radius", "4px"),
                    ("background", palette.background),
                    ("color", palette.text),
                ],
            );
            dom.append_child(section, caption);
            dom.append_child(section, input);
            dom.append_child(picker, section);
        }

        let controls = dom.create_element("div");
        set_styles(
            dom,
            controls,
            &[("display", "flex"), ("justify-content", "space-between"), ("align-items", "center")],
        );
        let group = dom.create_element("div");
        set_styles(dom, group, &[("display", "flex"), ("align-items", "center")]);

        let week_button = |dom: &mut dyn Dom, id: &str, radius: &str| {
            let button = dom.create_element("button");
            dom.set_attribute(button, "id", id);
            set_styles(
                dom,
                button,
                &[
                    ("background", palette.button_background),
                    ("border", border.as_str()),
                    ("border-radius", radius),
                    ("color", palette.button_text),
                    ("cursor", "pointer"),
                    ("margin", "0"),
                    ("height", palette.button_height),
                ],
            );
            button
        };

        let prev = week_button(dom, PREV_WEEK_ID, "4px 0 0 4px");
        dom.set_style(prev, "padding", "6px");
        dom.set_inner_html(prev, &render_arrow(Direction::Left));
        let current = week_button(dom, CURRENT_WEEK_ID, "0");
        set_styles(
            dom,
            current,
            &[
                ("border-left", "none"),
                ("border-right", "none"),
                ("padding", palette.button_padding),
                ("font-size", palette.font_size),
            ],
        );
        dom.set_text(current, "Current Week");
        let next = week_button(dom, NEXT_WEEK_ID, "0 4px 4px 0");
        dom.set_style(next, "padding", "6px");
        dom.set_inner_html(next, &render_arrow(Direction::Right));
        for button in [prev, current, next] {
            dom.append_child(group, button);
        }

        let apply = dom.create_element("button");
        dom.set_attribute(apply, "id", APPLY_ID);
        dom.set_text(apply, "Apply");
        set_styles(
            dom,
            apply,
            &[
                ("background", descriptor.accent_color),
                ("border", "none"),
                ("border-radius", "4px"),
                ("padding", palette.button_padding),
                ("color", "white"),
                ("cursor", "pointer"),
                ("height", palette.button_height),
                ("font-size", palette.font_size),
            ],
        );

        dom.append_child(controls, group);
        dom.append_child(controls, apply);
        dom.append_child(picker, controls);
        picker
    }
}

pub fn remove_picker(dom: &mut dyn Dom) {
    while let Some(existing) = dom.element_by_id(PICKER_ID) {
        dom.remove(existing);
    }
}
