use crate::config::Config;
use crate::dates::NormalizedDate;
use crate::dom::{Dom, NodeId};
use crate::errors::WeekSearchError;
use crate::injection::{remove_icon, InjectionController, InjectionOutcome, ICON_SELECTOR};
use crate::navigation::NavigationWatcher;
use crate::picker::{
    remove_picker, Field, FadeTicket, PickerController, APPLY_ID, CURRENT_WEEK_ID, END_INPUT_ID,
    NEXT_WEEK_ID, PICKER_SELECTOR, PREV_WEEK_ID, START_INPUT_ID,
};
use crate::sites::{self, Site};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    DomMutated,
    PopState,
    Click { target: NodeId },
    Input { target: NodeId, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Boot,
    Host(HostEvent),
    SettleElapsed { generation: u64 },
    AnchorRetryDue { generation: u64, site: Site },
    FadeOutDue { generation: u64, ticket: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled {
    pub delay: Duration,
    pub command: Command,
}

#[derive(Debug, Default, PartialEq)]
pub struct Reaction {
    pub scheduled: Vec<Scheduled>,
    pub notices: Vec<WeekSearchError>,
    pub navigated: Option<Url>,
}

impl Reaction {
    fn schedule(&mut self, delay: Duration, command: Command) {
        self.scheduled.push(Scheduled { delay, command });
    }
}

#[derive(Debug)]
struct PageState {
    injection: InjectionController,
    picker: PickerController,
}

pub struct Session {
    config: Config,
    today: Box<dyn Fn() -> NormalizedDate>,
    watcher: NavigationWatcher,
    generation: u64,
    site: Option<Site>,
    page: Option<PageState>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, NormalizedDate::today)
    }

    pub fn with_clock(config: Config, today: impl Fn() -> NormalizedDate + 'static) -> Self {
        Self {
            config,
            today: Box::new(today),
            watcher: NavigationWatcher::new(),
            generation: 0,
            site: None,
            page: None,
        }
    }

    pub fn site(&self) -> Option<Site> {
        self.site
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_dormant(&self) -> bool {
        self.site.is_none()
    }

    pub fn injection_attempts(&self) -> Option<u32> {
        self.page.as_ref().map(|page| page.injection.attempts())
    }

    pub fn picker(&self) -> Option<&PickerController> {
        self.page.as_ref().map(|page| &page.picker)
    }

    pub fn dispatch(&mut self, dom: &mut dyn Dom, command: Command) -> Reaction {
        let mut reaction = Reaction::default();
        match command {
            Command::Boot => self.boot(dom, &mut reaction),
            Command::Host(HostEvent::DomMutated | HostEvent::PopState) => {
                self.check_navigation(dom, &mut reaction)
            }
            Command::Host(HostEvent::Click { target }) => self.on_click(dom, target, &mut reaction),
            Command::Host(HostEvent::Input { target, value }) => self.on_input(dom, target, &value),
            Command::SettleElapsed { generation } => {
                self.initialize(dom, generation, &mut reaction)
            }
            Command::AnchorRetryDue { generation, site } => {
                self.retry_anchor(dom, generation, site, &mut reaction)
            }
            Command::FadeOutDue { generation, ticket } => {
                if generation == self.generation {
                    if let Some(page) = self.page.as_mut() {
                        page.picker.finish_fade(dom, ticket);
                    }
                }
            }
        }
        reaction
    }

    fn boot(&mut self, dom: &mut dyn Dom, reaction: &mut Reaction) {
        let location = dom.location();
        self.watcher.prime(&location);
        match sites::lookup(&location) {
            Ok(site) => {
                let delay = self.config.settle_delay(Some(site));
                self.begin_generation(site, delay, reaction);
            }
            Err(err) => debug!("{err}; staying dormant"),
        }
    }

    fn check_navigation(&mut self, dom: &mut dyn Dom, reaction: &mut Reaction) {
        let location = dom.location();
        if !self.watcher.observe(&location) {
            return;
        }
        self.teardown(dom);
        match sites::detect(&location) {
            Some(site) => {
                info!("url changed to a {site} page, reinitializing");
                let delay = self.config.navigation_settle();
                self.begin_generation(site, delay, reaction);
            }
            None => {
                info!("url changed to an unsupported page, going dormant");
                self.generation += 1;
                self.site = None;
            }
        }
    }

    fn begin_generation(&mut self, site: Site, delay: Duration, reaction: &mut Reaction) {
        self.generation += 1;
        self.site = Some(site);
        info!("delaying initialization for {}ms on {site}", delay.as_millis());
        reaction.schedule(
            delay,
            Command::SettleElapsed {
                generation: self.generation,
            },
        );
    }

    fn teardown(&mut self, dom: &mut dyn Dom) {
        remove_icon(dom);
        remove_picker(dom);
        self.page = None;
    }

    fn initialize(&mut self, dom: &mut dyn Dom, generation: u64, reaction: &mut Reaction) {
        let Some(site) = self.site.filter(|_| generation == self.generation) else {
            debug!("dropping stale initialization for generation {generation}");
            return;
        };
        self.teardown(dom);

        let mut injection = InjectionController::new(site, &self.config);
        let outcome = injection.attempt(dom);
        let mut picker = PickerController::new(site, &self.config);
        picker.mount(dom);
        picker.load_existing(dom, (self.today)());

        if let InjectionOutcome::RetryIn { delay, .. } = outcome {
            reaction.schedule(delay, Command::AnchorRetryDue { generation, site });
        }
        self.page = Some(PageState { injection, picker });
    }

    fn retry_anchor(&mut self, dom: &mut dyn Dom, generation: u64, site: Site, reaction: &mut Reaction) {
        let current = generation == self.generation && self.site == Some(site);
        let Some(page) = self.page.as_mut().filter(|page| current && page.injection.site() == site)
        else {
            debug!("dropping stale retry for {site} (generation {generation})");
            return;
        };
        match page.injection.attempt(dom) {
            InjectionOutcome::Injected => page.picker.refresh_icon(dom),
            InjectionOutcome::RetryIn { delay, .. } => {
                reaction.schedule(delay, Command::AnchorRetryDue { generation, site })
            }
            InjectionOutcome::GaveUp { .. } => {}
        }
    }

    fn on_click(&mut self, dom: &mut dyn Dom, target: NodeId, reaction: &mut Reaction) {
        let generation = self.generation;
        let today = (self.today)();
        let Some(page) = self.page.as_mut() else {
            return;
        };
        let picker = &mut page.picker;
        let hit = |selector: &str| dom.closest(target, selector).is_some();

        if hit(ICON_SELECTOR) {
            let ticket = picker.toggle(dom);
            schedule_fade(reaction, generation, ticket);
            return;
        }
        if picker.is_visible() && !hit(PICKER_SELECTOR) {
            let ticket = picker.hide(dom);
            schedule_fade(reaction, generation, ticket);
            return;
        }

        if hit(&format!("#{APPLY_ID}")) {
            let location = dom.location();
            let applied = picker.apply(&location);
            let ticket = picker.hide(dom);
            schedule_fade(reaction, generation, ticket);
            match applied {
                Ok(url) => {
                    info!("navigating to {url}");
                    dom.navigate(url.clone());
                    reaction.navigated = Some(url);
                }
                Err(err) if err.is_user_facing() => {
                    warn!("{err}");
                    reaction.notices.push(err);
                }
                Err(err) => debug!("apply aborted: {err}"),
            }
        } else if hit(&format!("#{CURRENT_WEEK_ID}")) {
            picker.select_current_week(dom, today);
        } else if hit(&format!("#{PREV_WEEK_ID}")) {
            picker.shift_weeks(dom, -1, today);
        } else if hit(&format!("#{NEXT_WEEK_ID}")) {
            picker.shift_weeks(dom, 1, today);
        }
    }

    fn on_input(&mut self, dom: &mut dyn Dom, target: NodeId, value: &str) {
        let Some(page) = self.page.as_mut() else {
            return;
        };
        match dom.attribute(target, "id").as_deref() {
            Some(START_INPUT_ID) => page.picker.edit(Field::Start, value),
            Some(END_INPUT_ID) => page.picker.edit(Field::End, value),
            _ => {}
        }
    }
}

fn schedule_fade(reaction: &mut Reaction, generation: u64, ticket: Option<FadeTicket>) {
    if let Some(ticket) = ticket {
        reaction.schedule(
            ticket.delay,
            Command::FadeOutDue {
                generation,
                ticket: ticket.id,
            },
        );
    }
}
