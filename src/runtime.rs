use crate::dom::Dom;
use crate::errors::WeekSearchError;
use crate::session::{Command, HostEvent, Reaction, Session};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep_until, Instant};
use tracing::debug;
use url::Url;

#[derive(Debug)]
struct Timer {
    due: Instant,
    seq: u64,
    command: Command,
}

#[derive(Debug, Default, PartialEq)]
pub struct Journal {
    pub navigations: Vec<Url>,
    pub notices: Vec<WeekSearchError>,
}

impl Journal {
    fn record(&mut self, reaction: Reaction) {
        self.navigations.extend(reaction.navigated);
        self.notices.extend(reaction.notices);
    }
}

#[derive(Debug, Default)]
pub struct Runtime {
    timers: Vec<Timer>,
    seq: u64,
    journal: Journal,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn into_journal(self) -> Journal {
        self.journal
    }

    pub fn submit(&mut self, session: &mut Session, dom: &mut dyn Dom, command: Command) {
        let mut reaction = session.dispatch(dom, command);
        let now = Instant::now();
        for scheduled in reaction.scheduled.drain(..) {
            self.seq += 1;
            self.timers.push(Timer {
                due: now + scheduled.delay,
                seq: self.seq,
                command: scheduled.command,
            });
        }
        self.journal.record(reaction);
    }

    pub async fn settle(&mut self, session: &mut Session, dom: &mut dyn Dom) {
        while let Some(due) = self.next_due() {
            sleep_until(due).await;
            self.fire_next(session, dom);
        }
    }

    pub async fn run(
        &mut self,
        session: &mut Session,
        dom: &mut dyn Dom,
        events: &mut UnboundedReceiver<HostEvent>,
    ) {
        let mut open = true;
        loop {
            let next = self.next_due();
            if !open && next.is_none() {
                break;
            }
            tokio::select! {
                event = events.recv(), if open => match event {
                    Some(event) => self.submit(session, dom, Command::Host(event)),
                    None => {
                        debug!("host event source closed");
                        open = false;
                    }
                },
                _ = sleep_until(next.unwrap_or_else(Instant::now)), if next.is_some() => {
                    self.fire_next(session, dom);
                }
            }
        }
    }

    fn next_due(&self) -> Option<Instant> {
        self.timers.iter().map(|timer| timer.due).min()
    }

    fn fire_next(&mut self, session: &mut Session, dom: &mut dyn Dom) {
        let Some(index) = self
            .timers
            .iter()
            .enumerate()
            .min_by_key(|(_, timer)| (timer.due, timer.seq))
            .map(|(index, _)| index)
        else {
            return;
        };
        let timer = self.timers.swap_remove(index);
        self.submit(session, dom, timer.command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dates::NormalizedDate;
    use crate::dom::MemoryDom;
    use crate::injection::ICON_SELECTOR;
    use crate::sites::Site;
    use std::time::Duration;

    fn session() -> Session {
        Session::with_clock(Config::default(), || NormalizedDate::from_ymd(2024, 1, 13).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn settle_waits_out_the_site_delay() {
        let url = Url::parse("https://www.youtube.com/results?search_query=a").unwrap();
        let mut dom = MemoryDom::search_page(url, Site::YouTube);
        let mut session = session();
        let mut runtime = Runtime::new();

        let started = Instant::now();
        runtime.submit(&mut session, &mut dom, Command::Boot);
        assert_eq!(runtime.pending_timers(), 1);
        assert_eq!(dom.count(ICON_SELECTOR), 0);

        runtime.settle(&mut session, &mut dom).await;
        assert_eq!(started.elapsed(), Duration::from_millis(2000));
        assert_eq!(dom.count(ICON_SELECTOR), 1);
        assert_eq!(runtime.pending_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn run_returns_once_events_close_and_timers_drain() {
        let url = Url::parse("https://www.google.com/search?q=a").unwrap();
        let mut dom = MemoryDom::search_page(url, Site::Google);
        let mut session = session();
        let mut runtime = Runtime::new();
        runtime.submit(&mut session, &mut dom, Command::Boot);

        let (sender, mut events) = tokio::sync::mpsc::unbounded_channel();
        sender.send(HostEvent::DomMutated).unwrap();
        drop(sender);
        runtime.run(&mut session, &mut dom, &mut events).await;

        assert_eq!(runtime.pending_timers(), 0);
        assert_eq!(dom.count(ICON_SELECTOR), 1);
        assert_eq!(runtime.journal(), &Journal::default());
    }
}
