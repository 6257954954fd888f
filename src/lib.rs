pub mod config;
pub mod dates;
pub mod dom;
pub mod errors;
pub mod injection;
pub mod markup;
pub mod navigation;
pub mod picker;
pub mod query;
pub mod runtime;
pub mod session;
pub mod sites;
pub mod theme;

pub use config::{load_config, resolve_config_path, Config};
pub use dates::{current_week, week_start, DateRange, NormalizedDate, Selection};
pub use errors::WeekSearchError;
pub use runtime::{Journal, Runtime};
pub use session::{Command, HostEvent, Reaction, Session};
pub use sites::{Site, SiteAdapter};
