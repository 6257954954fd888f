use std::env;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;
use week_search::dom::{Dom, MemoryDom};
use week_search::injection::ICON_ID;
use week_search::picker::{APPLY_ID, CURRENT_WEEK_ID};
use week_search::sites;
use week_search::{load_config, resolve_config_path, Command, HostEvent, Runtime, Session};

const DEFAULT_PAGE: &str = "https://www.google.com/search?q=rust";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&resolve_config_path()).await;
    let page = env::var("PAGE_URL").unwrap_or_else(|_| DEFAULT_PAGE.to_string());
    let location = Url::parse(&page)?;

    let mut dom = match sites::detect(&location) {
        Some(site) => MemoryDom::search_page(location, site),
        None => MemoryDom::new(location),
    };
    let mut session = Session::new(config);
    let mut runtime = Runtime::new();

    runtime.submit(&mut session, &mut dom, Command::Boot);
    runtime.settle(&mut session, &mut dom).await;
    if session.is_dormant() {
        println!("dormant: {}", dom.location());
        return Ok(());
    }

    let (sender, mut events) = tokio::sync::mpsc::unbounded_channel();
    for id in [ICON_ID, CURRENT_WEEK_ID, APPLY_ID] {
        let Some(target) = dom.element_by_id(id) else {
            return Err(format!("#{id} was never rendered").into());
        };
        sender.send(HostEvent::Click { target })?;
    }
    drop(sender);
    runtime.run(&mut session, &mut dom, &mut events).await;

    let journal = runtime.into_journal();
    for notice in &journal.notices {
        info!("notice: {notice}");
    }
    for url in &journal.navigations {
        println!("navigated: {url}");
    }
    Ok(())
}
