use super::Site;
use crate::errors::WeekSearchError;
use url::Url;

pub fn detect(url: &Url) -> Option<Site> {
    let host = url.host_str()?.to_ascii_lowercase();
    detect_host_path(&host, url.path())
}

pub fn detect_host_path(host: &str, path: &str) -> Option<Site> {
    Site::ALL
        .into_iter()
        .find(|site| site.adapter().matches(host, path))
}

pub fn lookup(url: &Url) -> Result<Site, WeekSearchError> {
    detect(url).ok_or_else(|| WeekSearchError::AdapterNotFound {
        host: url.host_str().unwrap_or_default().to_string(),
    })
}
