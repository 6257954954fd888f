use url::Url;

#[derive(Debug, Clone, Default)]
pub struct NavigationWatcher {
    last_known_url: Option<String>,
}

impl NavigationWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prime(&mut self, current: &Url) {
        self.last_known_url = Some(current.as_str().to_string());
    }

    pub fn observe(&mut self, current: &Url) -> bool {
        let changed = self
            .last_known_url
            .as_deref()
            .is_some_and(|last| last != current.as_str());
        self.prime(current);
        changed
    }
}
