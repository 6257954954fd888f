use url::Url;

pub fn get_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

pub fn has_param(url: &Url, name: &str) -> bool {
    url.query_pairs().any(|(key, _)| key == name)
}

pub fn set_param(url: &Url, name: &str, value: &str) -> Url {
    let mut pairs = owned_pairs(url);
    let mut replaced = false;
    pairs.retain_mut(|(key, existing)| {
        if key != name {
            return true;
        }
        if replaced {
            return false;
        }
        *existing = value.to_string();
        replaced = true;
        true
    });
    if !replaced {
        pairs.push((name.to_string(), value.to_string()));
    }
    with_pairs(url, &pairs)
}

pub fn delete_param(url: &Url, name: &str) -> Url {
    let mut pairs = owned_pairs(url);
    pairs.retain(|(key, _)| key != name);
    with_pairs(url, &pairs)
}

fn owned_pairs(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

fn with_pairs(url: &Url, pairs: &[(String, String)]) -> Url {
    let mut next = url.clone();
    if pairs.is_empty() {
        next.set_query(None);
        return next;
    }
    next.query_pairs_mut().clear().extend_pairs(pairs);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn set_replaces_in_place_and_keeps_order() {
        let updated = set_param(&url("https://a.test/s?q=cats&tbs=old&hl=en"), "tbs", "new");
        assert_eq!(updated.query(), Some("q=cats&tbs=new&hl=en"));
    }

    #[test]
    fn set_appends_missing_and_collapses_duplicates() {
        let appended = set_param(&url("https://a.test/s?q=cats"), "tbs", "x");
        assert_eq!(appended.query(), Some("q=cats&tbs=x"));

        let collapsed = set_param(&url("https://a.test/s?q=a&q=b"), "q", "c");
        assert_eq!(collapsed.query(), Some("q=c"));
    }

    #[test]
    fn values_are_form_encoded() {
        let updated = set_param(&url("https://a.test/s"), "q", "cats since:2024-01-01");
        assert_eq!(get_param(&updated, "q").as_deref(), Some("cats since:2024-01-01"));
        assert!(updated.as_str().contains("cats+since%3A2024-01-01"));
    }

    #[test]
    fn delete_removes_every_occurrence() {
        let updated = delete_param(&url("https://a.test/r?sp=1&search_query=x&sp=2"), "sp");
        assert_eq!(updated.query(), Some("search_query=x"));
        assert!(!has_param(&updated, "sp"));

        let emptied = delete_param(&url("https://a.test/r?sp=1"), "sp");
        assert_eq!(emptied.as_str(), "https://a.test/r");
    }
}
