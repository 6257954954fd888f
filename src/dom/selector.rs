use super::NodeId;

pub trait ElementView {
    fn tag_name(&self, node: NodeId) -> Option<&str>;
    fn attribute_value(&self, node: NodeId, name: &str) -> Option<&str>;
    fn parent_of(&self, node: NodeId) -> Option<NodeId>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<Complex>);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex(Vec<Compound>);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl SelectorList {
    pub fn parse(input: &str) -> Option<Self> {
        let mut list = Vec::new();
        for part in split_top_level(input, |c| c == ',') {
            let compounds = split_top_level(part, char::is_whitespace)
                .into_iter()
                .filter(|piece| !piece.is_empty())
                .map(parse_compound)
                .collect::<Option<Vec<_>>>()?;
            if compounds.is_empty() {
                return None;
            }
            list.push(Complex(compounds));
        }
        if list.is_empty() { None } else { Some(Self(list)) }
    }

    pub fn matches(&self, view: &impl ElementView, node: NodeId) -> bool {
        self.0.iter().any(|complex| complex.matches(view, node))
    }
}

impl Complex {
    fn matches(&self, view: &impl ElementView, node: NodeId) -> bool {
        let Some((last, ancestors)) = self.0.split_last() else {
            return false;
        };
        if !last.matches(view, node) {
            return false;
        }
        let mut cursor = view.parent_of(node);
        for compound in ancestors.iter().rev() {
            loop {
                let Some(candidate) = cursor else {
                    return false;
                };
                cursor = view.parent_of(candidate);
                if compound.matches(view, candidate) {
                    break;
                }
            }
        }
        true
    }
}

impl Compound {
    fn matches(&self, view: &impl ElementView, node: NodeId) -> bool {
        let Some(tag) = view.tag_name(node) else {
            return false;
        };
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if view.attribute_value(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = view.attribute_value(node, "class").unwrap_or_default();
            let present: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|class| present.contains(&class.as_str())) {
                return false;
            }
        }
        self.attributes.iter().all(|(name, expected)| {
            match (view.attribute_value(node, name), expected) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected.as_str(),
            }
        })
    }
}

fn split_top_level(input: &str, is_separator: impl Fn(char) -> bool) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (index, c) in input.char_indices() {
        match (quote, c) {
            (Some(open), _) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, _) if depth == 0 && is_separator(c) => {
                pieces.push(input[start..index].trim());
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(input[start..].trim());
    pieces
}

fn parse_compound(input: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = input;

    let tag_len = rest
        .find(|c: char| matches!(c, '#' | '.' | '['))
        .unwrap_or(rest.len());
    let tag = &rest[..tag_len];
    if !tag.is_empty() && tag != "*" {
        if !tag.chars().all(is_ident_char) {
            return None;
        }
        compound.tag = Some(tag.to_ascii_lowercase());
    }
    rest = &rest[tag_len..];

    while let Some(marker) = rest.chars().next() {
        rest = &rest[marker.len_utf8()..];
        match marker {
            '#' | '.' => {
                let len = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
                if len == 0 {
                    return None;
                }
                let name = rest[..len].to_string();
                if marker == '#' {
                    compound.id = Some(name);
                } else {
                    compound.classes.push(name);
                }
                rest = &rest[len..];
            }
            '[' => {
                let close = find_attribute_end(rest)?;
                compound.attributes.push(parse_attribute(&rest[..close])?);
                rest = &rest[close + 1..];
            }
            _ => return None,
        }
    }
    Some(compound)
}

fn find_attribute_end(input: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (index, c) in input.char_indices() {
        match (quote, c) {
            (Some(open), _) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, ']') => return Some(index),
            _ => {}
        }
    }
    None
}

fn parse_attribute(body: &str) -> Option<(String, Option<String>)> {
    let Some((name, value)) = body.split_once('=') else {
        let name = body.trim();
        return (!name.is_empty()).then(|| (name.to_string(), None));
    };
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let value = value.trim();
    let unquoted = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);
    Some((name.to_string(), Some(unquoted.to_string())))
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Fixture {
        nodes: HashMap<NodeId, (&'static str, Vec<(&'static str, &'static str)>, Option<NodeId>)>,
    }

    impl ElementView for Fixture {
        fn tag_name(&self, node: NodeId) -> Option<&str> {
            self.nodes.get(&node).map(|(tag, _, _)| *tag)
        }

        fn attribute_value(&self, node: NodeId, name: &str) -> Option<&str> {
            self.nodes
                .get(&node)?
                .1
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
        }

        fn parent_of(&self, node: NodeId) -> Option<NodeId> {
            self.nodes.get(&node)?.2
        }
    }

    fn fixture() -> Fixture {
        let mut nodes = HashMap::new();
        nodes.insert(NodeId(1), ("ytd-searchbox", vec![], None));
        nodes.insert(
            NodeId(2),
            ("form", vec![("id", "search-form"), ("role", "search"), ("class", "a search-form")], Some(NodeId(1))),
        );
        nodes.insert(
            NodeId(3),
            ("button", vec![("type", "submit"), ("aria-label", "Google Search")], Some(NodeId(2))),
        );
        Fixture { nodes }
    }

    fn matches(selector: &str, node: usize) -> bool {
        SelectorList::parse(selector)
            .unwrap_or_else(|| panic!("selector {selector} should parse"))
            .matches(&fixture(), NodeId(node))
    }

    #[test]
    fn matches_compound_forms() {
        assert!(matches("form", 2));
        assert!(matches("form#search-form", 2));
        assert!(matches("form.search-form", 2));
        assert!(matches(r#"form[role="search"]"#, 2));
        assert!(matches("[role]", 2));
        assert!(!matches("form#tsf", 2));
        assert!(!matches("form.missing", 2));
    }

    #[test]
    fn matches_attribute_values_with_spaces() {
        assert!(matches(r#"button[aria-label="Google Search"]"#, 3));
        assert!(!matches(r#"button[aria-label="More"]"#, 3));
    }

    #[test]
    fn comma_lists_match_any_branch() {
        assert!(matches(r#"form#tsf, form[role="search"]"#, 2));
        assert!(matches(r#"button[type="submit"], button[aria-label="Google Search"]"#, 3));
    }

    #[test]
    fn descendant_combinator_walks_ancestors() {
        assert!(matches("ytd-searchbox form", 2));
        assert!(matches("ytd-searchbox button", 3));
        assert!(!matches("form ytd-searchbox", 1));
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert!(SelectorList::parse("").is_none());
        assert!(SelectorList::parse("div > p").is_none());
        assert!(SelectorList::parse("a:hover").is_none());
        assert!(SelectorList::parse("[unterminated").is_none());
    }
}
