use super::selector::{ElementView, SelectorList};
use super::{Dom, NodeId, Rect, ScrollOffset};
use crate::sites::Site;
use std::{cell::RefCell, collections::BTreeMap};
use url::Url;

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    text: String,
    inner_html: Option<String>,
    value: String,
    rect: Rect,
}

#[derive(Debug)]
pub struct MemoryDom {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    location: Url,
    navigations: Vec<Url>,
    scroll: ScrollOffset,
    mutations: u64,
    queries: RefCell<BTreeMap<String, usize>>,
}

impl MemoryDom {
    pub fn new(location: Url) -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            location,
            navigations: Vec::new(),
            scroll: ScrollOffset::default(),
            mutations: 0,
            queries: RefCell::new(BTreeMap::new()),
        };
        dom.root = dom.alloc("html");
        dom.body = dom.alloc("body");
        dom.attach(dom.root, dom.body, None);
        dom.mutations = 0;
        dom
    }

    pub fn search_page(location: Url, site: Site) -> Self {
        let mut dom = Self::new(location);
        dom.mount_search_bar(site);
        dom
    }

    pub fn mount_search_bar(&mut self, site: Site) -> NodeId {
        let body = self.body;
        match site {
            Site::Google => {
                let form = self.element(body, "form", &[("role", "search"), ("id", "tsf")]);
                self.element(form, "input", &[("name", "q")]);
                let button = self.element(form, "button", &[("type", "submit")]);
                self.set_rect(button, Rect { left: 600.0, top: 20.0, width: 40.0, height: 40.0 });
                form
            }
            Site::Twitter => {
                let header = self.element(body, "div", &[("class", "search-header")]);
                let row = self.element(header, "div", &[("class", "search-row")]);
                self.element(row, "input", &[("data-testid", "SearchBox_Search_Input")]);
                self.element(row, "button", &[("aria-label", "More")]);
                header
            }
            Site::YouTube => {
                let searchbox = self.element(body, "ytd-searchbox", &[]);
                let form = self.element(searchbox, "form", &[("id", "search-form")]);
                self.element(form, "input", &[("name", "search_query")]);
                self.element(form, "button", &[("id", "search-icon-legacy")]);
                form
            }
        }
    }

    pub fn element(&mut self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let node = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(node, name, value);
        }
        self.append_child(parent, node);
        node
    }

    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(entry) = self.nodes.get_mut(node.0) {
            entry.rect = rect;
        }
    }

    pub fn set_scroll(&mut self, scroll: ScrollOffset) {
        self.scroll = scroll;
    }

    pub fn set_location(&mut self, location: Url) {
        self.location = location;
    }

    pub fn navigations(&self) -> &[Url] {
        &self.navigations
    }

    pub fn mutations(&self) -> u64 {
        self.mutations
    }

    pub fn count(&self, selector: &str) -> usize {
        self.query_all(selector).len()
    }

    pub fn query_count(&self, selector: &str) -> usize {
        self.queries.borrow().get(selector).copied().unwrap_or(0)
    }

    pub fn inner_html(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0)?.inner_html.as_deref()
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn alloc(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            ..Node::default()
        });
        NodeId(self.nodes.len() - 1)
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node.0).and_then(|n| n.parent) else {
            return;
        };
        self.nodes[parent.0].children.retain(|child| *child != node);
        self.nodes[node.0].parent = None;
        self.mutations += 1;
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() || parent == child {
            return;
        }
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = reference
            .and_then(|r| children.iter().position(|c| *c == r))
            .unwrap_or(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.mutations += 1;
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .nodes
            .get(root.0)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        out
    }

    fn select(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        *self
            .queries
            .borrow_mut()
            .entry(selector.to_string())
            .or_default() += 1;
        let Some(list) = SelectorList::parse(selector) else {
            return Vec::new();
        };
        self.descendants(root)
            .into_iter()
            .filter(|node| list.matches(self, *node))
            .collect()
    }
}

impl ElementView for MemoryDom {
    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|n| n.tag.as_str())
    }

    fn attribute_value(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(node.0)?.attributes.get(name).map(String::as_str)
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }
}

impl Dom for MemoryDom {
    fn query_one(&self, selector: &str) -> Option<NodeId> {
        self.select(self.root, selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.select(self.root, selector)
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        self.select(root, selector).into_iter().next()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.attribute_value(*node, "id") == Some(id))
    }

    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let list = SelectorList::parse(selector)?;
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if list.matches(self, current) {
                return Some(current);
            }
            cursor = self.parent_of(current);
        }
        None
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent_of(node)
    }

    fn body(&self) -> NodeId {
        self.body
    }

    fn document_element(&self) -> NodeId {
        self.root
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(tag)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.attach(parent, child, None);
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.attach(parent, child, Some(reference));
    }

    fn remove(&mut self, node: NodeId) {
        self.detach(node);
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.attribute_value(node, name).map(str::to_string)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(entry) = self.nodes.get_mut(node.0) {
            entry.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.nodes.get(node.0)?.styles.get(property).cloned()
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(entry) = self.nodes.get_mut(node.0) {
            entry.styles.insert(property.to_string(), value.to_string());
        }
    }

    fn computed_style(&self, node: NodeId, property: &str) -> Option<String> {
        self.style(node, property)
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) {
        let children = self
            .nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        for child in children {
            self.detach(child);
        }
        if let Some(entry) = self.nodes.get_mut(node.0) {
            entry.inner_html = Some(html.to_string());
            self.mutations += 1;
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(entry) = self.nodes.get_mut(node.0) {
            entry.text = text.to_string();
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        let Some(entry) = self.nodes.get(node.0) else {
            return String::new();
        };
        let mut text = entry.text.clone();
        for child in self.descendants(node) {
            text.push_str(&self.nodes[child.0].text);
        }
        text
    }

    fn value(&self, node: NodeId) -> String {
        self.nodes.get(node.0).map(|n| n.value.clone()).unwrap_or_default()
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(entry) = self.nodes.get_mut(node.0) {
            entry.value = value.to_string();
        }
    }

    fn bounding_box(&self, node: NodeId) -> Rect {
        self.nodes.get(node.0).map(|n| n.rect).unwrap_or_default()
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.scroll
    }

    fn location(&self) -> Url {
        self.location.clone()
    }

    fn navigate(&mut self, url: Url) {
        self.navigations.push(url.clone());
        self.location = url;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> MemoryDom {
        MemoryDom::new(Url::parse("https://www.google.com/search?q=cats").unwrap())
    }

    #[test]
    fn queries_follow_document_order() {
        let mut dom = page();
        let body = dom.body();
        let first = dom.element(body, "div", &[("class", "x")]);
        let nested = dom.element(first, "div", &[("class", "x")]);
        let second = dom.element(body, "div", &[("class", "x")]);
        assert_eq!(dom.query_all("div.x"), vec![first, nested, second]);
        assert_eq!(dom.query_one("div.x"), Some(first));
        assert_eq!(dom.query_within(first, "div.x"), Some(nested));
    }

    #[test]
    fn removed_nodes_are_unreachable() {
        let mut dom = page();
        let body = dom.body();
        let node = dom.element(body, "div", &[("id", "gone")]);
        assert_eq!(dom.element_by_id("gone"), Some(node));
        dom.remove(node);
        assert_eq!(dom.element_by_id("gone"), None);
        assert!(!dom.is_connected(node));
    }

    #[test]
    fn insert_before_places_node_ahead_of_reference() {
        let mut dom = page();
        let body = dom.body();
        let reference = dom.element(body, "button", &[]);
        let inserted = dom.create_element("span");
        dom.insert_before(body, inserted, reference);
        assert_eq!(dom.query_all("span, button"), vec![inserted, reference]);
    }

    #[test]
    fn closest_includes_the_node_itself() {
        let mut dom = page();
        let body = dom.body();
        let outer = dom.element(body, "div", &[("id", "outer")]);
        let inner = dom.element(outer, "svg", &[]);
        assert_eq!(dom.closest(inner, "#outer"), Some(outer));
        assert_eq!(dom.closest(outer, "#outer"), Some(outer));
        assert_eq!(dom.closest(inner, "#nowhere"), None);
    }

    #[test]
    fn inner_html_replaces_children() {
        let mut dom = page();
        let body = dom.body();
        let host = dom.element(body, "div", &[]);
        let child = dom.element(host, "p", &[]);
        dom.set_inner_html(host, "<rect></rect>");
        assert!(!dom.is_connected(child));
        assert_eq!(dom.inner_html(host), Some("<rect></rect>"));
    }

    #[test]
    fn navigate_records_and_moves_location() {
        let mut dom = page();
        let next = Url::parse("https://www.google.com/search?q=dogs").unwrap();
        dom.navigate(next.clone());
        assert_eq!(dom.location(), next);
        assert_eq!(dom.navigations(), &[next]);
    }

    #[test]
    fn search_page_fixtures_expose_site_selectors() {
        let url = Url::parse("https://x.com/search?q=cats").unwrap();
        let dom = MemoryDom::search_page(url, Site::Twitter);
        assert_eq!(dom.count(r#"button[aria-label="More"]"#), 1);
    }
}
