pub mod memory;
pub mod selector;

pub use memory::MemoryDom;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

pub trait Dom {
    fn query_one(&self, selector: &str) -> Option<NodeId>;
    fn query_all(&self, selector: &str) -> Vec<NodeId>;
    fn query_within(&self, root: NodeId, selector: &str) -> Option<NodeId>;
    fn element_by_id(&self, id: &str) -> Option<NodeId>;
    /// The node itself or its nearest ancestor matching `selector`.
    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn body(&self) -> NodeId;
    fn document_element(&self) -> NodeId;

    fn create_element(&mut self, tag: &str) -> NodeId;
    fn append_child(&mut self, parent: NodeId, child: NodeId);
    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId);
    fn remove(&mut self, node: NodeId);

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn style(&self, node: NodeId, property: &str) -> Option<String>;
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);
    fn computed_style(&self, node: NodeId, property: &str) -> Option<String>;
    fn set_inner_html(&mut self, node: NodeId, html: &str);
    fn set_text(&mut self, node: NodeId, text: &str);
    fn text_content(&self, node: NodeId) -> String;
    fn value(&self, node: NodeId) -> String;
    fn set_value(&mut self, node: NodeId, value: &str);

    fn bounding_box(&self, node: NodeId) -> Rect;
    fn scroll_offset(&self) -> ScrollOffset;

    fn location(&self) -> Url;
    fn navigate(&mut self, url: Url);
}

pub fn set_styles(dom: &mut dyn Dom, node: NodeId, styles: &[(&str, &str)]) {
    for (property, value) in styles {
        dom.set_style(node, property, value);
    }
}

pub fn has_class(dom: &dyn Dom, node: NodeId, class: &str) -> bool {
    dom.attribute(node, "class")
        .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}
